//! Asynchronous script loading behind the controller's polling seam.
//!
//! `request` never blocks: a cache hit compiles synchronously into an
//! immediately-ready ticket, a miss spawns a fetch task and hands back a
//! ticket wrapping the task's oneshot result. The controller polls the
//! ticket once per frame and keeps running on its base tree until the load
//! resolves.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{info, warn};

use enemy_core::{ScriptConfig, ScriptPoll, ScriptTicket};

use crate::cache::ScriptCache;
use crate::definition::ScriptDefinition;
use crate::error::{Result, ScriptError};
use crate::repository::ScriptRepository;

pub struct ScriptService {
    repository: Arc<dyn ScriptRepository>,
    cache: Arc<Mutex<ScriptCache>>,
}

impl ScriptService {
    pub fn new(repository: Arc<dyn ScriptRepository>, cache_capacity: usize) -> ScriptService {
        ScriptService {
            repository,
            cache: Arc::new(Mutex::new(ScriptCache::new(cache_capacity))),
        }
    }

    /// Begin loading the configured script.
    ///
    /// Must be called from within a tokio runtime; the fetch task is spawned
    /// onto it. The returned ticket is given to the entity's controller.
    pub fn request(&self, config: &ScriptConfig) -> Box<dyn ScriptTicket> {
        let id = config.script_id.clone();
        if let Some(definition) = self.cached(&id) {
            info!(%id, "script served from cache");
            return Box::new(ImmediateTicket(Some(compile_checked(&definition, config))));
        }

        let (tx, rx) = oneshot::channel();
        let repository = self.repository.clone();
        let cache = self.cache.clone();
        let requested = config.clone();
        tokio::spawn(async move {
            let result = load_and_cache(repository, cache, &requested).await;
            // The receiver may have been dropped with its entity; nothing to do.
            let _ = tx.send(result);
        });
        Box::new(PendingTicket { rx: Some(rx) })
    }

    fn cached(&self, id: &str) -> Option<ScriptDefinition> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(id).cloned())
    }
}

async fn load_and_cache(
    repository: Arc<dyn ScriptRepository>,
    cache: Arc<Mutex<ScriptCache>>,
    config: &ScriptConfig,
) -> Result<ScriptDefinition> {
    let definition = repository.fetch(&config.script_id).await?;
    definition.validate()?;
    if let Ok(mut cache) = cache.lock() {
        cache.insert(definition.clone());
    }
    info!(id = %definition.id, mode = ?definition.mode, "script loaded and cached");
    Ok(definition)
}

fn compile_checked(
    definition: &ScriptDefinition,
    config: &ScriptConfig,
) -> Result<enemy_core::CompiledScript> {
    if definition.mode != config.mode {
        // The definition is authoritative; the request's mode is a hint.
        warn!(id = %definition.id, requested = ?config.mode, actual = ?definition.mode,
            "script mode differs from the requested mode");
    }
    definition.compile()
}

/// Ticket that resolves on its first poll.
struct ImmediateTicket(Option<Result<enemy_core::CompiledScript>>);

impl ScriptTicket for ImmediateTicket {
    fn poll(&mut self) -> ScriptPoll {
        match self.0.take() {
            Some(Ok(script)) => ScriptPoll::Ready(script),
            Some(Err(err)) => ScriptPoll::Failed(err.to_string()),
            None => ScriptPoll::Pending,
        }
    }
}

/// Ticket backed by an in-flight load task.
struct PendingTicket {
    rx: Option<oneshot::Receiver<Result<ScriptDefinition>>>,
}

impl ScriptTicket for PendingTicket {
    fn poll(&mut self) -> ScriptPoll {
        let Some(rx) = self.rx.as_mut() else {
            return ScriptPoll::Pending;
        };
        match rx.try_recv() {
            Ok(Ok(definition)) => {
                self.rx = None;
                match definition.compile() {
                    Ok(script) => ScriptPoll::Ready(script),
                    Err(err) => ScriptPoll::Failed(err.to_string()),
                }
            }
            Ok(Err(err)) => {
                self.rx = None;
                ScriptPoll::Failed(err.to_string())
            }
            Err(oneshot::error::TryRecvError::Empty) => ScriptPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                ScriptPoll::Failed(ScriptError::TaskDropped.to_string())
            }
        }
    }
}
