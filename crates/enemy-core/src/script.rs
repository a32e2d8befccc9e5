//! Script overlays: loaded trees that replace or supplement the base logic.
//!
//! Loading is asynchronous and owned by the host; the controller only polls a
//! [`ScriptTicket`] once per frame, so a slow or failed load never stalls the
//! update. A failed ticket degrades to the base tree and is logged once.

use std::panic::{self, AssertUnwindSafe};

use behavior_tree::Status;
use tracing::{error, warn};

use crate::command::Command;
use crate::context::DecisionContext;
use crate::factory::EnemyTree;

/// How a script's output combines with the base tree during a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverrideMode {
    /// The script replaces the base tree entirely; if it yields nothing the
    /// consultation falls back to the base tree.
    Full,
    /// The script runs first; the base tree only runs when the script
    /// abstains.
    Partial,
    /// The base tree decides; the script may attach a bonus command, yielding
    /// a composite.
    Bonus,
}

/// Requested script attachment for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptConfig {
    pub script_id: String,
    pub mode: OverrideMode,
}

/// A validated, ready-to-tick script.
#[derive(Debug)]
pub struct CompiledScript {
    pub id: String,
    pub name: String,
    pub mode: OverrideMode,
    pub tree: EnemyTree,
    /// Secondary tree consulted for the bonus command in [`OverrideMode::Bonus`].
    pub bonus: Option<EnemyTree>,
}

impl CompiledScript {
    /// Tick the script's primary tree against a fresh context.
    ///
    /// Script trees come from data files the core does not author, so the
    /// tick runs under a panic boundary: a panicking overlay is disarmed by
    /// the caller and the base tree takes over. Returns `None` on panic or
    /// when the tree resolves without a command.
    pub fn consult(&mut self, ctx: &mut DecisionContext<'_>) -> Result<Option<Command>, ()> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.tree.tick(ctx))) {
            Ok(Status::Running) => {
                warn!(script = %self.id, "script tree returned running; treating as abstain");
                Ok(ctx.take_command())
            }
            Ok(_) => Ok(ctx.take_command()),
            Err(_) => {
                error!(script = %self.id, "script tree panicked; disarming overlay");
                Err(())
            }
        }
    }

    /// Tick the bonus tree, if any, for an extra command.
    pub fn consult_bonus(&mut self, ctx: &mut DecisionContext<'_>) -> Result<Option<Command>, ()> {
        let Some(bonus) = self.bonus.as_mut() else {
            return Ok(None);
        };
        match panic::catch_unwind(AssertUnwindSafe(|| bonus.tick(ctx))) {
            Ok(_) => Ok(ctx.take_command()),
            Err(_) => {
                error!(script = %self.id, "bonus tree panicked; disarming overlay");
                Err(())
            }
        }
    }
}

/// Outcome of polling a script load.
pub enum ScriptPoll {
    /// Still loading; poll again next frame.
    Pending,
    /// Load finished; attach the script.
    Ready(CompiledScript),
    /// Load failed; the reason has already been logged by the loader.
    Failed(String),
}

/// Handle to an in-flight script load.
///
/// Implementations wrap whatever async machinery the host uses; the
/// controller only ever calls [`ScriptTicket::poll`] and never blocks.
pub trait ScriptTicket: Send {
    fn poll(&mut self) -> ScriptPoll;
}
