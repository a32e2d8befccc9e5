//! Script loading wired through repositories, the service, and a live
//! controller.

use std::sync::Arc;
use std::time::Duration;

use enemy_core::{
    Command, EnemyController, EnemyEffect, EntityId, FsmState, Intelligence, OverrideMode,
    Rarity, ScriptConfig, ScriptTicket,
};
use runtime::{
    FileScriptRepository, InMemoryScriptRepository, NodeSpec, ScriptDefinition, ScriptMetadata,
    ScriptRepository, ScriptService,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn definition(id: &str, mode: OverrideMode) -> ScriptDefinition {
    let tree = NodeSpec::Action(EnemyEffect::Idle {
        duration: Some(60.0),
    });
    let (tree, bonus_tree) = match mode {
        OverrideMode::Bonus => (None, Some(NodeSpec::Action(EnemyEffect::Special))),
        _ => (Some(tree), None),
    };
    ScriptDefinition {
        id: id.into(),
        name: id.into(),
        mode,
        tree,
        bonus_tree,
        metadata: ScriptMetadata::default(),
    }
}

fn config(id: &str, mode: OverrideMode) -> ScriptConfig {
    ScriptConfig {
        script_id: id.into(),
        mode,
    }
}

async fn drive_until<F: Fn(&EnemyController) -> bool>(
    enemy: &mut EnemyController,
    dt: f32,
    frames: usize,
    done: F,
) -> bool {
    for _ in 0..frames {
        enemy.update(&[], dt);
        if done(enemy) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    false
}

#[tokio::test]
async fn file_repository_round_trips_definitions() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let def = definition("statue", OverrideMode::Full);
    let text = ron::to_string(&def).unwrap();
    tokio::fs::write(dir.path().join("statue.ron"), text)
        .await
        .unwrap();

    let repo = FileScriptRepository::new(dir.path());
    let fetched = repo.fetch("statue").await.unwrap();
    assert_eq!(fetched, def);
    assert_eq!(repo.list().await.unwrap(), vec!["statue".to_string()]);

    let missing = repo.fetch("nope").await;
    assert!(matches!(missing, Err(runtime::ScriptError::NotFound(_))));
}

#[tokio::test]
async fn loaded_full_script_takes_over_the_entity() {
    init_tracing();
    let repo = Arc::new(InMemoryScriptRepository::new());
    repo.insert(definition("statue", OverrideMode::Full)).unwrap();
    let service = ScriptService::new(repo, 8);

    let ticket = service.request(&config("statue", OverrideMode::Full));
    let mut enemy = EnemyController::builder(EntityId(20), Rarity::Common, Intelligence::Basic)
        .script_ticket(ticket)
        .build();

    let attached = drive_until(&mut enemy, 0.1, 200, |e| e.script_attached()).await;
    assert!(attached, "the async load resolved and hot-swapped in");

    // The scripted fixed idle holds well past the base tree's patrol timeout.
    for _ in 0..100 {
        enemy.update(&[], 0.1);
    }
    assert_eq!(enemy.state(), FsmState::Idle);
    assert!(!enemy.is_thinking());
}

#[tokio::test]
async fn missing_script_degrades_to_the_base_tree() {
    init_tracing();
    let repo = Arc::new(InMemoryScriptRepository::new());
    let service = ScriptService::new(repo, 8);

    let ticket = service.request(&config("ghost", OverrideMode::Full));
    let mut enemy = EnemyController::builder(EntityId(21), Rarity::Common, Intelligence::Basic)
        .script_ticket(ticket)
        .build();

    let resolved = drive_until(&mut enemy, 0.1, 200, |e| !e.script_pending()).await;
    assert!(resolved, "the failed load was observed and discarded");
    assert!(!enemy.script_attached());

    // Base behavior continues: the routine idle timeout still walks out.
    let walking =
        drive_until(&mut enemy, 0.1, 200, |e| e.state() == FsmState::Walking).await;
    assert!(walking);
}

#[tokio::test]
async fn bonus_script_supplements_the_base_decision() {
    init_tracing();
    let repo = Arc::new(InMemoryScriptRepository::new());
    repo.insert(definition("warcry", OverrideMode::Bonus)).unwrap();
    let service = ScriptService::new(repo, 8);

    let ticket = service.request(&config("warcry", OverrideMode::Bonus));
    let mut enemy = EnemyController::builder(EntityId(22), Rarity::Common, Intelligence::Basic)
        .script_ticket(ticket)
        .build();

    let composited = drive_until(&mut enemy, 0.1, 400, |e| {
        matches!(e.last_decision().1, Some(Command::Composite(_, _)))
    })
    .await;
    assert!(composited, "both sides yielded, producing a composite");
}

#[tokio::test]
async fn cache_hits_resolve_on_the_first_poll() {
    init_tracing();
    let repo = Arc::new(InMemoryScriptRepository::new());
    repo.insert(definition("statue", OverrideMode::Full)).unwrap();
    let service = ScriptService::new(repo, 8);

    // Prime the cache through a completed load.
    let ticket = service.request(&config("statue", OverrideMode::Full));
    let mut first = EnemyController::builder(EntityId(23), Rarity::Common, Intelligence::Basic)
        .script_ticket(ticket)
        .build();
    assert!(drive_until(&mut first, 0.1, 200, |e| e.script_attached()).await);

    // The second entity's ticket is ready without any task round trip.
    let mut ticket = service.request(&config("statue", OverrideMode::Full));
    assert!(matches!(ticket.poll(), enemy_core::ScriptPoll::Ready(_)));
}
