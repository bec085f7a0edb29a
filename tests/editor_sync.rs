//! End-to-end editor/store synchronization walk-through

use std::sync::Arc;
use std::time::Duration;

use agentest::editor::{EditorSession, EditorStatus};
use agentest::scenario::TestScenario;
use agentest::store::{MemoryStore, ScenarioRepository, ScenarioSubscription};

/// Drain buffered snapshots and return the most recent one.
async fn settled(sub: &mut ScenarioSubscription) -> Vec<TestScenario> {
    let mut latest = sub.next().await.expect("at least one snapshot");
    while let Ok(Some(next)) = tokio::time::timeout(Duration::from_millis(100), sub.next()).await {
        latest = next;
    }
    latest
}

#[tokio::test]
async fn create_load_and_remove_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let repo = ScenarioRepository::new(store.clone());
    let session = EditorSession::new(repo.clone());
    let mut sub = repo.subscribe();

    // Compose a scenario; auto-save fires a create and binds the session.
    session.set_goal("Login flow");
    session.add_step("Open app");
    session.add_step("Tap login");
    session.flush().await;

    let bound = session.bound_id().expect("session bound after auto-save");
    assert_eq!(session.status(), EditorStatus::Idle);

    let scenarios = settled(&mut sub).await;
    assert_eq!(scenarios.len(), 1);
    let persisted = scenarios[0].clone();
    assert_eq!(persisted.id, bound);
    assert_eq!(persisted.goal, "Login flow");
    assert_eq!(persisted.name, "Login flow");
    let descriptions: Vec<&str> = persisted
        .steps
        .iter()
        .map(|s| s.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Open app", "Tap login"]);
    assert!(persisted.updated_at >= persisted.created_at);

    // Loading the persisted scenario reproduces the editor state exactly.
    let fresh = EditorSession::new(repo.clone());
    fresh.load_scenario(&persisted);
    assert_eq!(fresh.goal(), "Login flow");
    assert_eq!(fresh.steps(), persisted.steps);
    assert_eq!(fresh.bound_id(), Some(bound.clone()));

    // Removing the second step leaves exactly the first, in the store too.
    let second_id = persisted.steps[1].id;
    fresh.remove_step(second_id);
    fresh.flush().await;

    let scenarios = settled(&mut sub).await;
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].steps.len(), 1);
    assert_eq!(scenarios[0].steps[0].description, "Open app");
}

#[tokio::test]
async fn subscription_sees_deletes_from_other_sessions() {
    let store = Arc::new(MemoryStore::new());
    let repo = ScenarioRepository::new(store.clone());

    let first = EditorSession::new(repo.clone());
    first.set_goal("first");
    first.flush().await;
    let first_id = first.bound_id().unwrap();

    let second = EditorSession::new(repo.clone());
    second.set_goal("second");
    second.flush().await;

    let mut sub = repo.subscribe();
    // Deleting through another session: the subscriber sees the shrunken
    // collection, and the deleting session is unaffected (not its binding).
    second.delete_scenario(&first_id).await.unwrap();

    let scenarios = settled(&mut sub).await;
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].goal, "second");
    assert_eq!(second.goal(), "second");
    assert!(second.bound_id().is_some());
}
