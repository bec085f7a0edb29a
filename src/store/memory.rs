//! In-memory document store backend
//!
//! Backs local single-process use and the test suites. Documents live in a
//! `BTreeMap` keyed by id (store-default order is therefore id order), and
//! every successful mutation publishes a full collection snapshot on a
//! broadcast channel.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::traits::{CollectionSnapshot, DocumentStore};
use super::wire::{ScenarioDoc, ScenarioPatch};
use crate::scenario::ScenarioId;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// In-memory `DocumentStore` implementation.
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, ScenarioDoc>>,
    snapshots: broadcast::Sender<CollectionSnapshot>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            docs: Mutex::new(BTreeMap::new()),
            snapshots,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Simulate a store outage: while set, every mutation fails with
    /// `StoreError::Unavailable` and publishes nothing. Used by tests to
    /// exercise the persistence error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.docs.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("write rejected".to_string()))
        } else {
            Ok(())
        }
    }

    fn publish(&self, docs: &BTreeMap<String, ScenarioDoc>) {
        let snapshot: CollectionSnapshot = Arc::new(
            docs.iter()
                .map(|(id, doc)| (ScenarioId::from(id.as_str()), doc.clone()))
                .collect(),
        );
        // No receivers is fine; the send result only signals that.
        let _ = self.snapshots.send(snapshot);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, doc: ScenarioDoc) -> StoreResult<ScenarioId> {
        self.check_available()?;
        let id = Uuid::new_v4().to_string();
        let mut docs = self.docs.lock().expect("store lock poisoned");
        docs.insert(id.clone(), doc);
        self.publish(&docs);
        Ok(ScenarioId::from_string(id))
    }

    async fn update(&self, id: &ScenarioId, patch: ScenarioPatch) -> StoreResult<()> {
        self.check_available()?;
        let mut docs = self.docs.lock().expect("store lock poisoned");
        let doc = docs
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.name = patch.name;
        doc.goal = patch.goal;
        doc.steps = patch.steps;
        doc.updated_at = patch.updated_at;
        self.publish(&docs);
        Ok(())
    }

    async fn remove(&self, id: &ScenarioId) -> StoreResult<()> {
        self.check_available()?;
        let mut docs = self.docs.lock().expect("store lock poisoned");
        if docs.remove(id.as_str()).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.publish(&docs);
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<CollectionSnapshot> {
        self.snapshots.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioDraft;
    use crate::store::wire::steps_to_wire;
    use chrono::Utc;

    fn doc(goal: &str) -> ScenarioDoc {
        ScenarioDoc::from_draft(
            &ScenarioDraft {
                name: goal.to_string(),
                goal: goal.to_string(),
                steps: Vec::new(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.insert(doc("a")).await.unwrap();
        let b = store.insert(doc("b")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let store = MemoryStore::new();
        let original = doc("a");
        let created_at = original.created_at;
        let id = store.insert(original).await.unwrap();

        store
            .update(
                &id,
                ScenarioPatch {
                    name: "b".to_string(),
                    goal: "b".to_string(),
                    steps: steps_to_wire(&[]),
                    updated_at: Utc::now().into(),
                },
            )
            .await
            .unwrap();

        let mut rx = store.watch();
        store.insert(doc("c")).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        let (_, updated) = snapshot
            .iter()
            .find(|(doc_id, _)| doc_id == &id)
            .expect("updated doc present");
        assert_eq!(updated.goal, "b");
        assert_eq!(updated.created_at, created_at);
    }

    #[tokio::test]
    async fn test_update_missing_doc_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(
                &ScenarioId::from("missing"),
                ScenarioPatch {
                    name: String::new(),
                    goal: String::new(),
                    steps: Vec::new(),
                    updated_at: Utc::now().into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_watch_receives_own_writes() {
        let store = MemoryStore::new();
        let mut rx = store.watch();
        let id = store.insert(doc("a")).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, id);
    }

    #[tokio::test]
    async fn test_failing_store_rejects_and_publishes_nothing() {
        let store = MemoryStore::new();
        let mut rx = store.watch();
        store.set_fail_writes(true);
        let err = store.insert(doc("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.is_empty());
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        store.set_fail_writes(false);
        store.insert(doc("a")).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
