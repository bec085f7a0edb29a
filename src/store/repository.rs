//! Scenario repository: typed CRUD plus a live subscription
//!
//! The repository is the only place that sees wire documents. Callers hand it
//! drafts and get back domain records with normalized timestamps; timestamps
//! are stamped here (`created_at == updated_at` on create, full overwrite with
//! a fresh `updated_at` otherwise).

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::StoreResult;
use super::traits::{CollectionSnapshot, DocumentStore};
use super::wire::{steps_to_wire, ScenarioDoc, ScenarioPatch};
use crate::scenario::{ScenarioDraft, ScenarioId, TestScenario};

/// Repository over a [`DocumentStore`].
#[derive(Clone)]
pub struct ScenarioRepository {
    store: Arc<dyn DocumentStore>,
}

impl ScenarioRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new scenario and return its store-assigned id.
    pub async fn create(&self, draft: &ScenarioDraft) -> StoreResult<ScenarioId> {
        let doc = ScenarioDoc::from_draft(draft, chrono::Utc::now());
        let id = self.store.insert(doc).await?;
        debug!(id = %id, "created scenario");
        Ok(id)
    }

    /// Overwrite an existing scenario's writable fields.
    pub async fn update(&self, id: &ScenarioId, draft: &ScenarioDraft) -> StoreResult<()> {
        let patch = ScenarioPatch {
            name: draft.name.clone(),
            goal: draft.goal.clone(),
            steps: steps_to_wire(&draft.steps),
            updated_at: chrono::Utc::now().into(),
        };
        self.store.update(id, patch).await?;
        debug!(id = %id, "updated scenario");
        Ok(())
    }

    /// Delete a scenario.
    pub async fn delete(&self, id: &ScenarioId) -> StoreResult<()> {
        self.store.remove(id).await?;
        debug!(id = %id, "deleted scenario");
        Ok(())
    }

    /// Subscribe to the live collection. Safe to call repeatedly; each
    /// subscription is independent and releases its resources on drop.
    pub fn subscribe(&self) -> ScenarioSubscription {
        ScenarioSubscription {
            rx: self.store.watch(),
        }
    }
}

/// A live view of the `testScenarios` collection.
///
/// Yields the full current collection on every change, own writes included.
/// Snapshots are full-state, so a receiver that falls behind skips straight
/// to the newest one.
pub struct ScenarioSubscription {
    rx: broadcast::Receiver<CollectionSnapshot>,
}

impl ScenarioSubscription {
    /// Wait for the next collection snapshot. Returns `None` once the store
    /// has shut down.
    pub async fn next(&mut self) -> Option<Vec<TestScenario>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(Self::convert(&snapshot)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscription lagged; catching up to newest snapshot");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn convert(snapshot: &CollectionSnapshot) -> Vec<TestScenario> {
        snapshot
            .iter()
            .map(|(id, doc)| doc.clone().into_scenario(id.clone()))
            .collect()
    }
}
