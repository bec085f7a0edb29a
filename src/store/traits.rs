//! Core trait definition for the document store seam

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::error::StoreResult;
use super::wire::{ScenarioDoc, ScenarioPatch};
use crate::scenario::ScenarioId;

/// Full state of the collection at some point in time, pushed to every
/// watcher on every change (own writes included). No ordering guarantee
/// beyond the store default.
pub type CollectionSnapshot = Arc<Vec<(ScenarioId, ScenarioDoc)>>;

/// A document database holding the `testScenarios` collection.
///
/// Implementations assign document ids, preserve `createdAt` across updates,
/// and publish the full current collection after every successful mutation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its store-assigned id.
    async fn insert(&self, doc: ScenarioDoc) -> StoreResult<ScenarioId>;

    /// Overwrite the writable fields of an existing document.
    async fn update(&self, id: &ScenarioId, patch: ScenarioPatch) -> StoreResult<()>;

    /// Delete a document.
    async fn remove(&self, id: &ScenarioId) -> StoreResult<()>;

    /// Watch the collection. Each call returns an independent receiver;
    /// dropping it releases the watch.
    fn watch(&self) -> broadcast::Receiver<CollectionSnapshot>;
}
