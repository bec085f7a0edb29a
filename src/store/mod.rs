//! Scenario persistence: document store seam, wire documents, repository
//!
//! The store is the single source of truth for the persisted collection. The
//! repository owns translation between domain records and wire documents and
//! exposes CRUD plus a live subscription that pushes the full collection on
//! every change.

pub mod error;
pub mod memory;
pub mod repository;
pub mod traits;
pub mod wire;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repository::{ScenarioRepository, ScenarioSubscription};
pub use traits::{CollectionSnapshot, DocumentStore};
