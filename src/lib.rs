//! # Agentest
//!
//! Compose test scenarios (a goal plus ordered natural-language steps), keep
//! them synchronized with a shared scenario store, and dispatch them to an
//! AI-model backend for execution with every failure classified.
//!
//! ## Modules
//!
//! - `scenario` - Domain model: steps, scenarios, drafts
//! - `store` - Document-store seam, wire documents, repository, subscription
//! - `editor` - The editor session state machine and its auto-save protocol
//! - `dispatch` - Model endpoint selection, run requests, outcome taxonomy
//! - `settings` - Executor settings persistence and the `/api/config` boundary

pub mod cli;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod scenario;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
