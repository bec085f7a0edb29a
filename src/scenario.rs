//! Domain model for test scenarios
//!
//! A scenario is the unit of persistence and execution: a free-text goal plus
//! an ordered list of natural-language steps. Step order is execution order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a persisted scenario.
///
/// Absent until the scenario has been written once; the editor session holds
/// at most one of these as its binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Create from an existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One ordered instruction within a scenario.
///
/// The id is locally unique within its scenario and monotonically assigned;
/// ids are never reused, even after deletions. Ids never leave the editing
/// context — dispatch sends descriptions only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: u64,
    pub description: String,
}

impl Step {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// A persisted test scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub id: ScenarioId,
    pub name: String,
    pub goal: String,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestScenario {
    /// Largest step id present, or `None` for an empty scenario.
    pub fn max_step_id(&self) -> Option<u64> {
        self.steps.iter().map(|s| s.id).max()
    }
}

/// The writable fields of a scenario, as produced by the editor session.
///
/// The store assigns the id and the repository stamps the timestamps, so a
/// draft carries neither.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDraft {
    pub name: String,
    pub goal: String,
    pub steps: Vec<Step>,
}

impl ScenarioDraft {
    /// A draft with nothing worth persisting: blank goal and no steps.
    pub fn is_empty(&self) -> bool {
        self.goal.trim().is_empty() && self.steps.is_empty()
    }
}
