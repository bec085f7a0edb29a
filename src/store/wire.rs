//! Wire document shapes for the `testScenarios` collection
//!
//! The store speaks its own dialect: camelCase field names and a
//! seconds/nanos timestamp pair. Translation to the domain's `DateTime<Utc>`
//! happens here and only here, at the repository boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scenario::{ScenarioDraft, ScenarioId, Step, TestScenario};

/// Store-native time representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl From<DateTime<Utc>> for WireTimestamp {
    fn from(ts: DateTime<Utc>) -> Self {
        Self {
            seconds: ts.timestamp(),
            nanos: ts.timestamp_subsec_nanos(),
        }
    }
}

impl WireTimestamp {
    /// Normalize to the domain timestamp type. An out-of-range pair falls
    /// back to the current time, matching how a missing server timestamp is
    /// treated.
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.seconds, self.nanos).unwrap_or_else(Utc::now)
    }
}

/// A step as stored in a scenario document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDoc {
    pub id: u64,
    pub description: String,
}

/// A scenario document as held by the store. The document id lives outside
/// the document itself (store-assigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDoc {
    pub name: String,
    pub goal: String,
    pub steps: Vec<StepDoc>,
    pub created_at: WireTimestamp,
    pub updated_at: WireTimestamp,
}

/// The writable fields of an update: everything but `createdAt`, which the
/// store preserves from the original document.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPatch {
    pub name: String,
    pub goal: String,
    pub steps: Vec<StepDoc>,
    pub updated_at: WireTimestamp,
}

pub(crate) fn steps_to_wire(steps: &[Step]) -> Vec<StepDoc> {
    steps
        .iter()
        .map(|s| StepDoc {
            id: s.id,
            description: s.description.clone(),
        })
        .collect()
}

pub(crate) fn steps_from_wire(steps: &[StepDoc]) -> Vec<Step> {
    steps
        .iter()
        .map(|s| Step::new(s.id, s.description.clone()))
        .collect()
}

impl ScenarioDoc {
    /// Build a fresh document from a draft, stamping both timestamps.
    pub fn from_draft(draft: &ScenarioDraft, now: DateTime<Utc>) -> Self {
        Self {
            name: draft.name.clone(),
            goal: draft.goal.clone(),
            steps: steps_to_wire(&draft.steps),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// Translate into a domain record, normalizing timestamps.
    pub fn into_scenario(self, id: ScenarioId) -> TestScenario {
        TestScenario {
            id,
            name: self.name,
            goal: self.goal,
            steps: steps_from_wire(&self.steps),
            created_at: self.created_at.to_datetime(),
            updated_at: self.updated_at.to_datetime(),
        }
    }
}
