//! Scenario editor session
//!
//! Holds the single "currently edited" scenario (goal plus ordered steps) and
//! drives auto-persistence through the [`ScenarioRepository`]. Local state is
//! always the user-visible truth: a failed write never rolls edits back, the
//! store is reconciled on the next successful write.
//!
//! Auto-save is coalescing and single-flight: at most one save task runs per
//! session, and mutations arriving while a write is in flight mark the
//! session dirty so the worker re-snapshots and writes again. Every write is
//! tagged with the session epoch at issue time; `new_scenario` and
//! `load_scenario` bump the epoch, so a write that completes after the
//! session has moved on is discarded instead of resurrecting stale state.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::scenario::{ScenarioDraft, ScenarioId, Step, TestScenario};
use crate::store::{ScenarioRepository, StoreResult};


/// Persistence status of the editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    /// No pending write
    Idle,
    /// A write is in flight
    Saving,
    /// The last write failed; the message is retained until cleared or
    /// superseded by the next save attempt
    Error(String),
}

/// Edit-in-progress sub-state for a single step.
#[derive(Debug, Clone)]
struct StepEdit {
    id: u64,
    draft: String,
}

#[derive(Debug)]
struct EditorState {
    goal: String,
    steps: Vec<Step>,
    step_counter: u64,
    bound_id: Option<ScenarioId>,
    editing: Option<StepEdit>,
    status: EditorStatus,
    /// Bumped on `new_scenario`/`load_scenario`; stale-write guard.
    epoch: u64,
    /// Content changed since the in-flight save snapshotted it.
    dirty: bool,
    save_in_flight: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl EditorState {
    fn initial() -> Self {
        Self {
            goal: String::new(),
            steps: Vec::new(),
            step_counter: 1,
            bound_id: None,
            editing: None,
            status: EditorStatus::Idle,
            epoch: 0,
            dirty: false,
            save_in_flight: false,
            last_saved_at: None,
        }
    }

    /// Reset to the initial editing state, keeping the epoch monotonic so
    /// in-flight writes issued before the reset are discarded on completion.
    fn reset(&mut self) {
        let epoch = self.epoch + 1;
        let save_in_flight = self.save_in_flight;
        *self = Self::initial();
        self.epoch = epoch;
        self.save_in_flight = save_in_flight;
    }

    fn draft(&self) -> ScenarioDraft {
        // `name` is derived from the goal in this deployment.
        ScenarioDraft {
            name: self.goal.clone(),
            goal: self.goal.clone(),
            steps: self.steps.clone(),
        }
    }
}

/// The editor session: one instance per active editing context.
///
/// Cheap to clone; clones share the same underlying session state.
#[derive(Clone)]
pub struct EditorSession {
    state: Arc<Mutex<EditorState>>,
    repo: ScenarioRepository,
    idle: Arc<Notify>,
}

impl EditorSession {
    pub fn new(repo: ScenarioRepository) -> Self {
        Self {
            state: Arc::new(Mutex::new(EditorState::initial())),
            repo,
            idle: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().expect("editor state lock poisoned")
    }

    // --- accessors ---------------------------------------------------------

    pub fn goal(&self) -> String {
        self.lock().goal.clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.lock().steps.clone()
    }

    pub fn status(&self) -> EditorStatus {
        self.lock().status.clone()
    }

    pub fn bound_id(&self) -> Option<ScenarioId> {
        self.lock().bound_id.clone()
    }

    /// Id of the step currently mid-edit, if any.
    pub fn editing_step(&self) -> Option<u64> {
        self.lock().editing.as_ref().map(|e| e.id)
    }

    /// Time of the last successful save. The presentation layer may show
    /// this as a transient "saved" acknowledgment; it is not durable.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.lock().last_saved_at
    }

    /// Current goal and steps, for dispatching.
    pub fn snapshot(&self) -> (String, Vec<Step>) {
        let st = self.lock();
        (st.goal.clone(), st.steps.clone())
    }

    // --- mutations ---------------------------------------------------------

    /// Append a step with the next monotonic id. No-op when the description
    /// trims to empty.
    pub fn add_step(&self, description: &str) {
        {
            let mut st = self.lock();
            if description.trim().is_empty() {
                return;
            }
            let id = st.step_counter;
            st.steps.push(Step::new(id, description));
            st.step_counter += 1;
        }
        self.schedule_save();
    }

    /// Remove the step with the given id; cancels an in-flight edit of it.
    pub fn remove_step(&self, id: u64) {
        {
            let mut st = self.lock();
            st.steps.retain(|s| s.id != id);
            if st.editing.as_ref().is_some_and(|e| e.id == id) {
                st.editing = None;
            }
        }
        self.schedule_save();
    }

    /// Enter the edit sub-state for a step. Only one step may be mid-edit at
    /// a time; starting a new edit replaces any previous one. Returns false
    /// when no step has that id.
    pub fn edit_step(&self, id: u64) -> bool {
        let mut st = self.lock();
        match st.steps.iter().find(|s| s.id == id) {
            Some(step) => {
                let draft = step.description.clone();
                st.editing = Some(StepEdit { id, draft });
                true
            }
            None => false,
        }
    }

    /// Replace the draft text of the step currently mid-edit.
    pub fn update_edit_draft(&self, text: &str) {
        let mut st = self.lock();
        if let Some(edit) = st.editing.as_mut() {
            edit.draft = text.to_string();
        }
    }

    /// Commit the in-flight edit. A draft that trims to empty is a no-op and
    /// keeps the edit sub-state open; otherwise the description is replaced
    /// and the sub-state exits.
    pub fn commit_edit(&self) {
        {
            let mut st = self.lock();
            let Some(edit) = st.editing.clone() else {
                return;
            };
            if edit.draft.trim().is_empty() {
                return;
            }
            if let Some(step) = st.steps.iter_mut().find(|s| s.id == edit.id) {
                step.description = edit.draft;
            }
            st.editing = None;
        }
        self.schedule_save();
    }

    /// Discard the in-flight edit.
    pub fn cancel_edit(&self) {
        self.lock().editing = None;
    }

    /// Replace the goal verbatim; empty is allowed while typing.
    pub fn set_goal(&self, text: &str) {
        {
            let mut st = self.lock();
            st.goal = text.to_string();
        }
        self.schedule_save();
    }

    /// Replace goal, steps, and binding wholesale from a persisted scenario.
    /// The step counter restarts above every loaded id, so future ids never
    /// collide with loaded ones.
    pub fn load_scenario(&self, scenario: &TestScenario) {
        let mut st = self.lock();
        st.epoch += 1;
        st.goal = scenario.goal.clone();
        st.steps = scenario.steps.clone();
        st.step_counter = scenario.max_step_id().map_or(1, |max| max + 1);
        st.bound_id = Some(scenario.id.clone());
        st.editing = None;
        st.status = EditorStatus::Idle;
        st.dirty = false;
        debug!(id = %scenario.id, "loaded scenario into editor");
    }

    /// Clear goal, steps, binding, and counter back to the initial state.
    pub fn new_scenario(&self) {
        self.lock().reset();
        debug!("editor reset to new scenario");
    }

    /// Clear a retained error state.
    pub fn clear_error(&self) {
        let mut st = self.lock();
        if matches!(st.status, EditorStatus::Error(_)) {
            st.status = EditorStatus::Idle;
        }
    }

    /// Request deletion of a persisted scenario. When the id is the bound
    /// one, the editor resets afterwards regardless of the delete outcome,
    /// so it never points at a non-existent record.
    pub async fn delete_scenario(&self, id: &ScenarioId) -> StoreResult<()> {
        let result = self.repo.delete(id).await;
        {
            let mut st = self.lock();
            if st.bound_id.as_ref() == Some(id) {
                st.reset();
            } else if result.is_err() {
                st.status = EditorStatus::Error("delete failed".to_string());
            }
        }
        if let Err(e) = &result {
            warn!(id = %id, error = %e, "scenario delete failed");
        }
        result
    }

    /// Wait until no save is in flight. Mutations made after the last
    /// `schedule_save` are included because the worker drains the dirty flag
    /// before exiting.
    pub async fn flush(&self) {
        loop {
            let notified = self.idle.notified();
            if !self.lock().save_in_flight {
                return;
            }
            notified.await;
        }
    }

    // --- auto-save ---------------------------------------------------------

    fn schedule_save(&self) {
        {
            let mut st = self.lock();
            // Never persist an empty placeholder.
            if st.goal.trim().is_empty() && st.steps.is_empty() {
                return;
            }
            st.dirty = true;
            if st.save_in_flight {
                return;
            }
            st.save_in_flight = true;
            st.status = EditorStatus::Saving;
        }
        let session = self.clone();
        tokio::spawn(async move { session.run_save_worker().await });
    }

    async fn run_save_worker(self) {
        loop {
            let (epoch, target, draft) = {
                let mut st = self.lock();
                st.dirty = false;
                let draft = st.draft();
                if draft.is_empty() {
                    // Content was cleared while the save was queued.
                    st.save_in_flight = false;
                    if st.status == EditorStatus::Saving {
                        st.status = EditorStatus::Idle;
                    }
                    drop(st);
                    self.idle.notify_waiters();
                    return;
                }
                (st.epoch, st.bound_id.clone(), draft)
            };

            let result = match &target {
                Some(id) => self.repo.update(id, &draft).await.map(|()| None),
                None => self.repo.create(&draft).await.map(Some),
            };

            {
                let mut st = self.lock();
                if st.epoch != epoch {
                    // The session moved on while this write was in flight;
                    // applying it would resurrect state the user navigated
                    // away from.
                    debug!("discarding stale auto-save result");
                } else {
                    match result {
                        Ok(bound) => {
                            if let Some(new_id) = bound {
                                debug!(id = %new_id, "auto-save created scenario");
                                st.bound_id = Some(new_id);
                            }
                            st.status = EditorStatus::Idle;
                            st.last_saved_at = Some(Utc::now());
                        }
                        Err(e) => {
                            warn!(error = %e, "auto-save failed");
                            st.status = EditorStatus::Error("auto-save failed".to_string());
                        }
                    }
                }
                if st.dirty {
                    st.status = EditorStatus::Saving;
                    continue;
                }
                st.save_in_flight = false;
            }
            self.idle.notify_waiters();
            return;
        }
    }
}
