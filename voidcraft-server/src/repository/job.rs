//! Job Repository
//!
//! The job store: the only shared mutable state in the service. Every read
//! and write of a job record goes through `JobStore`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;
use voidcraft_core::domain::inputs::CraftInputs;
use voidcraft_core::domain::job::{Job, JobStatus, StoryResult};

/// Store error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

/// A lifecycle step together with the fields it sets
#[derive(Debug, Clone)]
pub enum Transition {
    /// `Queued -> Running`, stamps `started_at`
    Start,
    /// `Running -> Completed`, stamps `finished_at`
    Complete {
        output_path: String,
        result: StoryResult,
    },
    /// `Running -> Failed`, stamps `finished_at`
    Fail { error: String },
}

impl Transition {
    pub fn target(&self) -> JobStatus {
        match self {
            Transition::Start => JobStatus::Running,
            Transition::Complete { .. } => JobStatus::Completed,
            Transition::Fail { .. } => JobStatus::Failed,
        }
    }

    fn allowed_from(&self) -> JobStatus {
        match self {
            Transition::Start => JobStatus::Queued,
            Transition::Complete { .. } | Transition::Fail { .. } => JobStatus::Running,
        }
    }
}

/// Concurrent mapping from job id to job record
///
/// Every operation is atomic with respect to the others: readers never see
/// a record with some fields of a transition applied and others not.
pub trait JobStore: Send + Sync {
    /// Inserts a queued job and returns its fresh id
    fn create(&self, inputs: CraftInputs) -> Uuid;

    /// Snapshot of a job
    fn get(&self, id: Uuid) -> Option<Job>;

    /// Applies a lifecycle step, returning the updated snapshot
    fn transition(&self, id: Uuid, transition: Transition) -> Result<Job, StoreError>;

    /// Removes terminal jobs that finished before `cutoff`
    ///
    /// Queued and running jobs are never removed.
    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> usize;

    /// Number of jobs currently held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory implementation of JobStore
///
/// Held for the life of the process; nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn create(&self, inputs: CraftInputs) -> Uuid {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);

        loop {
            let id = Uuid::new_v4();
            if let Entry::Vacant(slot) = jobs.entry(id) {
                slot.insert(Job::new(id, inputs));
                return id;
            }
        }
    }

    fn get(&self, id: Uuid) -> Option<Job> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&id).cloned()
    }

    fn transition(&self, id: Uuid, transition: Transition) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if job.status != transition.allowed_from() {
            return Err(StoreError::InvalidTransition {
                id,
                from: job.status,
                to: transition.target(),
            });
        }

        // Timestamps never run backwards, even if the wall clock does.
        let now = Utc::now();
        match transition {
            Transition::Start => {
                job.status = JobStatus::Running;
                job.started_at = Some(now.max(job.created_at));
            }
            Transition::Complete {
                output_path,
                result,
            } => {
                job.status = JobStatus::Completed;
                job.finished_at = Some(now.max(job.started_at.unwrap_or(job.created_at)));
                job.output_path = Some(output_path);
                job.result = Some(result);
            }
            Transition::Fail { error } => {
                job.status = JobStatus::Failed;
                job.finished_at = Some(now.max(job.started_at.unwrap_or(job.created_at)));
                job.error = Some(error);
            }
        }

        Ok(job.clone())
    }

    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let before = jobs.len();
        jobs.retain(|_, job| {
            !(job.status.is_terminal() && job.finished_at.is_some_and(|at| at < cutoff))
        });
        before - jobs.len()
    }

    fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn inputs() -> CraftInputs {
        CraftInputs::new(
            "medieval".to_string(),
            vec!["Arthur".to_string(), "Merlin".to_string()],
            2026,
        )
    }

    fn complete() -> Transition {
        Transition::Complete {
            output_path: "craft_results/craft.md".to_string(),
            result: StoryResult::Text("The end".to_string()),
        }
    }

    #[test]
    fn test_create_inserts_queued_job() {
        let store = InMemoryJobStore::new();
        let id = store.create(inputs());

        let job = store.get(id).unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.inputs, inputs());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_returns_none() {
        let store = InMemoryJobStore::new();
        assert!(store.get(Uuid::new_v4()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_successful_lifecycle() {
        let store = InMemoryJobStore::new();
        let id = store.create(inputs());

        let running = store.transition(id, Transition::Start).unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert!(running.started_at.unwrap() >= running.created_at);
        assert!(running.finished_at.is_none());

        let done = store.transition(id, complete()).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.finished_at.unwrap() >= done.started_at.unwrap());
        assert_eq!(done.output_path.as_deref(), Some("craft_results/craft.md"));
        assert_eq!(done.result, Some(StoryResult::Text("The end".to_string())));
        assert!(done.error.is_none());
    }

    #[test]
    fn test_failed_lifecycle_sets_only_error() {
        let store = InMemoryJobStore::new();
        let id = store.create(inputs());
        store.transition(id, Transition::Start).unwrap();

        let failed = store
            .transition(
                id,
                Transition::Fail {
                    error: "model unavailable".to_string(),
                },
            )
            .unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("model unavailable"));
        assert!(failed.output_path.is_none());
        assert!(failed.result.is_none());
        assert!(failed.finished_at.is_some());
    }

    #[test]
    fn test_cannot_finish_queued_job() {
        let store = InMemoryJobStore::new();
        let id = store.create(inputs());

        let err = store.transition(id, complete()).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                id,
                from: JobStatus::Queued,
                to: JobStatus::Completed,
            }
        );
        assert_eq!(store.get(id).unwrap().status, JobStatus::Queued);
    }

    #[test]
    fn test_terminal_states_never_change() {
        let store = InMemoryJobStore::new();
        let id = store.create(inputs());
        store.transition(id, Transition::Start).unwrap();
        store.transition(id, complete()).unwrap();

        assert!(store.transition(id, Transition::Start).is_err());
        assert!(store
            .transition(
                id,
                Transition::Fail {
                    error: "late".to_string()
                }
            )
            .is_err());
        assert!(store.transition(id, complete()).is_err());

        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_transition_unknown_job() {
        let store = InMemoryJobStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.transition(id, Transition::Start).unwrap_err(),
            StoreError::NotFound(id)
        );
    }

    #[test]
    fn test_evicts_only_old_terminal_jobs() {
        let store = InMemoryJobStore::new();
        let queued = store.create(inputs());
        let running = store.create(inputs());
        store.transition(running, Transition::Start).unwrap();
        let finished = store.create(inputs());
        store.transition(finished, Transition::Start).unwrap();
        store
            .transition(
                finished,
                Transition::Complete {
                    output_path: String::new(),
                    result: StoryResult::Structured(json!({"story": "short"})),
                },
            )
            .unwrap();

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(store.evict_finished_before(past), 0);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert_eq!(store.evict_finished_before(future), 1);
        assert!(store.get(finished).is_none());
        assert!(store.get(queued).is_some());
        assert!(store.get(running).is_some());
    }

    #[test]
    fn test_concurrent_creates_yield_distinct_ids() {
        let store = Arc::new(InMemoryJobStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || (0..50).map(|_| store.create(inputs())).collect::<Vec<_>>())
            })
            .collect();

        let ids: HashSet<Uuid> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }
}
