//! Job executor
//!
//! Runs story generation off the request path. Each job runs on its own
//! detached task and talks to the job store only through `JobStore`.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;
use voidcraft_core::domain::inputs::CraftInputs;
use voidcraft_core::domain::job::StoryResult;

use crate::repository::{JobStore, Transition};
use crate::service::artifact::ResultWriter;
use crate::service::generator::StoryGenerator;

/// Drives jobs from `queued` to a terminal state
pub struct JobExecutor {
    store: Arc<dyn JobStore>,
    generator: Arc<dyn StoryGenerator>,
    writer: ResultWriter,
    timeout: Option<Duration>,
    slots: Option<Arc<Semaphore>>,
}

impl JobExecutor {
    /// Creates an executor with no timeout and no concurrency cap
    pub fn new(
        store: Arc<dyn JobStore>,
        generator: Arc<dyn StoryGenerator>,
        writer: ResultWriter,
    ) -> Self {
        Self {
            store,
            generator,
            writer,
            timeout: None,
            slots: None,
        }
    }

    /// Fails generations that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Caps the number of generations running at once
    ///
    /// Jobs waiting for a slot stay queued.
    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.slots = max_concurrent.map(|max| Arc::new(Semaphore::new(max)));
        self
    }

    /// Starts a job on its own task and returns immediately
    pub fn spawn(self: &Arc<Self>, job_id: Uuid, inputs: CraftInputs) -> tokio::task::JoinHandle<()> {
        let executor = Arc::clone(self);
        tokio::spawn(async move { executor.run(job_id, inputs).await })
    }

    /// Runs a queued job to completion or failure
    pub async fn run(&self, job_id: Uuid, inputs: CraftInputs) {
        // Held until the job is terminal
        let _permit = self.acquire_slot().await;

        let started = match self.store.transition(job_id, Transition::Start) {
            Ok(job) => job,
            Err(e) => {
                error!("Failed to start job {}: {}", job_id, e);
                return;
            }
        };
        let started_at = started.started_at.unwrap_or_else(Utc::now);

        info!("Job {} started (age: {})", job_id, inputs.age);

        let transition = match self.generate(&inputs).await {
            Ok(result) => {
                let output_path = self.writer.save(job_id, &inputs, started_at, &result).await;
                Transition::Complete {
                    output_path,
                    result,
                }
            }
            Err(message) => {
                warn!("Job {} failed: {}", job_id, message);
                Transition::Fail { error: message }
            }
        };

        match self.store.transition(job_id, transition) {
            Ok(job) => info!("Job {} finished with status: {}", job_id, job.status),
            Err(e) => error!("Failed to finish job {}: {}", job_id, e),
        }
    }

    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        let slots = self.slots.as_ref()?;
        Arc::clone(slots).acquire_owned().await.ok()
    }

    /// Calls the generator on a separate task so a panic becomes a failure
    async fn generate(&self, inputs: &CraftInputs) -> Result<StoryResult, String> {
        let generator = Arc::clone(&self.generator);
        let inputs = inputs.clone();
        let mut task = tokio::spawn(async move { generator.generate(&inputs).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    return Err(format!("generation timed out after {}s", limit.as_secs()));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(e) if e.is_panic() => Err("generation task panicked".to_string()),
            Err(e) => Err(format!("generation task aborted: {}", e)),
        }
    }
}
