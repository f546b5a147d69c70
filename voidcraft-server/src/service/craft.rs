//! Craft Service
//!
//! Business logic behind the `/craft` endpoints: input validation, job
//! submission, status lookups and artifact retrieval.

use chrono::Datelike;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use voidcraft_core::domain::inputs::CraftInputs;
use voidcraft_core::domain::job::Job;

use crate::repository::JobStore;
use crate::service::executor::JobExecutor;

/// Service error type
#[derive(Debug, Error)]
pub enum CraftError {
    #[error("{0}")]
    Validation(String),

    #[error("task not found")]
    NotFound,

    #[error("output not available")]
    OutputUnavailable,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// A finished artifact ready to be served
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Entry point for crafting requests
pub struct CraftService {
    store: Arc<dyn JobStore>,
    executor: Arc<JobExecutor>,
}

impl CraftService {
    pub fn new(store: Arc<dyn JobStore>, executor: Arc<JobExecutor>) -> Self {
        Self { store, executor }
    }

    /// Validates a raw request body, creates a job and starts it
    ///
    /// Returns as soon as the job is queued. Invalid input creates nothing.
    pub fn submit(&self, body: &[u8]) -> Result<Uuid, CraftError> {
        let inputs = parse_request(body)?;

        let job_id = self.store.create(inputs.clone());
        tracing::info!(
            "Job {} accepted (age: {}, names: {})",
            job_id,
            inputs.age,
            inputs.names_joined
        );

        // Detached: the outcome is only observable through the store.
        let _ = self.executor.spawn(job_id, inputs);

        Ok(job_id)
    }

    /// Current snapshot of a job
    pub fn status(&self, task_id: &str) -> Result<Job, CraftError> {
        let id = parse_task_id(task_id)?;
        self.store.get(id).ok_or(CraftError::NotFound)
    }

    /// Reads the artifact of a completed job
    pub async fn download(&self, task_id: &str) -> Result<Artifact, CraftError> {
        let job = self.status(task_id)?;

        let path = job
            .output_path
            .filter(|path| !path.is_empty())
            .ok_or(CraftError::OutputUnavailable)?;

        let bytes = read_artifact(Path::new(&path)).await?;
        let file_name = Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("craft_{}.md", job.id));

        Ok(Artifact { file_name, bytes })
    }
}

/// Reads an artifact file
///
/// A path that is missing or not a regular file is unavailable, including a
/// file removed between the check and the read. Other I/O errors propagate.
async fn read_artifact(path: &Path) -> Result<Vec<u8>, CraftError> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(CraftError::OutputUnavailable);
    }

    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CraftError::OutputUnavailable,
        _ => CraftError::Io(e),
    })
}

/// Unknown and malformed ids are both "not found"
fn parse_task_id(task_id: &str) -> Result<Uuid, CraftError> {
    Uuid::parse_str(task_id).map_err(|_| CraftError::NotFound)
}

// =============================================================================
// Validation
// =============================================================================

/// Parses and validates a submission body
///
/// An empty body counts as `{}`. `names` is checked before `age`.
pub fn parse_request(body: &[u8]) -> Result<CraftInputs, CraftError> {
    let payload: JsonValue = if body.is_empty() {
        JsonValue::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(|_| CraftError::Validation("Invalid JSON".to_string()))?
    };

    let names = payload
        .get("names")
        .and_then(JsonValue::as_array)
        .and_then(|names| {
            names
                .iter()
                .map(|name| name.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| CraftError::Validation("`names` must be an array of strings".to_string()))?;

    let age = payload
        .get("age")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| CraftError::Validation("`age` must be a string".to_string()))?;

    Ok(CraftInputs::new(
        age.to_string(),
        names,
        chrono::Local::now().year(),
    ))
}
