//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::inputs::CraftInputs;

/// Story crafting job record
///
/// Owned exclusively by the job store. Everything else refers to a job by
/// its `id` and reads snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub inputs: CraftInputs,
    /// Set on completion. Empty when the artifact could not be written.
    pub output_path: Option<String>,
    /// Set on failure.
    pub error: Option<String>,
    pub result: Option<StoryResult>,
}

impl Job {
    /// Creates a fresh queued job
    pub fn new(id: Uuid, inputs: CraftInputs) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            inputs,
            output_path: None,
            error: None,
            result: None,
        }
    }
}

/// Job lifecycle status
///
/// `Queued -> Running -> {Completed | Failed}`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw value handed back by the story generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StoryResult {
    /// Structured data, rendered as JSON
    Structured(JsonValue),
    /// Anything else, rendered verbatim
    Text(String),
}

impl StoryResult {
    /// Value suitable for a status response
    ///
    /// Primitives pass through; arrays and objects are stringified.
    pub fn status_value(&self) -> JsonValue {
        match self {
            StoryResult::Text(text) => JsonValue::String(text.clone()),
            StoryResult::Structured(value @ (JsonValue::Array(_) | JsonValue::Object(_))) => {
                JsonValue::String(value.to_string())
            }
            StoryResult::Structured(value) => value.clone(),
        }
    }
}
