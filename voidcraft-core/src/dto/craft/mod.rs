//! Craft DTOs returned by the HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::job::{Job, JobStatus};

/// Body of an accepted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    pub task_id: Uuid,
}

impl SubmitResponse {
    pub fn accepted(task_id: Uuid) -> Self {
        Self {
            status: "accepted".to_string(),
            task_id,
        }
    }
}

/// Status snapshot of a single job
///
/// Only fields that are set are serialized. Timestamps are RFC 3339 strings
/// and the result is stringified when it is not a JSON primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub status: JobStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
}

impl From<&Job> for TaskView {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|at| at.to_rfc3339()),
            finished_at: job.finished_at.map(|at| at.to_rfc3339()),
            output_path: job.output_path.clone(),
            error: job.error.clone(),
            result: job.result.as_ref().map(|result| result.status_value()),
        }
    }
}

/// Body of `GET /craft/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub task_id: Uuid,
    pub task: TaskView,
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            task_id: job.id,
            task: TaskView::from(job),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inputs::CraftInputs;
    use crate::domain::job::StoryResult;
    use serde_json::json;

    fn queued_job() -> Job {
        Job::new(
            Uuid::new_v4(),
            CraftInputs::new("modern".to_string(), vec!["Ada".to_string()], 2026),
        )
    }

    #[test]
    fn test_submit_response_shape() {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(SubmitResponse::accepted(id)).unwrap();
        assert_eq!(body, json!({"status": "accepted", "task_id": id.to_string()}));
    }

    #[test]
    fn test_queued_view_omits_unset_fields() {
        let job = queued_job();
        let body = serde_json::to_value(StatusResponse::from(&job)).unwrap();

        let task = body["task"].as_object().unwrap();
        assert_eq!(task["status"], json!("queued"));
        assert!(task.contains_key("created_at"));
        assert!(!task.contains_key("started_at"));
        assert!(!task.contains_key("output_path"));
        assert!(!task.contains_key("error"));
        assert!(!task.contains_key("result"));
        assert_eq!(body["task_id"], json!(job.id.to_string()));
    }

    #[test]
    fn test_completed_view_stringifies_result() {
        let mut job = queued_job();
        job.status = JobStatus::Completed;
        job.started_at = Some(chrono::Utc::now());
        job.finished_at = Some(chrono::Utc::now());
        job.output_path = Some("craft_results/out.md".to_string());
        job.result = Some(StoryResult::Structured(json!({"story": "..."})));

        let view = TaskView::from(&job);
        assert_eq!(view.output_path.as_deref(), Some("craft_results/out.md"));
        assert_eq!(view.result, Some(json!(r#"{"story":"..."}"#)));
        assert!(view.error.is_none());
    }
}
