//! Craft API Handlers
//!
//! HTTP endpoints for submitting story jobs, polling them and downloading
//! the finished artifact.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use voidcraft_core::dto::craft::{StatusResponse, SubmitResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /craft
/// Validate the payload, queue a job and return its id without waiting
pub async fn submit_craft(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let task_id = state.craft.submit(&body)?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse::accepted(task_id))))
}

/// GET /craft/status?task_id={id}
/// Current state of a job
pub async fn craft_status(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<StatusResponse>> {
    let task_id = TaskQuery::from_pairs(params).resolve()?;
    tracing::debug!("Getting status of job: {}", task_id);

    let job = state.craft.status(&task_id)?;
    Ok(Json(StatusResponse::from(&job)))
}

/// GET /craft/download?task_id={id}
/// Raw bytes of a completed job's artifact
pub async fn craft_download(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let task_id = TaskQuery::from_pairs(params).resolve()?;
    tracing::debug!("Downloading artifact of job: {}", task_id);

    let artifact = state.craft.download(&task_id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// Job lookup parameters; `task_id` wins over `id`
///
/// Query strings are taken as raw pairs so a repeated key keeps its first
/// non-empty value instead of rejecting the request.
#[derive(Debug, Default)]
pub struct TaskQuery {
    pub task_id: Option<String>,
    pub id: Option<String>,
}

impl TaskQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_str() {
                "task_id" => &mut query.task_id,
                "id" => &mut query.id,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    fn resolve(self) -> ApiResult<String> {
        self.task_id
            .filter(|id| !id.is_empty())
            .or(self.id.filter(|id| !id.is_empty()))
            .ok_or_else(|| ApiError::BadRequest("task_id query parameter required".to_string()))
    }
}
