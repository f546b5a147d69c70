//! Result writer
//!
//! Persists a completed job as a Markdown artifact inside the output
//! directory. Each job writes its own file, so no locking is needed.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;
use voidcraft_core::domain::inputs::CraftInputs;
use voidcraft_core::domain::job::StoryResult;

/// Writes job artifacts to a fixed directory
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Creates a writer for `output_dir`; the directory is created on first write
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the artifact and returns its path
    ///
    /// The file name combines the job id with the write time and is never
    /// reused: an existing file makes the write fail instead of clobbering it.
    pub async fn write(
        &self,
        job_id: Uuid,
        inputs: &CraftInputs,
        started_at: DateTime<Utc>,
        result: &StoryResult,
    ) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let path = self
            .output_dir
            .join(format!("craft_{}_{}.md", job_id, stamp));

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        fill_or_discard(
            file,
            &path,
            render(job_id, inputs, started_at, result).as_bytes(),
        )
        .await?;

        debug!("Wrote artifact for job {} to {}", job_id, path.display());
        Ok(path)
    }

    /// Like `write`, but tolerates failure
    ///
    /// Returns the artifact path, or an empty string if it could not be
    /// written. A failed write never fails the job.
    pub async fn save(
        &self,
        job_id: Uuid,
        inputs: &CraftInputs,
        started_at: DateTime<Utc>,
        result: &StoryResult,
    ) -> String {
        match self.write(job_id, inputs, started_at, result).await {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                warn!("Failed to write artifact for job {}: {}", job_id, e);
                String::new()
            }
        }
    }
}

/// Writes `contents` through `writer`, removing `path` if the write fails
///
/// The file at `path` was created for this write only, so a partial artifact
/// never outlives a failed write.
async fn fill_or_discard<W>(mut writer: W, path: &Path, contents: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(contents).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };
    drop(writer);

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(
                "Failed to remove partial artifact {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Renders the Markdown artifact
pub fn render(
    job_id: Uuid,
    inputs: &CraftInputs,
    started_at: DateTime<Utc>,
    result: &StoryResult,
) -> String {
    let names = serde_json::to_string(&inputs.names).unwrap_or_default();

    let result_block = match result {
        StoryResult::Structured(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!("```json\n{}\n```", pretty)
        }
        StoryResult::Text(text) => format!("```\n{}\n```", text),
    };

    format!(
        "# Craft Result {id}\n\n\
         - Task ID: {id}\n\
         - Age: {age}\n\
         - Names: {names}\n\
         - Started: {started}\n\n\
         ## Result\n\n\
         {result_block}\n",
        id = job_id,
        age = inputs.age,
        names = names,
        started = started_at.to_rfc3339(),
        result_block = result_block,
    )
}
