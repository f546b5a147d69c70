//! Server configuration
//!
//! Defines the configurable parameters of the crafting service: listen
//! address, artifact directory, generator endpoint and the opt-in limits on
//! generation time, concurrency and job retention.

use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
///
/// The defaults match the historical behaviour: no generation timeout,
/// no concurrency cap and jobs kept for the life of the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Directory artifacts are written to (created on demand)
    pub output_dir: PathBuf,

    /// Story generator kickoff URL
    pub generator_url: String,

    /// Maximum time a single generation may take
    pub generation_timeout: Option<Duration>,

    /// Maximum number of generations running at once
    pub max_concurrent_jobs: Option<usize>,

    /// How long finished jobs are kept before eviction
    pub job_retention: Option<Duration>,

    /// How often the retention sweeper runs
    pub retention_sweep_interval: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - CRAFT_BIND_ADDR (default: 0.0.0.0:8000)
    /// - CRAFT_OUTPUT_DIR (default: craft_results)
    /// - CRAFT_GENERATOR_URL (default: http://localhost:8001/kickoff)
    /// - CRAFT_GENERATION_TIMEOUT (seconds, default: none)
    /// - CRAFT_MAX_CONCURRENT_JOBS (default: unbounded)
    /// - CRAFT_JOB_RETENTION (seconds, default: keep forever)
    /// - CRAFT_RETENTION_SWEEP_INTERVAL (seconds, default: 60)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("CRAFT_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let output_dir = lookup("CRAFT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let generator_url = lookup("CRAFT_GENERATOR_URL").unwrap_or(defaults.generator_url);

        let seconds = |key: &str| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        };

        let generation_timeout = seconds("CRAFT_GENERATION_TIMEOUT");
        let job_retention = seconds("CRAFT_JOB_RETENTION");
        let retention_sweep_interval = seconds("CRAFT_RETENTION_SWEEP_INTERVAL")
            .unwrap_or(defaults.retention_sweep_interval);

        let max_concurrent_jobs = lookup("CRAFT_MAX_CONCURRENT_JOBS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|max| *max > 0);

        let config = Self {
            bind_addr,
            output_dir,
            generator_url,
            generation_timeout,
            max_concurrent_jobs,
            job_retention,
            retention_sweep_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir cannot be empty");
        }

        if !self.generator_url.starts_with("http://") && !self.generator_url.starts_with("https://")
        {
            anyhow::bail!("generator_url must start with http:// or https://");
        }

        if self.max_concurrent_jobs == Some(0) {
            anyhow::bail!("max_concurrent_jobs must be greater than 0");
        }

        if self.generation_timeout.is_some_and(|timeout| timeout.is_zero()) {
            anyhow::bail!("generation_timeout must be greater than 0");
        }

        if self.retention_sweep_interval.is_zero() {
            anyhow::bail!("retention_sweep_interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            output_dir: PathBuf::from("craft_results"),
            generator_url: "http://localhost:8001/kickoff".to_string(),
            generation_timeout: None,
            max_concurrent_jobs: None,
            job_retention: None,
            retention_sweep_interval: Duration::from_secs(60),
        }
    }
}
