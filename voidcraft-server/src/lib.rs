//! Voidcraft Server
//!
//! Accepts short-story crafting requests over HTTP, runs each one on a
//! background task against the story generator, and serves status and the
//! finished Markdown artifact.
//!
//! Architecture:
//! - Configuration: settings from environment or defaults
//! - Repository: in-memory job store, the single source of truth for jobs
//! - Services: validation, execution, artifact writing, retention
//! - API: axum router with CORS and request tracing

pub mod api;
pub mod config;
pub mod repository;
pub mod service;

use axum::Router;
use std::sync::Arc;

use crate::api::AppState;
use crate::config::Config;
use crate::repository::{InMemoryJobStore, JobStore};
use crate::service::{CraftService, JobExecutor, ResultWriter, StoryGenerator};

/// Fully wired application
pub struct App {
    pub router: Router,
    pub store: Arc<dyn JobStore>,
}

/// Wires the store, executor and API around a story generator
pub fn build_app(config: &Config, generator: Arc<dyn StoryGenerator>) -> App {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

    let executor = JobExecutor::new(
        Arc::clone(&store),
        generator,
        ResultWriter::new(config.output_dir.clone()),
    )
    .with_timeout(config.generation_timeout)
    .with_max_concurrent(config.max_concurrent_jobs);

    let craft = CraftService::new(Arc::clone(&store), Arc::new(executor));
    let router = api::create_router(AppState::new(Arc::new(craft), Arc::clone(&store)));

    App { router, store }
}
