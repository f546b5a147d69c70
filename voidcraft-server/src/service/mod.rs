//! Service Module
//!
//! Business logic layer for the crafting service.
//! Services sit between the HTTP API and the job store and own the
//! background execution of jobs.

pub mod artifact;
pub mod craft;
pub mod executor;
pub mod generator;
pub mod retention;

pub use artifact::ResultWriter;
pub use craft::{Artifact, CraftError, CraftService};
pub use executor::JobExecutor;
pub use generator::{HttpStoryGenerator, StoryGenerator};
pub use retention::RetentionSweeper;
