//! Repository Module
//!
//! Data access layer for the crafting service.
//! Jobs live in memory for the life of the process.

pub mod job;

pub use job::{InMemoryJobStore, JobStore, StoreError, Transition};
