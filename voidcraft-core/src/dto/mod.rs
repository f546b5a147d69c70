//! Data Transfer Objects
//!
//! Response bodies produced by the HTTP API. They are derived from domain
//! types and never stored.

pub mod craft;
