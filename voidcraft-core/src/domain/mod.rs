//! Core domain types
//!
//! The job record and its inputs. These types carry no behaviour beyond
//! small helpers; the server owns storage and execution.

pub mod inputs;
pub mod job;
