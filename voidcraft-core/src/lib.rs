//! Voidcraft Core
//!
//! Core types shared by the story crafting service.
//!
//! This crate contains:
//! - Domain types: jobs, their lifecycle status and the validated crafting inputs
//! - DTOs: wire shapes returned by the HTTP API

pub mod domain;
pub mod dto;
