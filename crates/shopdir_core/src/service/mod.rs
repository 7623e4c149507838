//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case level APIs.
//! - Keep caller-facing layers decoupled from storage details.

pub mod shop_service;
