//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and index calls into listing APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod placement_service;
