//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate child repository calls into repeater use-cases.
//! - Keep form-facing callers decoupled from storage details.

pub mod projection;
pub mod repeater_service;
