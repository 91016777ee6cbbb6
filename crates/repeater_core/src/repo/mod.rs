//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the child repository contract used by repeater synchronization.
//! - Isolate SQLite query details from service orchestration.
//! - Resolve child repositories by relation through an explicit registry.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Registry lookups are exact-key and fail loudly on a miss.

pub mod child_repo;
pub mod registry;
