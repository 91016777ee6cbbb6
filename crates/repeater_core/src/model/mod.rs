//! Domain model for repeater synchronization.
//!
//! # Responsibility
//! - Define parent/child record shapes shared by repository and service layers.
//! - Define submitted and projected form payload shapes.
//! - Normalize repeater declarations and naming conventions.
//!
//! # Invariants
//! - Child records are identified by a stable `ChildId`.
//! - Deletion is represented by a `deleted_at` timestamp, not hard delete.

pub mod block_field;
pub mod declaration;
pub mod form;
pub mod naming;
pub mod record;
