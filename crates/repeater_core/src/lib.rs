//! Repeater synchronization core.
//!
//! Reconciles ordered repeater submissions with stored child rows and
//! projects stored rows back into form fields.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RepeaterBlock, RepeaterConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::block_field::{
    block_field_name, parse_block_field_name, parse_existing_id, repeater_item_id, BlockFieldName,
};
pub use model::declaration::{normalize_declarations, RepeaterDeclaration, ResolvedRepeater};
pub use model::form::{
    ChildFormFields, FormFieldEntry, FormFieldOptions, FormFields, MediaFields, RepeaterItem,
    SubmittedForm,
};
pub use model::record::{ChildId, ChildRecord, FieldMap, ParentRecord, RecordId};
pub use repo::child_repo::{
    ChildFilter, ChildRepository, ChildSchema, OwnerScope, RepoError, RepoResult,
    SqliteChildRepository,
};
pub use repo::registry::{ChildRepositoryRegistry, RegistryError};
pub use service::repeater_service::{RepeaterError, RepeaterResult, RepeaterService, SyncReport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
