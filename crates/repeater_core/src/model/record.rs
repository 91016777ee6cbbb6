//! Parent and child record model.
//!
//! # Responsibility
//! - Define the owning parent reference used to scope child rows.
//! - Define the canonical child row shape returned by repositories.
//!
//! # Invariants
//! - `deleted_at` is the source of truth for tombstone state.
//! - `position` is 1-based once a child went through reconciliation.

use crate::model::naming::snake_case;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a parent record. Opaque to the synchronizer.
pub type RecordId = i64;

/// Identifier of a child row inside `repeater_items`.
pub type ChildId = i64;

/// Arbitrary field map as submitted by a form or stored on a child.
pub type FieldMap = Map<String, Value>;

/// Owning entity of repeater children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    /// Persisted parent id.
    pub id: RecordId,
    /// Type tag written into `<morph>_type` for polymorphic children.
    pub morph_class: String,
    /// Column carrying the parent id on one-to-many children.
    pub foreign_key: String,
}

impl ParentRecord {
    /// Builds a parent reference from its model name.
    ///
    /// Morph class is the snake-cased model name; the foreign key follows
    /// the `<snake_model>_id` convention.
    pub fn new(id: RecordId, model: &str) -> Self {
        let snake = snake_case(model);
        Self {
            id,
            foreign_key: format!("{snake}_id"),
            morph_class: snake,
        }
    }
}

/// Stored repeater child row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub id: ChildId,
    /// Child model name (for example `Slide`).
    pub model: String,
    /// 1-based order within its relation.
    pub position: i64,
    /// Plain attributes, excluding translated fields.
    pub attributes: FieldMap,
    /// Translated fields keyed by field name, each a `locale -> value` map.
    pub translations: FieldMap,
    /// Epoch ms soft-delete tombstone.
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChildRecord {
    /// Returns whether this child is visible (not soft-deleted).
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Generic attribute projection, the equivalent of a row's plain array form.
    ///
    /// Includes `id` and `position` next to stored attributes.
    pub fn attributes_to_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("id".to_string(), Value::from(self.id));
        map.insert("position".to_string(), Value::from(self.position));
        for (key, value) in &self.attributes {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}
