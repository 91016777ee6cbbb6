//! Submitted and projected form payloads.
//!
//! # Responsibility
//! - Model the `repeaters` section of a submitted admin form.
//! - Model the projected field bag handed back to the form renderer.
//! - Model per-child form fields extracted by a child repository.
//!
//! # Invariants
//! - Submitted entries keep submission order.
//! - Projected collections are keyed by repeater name and replaced as a whole.

use crate::model::record::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Form payload section carrying repeater submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmittedForm {
    /// Ordered child field sets keyed by repeater name.
    #[serde(default)]
    pub repeaters: BTreeMap<String, Vec<FieldMap>>,
}

impl SubmittedForm {
    /// Returns the submitted entries for one repeater, empty when absent.
    pub fn entries(&self, repeater_name: &str) -> &[FieldMap] {
        self.repeaters
            .get(repeater_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Builder helper used by callers assembling submissions in code.
    pub fn with_repeater(mut self, repeater_name: impl Into<String>, entries: Vec<FieldMap>) -> Self {
        self.repeaters.insert(repeater_name.into(), entries);
        self
    }
}

/// Repeater block descriptor rendered once per stored child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterItem {
    /// Synthetic `<relation>-<childId>` id.
    pub id: String,
    /// UI component tag.
    #[serde(rename = "type")]
    pub component: String,
    pub title: String,
}

/// One flat `{name, value}` form field entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldEntry {
    pub name: String,
    pub value: Value,
}

/// Projected field bag grouped by repeater name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub repeaters: BTreeMap<String, Vec<RepeaterItem>>,
    pub repeater_fields: BTreeMap<String, Vec<FormFieldEntry>>,
    pub repeater_medias: BTreeMap<String, FieldMap>,
    pub repeater_files: BTreeMap<String, FieldMap>,
    pub repeater_browsers: BTreeMap<String, FieldMap>,
}

impl FormFields {
    /// Returns the field entry value for a qualified name, if projected.
    pub fn field_value(&self, repeater_name: &str, name: &str) -> Option<&Value> {
        self.repeater_fields
            .get(repeater_name)?
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }
}

/// Media attachments of one child as returned by its repository.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaFields {
    /// `role -> medias`.
    ByRole(BTreeMap<String, Value>),
    /// `locale -> role -> medias`.
    ByLocale(BTreeMap<String, BTreeMap<String, Value>>),
}

impl MediaFields {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ByRole(roles) => roles.is_empty(),
            Self::ByLocale(locales) => locales.is_empty(),
        }
    }
}

/// Options forwarded to child repositories when extracting form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFieldOptions {
    /// Group media by locale (`MediaFields::ByLocale`).
    pub translated_media_fields: bool,
    /// Group files by locale; when off, files are keyed by role only.
    pub locale_grouped_files: bool,
}

impl Default for FormFieldOptions {
    fn default() -> Self {
        Self {
            translated_media_fields: false,
            locale_grouped_files: true,
        }
    }
}

/// Form fields of one child as extracted by its repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildFormFields {
    /// Translated values keyed by field name.
    pub translations: BTreeMap<String, Value>,
    pub medias: Option<MediaFields>,
    /// Same grouping contract as `medias`, driven by `locale_grouped_files`.
    pub files: Option<MediaFields>,
    /// Nested browser selections keyed by browser name.
    pub browsers: BTreeMap<String, Value>,
    /// Generic attribute map of the child.
    pub attributes: FieldMap,
    /// Custom repeater serialization, used instead of `attributes` when set.
    pub repeater_attributes: Option<FieldMap>,
}
