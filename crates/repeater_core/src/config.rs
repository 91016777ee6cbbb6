//! Repeater block configuration.
//!
//! # Responsibility
//! - Hold block declarations (`component`, `title`) keyed by repeater name.
//! - Hold media/file grouping switches used by form-field projection.
//! - Load configuration from JSON text or files.
//!
//! # Invariants
//! - Missing block declarations are reported to callers, never defaulted.

use crate::model::form::FormFieldOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// UI block declaration for one repeater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterBlock {
    /// UI component tag, e.g. `a17-block-slide`.
    pub component: String,
    pub title: String,
}

/// Configuration consumed by the repeater service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeaterConfig {
    /// Block declarations keyed by repeater name.
    pub repeaters: BTreeMap<String, RepeaterBlock>,
    /// Group projected media by locale.
    pub translated_media_fields: bool,
    /// Group projected files by locale.
    pub locale_grouped_files: bool,
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            repeaters: BTreeMap::new(),
            translated_media_fields: false,
            locale_grouped_files: true,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read repeater config: {err}"),
            Self::Parse(err) => write!(f, "invalid repeater config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl RepeaterConfig {
    /// Parses configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Registers one block declaration.
    pub fn with_block(
        mut self,
        repeater_name: impl Into<String>,
        component: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.repeaters.insert(
            repeater_name.into(),
            RepeaterBlock {
                component: component.into(),
                title: title.into(),
            },
        );
        self
    }

    /// Looks up the block declaration for a repeater name.
    pub fn block(&self, repeater_name: &str) -> Option<&RepeaterBlock> {
        self.repeaters.get(repeater_name)
    }

    pub fn form_field_options(&self) -> FormFieldOptions {
        FormFieldOptions {
            translated_media_fields: self.translated_media_fields,
            locale_grouped_files: self.locale_grouped_files,
        }
    }
}
