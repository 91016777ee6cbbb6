//! Repeater declarations of a parent type.
//!
//! # Responsibility
//! - Accept shorthand (`"slides"`) or full (`{relation, model, repeaterName}`)
//!   declarations.
//! - Normalize them once into `ResolvedRepeater` entries.
//!
//! # Invariants
//! - Resolution precedence: explicit value > declaration key convention.
//! - Normalized entries keep declaration order.

use crate::model::naming::{model_name_for, repeater_name_for};
use serde::{Deserialize, Serialize};

/// Declaration of one repeater relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeaterDeclaration {
    /// Relation name only; model and repeater name follow conventions.
    Shorthand(String),
    /// Explicit overrides; blank values fall back to the declaration key.
    Full {
        #[serde(default)]
        relation: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default, rename = "repeaterName")]
        repeater_name: Option<String>,
    },
}

/// Normalized repeater declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepeater {
    /// Relation name; also the prefix of child id tokens.
    pub relation: String,
    /// Child model name used to pick the child repository.
    pub model: String,
    /// Submission/projection key and block config name.
    pub repeater_name: String,
}

impl ResolvedRepeater {
    /// Resolves names for direct entry-point calls.
    ///
    /// Missing hints use conventions derived from `relation`; a missing
    /// repeater name falls back to the relation itself.
    pub fn from_hints(
        relation: &str,
        model_hint: Option<&str>,
        repeater_name_hint: Option<&str>,
    ) -> Self {
        Self {
            relation: relation.to_string(),
            model: non_blank(model_hint).unwrap_or_else(|| model_name_for(relation)),
            repeater_name: non_blank(repeater_name_hint).unwrap_or_else(|| relation.to_string()),
        }
    }
}

impl RepeaterDeclaration {
    /// Resolves this declaration registered under `key`.
    pub fn resolve(&self, key: &str) -> ResolvedRepeater {
        match self {
            Self::Shorthand(relation) => ResolvedRepeater {
                relation: relation.clone(),
                model: model_name_for(relation),
                repeater_name: repeater_name_for(relation),
            },
            Self::Full {
                relation,
                model,
                repeater_name,
            } => ResolvedRepeater {
                relation: non_blank(relation.as_deref()).unwrap_or_else(|| key.to_string()),
                model: non_blank(model.as_deref()).unwrap_or_else(|| model_name_for(key)),
                repeater_name: non_blank(repeater_name.as_deref())
                    .unwrap_or_else(|| repeater_name_for(key)),
            },
        }
    }
}

/// Normalizes a declaration table into resolved entries, keeping order.
pub fn normalize_declarations<K, I>(declarations: I) -> Vec<ResolvedRepeater>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, RepeaterDeclaration)>,
{
    declarations
        .into_iter()
        .map(|(key, declaration)| declaration.resolve(key.as_ref()))
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{normalize_declarations, RepeaterDeclaration, ResolvedRepeater};

    #[test]
    fn shorthand_uses_conventions() {
        let resolved = RepeaterDeclaration::Shorthand("slides".to_string()).resolve("0");
        assert_eq!(
            resolved,
            ResolvedRepeater {
                relation: "slides".to_string(),
                model: "Slide".to_string(),
                repeater_name: "slide".to_string(),
            }
        );
    }

    #[test]
    fn full_declaration_prefers_explicit_values_over_key() {
        let declaration = RepeaterDeclaration::Full {
            relation: Some("testimonials".to_string()),
            model: Some("Quote".to_string()),
            repeater_name: Some("quote_block".to_string()),
        };
        let resolved = declaration.resolve("quotes");
        assert_eq!(resolved.relation, "testimonials");
        assert_eq!(resolved.model, "Quote");
        assert_eq!(resolved.repeater_name, "quote_block");
    }

    #[test]
    fn full_declaration_falls_back_to_key_for_blank_values() {
        let declaration = RepeaterDeclaration::Full {
            relation: Some(String::new()),
            model: None,
            repeater_name: None,
        };
        let resolved = declaration.resolve("case_studies");
        assert_eq!(resolved.relation, "case_studies");
        assert_eq!(resolved.model, "CaseStudy");
        assert_eq!(resolved.repeater_name, "case_study");
    }

    #[test]
    fn declarations_deserialize_from_string_or_object() {
        let table: Vec<(String, RepeaterDeclaration)> = serde_json::from_str(
            r#"[["slides", "slides"], ["quotes", {"model": "Quote", "repeaterName": "quote"}]]"#,
        )
        .expect("declarations should deserialize");
        let resolved = normalize_declarations(table);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].repeater_name, "slide");
        assert_eq!(resolved[1].relation, "quotes");
        assert_eq!(resolved[1].model, "Quote");
        assert_eq!(resolved[1].repeater_name, "quote");
    }

    #[test]
    fn hints_fall_back_to_relation_for_repeater_name() {
        let resolved = ResolvedRepeater::from_hints("slides", None, None);
        assert_eq!(resolved.model, "Slide");
        assert_eq!(resolved.repeater_name, "slides");

        let hinted = ResolvedRepeater::from_hints("slides", Some("Card"), Some("card"));
        assert_eq!(hinted.model, "Card");
        assert_eq!(hinted.repeater_name, "card");
    }
}
