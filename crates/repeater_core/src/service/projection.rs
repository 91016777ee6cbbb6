//! Projection of stored repeater children into flat form fields.
//!
//! # Invariants
//! - Every emitted key is scoped with `blocks[<relation>-<childId>]`, so
//!   collections from several children and repeaters never collide.
//! - Plain attributes skip keys already emitted as translated fields, unless
//!   the child provides its own repeater serialization.

use crate::config::RepeaterBlock;
use crate::model::block_field::{block_field_name, repeater_item_id};
use crate::model::form::{ChildFormFields, FormFieldEntry, FormFields, MediaFields, RepeaterItem};
use crate::model::record::{ChildId, FieldMap};
use std::collections::BTreeSet;

/// Accumulated projection of one repeater.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepeaterProjection {
    pub items: Vec<RepeaterItem>,
    pub fields: Vec<FormFieldEntry>,
    pub medias: FieldMap,
    pub files: FieldMap,
    pub browsers: FieldMap,
}

impl RepeaterProjection {
    /// Appends one child's descriptor and re-keyed fields.
    pub fn push_child(
        &mut self,
        relation: &str,
        child_id: ChildId,
        block: &RepeaterBlock,
        extracted: ChildFormFields,
    ) {
        self.items.push(RepeaterItem {
            id: repeater_item_id(relation, child_id),
            component: block.component.clone(),
            title: block.title.clone(),
        });

        let mut translated = BTreeSet::new();
        for (key, value) in extracted.translations {
            self.fields.push(FormFieldEntry {
                name: block_field_name(relation, child_id, &key, None),
                value,
            });
            translated.insert(key);
        }

        for (target, grouped) in [
            (&mut self.medias, extracted.medias),
            (&mut self.files, extracted.files),
        ] {
            if let Some(grouped) = grouped.filter(|grouped| !grouped.is_empty()) {
                merge_grouped(target, relation, child_id, grouped);
            }
        }
        for (key, value) in extracted.browsers {
            self.browsers
                .insert(block_field_name(relation, child_id, &key, None), value);
        }

        let plain = match extracted.repeater_attributes {
            Some(custom) => custom,
            None => {
                let mut attributes = extracted.attributes;
                attributes.retain(|key, _| !translated.contains(key));
                attributes
            }
        };
        for (key, value) in plain {
            self.fields.push(FormFieldEntry {
                name: block_field_name(relation, child_id, &key, None),
                value,
            });
        }
    }

    /// Writes the five collections under `repeater_name`, replacing prior values.
    pub fn apply(self, fields: &mut FormFields, repeater_name: &str) {
        let name = repeater_name.to_string();
        fields.repeaters.insert(name.clone(), self.items);
        fields.repeater_fields.insert(name.clone(), self.fields);
        fields.repeater_medias.insert(name.clone(), self.medias);
        fields.repeater_files.insert(name.clone(), self.files);
        fields.repeater_browsers.insert(name, self.browsers);
    }
}

fn merge_grouped(target: &mut FieldMap, relation: &str, child_id: ChildId, grouped: MediaFields) {
    match grouped {
        MediaFields::ByRole(roles) => {
            for (role, value) in roles {
                target.insert(block_field_name(relation, child_id, &role, None), value);
            }
        }
        MediaFields::ByLocale(locales) => {
            for (locale, roles) in locales {
                for (role, value) in roles {
                    target.insert(
                        block_field_name(relation, child_id, &role, Some(&locale)),
                        value,
                    );
                }
            }
        }
    }
}
