//! Qualified block field names and repeater id tokens.
//!
//! # Responsibility
//! - Produce `blocks[<relation>-<childId>][<key>]` and
//!   `blocks[<relation>-<childId>][<key>][<locale>]` names for projection.
//! - Parse those names and `<relation>-<childId>` tokens back on re-submission.
//!
//! # Invariants
//! - `parse_block_field_name(block_field_name(..))` returns the same parts.
//! - Child ids inside names and tokens are decimal integers.

use crate::model::record::ChildId;
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^blocks\[(?P<block>[^\[\]]+)-(?P<id>\d+)\]\[(?P<key>[^\[\]]+)\](?:\[(?P<locale>[^\[\]]+)\])?$")
        .expect("valid block field regex")
});

/// Parsed parts of a qualified block field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFieldName {
    pub relation: String,
    pub child_id: ChildId,
    pub key: String,
    pub locale: Option<String>,
}

/// Synthetic form id for one stored child, e.g. `slides-12`.
pub fn repeater_item_id(relation: &str, child_id: ChildId) -> String {
    format!("{relation}-{child_id}")
}

/// Qualified field name scoped to one child block.
pub fn block_field_name(
    relation: &str,
    child_id: ChildId,
    key: &str,
    locale: Option<&str>,
) -> String {
    match locale {
        Some(locale) => format!("blocks[{relation}-{child_id}][{key}][{locale}]"),
        None => format!("blocks[{relation}-{child_id}][{key}]"),
    }
}

/// Parses a qualified block field name produced by [`block_field_name`].
pub fn parse_block_field_name(name: &str) -> Option<BlockFieldName> {
    let caps = BLOCK_FIELD_RE.captures(name)?;
    let child_id = caps.name("id")?.as_str().parse::<ChildId>().ok()?;
    Some(BlockFieldName {
        relation: caps.name("block")?.as_str().to_string(),
        child_id,
        key: caps.name("key")?.as_str().to_string(),
        locale: caps.name("locale").map(|m| m.as_str().to_string()),
    })
}

/// Resolves an existing-row token for `relation`.
///
/// Returns `None` when the token is not `<relation>-<digits>`; callers treat
/// that as a new row.
pub fn parse_existing_id(token: &str, relation: &str) -> Option<ChildId> {
    token
        .strip_prefix(relation)?
        .strip_prefix('-')?
        .parse::<ChildId>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{
        block_field_name, parse_block_field_name, parse_existing_id, repeater_item_id,
        BlockFieldName,
    };

    #[test]
    fn block_field_name_formats_with_and_without_locale() {
        assert_eq!(
            block_field_name("slides", 4, "title", None),
            "blocks[slides-4][title]"
        );
        assert_eq!(
            block_field_name("slides", 4, "cover", Some("fr")),
            "blocks[slides-4][cover][fr]"
        );
        assert_eq!(repeater_item_id("slides", 4), "slides-4");
    }

    #[test]
    fn parse_block_field_name_reads_back_parts() {
        let parsed = parse_block_field_name("blocks[case_studies-12][cover][en]")
            .expect("name should parse");
        assert_eq!(
            parsed,
            BlockFieldName {
                relation: "case_studies".to_string(),
                child_id: 12,
                key: "cover".to_string(),
                locale: Some("en".to_string()),
            }
        );

        let plain = parse_block_field_name(&block_field_name("team-members", 3, "name", None))
            .expect("hyphenated relation should parse");
        assert_eq!(plain.relation, "team-members");
        assert_eq!(plain.child_id, 3);
        assert_eq!(plain.locale, None);
    }

    #[test]
    fn parse_block_field_name_rejects_foreign_shapes() {
        assert!(parse_block_field_name("blocks[slides][title]").is_none());
        assert!(parse_block_field_name("title").is_none());
        assert!(parse_block_field_name("blocks[slides-x][title]").is_none());
    }

    #[test]
    fn parse_existing_id_requires_relation_prefix_and_numeric_id() {
        assert_eq!(parse_existing_id("slides-2", "slides"), Some(2));
        assert_eq!(parse_existing_id("slides-", "slides"), None);
        assert_eq!(parse_existing_id("slides-abc", "slides"), None);
        assert_eq!(parse_existing_id("slidesx-2", "slides"), None);
        assert_eq!(parse_existing_id("items-2", "slides"), None);
        assert_eq!(parse_existing_id("2", "slides"), None);
    }
}
