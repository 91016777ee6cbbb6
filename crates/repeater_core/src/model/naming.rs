//! Naming conventions used to derive child model and repeater names.
//!
//! Rules:
//! - repeater name: `singular(relation)`, e.g. `slides -> slide`.
//! - model name: `studly(singular(relation))`, e.g. `case_studies -> CaseStudy`.
//! - Only the last `_`/`-` separated segment is singularized.

use convert_case::{Case, Casing};

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "feedback",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("women", "woman"),
];

/// Converts a plural English noun (or snake/kebab phrase) to its singular form.
pub fn singular(value: &str) -> String {
    let split_at = value.rfind(['_', '-']).map_or(0, |index| index + 1);
    let (head, last) = value.split_at(split_at);
    format!("{head}{}", singular_word(last))
}

/// Studly (Pascal) case, e.g. `case_study -> CaseStudy`.
pub fn studly(value: &str) -> String {
    value.to_case(Case::Pascal)
}

/// Snake case, e.g. `HomePage -> home_page`.
pub fn snake_case(value: &str) -> String {
    value.to_case(Case::Snake)
}

/// Conventional child model name for a relation key.
pub fn model_name_for(relation: &str) -> String {
    studly(&singular(relation))
}

/// Conventional repeater name for a relation key.
pub fn repeater_name_for(relation: &str) -> String {
    singular(relation)
}

fn singular_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return (*single).to_string();
    }

    let stem = |suffix_len: usize| word[..word.len() - suffix_len].to_string();

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", stem(3));
    }
    if lower.ends_with("ives") {
        return format!("{}ife", stem(4));
    }
    if lower.ends_with("ves") {
        return format!("{}f", stem(3));
    }
    if ["sses", "shes", "ches", "xes", "zes", "oes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return stem(2);
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') {
        return stem(1);
    }
    word.to_string()
}
