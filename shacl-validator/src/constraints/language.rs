//! Language tag constraint validators (sh:languageIn, sh:uniqueLang)

use super::ConstraintViolation;
use crate::report::ConstraintKind;
use shacl_graph_ir::Term;

/// Basic language range matching
///
/// `*` matches any non-empty tag. Otherwise the range matches when it equals
/// the tag or is a prefix of it ending at a `-` boundary, ignoring case.
pub fn lang_matches(tag: &str, range: &str) -> bool {
    if tag.is_empty() {
        return false;
    }
    if range == "*" {
        return true;
    }
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    match tag.strip_prefix(range.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

/// Validate sh:languageIn constraint
pub fn validate_language_in(value: &Term, ranges: &[String]) -> Option<ConstraintViolation> {
    let tag = value
        .as_literal()
        .and_then(|lit| lit.language())
        .unwrap_or_default();
    if ranges.iter().any(|range| lang_matches(tag, range)) {
        return None;
    }
    let message = if tag.is_empty() {
        format!("Value {} has no language tag", value)
    } else {
        format!(
            "Language tag '{}' is not one of {}",
            tag,
            ranges.join(", ")
        )
    };
    Some(ConstraintViolation::new(
        ConstraintKind::LanguageIn,
        Some(value.clone()),
        message,
    ))
}

/// Validate sh:uniqueLang constraint
///
/// One violation per language tag used by more than one value, in the order
/// the duplicates are first seen. Tags compare case-insensitively.
pub fn validate_unique_lang(values: &[Term]) -> Vec<ConstraintViolation> {
    let mut seen: Vec<String> = Vec::new();
    let mut reported: Vec<String> = Vec::new();
    let mut violations = Vec::new();

    for value in values {
        let Some(tag) = value.as_literal().and_then(|lit| lit.language()) else {
            continue;
        };
        if tag.is_empty() {
            continue;
        }
        let key = tag.to_ascii_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
        } else if !reported.contains(&key) {
            violations.push(
                ConstraintViolation::new(
                    ConstraintKind::UniqueLang,
                    None,
                    format!("Language tag '{}' is used by more than one value", tag),
                )
                .with_detail(key.clone()),
            );
            reported.push(key);
        }
    }
    violations
}
