//! String constraint validators (sh:pattern, sh:minLength, sh:maxLength)
//!
//! All three operate on the string form of a value: the lexical form of a
//! literal or the IRI string of an IRI. Blank nodes have no string form and
//! always fail.

use super::ConstraintViolation;
use crate::report::ConstraintKind;
use regex::{Regex, RegexBuilder};
use shacl_graph_ir::Term;

/// A compiled sh:pattern with its sh:flags
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    pattern: String,
    flags: Option<String>,
    regex: Regex,
}

impl PatternConstraint {
    /// Compile a pattern with optional flags
    ///
    /// Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
    /// matches newline), `x` (ignore whitespace) and `q` (quote the whole
    /// pattern). Unknown flags are ignored.
    pub fn compile(pattern: &str, flags: Option<&str>) -> Result<Self, regex::Error> {
        let flag_set = flags.unwrap_or_default();
        let source = if flag_set.contains('q') {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(flag_set.contains('i'))
            .multi_line(flag_set.contains('m'))
            .dot_matches_new_line(flag_set.contains('s'))
            .ignore_whitespace(flag_set.contains('x'))
            .build()?;

        Ok(Self {
            pattern: pattern.to_string(),
            flags: flags.map(String::from),
            regex,
        })
    }

    /// The pattern source as written in the shapes graph
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The sh:flags value, if any
    pub fn flags(&self) -> Option<&str> {
        self.flags.as_deref()
    }

    /// Unanchored match against `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Validate sh:pattern constraint
pub fn validate_pattern(value: &Term, pattern: &PatternConstraint) -> Option<ConstraintViolation> {
    let message = match value.string_form() {
        None => format!("Blank node {} cannot match pattern '{}'", value, pattern.pattern()),
        Some(text) if !pattern.is_match(text) => format!(
            "Value '{}' does not match pattern '{}'",
            text,
            pattern.pattern()
        ),
        Some(_) => return None,
    };
    Some(ConstraintViolation::new(
        ConstraintKind::Pattern,
        Some(value.clone()),
        message,
    ))
}

/// Validate sh:minLength constraint
pub fn validate_min_length(value: &Term, min: usize) -> Option<ConstraintViolation> {
    let message = match string_length(value) {
        None => format!("Blank node {} has no string length", value),
        Some(len) if len < min => format!("String length {} is less than minimum {}", len, min),
        Some(_) => return None,
    };
    Some(ConstraintViolation::new(
        ConstraintKind::MinLength,
        Some(value.clone()),
        message,
    ))
}

/// Validate sh:maxLength constraint
pub fn validate_max_length(value: &Term, max: usize) -> Option<ConstraintViolation> {
    let message = match string_length(value) {
        None => format!("Blank node {} has no string length", value),
        Some(len) if len > max => format!("String length {} exceeds maximum {}", len, max),
        Some(_) => return None,
    };
    Some(ConstraintViolation::new(
        ConstraintKind::MaxLength,
        Some(value.clone()),
        message,
    ))
}

/// Length in characters of the value's string form
fn string_length(value: &Term) -> Option<usize> {
    value.string_form().map(|s| s.chars().count())
}
