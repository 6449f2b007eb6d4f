//! Validation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options controlling a validation run
///
/// Mirrors the knobs of a conventional SHACL processor call. Every field has a
/// default, so a partial JSON object deserializes cleanly:
///
/// ```
/// use shacl_validator::ValidationConfig;
///
/// let config: ValidationConfig = serde_json::from_str(r#"{"abort_on_first": true}"#).unwrap();
/// assert!(config.abort_on_first);
/// assert!(config.allow_warnings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Stop after the first focus node that produces a Violation.
    pub abort_on_first: bool,

    /// Warnings do not affect conformance when true.
    pub allow_warnings: bool,

    /// Infos do not affect conformance when true.
    pub allow_infos: bool,

    /// Validate the shapes graph against the SHACL-for-SHACL shapes.
    ///
    /// Accepted for compatibility; has no effect.
    pub meta_shacl: bool,

    /// Follow `rdfs:subClassOf` in the data graph for `sh:targetClass` and
    /// `sh:class`.
    pub subclass_inference: bool,

    /// Wall-clock budget for the run, checked between focus nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<u64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            abort_on_first: false,
            allow_warnings: true,
            allow_infos: true,
            meta_shacl: false,
            subclass_inference: true,
            time_limit_ms: None,
        }
    }
}

impl ValidationConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop at the first violating focus node.
    pub fn with_abort_on_first(mut self, abort: bool) -> Self {
        self.abort_on_first = abort;
        self
    }

    /// Let warnings affect conformance (`false`) or not (`true`).
    pub fn with_allow_warnings(mut self, allow: bool) -> Self {
        self.allow_warnings = allow;
        self
    }

    /// Let infos affect conformance (`false`) or not (`true`).
    pub fn with_allow_infos(mut self, allow: bool) -> Self {
        self.allow_infos = allow;
        self
    }

    /// Request meta-SHACL validation of the shapes graph.
    pub fn with_meta_shacl(mut self, meta: bool) -> Self {
        self.meta_shacl = meta;
        self
    }

    /// Enable or disable `rdfs:subClassOf` traversal.
    pub fn with_subclass_inference(mut self, enabled: bool) -> Self {
        self.subclass_inference = enabled;
        self
    }

    /// Set the wall-clock budget.
    pub fn with_time_limit_ms(mut self, limit_ms: u64) -> Self {
        self.time_limit_ms = Some(limit_ms);
        self
    }

    /// The wall-clock budget as a `Duration`, if one is set
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}
