//! Typed rule records decoded from stored settings.
//!
//! # Design
//! - Pure data carriers; decoding lives in `validate.rs`.
//! - Everything here is rebuilt from the store on every generation pass.

use serde::{Deserialize, Serialize};

/// One address allowed to issue purge requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessEntry {
    /// Trimmed address as configured (not validated).
    pub ip: String,
}

/// User-agent rule selecting an alternate design for matching clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DesignExceptionRule {
    /// Delimited regex with optional trailing modifiers, e.g. `/iPhone/i`.
    #[serde(default)]
    pub regexp: String,
    /// Value hashed into the cache key when the rule matches.
    #[serde(default)]
    pub value: String,
}

impl DesignExceptionRule {
    /// Build a rule from its pattern and hash value.
    #[must_use]
    pub fn new(regexp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            regexp: regexp.into(),
            value: value.into(),
        }
    }
}

/// A single tracking parameter row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingParam {
    /// Query parameter name (or pattern fragment) to strip.
    #[serde(default)]
    pub param: String,
}

/// Tracking parameters in either of their stored notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingParameters {
    /// Pre-versioned notation: one literal string used as-is.
    Legacy(String),
    /// Ordered parameter rows.
    List(Vec<TrackingParam>),
}

impl Default for TrackingParameters {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TrackingParameters {
    /// Render the parameters as the `|`-joined alternation used inside VCL.
    #[must_use]
    pub fn to_pattern(&self) -> String {
        match self {
            Self::Legacy(raw) => raw.clone(),
            Self::List(params) => params
                .iter()
                .map(|row| row.param.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

/// Transparent wrapper for boolean feature toggles to avoid pedantic lint churn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Toggle(pub bool);

impl Toggle {
    #[must_use]
    /// Whether the toggle is enabled.
    pub const fn is_enabled(self) -> bool {
        self.0
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle.0
    }
}

/// Cache feature switches read from the store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureToggles {
    /// Allow the browser back/forward cache.
    pub bfcache: Toggle,
    /// Cache media files.
    pub media_cache: Toggle,
    /// Cache static files.
    pub static_cache: Toggle,
    /// Cache 404 responses.
    pub not_found_cache: Toggle,
    /// Purge through the xkey vmod.
    pub xkey_vmod: Toggle,
    /// Soft purge instead of hard ban.
    pub soft_purging: Toggle,
}

/// Scope a setting is resolved in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Global default values.
    Default,
    /// Values for one store view, falling back to `Default`.
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parameters_join_with_pipe() {
        let params = TrackingParameters::List(vec![
            TrackingParam {
                param: "utm_source".into(),
            },
            TrackingParam {
                param: "gclid".into(),
            },
        ]);
        assert_eq!(params.to_pattern(), "utm_source|gclid");
    }

    #[test]
    fn legacy_parameters_render_verbatim() {
        let params = TrackingParameters::Legacy("utm_[a-z]+|gclid".into());
        assert_eq!(params.to_pattern(), "utm_[a-z]+|gclid");
    }

    #[test]
    fn default_parameters_render_empty() {
        assert_eq!(TrackingParameters::default().to_pattern(), "");
    }

    #[test]
    fn rule_deserializes_missing_fields_as_empty() {
        let rule: DesignExceptionRule =
            serde_json::from_str(r#"{"regexp":"/x/"}"#).expect("rule should decode");
        assert_eq!(rule, DesignExceptionRule::new("/x/", ""));
    }
}
