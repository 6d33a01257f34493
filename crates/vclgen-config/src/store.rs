//! Settings access for VCL generation.
//!
//! # Design
//! - `RuleStore` is the narrow seam the generator depends on; any backend can
//!   implement it.
//! - `ScopeConfig` is the in-memory implementation over a scoped settings
//!   document (`default` values plus per-store overrides).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::debug;

use crate::defaults::{
    ACCESS_LIST_PATH, BACKEND_HOST_PATH, BACKEND_PORT_PATH, DEFAULT_ACCESS_LIST,
    DEFAULT_BACKEND_HOST, DEFAULT_BACKEND_PORT, DEFAULT_GRACE_PERIOD, DEFAULT_OFFLOADER_HEADER,
    DESIGN_EXCEPTIONS_PATH, ENABLE_404_CACHE_PATH, ENABLE_BFCACHE_PATH, ENABLE_MEDIA_CACHE_PATH,
    ENABLE_STATIC_CACHE_PATH, GRACE_PERIOD_PATH, OFFLOADER_HEADER_PATH,
    PASS_ON_COOKIE_PRESENCE_PATH, TRACKING_PARAMETERS_PATH, USE_SOFT_PURGING_PATH,
    USE_XKEY_VMOD_PATH,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DesignExceptionRule, FeatureToggles, Scope, TrackingParameters};
use crate::validate::{
    coerce_flag, decode_cookie_presence, decode_design_exceptions, decode_tracking_parameters,
    parse_integer, scalar_text, split_access_list,
};

/// Abstraction over the settings backend consumed by the VCL generator.
pub trait RuleStore {
    /// Backend host the cache forwards to.
    fn backend_host(&self) -> String;
    /// Backend port the cache forwards to.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored value is not an integer.
    fn backend_port(&self) -> ConfigResult<i64>;
    /// Raw purge access list entries, trimmed but not filtered.
    fn access_list(&self) -> Vec<String>;
    /// Grace period in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored value is not an integer.
    fn grace_period(&self) -> ConfigResult<i64>;
    /// Header carrying the original scheme behind TLS offloading.
    fn ssl_offloaded_header(&self) -> String;
    /// Tracking parameters in their stored notation.
    fn tracking_parameters(&self) -> TrackingParameters;
    /// Cache feature switches.
    fn feature_toggles(&self) -> FeatureToggles;
    /// Cookie passthrough rules, structurally unexamined.
    fn pass_on_cookie_presence(&self) -> Value;
    /// Ordered user-agent design exception rules.
    fn design_exceptions(&self) -> Vec<DesignExceptionRule>;
}

/// Serialized settings: default values keyed by path plus per-store overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsDocument {
    /// Values applied to every scope.
    #[serde(default)]
    pub default: Map<String, Value>,
    /// Overrides keyed by store code.
    #[serde(default)]
    pub stores: BTreeMap<String, Map<String, Value>>,
}

/// In-memory scoped settings store.
#[derive(Debug, Clone, Default)]
pub struct ScopeConfig {
    document: SettingsDocument,
    store: Option<String>,
}

impl ScopeConfig {
    /// Wrap a settings document; store-scoped lookups use the default scope.
    #[must_use]
    pub const fn new(document: SettingsDocument) -> Self {
        Self {
            document,
            store: None,
        }
    }

    /// Parse a JSON settings document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDocument`] when the text is not a valid
    /// settings document.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let document = serde_json::from_str(text).map_err(|source| ConfigError::InvalidDocument {
            operation: "config.settings_document.parse",
            source,
        })?;
        Ok(Self::new(document))
    }

    /// Read a JSON settings document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::InvalidDocument`] when it is not a settings document.
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            operation: "config.settings_document.read",
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings document");
        Self::from_json_str(&text)
    }

    /// Resolve store-scoped settings for the given store code.
    #[must_use]
    pub fn with_store(mut self, code: impl Into<String>) -> Self {
        self.store = Some(code.into());
        self
    }

    /// Set a default-scope value.
    #[must_use]
    pub fn with_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.document.default.insert(path.to_string(), value.into());
        self
    }

    /// Set a store-scope value.
    #[must_use]
    pub fn with_store_value(mut self, code: &str, path: &str, value: impl Into<Value>) -> Self {
        self.document
            .stores
            .entry(code.to_string())
            .or_default()
            .insert(path.to_string(), value.into());
        self
    }

    /// Look up a raw value. Null values count as absent.
    #[must_use]
    pub fn value(&self, path: &str, scope: &Scope) -> Option<&Value> {
        let scoped = match scope {
            Scope::Default => None,
            Scope::Store(code) => self
                .document
                .stores
                .get(code)
                .and_then(|values| values.get(path))
                .filter(|value| !value.is_null()),
        };

        scoped.or_else(|| {
            self.document
                .default
                .get(path)
                .filter(|value| !value.is_null())
        })
    }

    fn store_scope(&self) -> Scope {
        self.store
            .as_ref()
            .map_or(Scope::Default, |code| Scope::Store(code.clone()))
    }

    fn text_or(&self, path: &str, fallback: &str) -> String {
        self.value(path, &Scope::Default)
            .and_then(scalar_text)
            .unwrap_or_else(|| fallback.to_string())
    }

    fn integer_or(&self, path: &str, fallback: i64) -> ConfigResult<i64> {
        self.value(path, &Scope::Default)
            .map_or(Ok(fallback), |value| parse_integer(value, path))
    }

    fn flag(&self, path: &str) -> bool {
        coerce_flag(self.value(path, &Scope::Default))
    }
}

impl RuleStore for ScopeConfig {
    fn backend_host(&self) -> String {
        self.text_or(BACKEND_HOST_PATH, DEFAULT_BACKEND_HOST)
    }

    fn backend_port(&self) -> ConfigResult<i64> {
        self.integer_or(BACKEND_PORT_PATH, DEFAULT_BACKEND_PORT)
    }

    fn access_list(&self) -> Vec<String> {
        match self.value(ACCESS_LIST_PATH, &Scope::Default) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(scalar_text)
                .map(|entry| entry.trim().to_string())
                .collect(),
            Some(value) => split_access_list(&scalar_text(value).unwrap_or_default()),
            None => split_access_list(DEFAULT_ACCESS_LIST),
        }
    }

    fn grace_period(&self) -> ConfigResult<i64> {
        self.integer_or(GRACE_PERIOD_PATH, DEFAULT_GRACE_PERIOD)
    }

    fn ssl_offloaded_header(&self) -> String {
        self.text_or(OFFLOADER_HEADER_PATH, DEFAULT_OFFLOADER_HEADER)
    }

    fn tracking_parameters(&self) -> TrackingParameters {
        decode_tracking_parameters(self.value(TRACKING_PARAMETERS_PATH, &Scope::Default))
    }

    fn feature_toggles(&self) -> FeatureToggles {
        FeatureToggles {
            bfcache: self.flag(ENABLE_BFCACHE_PATH).into(),
            media_cache: self.flag(ENABLE_MEDIA_CACHE_PATH).into(),
            static_cache: self.flag(ENABLE_STATIC_CACHE_PATH).into(),
            not_found_cache: self.flag(ENABLE_404_CACHE_PATH).into(),
            xkey_vmod: self.flag(USE_XKEY_VMOD_PATH).into(),
            soft_purging: self.flag(USE_SOFT_PURGING_PATH).into(),
        }
    }

    fn pass_on_cookie_presence(&self) -> Value {
        decode_cookie_presence(self.value(PASS_ON_COOKIE_PRESENCE_PATH, &Scope::Default))
    }

    fn design_exceptions(&self) -> Vec<DesignExceptionRule> {
        let scope = self.store_scope();
        let rules = decode_design_exceptions(self.value(DESIGN_EXCEPTIONS_PATH, &scope));
        debug!(?scope, count = rules.len(), "loaded design exceptions");
        rules
    }
}
