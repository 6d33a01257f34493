//! Template variables assembled from the rule store.
//!
//! # Design
//! - One fixed set of keys; every generation pass builds a fresh map.
//! - Normalization (access list, tracking parameters) happens here or in the
//!   store, never in the renderer.

use serde_json::{Map, Value, json};
use vclgen_config::{AccessEntry, ConfigResult, RuleStore, Toggle};

use crate::transpile::{TranspileOptions, design_exceptions_code};

/// Variable name to value mapping handed to the template renderer.
pub type VariableMap = Map<String, Value>;

/// Typed view of every variable exposed to VCL templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    /// Backend host.
    pub host: String,
    /// Backend port.
    pub port: i64,
    /// Addresses allowed to purge.
    pub access_list: Vec<AccessEntry>,
    /// Grace period in seconds.
    pub grace_period: i64,
    /// SSL offload header name.
    pub ssl_offloaded_header: String,
    /// `|`-joined tracking parameters.
    pub tracking_parameters: String,
    /// Back/forward cache allowed.
    pub enable_bfcache: Toggle,
    /// Media caching enabled.
    pub enable_media_cache: Toggle,
    /// Static file caching enabled.
    pub enable_static_cache: Toggle,
    /// 404 caching enabled.
    pub enable_404_cache: Toggle,
    /// xkey vmod purging enabled.
    pub use_xkey_vmod: Toggle,
    /// Soft purging enabled.
    pub use_soft_purging: Toggle,
    /// Cookie passthrough rules as stored.
    pub pass_on_cookie_presence: Value,
    /// Generated `vcl_hash` branches for design exceptions.
    pub design_exceptions_code: String,
}

impl TemplateVariables {
    /// Flatten into the name/value map consumed by templates.
    #[must_use]
    pub fn to_map(&self) -> VariableMap {
        let access_list: Vec<Value> = self
            .access_list
            .iter()
            .map(|entry| json!({ "ip": entry.ip }))
            .collect();

        let mut map = VariableMap::new();
        map.insert("host".into(), Value::from(self.host.clone()));
        map.insert("port".into(), Value::from(self.port));
        map.insert("access_list".into(), Value::Array(access_list));
        map.insert("grace_period".into(), Value::from(self.grace_period));
        map.insert(
            "ssl_offloaded_header".into(),
            Value::from(self.ssl_offloaded_header.clone()),
        );
        map.insert(
            "tracking_parameters".into(),
            Value::from(self.tracking_parameters.clone()),
        );
        map.insert(
            "enable_bfcache".into(),
            Value::from(self.enable_bfcache.is_enabled()),
        );
        map.insert(
            "disable_bfcache".into(),
            Value::from(!self.enable_bfcache.is_enabled()),
        );
        map.insert(
            "enable_media_cache".into(),
            Value::from(self.enable_media_cache.is_enabled()),
        );
        map.insert(
            "enable_static_cache".into(),
            Value::from(self.enable_static_cache.is_enabled()),
        );
        map.insert(
            "enable_404_cache".into(),
            Value::from(self.enable_404_cache.is_enabled()),
        );
        map.insert(
            "use_xkey_vmod".into(),
            Value::from(self.use_xkey_vmod.is_enabled()),
        );
        map.insert(
            "use_soft_purging".into(),
            Value::from(self.use_soft_purging.is_enabled()),
        );
        map.insert(
            "pass_on_cookie_presence".into(),
            self.pass_on_cookie_presence.clone(),
        );
        map.insert(
            "design_exceptions_code".into(),
            Value::from(self.design_exceptions_code.clone()),
        );
        map
    }
}

/// Trim access list entries, drop empty ones and wrap the rest as records.
#[must_use]
pub fn transform_access_list<I, S>(entries: I) -> Vec<AccessEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            let ip = entry.as_ref().trim();
            (!ip.is_empty()).then(|| AccessEntry { ip: ip.to_string() })
        })
        .collect()
}

/// Builds [`TemplateVariables`] from a [`RuleStore`].
pub struct VariableBuilder<'a, S: RuleStore + ?Sized> {
    store: &'a S,
    options: TranspileOptions,
}

impl<'a, S: RuleStore + ?Sized> VariableBuilder<'a, S> {
    /// Create a builder reading from `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: TranspileOptions::default(),
        }
    }

    /// Override design exception generation options.
    #[must_use]
    pub const fn with_options(mut self, options: TranspileOptions) -> Self {
        self.options = options;
        self
    }

    /// Read every setting and produce the variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an integer setting cannot be parsed.
    pub fn build(&self) -> ConfigResult<TemplateVariables> {
        let toggles = self.store.feature_toggles();
        let rules = self.store.design_exceptions();

        Ok(TemplateVariables {
            host: self.store.backend_host(),
            port: self.store.backend_port()?,
            access_list: transform_access_list(self.store.access_list()),
            grace_period: self.store.grace_period()?,
            ssl_offloaded_header: self.store.ssl_offloaded_header(),
            tracking_parameters: self.store.tracking_parameters().to_pattern(),
            enable_bfcache: toggles.bfcache,
            enable_media_cache: toggles.media_cache,
            enable_static_cache: toggles.static_cache,
            enable_404_cache: toggles.not_found_cache,
            use_xkey_vmod: toggles.xkey_vmod,
            use_soft_purging: toggles.soft_purging,
            pass_on_cookie_presence: self.store.pass_on_cookie_presence(),
            design_exceptions_code: design_exceptions_code(&rules, self.options),
        })
    }
}
