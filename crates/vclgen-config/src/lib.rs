#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Scoped settings store and rule decoding for VCL generation.
//!
//! Layout: `defaults.rs` (configuration paths and fallback values), `model.rs`
//! (typed rule records), `validate.rs` (decoding of raw stored values),
//! `store.rs` (`RuleStore` + the in-memory `ScopeConfig`).

pub mod defaults;
pub mod error;
pub mod model;
pub mod store;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    AccessEntry, DesignExceptionRule, FeatureToggles, Scope, Toggle, TrackingParam,
    TrackingParameters,
};
pub use store::{RuleStore, ScopeConfig, SettingsDocument};
