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
#![allow(clippy::module_name_repetitions)]

//! VCL generation from stored cache rules.
//!
//! Layout: `transpile.rs` (design exception regexes to `vcl_hash` branches),
//! `variables.rs` (template variable map), `template.rs` (directive template
//! engine), `locator.rs` (base template lookup), `generator.rs` (the
//! end-to-end `VclGenerator`).

pub mod error;
pub mod generator;
pub mod locator;
pub mod template;
pub mod transpile;
pub mod variables;

pub use error::{GeneratorError, GeneratorResult};
pub use generator::VclGenerator;
pub use locator::{DirectoryTemplateLocator, SUPPORTED_VERSIONS, TemplateLocator};
pub use template::{Template, TemplateError, TemplateResult};
pub use transpile::{
    BranchNumbering, Interpolation, Skipped, TranspileOptions, design_exceptions_code,
    inline_modifiers, quote_vcl_string,
};
pub use variables::{TemplateVariables, VariableBuilder, VariableMap, transform_access_list};
