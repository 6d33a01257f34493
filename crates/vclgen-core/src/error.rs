//! # Design
//!
//! - Constant-message errors for the generation pipeline.
//! - Carry the failing path or version as context; keep source errors intact.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vclgen_config::ConfigError;

use crate::template::TemplateError;

/// Result type for generation operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors produced while generating VCL.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No base template exists for the requested Varnish version.
    #[error("unsupported varnish version")]
    UnsupportedVersion {
        /// Requested major version.
        version: u8,
    },
    /// Reading a base template failed.
    #[error("template read failed")]
    TemplateRead {
        /// Template path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The base template could not be parsed.
    #[error("template parse failed")]
    Template {
        /// Template path or identifier.
        template: String,
        /// Underlying template error.
        source: TemplateError,
    },
    /// Settings could not be resolved.
    #[error("settings resolution failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying configuration error.
        source: ConfigError,
    },
}
