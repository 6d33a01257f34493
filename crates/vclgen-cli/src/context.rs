//! Shared error type and settings loading for command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use anyhow::anyhow;
use vclgen_config::{ConfigError, ScopeConfig};
use vclgen_core::{GeneratorError, SUPPORTED_VERSIONS, TemplateError};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<GeneratorError> for CliError {
    fn from(error: GeneratorError) -> Self {
        match error {
            GeneratorError::UnsupportedVersion { version } => Self::Validation(format!(
                "unsupported varnish version {version} (expected one of {SUPPORTED_VERSIONS:?})"
            )),
            GeneratorError::Config { source, .. } => Self::Validation(describe_config_error(&source)),
            GeneratorError::TemplateRead { path, source } => Self::Failure(anyhow!(
                "failed to read template {}: {source}",
                path.display()
            )),
            GeneratorError::Template { template, source } => Self::Failure(anyhow!(
                "template {template} is malformed: {}",
                describe_template_error(&source)
            )),
        }
    }
}

fn describe_template_error(error: &TemplateError) -> String {
    match error {
        TemplateError::UnclosedBlock { directive, offset } => {
            format!("{{{{{directive}}}}} at byte {offset} is never closed")
        }
        TemplateError::UnexpectedDirective { directive, offset } => {
            format!("unexpected {{{{{directive}}}}} at byte {offset}")
        }
        TemplateError::MalformedDirective {
            directive,
            argument,
            offset,
        } => format!("cannot parse {{{{{directive} {argument}}}}} at byte {offset}"),
    }
}

fn describe_config_error(error: &ConfigError) -> String {
    match error {
        ConfigError::InvalidField {
            path,
            value: Some(value),
            reason,
        } => format!("invalid setting {path} = {value}: {reason}"),
        ConfigError::InvalidField { path, reason, .. } => format!("invalid setting {path}: {reason}"),
        ConfigError::InvalidDocument { source, .. } => format!("invalid settings document: {source}"),
        ConfigError::Io { path, source, .. } => {
            format!("failed to read {}: {source}", path.display())
        }
    }
}

/// Read a settings document and select the store scope, if any.
pub(crate) async fn load_settings(path: &Path, store: Option<&str>) -> CliResult<ScopeConfig> {
    let config = ScopeConfig::load(path).await.map_err(|err| match err {
        ConfigError::Io { .. } => CliError::failure(anyhow!(describe_config_error(&err))),
        other => CliError::validation(format!(
            "settings file {} is not valid: {}",
            path.display(),
            describe_config_error(&other)
        )),
    })?;

    Ok(match store {
        Some(code) => config.with_store(code),
        None => config,
    })
}
