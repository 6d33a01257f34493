//! End-to-end VCL generation.
//!
//! # Design
//! - Composition over the two seams: a `RuleStore` for settings and a
//!   `TemplateLocator` for base templates.
//! - Every call reads the store afresh; nothing is cached between calls.

use std::path::Path;

use tracing::{info, instrument};
use vclgen_config::RuleStore;

use crate::error::{GeneratorError, GeneratorResult};
use crate::locator::TemplateLocator;
use crate::template::Template;
use crate::transpile::TranspileOptions;
use crate::variables::{TemplateVariables, VariableBuilder};

/// Renders base templates with variables read from a rule store.
#[derive(Debug, Clone)]
pub struct VclGenerator<S, L> {
    store: S,
    locator: L,
    options: TranspileOptions,
}

impl<S: RuleStore, L: TemplateLocator> VclGenerator<S, L> {
    /// Create a generator with default design exception options.
    #[must_use]
    pub fn new(store: S, locator: L) -> Self {
        Self {
            store,
            locator,
            options: TranspileOptions::default(),
        }
    }

    /// Override design exception generation options.
    #[must_use]
    pub const fn with_options(mut self, options: TranspileOptions) -> Self {
        self.options = options;
        self
    }

    /// Access the backing rule store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the template variables for the current settings.
    ///
    /// # Errors
    ///
    /// Returns an error when a setting cannot be parsed.
    pub fn variables(&self) -> GeneratorResult<TemplateVariables> {
        VariableBuilder::new(&self.store)
            .with_options(self.options)
            .build()
            .map_err(|source| GeneratorError::Config {
                operation: "generator.variables",
                source,
            })
    }

    /// Generate VCL for `version`, optionally from an explicit template file.
    ///
    /// # Errors
    ///
    /// Returns an error when the template cannot be located or parsed, or when
    /// a setting cannot be parsed.
    #[instrument(name = "vcl_generator.generate", skip(self))]
    pub fn generate(&self, version: u8, input_file: Option<&Path>) -> GeneratorResult<String> {
        let variables = self.variables()?;
        let text = self.locator.template(version, input_file)?;
        let template = Template::parse(&text).map_err(|source| GeneratorError::Template {
            template: input_file.map_or_else(
                || format!("varnish{version}.vcl"),
                |file| file.display().to_string(),
            ),
            source,
        })?;

        let output = template.render(&variables.to_map());
        info!(
            bytes = output.len(),
            access_entries = variables.access_list.len(),
            "generated vcl"
        );
        Ok(output)
    }
}
