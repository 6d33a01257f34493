//! Lookup of base VCL templates by Varnish version.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GeneratorError, GeneratorResult};

/// Varnish major versions with a base template.
pub const SUPPORTED_VERSIONS: [u8; 3] = [4, 6, 7];

/// Source of base template text.
pub trait TemplateLocator {
    /// Return the template text for `version`, or the contents of
    /// `input_file` when given.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported versions or unreadable templates.
    fn template(&self, version: u8, input_file: Option<&Path>) -> GeneratorResult<String>;
}

/// Reads `varnish<version>.vcl` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateLocator {
    root: PathBuf,
}

impl DirectoryTemplateLocator {
    /// Locate templates under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the path that would be read for `version`.
    ///
    /// A relative `input_file` is resolved against the template directory.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnsupportedVersion`] for unknown versions.
    pub fn template_path(&self, version: u8, input_file: Option<&Path>) -> GeneratorResult<PathBuf> {
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(GeneratorError::UnsupportedVersion { version });
        }

        Ok(match input_file {
            Some(file) if file.is_absolute() => file.to_path_buf(),
            Some(file) => self.root.join(file),
            None => self.root.join(format!("varnish{version}.vcl")),
        })
    }
}

impl TemplateLocator for DirectoryTemplateLocator {
    fn template(&self, version: u8, input_file: Option<&Path>) -> GeneratorResult<String> {
        let path = self.template_path(version, input_file)?;
        debug!(path = %path.display(), version, "reading base template");
        fs::read_to_string(&path).map_err(|source| GeneratorError::TemplateRead { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_file_name_is_used_by_default() {
        let locator = DirectoryTemplateLocator::new("/etc/vclgen");
        let path = locator.template_path(6, None).expect("version 6 is supported");
        assert_eq!(path, PathBuf::from("/etc/vclgen/varnish6.vcl"));
    }

    #[test]
    fn relative_override_resolves_against_root() {
        let locator = DirectoryTemplateLocator::new("/etc/vclgen");
        let path = locator
            .template_path(7, Some(Path::new("custom.vcl")))
            .expect("version 7 is supported");
        assert_eq!(path, PathBuf::from("/etc/vclgen/custom.vcl"));
    }

    #[test]
    fn absolute_override_is_used_as_is() {
        let locator = DirectoryTemplateLocator::new("/etc/vclgen");
        let path = locator
            .template_path(4, Some(Path::new("/srv/custom.vcl")))
            .expect("version 4 is supported");
        assert_eq!(path, PathBuf::from("/srv/custom.vcl"));
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let locator = DirectoryTemplateLocator::new("/etc/vclgen");
        assert!(matches!(
            locator.template_path(5, None),
            Err(GeneratorError::UnsupportedVersion { version: 5 })
        ));
    }

    #[test]
    fn missing_template_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locator = DirectoryTemplateLocator::new(dir.path());
        match locator.template(6, None) {
            Err(GeneratorError::TemplateRead { path, .. }) => {
                assert_eq!(path, dir.path().join("varnish6.vcl"));
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }
}
