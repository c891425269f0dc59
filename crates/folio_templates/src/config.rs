//! Composer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};

/// Default size of the blocks header and footer resources are copied in.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Settings for loading a template package and composing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Directory containing the `Templates` folder
    pub package_root: PathBuf,
    /// Bytes read per block when streaming headers and footers
    pub chunk_size: usize,
    /// Reject templates that reference fields missing from the model
    pub strict_models: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            package_root: PathBuf::from("."),
            chunk_size: DEFAULT_CHUNK_SIZE,
            strict_models: false,
        }
    }
}

impl ComposerConfig {
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
            ..Self::default()
        }
    }

    /// Load from a YAML file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> TemplateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn package_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.package_root = root.into();
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn strict_models(mut self, strict: bool) -> Self {
        self.strict_models = strict;
        self
    }

    pub fn validate(&self) -> TemplateResult<()> {
        if self.chunk_size == 0 {
            return Err(TemplateError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
