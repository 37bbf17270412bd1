//! Render configuration.
//!
//! Parses the `[render]` section of a `richtext.toml` file with serde and
//! provides auto-discovery of the file in parent directories.
//!
//! ```toml
//! [render]
//! gfm = true
//! extract_title = true
//! strict = false
//! max_depth = 128
//! base_path = "guide"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context::{DEFAULT_MAX_DEPTH, RenderOptions};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "richtext.toml";

/// Top-level configuration file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render settings.
    pub render: RenderSection,
    /// Path of the file this configuration was loaded from.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// The `[render]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSection {
    /// Enable GitHub Flavored Markdown extensions (default: true).
    pub gfm: bool,
    /// Use the first level-1 heading as the document title (default: false).
    pub extract_title: bool,
    /// Fail on input that would otherwise be rendered in degraded form.
    pub strict: bool,
    /// Maximum node nesting depth.
    pub max_depth: usize,
    /// Directory used to resolve relative `.md` links in HTML output.
    pub base_path: Option<String>,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            gfm: true,
            extract_title: false,
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            base_path: None,
        }
    }
}

impl RenderSection {
    /// Traversal options described by this section.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            strict: self.strict,
            max_depth: self.max_depth,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl RenderConfig {
    /// Load configuration.
    ///
    /// An explicit `config_path` must exist. Without one, `richtext.toml` is
    /// searched in the current directory and its parents; when none is found
    /// the defaults are used.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded render configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.max_depth == 0 {
            return Err(ConfigError::Validation(
                "render.max_depth must be at least 1".to_owned(),
            ));
        }
        if self
            .render
            .base_path
            .as_deref()
            .is_some_and(|base| base.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "render.base_path cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Find `richtext.toml` in `start` or one of its ancestors.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
