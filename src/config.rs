//! Parser configuration, persisted as TOML.
//!
//! ```toml
//! crossing = true
//! parallel = false
//! beam_width = 8
//! max_words = 40
//! ```
//!
//! Every key is optional; missing keys take their [`Default`] values.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a [`ParserConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read parser config: {path}")]
    #[diagnostic(
        code(ccg::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse parser config: {path}")]
    #[diagnostic(
        code(ccg::config::parse),
        help("Check the TOML syntax in the parser config file. {message}")
    )]
    Parse { path: String, message: String },

    #[error("failed to write parser config: {path}")]
    #[diagnostic(
        code(ccg::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parser configuration: {message}")]
    #[diagnostic(code(ccg::config::invalid), help("Check the ParserConfig fields. {message}"))]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Knobs for [`ChartParser`](crate::chart::ChartParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Try crossing composition in addition to the four basic rules.
    pub crossing: bool,
    /// Fill all cells of one span length concurrently.
    pub parallel: bool,
    /// Keep at most this many trees per cell when a scorer is supplied.
    pub beam_width: Option<usize>,
    /// Reject longer sentences in [`try_parse`](crate::chart::ChartParser::try_parse).
    pub max_words: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            crossing: true,
            parallel: false,
            beam_width: None,
            max_words: None,
        }
    }
}

impl ParserConfig {
    /// Check field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.beam_width == Some(0) {
            return Err(ConfigError::Invalid {
                message: "beam_width must be at least 1".into(),
            });
        }
        if self.max_words == Some(0) {
            return Err(ConfigError::Invalid {
                message: "max_words must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Parse and validate a config from its TOML form.
    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        Self::parse_toml(toml_str, "<inline>")
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_toml(&content, &path.display().to_string())
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn parse_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: ParserConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
