//! Configuration types for httpdoc

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{HttpDocError, Result};

/// Document configuration, usually kept next to the tests that record it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API documentation name
    pub name: String,
    /// Headers to exclude from every entry
    #[serde(default)]
    pub exclude_headers: Vec<String>,
    /// Custom template file used instead of the built-in Markdown template
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed or validated
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HttpDocError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| HttpDocError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HttpDocError::ConfigError(
                "Document name cannot be empty".to_string(),
            ));
        }

        for (i, header) in self.exclude_headers.iter().enumerate() {
            if header.trim().is_empty() {
                return Err(HttpDocError::ConfigError(format!(
                    "exclude_headers[{i}]: header name cannot be empty"
                )));
            }
        }

        if let Some(template) = &self.template {
            if !template.exists() {
                return Err(HttpDocError::ConfigError(format!(
                    "Template file does not exist: {}",
                    template.display()
                )));
            }
        }

        Ok(())
    }
}
