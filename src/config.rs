//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cardintake.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Extraction service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report format.
    #[serde(default)]
    pub format: crate::cli::OutputFormat,

    /// Write the report to this file instead of stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Exit with code 2 when any record failed.
    #[serde(default)]
    pub fail_on_error: bool,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            format: crate::cli::OutputFormat::default(),
            output: None,
            fail_on_error: false,
            verbose: false,
        }
    }
}

/// Extraction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the extraction service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. A call that exceeds it is surfaced as
    /// an error outcome; there is no unbounded wait.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Issuer hint forwarded on single-file submissions.
    #[serde(default)]
    pub issuer_hint: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            issuer_hint: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Text shown for fields the service could not extract.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Include the per-issuer breakdown section.
    #[serde(default = "default_true")]
    pub issuer_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            issuer_summary: true,
        }
    }
}

fn default_placeholder() -> String {
    "N/A".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".cardintake.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Service URL - always override since it has a default in CLI
        self.service.base_url = args.service_url.clone();

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.service.timeout_seconds = timeout;
        }

        if let Some(ref issuer) = args.issuer {
            self.service.issuer_hint = Some(issuer.clone());
        }

        // Report settings - only override if provided
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        // Flags always override
        if args.fail_on_error {
            self.general.fail_on_error = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:5000");
        assert_eq!(config.service.timeout_seconds, 120);
        assert_eq!(config.report.placeholder, "N/A");
        assert_eq!(config.general.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
format = "markdown"
fail_on_error = true

[service]
base_url = "http://statements.internal:8080"
timeout_seconds = 30

[report]
placeholder = "--"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert!(config.general.fail_on_error);
        assert_eq!(config.service.base_url, "http://statements.internal:8080");
        assert_eq!(config.service.timeout_seconds, 30);
        assert_eq!(config.report.placeholder, "--");
        // Unspecified table keeps its defaults
        assert!(config.report.issuer_summary);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[service]"));
        assert!(toml_str.contains("[report]"));
    }
}
