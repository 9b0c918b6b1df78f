//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model server connection
    #[serde(default)]
    pub connection: Connection,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Connection details for the model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Ollama endpoint
    #[serde(default = "default_host")]
    pub host: String,

    /// Model for text inputs
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model for image inputs
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts per request
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default display format
    #[serde(default)]
    pub display: DisplayFormat,

    /// Default export format
    #[serde(default)]
    pub export: ExportFormat,
}

/// Display format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Table format
    Table,
    /// No display
    None,
}

/// Export format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON file
    Json,
    /// CSV file
    Csv,
    /// No export
    #[default]
    None,
}

impl ExportFormat {
    /// File extension for this format, if it writes a file.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Json => Some("json"),
            ExportFormat::Csv => Some("csv"),
            ExportFormat::None => None,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".glean").join("config.toml"))
    }

    /// Load configuration from the default path, creating it on first run.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save().ok();
            Ok(config)
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: Connection::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            host: default_host(),
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            display: DisplayFormat::Json,
            export: ExportFormat::None,
        }
    }
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_text_model() -> String {
    "llama3".to_string()
}

fn default_vision_model() -> String {
    "llama3.2-vision".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.host, "http://localhost:11434");
        assert_eq!(config.connection.text_model, "llama3");
        assert_eq!(config.connection.vision_model, "llama3.2-vision");
        assert!(config.settings.color);
        assert_eq!(config.settings.display, DisplayFormat::Json);
        assert_eq!(config.settings.export, ExportFormat::None);
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[connection]\ntext_model = \"mistral\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.connection.text_model, "mistral");
        // Unspecified keys fall back to defaults
        assert_eq!(config.connection.host, "http://localhost:11434");
        assert!(config.settings.color);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.connection.host, config.connection.host);
        assert_eq!(parsed.settings.display, config.settings.display);
    }

    #[test]
    fn test_export_extension() {
        assert_eq!(ExportFormat::Json.extension(), Some("json"));
        assert_eq!(ExportFormat::Csv.extension(), Some("csv"));
        assert_eq!(ExportFormat::None.extension(), None);
    }
}
