//! CLI argument definitions and parsing.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// glean - Extract structured data from text and images with a local LLM.
#[derive(Debug, Parser)]
#[command(name = "glean")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true)))]
pub struct Cli {
    /// Text input for extraction
    #[arg(long, group = "input")]
    pub text: Option<String>,

    /// Image path for extraction
    #[arg(long, group = "input")]
    pub image: Option<PathBuf>,

    /// Path to a bulk text file (.txt or .csv)
    #[arg(long, group = "input")]
    pub bulk_text: Option<PathBuf>,

    /// Path to a folder of images
    #[arg(long, group = "input")]
    pub bulk_images: Option<PathBuf>,

    /// Display format for results
    #[arg(long, value_enum)]
    pub display: Option<DisplayArg>,

    /// Export format for results
    #[arg(long, value_enum)]
    pub export: Option<ExportArg>,

    /// Export file path (default: extraction_results.<ext> in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter file (JSON array of field specs) instead of interactive definition
    #[arg(short, long)]
    pub filter: Option<PathBuf>,

    /// Ollama server endpoint
    #[arg(long, env = "OLLAMA_HOST")]
    pub host: Option<String>,

    /// Text model name
    #[arg(long, env = "GLEAN_TEXT_MODEL")]
    pub model: Option<String>,

    /// Vision model name
    #[arg(long, env = "GLEAN_VISION_MODEL")]
    pub vision_model: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Display format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DisplayArg {
    /// Pretty-printed JSON (default)
    Json,
    /// Table format
    Table,
    /// No display
    None,
}

/// Export format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExportArg {
    /// JSON file
    Json,
    /// CSV file
    Csv,
    /// No export (default)
    None,
}

impl From<DisplayArg> for crate::config::DisplayFormat {
    fn from(arg: DisplayArg) -> Self {
        match arg {
            DisplayArg::Json => crate::config::DisplayFormat::Json,
            DisplayArg::Table => crate::config::DisplayFormat::Table,
            DisplayArg::None => crate::config::DisplayFormat::None,
        }
    }
}

impl From<ExportArg> for crate::config::ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => crate::config::ExportFormat::Json,
            ExportArg::Csv => crate::config::ExportFormat::Csv,
            ExportArg::None => crate::config::ExportFormat::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_text_input() {
        let cli = Cli::parse_from(["glean", "--text", "Alice is 30"]);
        assert_eq!(cli.text.as_deref(), Some("Alice is 30"));
        assert!(cli.image.is_none());
    }

    #[test]
    fn test_input_modes_mutually_exclusive() {
        let result = Cli::try_parse_from(["glean", "--text", "x", "--image", "y.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_required() {
        let result = Cli::try_parse_from(["glean", "--display", "json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_export_args() {
        let cli = Cli::parse_from([
            "glean",
            "--text",
            "x",
            "--display",
            "table",
            "--export",
            "csv",
            "--output",
            "out.csv",
        ]);
        assert!(matches!(cli.display, Some(DisplayArg::Table)));
        assert!(matches!(cli.export, Some(ExportArg::Csv)));
        assert_eq!(cli.output.unwrap().to_str().unwrap(), "out.csv");
    }

    #[test]
    fn test_connection_overrides() {
        let cli = Cli::parse_from([
            "glean",
            "--text",
            "x",
            "--host",
            "http://10.0.0.2:11434",
            "--model",
            "mistral",
        ]);
        assert_eq!(cli.host.as_deref(), Some("http://10.0.0.2:11434"));
        assert_eq!(cli.model.as_deref(), Some("mistral"));
        assert!(cli.vision_model.is_none());
    }
}
