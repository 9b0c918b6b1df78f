//! glean CLI library.
//!
//! This library provides the core functionality for the glean command-line
//! interface: argument parsing, configuration management, interactive filter
//! definition, output formatting, and result export.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod output;

pub use cli::Cli;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
