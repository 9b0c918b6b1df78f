//! glean - Extract structured data from text and images with a local LLM.

use clap::Parser;
use glean_cli::config::{DisplayFormat, ExportFormat};
use glean_cli::{export, filters, Cli, CliError, Config, Formatter};
use glean_extractor::{Extractor, ExtractorConfig};
use glean_llm::OllamaProvider;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Log level resolution: GLEAN_LOG, then RUST_LOG, then "info"
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env("GLEAN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() {
    // Log to stderr so piped output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .init();

    match run().await {
        Ok(()) => {}
        Err(CliError::Cancelled) => {
            eprintln!("Operation cancelled.");
        }
        Err(e) => {
            let formatter = Formatter::new(DisplayFormat::None, true);
            eprintln!("{}", formatter.error(&e.to_string()));
            std::process::exit(1);
        }
    }
}

async fn run() -> glean_cli::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    // CLI flags and env vars override the config file
    let display: DisplayFormat = cli
        .display
        .map(Into::into)
        .unwrap_or(config.settings.display);
    let export_format: ExportFormat = cli
        .export
        .map(Into::into)
        .unwrap_or(config.settings.export);
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(display, color_enabled);

    // Resolve the filter before touching the network
    let filter = match &cli.filter {
        Some(path) => filters::load_filter(path)?,
        None => filters::define_filter_interactive(&formatter)?,
    };
    debug!("Filter defines {} field(s)", filter.len());

    let host = cli.host.clone().unwrap_or(config.connection.host.clone());
    let text_model = cli
        .model
        .clone()
        .unwrap_or(config.connection.text_model.clone());
    let vision_model = cli
        .vision_model
        .clone()
        .unwrap_or(config.connection.vision_model.clone());
    info!("Using models '{}' / '{}' at {}", text_model, vision_model, host);

    let max_retries = config.connection.max_retries.max(1);
    let provider = OllamaProvider::with_timeout(
        host,
        text_model,
        vision_model,
        Duration::from_secs(config.connection.timeout_secs),
    )?
    .with_max_retries(max_retries);

    // The pipeline timeout must cover every retry attempt plus backoff
    let extractor_config = ExtractorConfig {
        extraction_timeout_secs: config
            .connection
            .timeout_secs
            .saturating_mul(u64::from(max_retries))
            + 30,
        ..ExtractorConfig::default()
    };
    extractor_config
        .validate()
        .map_err(CliError::Config)?;
    let extractor = Extractor::new(provider, extractor_config);

    let outcome = if let Some(text) = &cli.text {
        extractor.process_text(text, &filter).await?
    } else if let Some(image) = &cli.image {
        extractor.process_image(image, &filter).await?
    } else if let Some(path) = &cli.bulk_text {
        let bar = ProgressBar::new(0);
        let outcome = extractor
            .process_bulk_text(path, &filter, |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await?;
        bar.finish_and_clear();
        outcome
    } else if let Some(folder) = &cli.bulk_images {
        let bar = ProgressBar::new(0);
        let outcome = extractor
            .process_bulk_images(folder, &filter, |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await?;
        bar.finish_and_clear();
        outcome
    } else {
        // clap's input group is required
        unreachable!()
    };

    if outcome.records.is_empty() {
        eprintln!("{}", formatter.warning("No records extracted."));
    } else {
        if let Some(rendered) = formatter.format_outcome(&outcome, &filter)? {
            println!("{}", rendered);
        }

        if export_format != ExportFormat::None {
            let path = export::resolve_path(cli.output.as_deref(), export_format)?;
            export::export_outcome(&outcome, &filter, export_format, &path)?;
            eprintln!(
                "{}",
                formatter.success(&format!("Results exported to {}", path.display()))
            );
        }
    }

    eprintln!("{}", formatter.summary(&outcome));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because it manipulates process-wide env vars
    #[test]
    fn test_log_filter_fallback_chain() {
        std::env::remove_var("GLEAN_LOG");
        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().to_string(), "info");

        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(log_filter().to_string(), "debug");

        std::env::set_var("GLEAN_LOG", "trace");
        assert_eq!(log_filter().to_string(), "trace");

        std::env::remove_var("GLEAN_LOG");
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    fn test_derived_extractor_config_is_valid() {
        let connection = glean_cli::config::Config::default().connection;
        let config = ExtractorConfig {
            extraction_timeout_secs: connection
                .timeout_secs
                .saturating_mul(u64::from(connection.max_retries.max(1)))
                + 30,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
