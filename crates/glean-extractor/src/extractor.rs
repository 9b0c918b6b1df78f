//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::schema::entities_schema;
use crate::sources::{list_images, read_bulk_text};
use glean_domain::{
    CompletionRequest, ExtractionFailure, ExtractionMetadata, ExtractionOutcome, Filter,
    LlmProvider, Record,
};
use std::path::Path;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor converts unstructured inputs into structured records
pub struct Extractor<P: LlmProvider> {
    provider: P,
    config: ExtractorConfig,
}

impl<P> Extractor<P>
where
    P: LlmProvider,
    P::Error: std::fmt::Display,
{
    /// Create a new Extractor
    pub fn new(provider: P, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// Extract records from a single text input
    pub async fn process_text(
        &self,
        text: &str,
        filter: &Filter,
    ) -> Result<ExtractionOutcome, ExtractError> {
        if text.len() > self.config.max_text_length {
            return Err(ExtractError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }

        let system = PromptBuilder::new(filter).text_prompt();
        let request = CompletionRequest::text(system, text).with_schema(entities_schema(filter));

        self.run(request, filter, text).await
    }

    /// Extract records from a single image file
    ///
    /// The record's input context is the image file name, not its contents.
    pub async fn process_image(
        &self,
        path: &Path,
        filter: &Filter,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let bytes = std::fs::read(path)?;
        let context = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let system = PromptBuilder::new(filter).image_prompt();
        let request = CompletionRequest::image(system, bytes).with_schema(entities_schema(filter));

        self.run(request, filter, &context).await
    }

    /// Extract records from every item in a bulk text file
    ///
    /// Item failures are collected in the outcome; they do not abort the
    /// run. `progress` is called after each item with (done, total).
    pub async fn process_bulk_text(
        &self,
        path: &Path,
        filter: &Filter,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<ExtractionOutcome, ExtractError> {
        let items = read_bulk_text(path, &self.config.bulk_text_delimiter)?;
        info!("Bulk text: {} item(s) from {}", items.len(), path.display());

        let mut outcome = self.empty_outcome(false);
        let total = items.len();

        for (idx, item) in items.iter().enumerate() {
            match self.process_text(item, filter).await {
                Ok(item_outcome) => outcome.absorb(item_outcome),
                Err(e) => {
                    warn!("Item {}/{} failed: {}", idx + 1, total, e);
                    outcome.metadata.inputs_processed += 1;
                    outcome.failures.push(ExtractionFailure {
                        reason: e.to_string(),
                        raw_text: item.clone(),
                    });
                }
            }
            progress(idx + 1, total);
        }

        Ok(outcome)
    }

    /// Extract records from every image in a folder
    ///
    /// Files are processed in sorted name order. Item failures are
    /// collected in the outcome; they do not abort the run.
    pub async fn process_bulk_images(
        &self,
        folder: &Path,
        filter: &Filter,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<ExtractionOutcome, ExtractError> {
        let images = list_images(folder)?;
        info!(
            "Bulk images: {} file(s) from {}",
            images.len(),
            folder.display()
        );

        let mut outcome = self.empty_outcome(true);
        let total = images.len();

        for (idx, image) in images.iter().enumerate() {
            match self.process_image(image, filter).await {
                Ok(item_outcome) => outcome.absorb(item_outcome),
                Err(e) => {
                    warn!("Image {}/{} failed: {}", idx + 1, total, e);
                    outcome.metadata.inputs_processed += 1;
                    outcome.failures.push(ExtractionFailure {
                        reason: e.to_string(),
                        raw_text: image.display().to_string(),
                    });
                }
            }
            progress(idx + 1, total);
        }

        Ok(outcome)
    }

    /// Run one completion request and assemble the outcome
    async fn run(
        &self,
        request: CompletionRequest,
        filter: &Filter,
        context: &str,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let start = Instant::now();
        let model_name = self.provider.model_name(&request);

        debug!(
            "Prompt length: {} chars, images: {}",
            request.system.len() + request.user.len(),
            request.images.len()
        );

        let response = timeout(
            self.config.extraction_timeout(),
            self.provider.complete(request),
        )
        .await
        .map_err(|_| ExtractError::Timeout)?
        .map_err(|e| ExtractError::Llm(e.to_string()))?;

        debug!("Response length: {} chars", response.len());

        let parsed = parse_response(&response, filter)?;

        let records: Vec<Record> = parsed
            .entities
            .into_iter()
            .map(|fields| Record::new(context, fields))
            .collect();

        info!(
            "Extraction complete: {} record(s), {} rejected",
            records.len(),
            parsed.failures.len()
        );

        Ok(ExtractionOutcome {
            records,
            failures: parsed.failures,
            metadata: ExtractionMetadata {
                model_name,
                inputs_processed: 1,
                entities_attempted: parsed.attempted,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    /// Seed outcome for bulk folds, carrying the model name for the mode
    fn empty_outcome(&self, vision: bool) -> ExtractionOutcome {
        let probe = if vision {
            CompletionRequest::image(String::new(), Vec::new())
        } else {
            CompletionRequest::text(String::new(), String::new())
        };
        ExtractionOutcome::empty(self.provider.model_name(&probe))
    }
}
