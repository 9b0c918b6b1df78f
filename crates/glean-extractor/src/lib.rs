//! glean Extractor
//!
//! Converts unstructured text and images into structured records using an
//! LLM, driven by a user-authored filter.
//!
//! # Architecture
//!
//! ```text
//! Input → PromptBuilder → LLM → Parser → Records
//! ```
//!
//! # Key Features
//!
//! - **Filter-driven schemas**: the response format sent to the model is
//!   derived from the user's field specs
//! - **Text and image inputs**: vision model routing is handled by the
//!   provider
//! - **Bulk processing**: `.txt`/`.csv` files and image folders, processed
//!   sequentially with per-item progress reporting
//! - **Lenient parsing**: invalid entities are skipped and reported, not
//!   fatal
//!
//! # Example Usage
//!
//! ```no_run
//! use glean_extractor::{Extractor, ExtractorConfig};
//! use glean_domain::{FieldSpec, FieldType, Filter, Scalar};
//! use glean_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = Filter::new(vec![
//!     FieldSpec::required("name", FieldType::Scalar(Scalar::Str)),
//!     FieldSpec::optional("age", FieldType::Scalar(Scalar::Int)),
//! ])?;
//!
//! let provider = MockProvider::new(r#"{"entities": [{"name": "Alice", "age": 30}]}"#);
//! let extractor = Extractor::new(provider, ExtractorConfig::default());
//!
//! let outcome = extractor.process_text("Alice is 30 years old.", &filter).await?;
//! println!("Extracted {} record(s)", outcome.records.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod schema;
mod sources;

pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extractor::Extractor;
pub use schema::entities_schema;
pub use sources::{list_images, read_bulk_text};
