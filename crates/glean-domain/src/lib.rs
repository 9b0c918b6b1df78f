//! glean Domain Layer
//!
//! This crate contains the core types for glean: user-authored extraction
//! filters, the records produced by the pipeline, and the trait interface
//! to the LLM provider. Infrastructure implementations (HTTP, terminal)
//! live in other crates.
//!
//! ## Key Concepts
//!
//! - **Filter**: ordered list of field specifications describing what to
//!   extract from unstructured input
//! - **FieldSpec**: a single named, typed, possibly optional field
//! - **Record**: one extracted entity, tied back to its input context
//! - **LlmProvider**: the seam to the model backend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod filter;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use field::{FieldSpec, FieldType, Scalar};
pub use filter::{Filter, FilterError};
pub use record::{ExtractionFailure, ExtractionMetadata, ExtractionOutcome, Record};
pub use traits::{CompletionRequest, LlmProvider};
