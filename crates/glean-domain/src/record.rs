//! Extraction results: records, failures, and run metadata

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One extracted entity, tied back to the input it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Input context: the source text, or the image file name
    pub input: String,

    /// Extracted field values, keyed by field name
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record for the given input context
    pub fn new(input: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            input: input.into(),
            fields,
        }
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// An entity the model produced that could not be turned into a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Why the entity was rejected
    pub reason: String,

    /// The offending fragment, for diagnostics
    pub raw_text: String,
}

/// Metadata about an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Name of the model that produced the output
    pub model_name: String,

    /// Number of inputs processed (1 for single mode)
    pub inputs_processed: usize,

    /// Total entities the model proposed, valid or not
    pub entities_attempted: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

/// The outcome of an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Records that validated against the filter
    pub records: Vec<Record>,

    /// Entities that were rejected
    pub failures: Vec<ExtractionFailure>,

    /// Run metadata
    pub metadata: ExtractionMetadata,
}

impl ExtractionOutcome {
    /// Merge another outcome into this one, accumulating metadata
    pub fn absorb(&mut self, other: ExtractionOutcome) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
        self.metadata.inputs_processed += other.metadata.inputs_processed;
        self.metadata.entities_attempted += other.metadata.entities_attempted;
        self.metadata.processing_time_ms += other.metadata.processing_time_ms;
    }

    /// An empty outcome for the given model, used as a fold seed in bulk mode
    pub fn empty(model_name: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            metadata: ExtractionMetadata {
                model_name: model_name.into(),
                inputs_processed: 0,
                entities_attempted: 0,
                processing_time_ms: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(input: &str) -> Record {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Alice"));
        Record::new(input, fields)
    }

    #[test]
    fn test_record_get() {
        let r = record("some text");
        assert_eq!(r.get("name"), Some(&json!("Alice")));
        assert_eq!(r.get("missing"), None);
    }

    #[test]
    fn test_record_serializes_with_input() {
        let r = record("some text");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["input"], "some text");
        assert_eq!(json["fields"]["name"], "Alice");
    }

    #[test]
    fn test_outcome_absorb() {
        let mut a = ExtractionOutcome::empty("llama3");
        a.records.push(record("one"));
        a.metadata.inputs_processed = 1;
        a.metadata.entities_attempted = 2;
        a.metadata.processing_time_ms = 10;

        let mut b = ExtractionOutcome::empty("llama3");
        b.records.push(record("two"));
        b.failures.push(ExtractionFailure {
            reason: "bad".to_string(),
            raw_text: "{}".to_string(),
        });
        b.metadata.inputs_processed = 1;
        b.metadata.entities_attempted = 3;
        b.metadata.processing_time_ms = 5;

        a.absorb(b);
        assert_eq!(a.records.len(), 2);
        assert_eq!(a.failures.len(), 1);
        assert_eq!(a.metadata.inputs_processed, 2);
        assert_eq!(a.metadata.entities_attempted, 5);
        assert_eq!(a.metadata.processing_time_ms, 15);
    }
}
