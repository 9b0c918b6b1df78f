//! Extraction filters: ordered collections of field specifications

use crate::field::FieldSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors produced when validating a filter
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A filter must contain at least one field
    #[error("filter must define at least one field")]
    Empty,

    /// A field name was empty or whitespace-only
    #[error("field name must not be empty")]
    EmptyName,

    /// Two fields share the same name
    #[error("duplicate field name '{0}'")]
    DuplicateName(String),
}

/// A user-authored extraction filter
///
/// Field order is preserved; it drives prompt wording, table columns,
/// and CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    fields: Vec<FieldSpec>,
}

impl Filter {
    /// Build a filter from field specs, validating it
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, FilterError> {
        if fields.is_empty() {
            return Err(FilterError::Empty);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(FilterError::EmptyName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FilterError::DuplicateName(field.name.clone()));
            }
        }

        Ok(Self { fields })
    }

    /// The fields in definition order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the filter has no fields (never true for a validated filter)
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of all fields, in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of required (non-optional) fields, in order
    pub fn required_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.optional)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Parse a filter from a JSON array of field specs
    pub fn from_json(json: &str) -> Result<Self, String> {
        let fields: Vec<FieldSpec> =
            serde_json::from_str(json).map_err(|e| format!("invalid filter JSON: {}", e))?;
        Self::new(fields).map_err(|e| e.to_string())
    }
}
