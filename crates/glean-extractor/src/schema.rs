//! JSON Schema derivation from extraction filters
//!
//! The schema is passed to the provider as the response `format`, so the
//! model is constrained to emit exactly the fields the filter names.

use glean_domain::{FieldType, Filter};
use serde_json::{json, Map, Value};

/// Build the response schema for a filter
///
/// The shape is an object with a single `entities` array; each element is
/// an object whose properties are typed from the field specs, with the
/// non-optional fields required.
pub fn entities_schema(filter: &Filter) -> Value {
    let mut properties = Map::new();
    for field in filter.fields() {
        properties.insert(field.name.clone(), type_schema(&field.field_type));
    }

    let required: Vec<&str> = filter.required_names();

    json!({
        "type": "object",
        "properties": {
            "entities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false
                }
            }
        },
        "required": ["entities"]
    })
}

fn type_schema(field_type: &FieldType) -> Value {
    match field_type {
        FieldType::Scalar(s) => json!({ "type": s.json_type() }),
        FieldType::List(s) => json!({
            "type": "array",
            "items": { "type": s.json_type() }
        }),
    }
}
