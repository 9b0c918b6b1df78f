//! Field specifications for extraction filters

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Scalar value types a field can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    /// UTF-8 string
    Str,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// Boolean
    Bool,
}

impl Scalar {
    /// JSON Schema type name for this scalar
    pub fn json_type(&self) -> &'static str {
        match self {
            Scalar::Str => "string",
            Scalar::Int => "integer",
            Scalar::Float => "number",
            Scalar::Bool => "boolean",
        }
    }

    /// Check whether a JSON value matches this scalar type
    ///
    /// Integral floats (e.g. `3.0`) are accepted for `Int` because models
    /// routinely emit whole numbers with a fractional part.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Scalar::Str => value.is_string(),
            Scalar::Int => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().map_or(false, |f| f.fract() == 0.0)
            }
            Scalar::Float => value.is_number(),
            Scalar::Bool => value.is_boolean(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scalar::Str => "str",
            Scalar::Int => "int",
            Scalar::Float => "float",
            Scalar::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// The type of a filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// A single scalar value
    Scalar(Scalar),
    /// A list of scalar values
    List(Scalar),
}

impl FieldType {
    /// All field types a user can choose from, in menu order
    pub const ALL: [FieldType; 8] = [
        FieldType::Scalar(Scalar::Str),
        FieldType::Scalar(Scalar::Int),
        FieldType::Scalar(Scalar::Float),
        FieldType::List(Scalar::Str),
        FieldType::List(Scalar::Int),
        FieldType::List(Scalar::Float),
        FieldType::List(Scalar::Bool),
        FieldType::Scalar(Scalar::Bool),
    ];

    /// Check whether a JSON value conforms to this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Scalar(s) => s.matches(value),
            FieldType::List(s) => value
                .as_array()
                .map_or(false, |items| items.iter().all(|v| s.matches(v))),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s),
            FieldType::List(s) => write!(f, "list({})", s),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_scalar = |name: &str| -> Result<Scalar, String> {
            match name {
                "str" => Ok(Scalar::Str),
                "int" => Ok(Scalar::Int),
                "float" => Ok(Scalar::Float),
                "bool" => Ok(Scalar::Bool),
                other => Err(format!("unknown type '{}'", other)),
            }
        };

        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix("list(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Ok(FieldType::List(parse_scalar(inner.trim())?))
        } else {
            Ok(FieldType::Scalar(parse_scalar(trimmed)?))
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}

/// A single user-defined field to extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the JSON property key
    pub name: String,

    /// Expected value type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the model may omit this field
    #[serde(default)]
    pub optional: bool,
}

impl FieldSpec {
    /// Create a required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: false,
        }
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: true,
        }
    }
}
