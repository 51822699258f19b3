//! Raw schema-document structs for serde deserialization.
//!
//! This is the unprocessed shape of the input document: a `components.schemas`
//! mapping where each entry is a JSON-Schema-style node. Ordered sections are
//! kept as [`serde_yaml::Mapping`] so that declaration order survives parsing;
//! everything else is typed. Normalization into the graph model happens in
//! [`crate::graph`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SchemaError;

/// Root of a raw schema document.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    /// Reusable schema components.
    pub components: Option<RawComponents>,
    /// Optional explicit declaration order overriding insertion order.
    #[serde(rename = "x-dependency-order")]
    pub dependency_order: Option<Vec<String>>,
}

/// The `components` section.
#[derive(Debug, Deserialize)]
pub struct RawComponents {
    /// Named entity schemas, in document order.
    pub schemas: Option<serde_yaml::Mapping>,
}

/// One raw schema node (an entity, a property, or an array item).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchema {
    /// Schema kind: string, integer, number, boolean, object, array.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    /// Reference to another entity, e.g. `#/components/schemas/Bill`.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Human-readable description, carried into generated docs.
    pub description: Option<String>,

    /// Object properties, in document order.
    pub properties: Option<serde_yaml::Mapping>,

    /// Required property names for object schemas.
    pub required: Option<Vec<String>>,

    /// Item schema for array schemas.
    pub items: Option<Box<RawSchema>>,

    /// Enumerated values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Format hint (date, date-time, uuid, email).
    pub format: Option<String>,

    /// Regex pattern constraint for strings.
    pub pattern: Option<String>,

    /// Minimum value for numbers/integers.
    pub minimum: Option<f64>,

    /// Maximum value for numbers/integers.
    pub maximum: Option<f64>,

    /// Default value literal.
    pub default: Option<serde_json::Value>,

    /// Simple union extension: names of entities this alias unions over.
    #[serde(rename = "x-union-types")]
    pub union_types: Option<Vec<String>>,
}

/// An enum value can be a string, integer, float, or boolean.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String literal.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
}

impl RawDocument {
    /// Parse a raw document from YAML (or JSON, which parses as YAML) text.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Read and parse a raw document from disk.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SchemaError::FileNotFound(path.to_path_buf())
            } else {
                SchemaError::Parse(format!("failed to read {}: {e}", path.display()))
            }
        })?;
        Self::parse(&text)
    }

    /// The `components.schemas` mapping, or the fail-fast load error.
    pub fn schemas(&self) -> Result<&serde_yaml::Mapping, SchemaError> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .ok_or(SchemaError::MissingSchemasSection)
    }
}
