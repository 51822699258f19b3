//! Graph node types: entities, schema nodes, properties, constraints.

use std::collections::HashMap;
use std::path::Path;

use crate::error::SchemaError;
use crate::schema::EnumValue;

/// A loaded, normalized schema document: named entities in declaration order.
#[derive(Debug)]
pub struct SchemaDocument {
    pub(crate) entities: Vec<Entity>,
    pub(crate) index: HashMap<String, usize>,
}

impl SchemaDocument {
    /// Load and normalize a schema document from disk.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let raw = crate::schema::RawDocument::from_path(path)?;
        super::normalize::normalize_document(&raw)
    }

    /// Parse and normalize a schema document from text.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let raw = crate::schema::RawDocument::parse(text)?;
        super::normalize::normalize_document(&raw)
    }

    /// Entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Look up an entity by name.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }
}

/// A named entity in the schema graph.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Entity name, used as the generated type name.
    pub name: String,
    /// Description carried into generated docs.
    pub description: Option<String>,
    /// The entity's schema node (usually an object).
    pub node: SchemaNode,
    /// Names this entity's `<Name>Types` union alias covers, if any.
    pub union_types: Option<Vec<String>>,
    /// True for entities lifted out of inline nested objects.
    pub synthesized: bool,
}

/// One typed node in the schema graph.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// An object with ordered properties.
    Object(Vec<Property>),
    /// An array over an item node.
    Array(Box<SchemaNode>),
    /// A string scalar.
    String,
    /// An integer scalar.
    Integer,
    /// A floating-point scalar.
    Number,
    /// A boolean scalar.
    Boolean,
    /// A by-name reference to another entity, resolved at emission time.
    Reference(String),
    /// A node with no recognized type.
    Unknown,
}

impl SchemaNode {
    /// The referenced entity name if this node is a reference.
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            SchemaNode::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// The referenced entity name if this node is an array of references.
    pub fn array_reference_target(&self) -> Option<&str> {
        match self {
            SchemaNode::Array(items) => items.reference_target(),
            _ => None,
        }
    }
}

/// One property of an object entity.
#[derive(Debug, Clone)]
pub struct Property {
    /// Original schema property name, also the wire key.
    pub name: String,
    /// The property's schema node.
    pub node: SchemaNode,
    /// Whether the enclosing entity's `required` list names this property.
    /// Never inferred from the presence of a default.
    pub required: bool,
    /// Description carried into generated docs.
    pub description: Option<String>,
    /// Default value literal, if declared.
    pub default: Option<serde_json::Value>,
    /// Validation facets.
    pub constraints: Constraints,
}

/// Constraint facets attached to a property.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// String format hint.
    pub format: Option<StringFormat>,
    /// Regex pattern (unanchored search semantics).
    pub pattern: Option<String>,
    /// Enumerated values.
    pub enum_values: Option<Vec<EnumValue>>,
    /// Inclusive lower bound for numerics.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numerics.
    pub maximum: Option<f64>,
}

impl Constraints {
    /// True when no facet is set.
    pub fn is_empty(&self) -> bool {
        self.format.is_none()
            && self.pattern.is_none()
            && self.enum_values.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
    }
}

/// Recognized string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `YYYY-MM-DD`, exactly.
    Date,
    /// Full ISO-8601 date-time with `Z` or an explicit offset.
    DateTime,
    /// RFC 4122 UUID text form.
    Uuid,
    /// Email address.
    Email,
}

impl StringFormat {
    /// Parse a schema `format` value; unrecognized formats are dropped.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            "uuid" => Some(Self::Uuid),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    /// Documentation note appended to generated field docs.
    pub fn doc_note(self) -> &'static str {
        match self {
            Self::Date => "ISO 8601 date format (YYYY-MM-DD)",
            Self::DateTime => "ISO 8601 date-time format with timezone (YYYY-MM-DDThh:mm:ssZ)",
            Self::Uuid => "UUID string",
            Self::Email => "Email address",
        }
    }
}
