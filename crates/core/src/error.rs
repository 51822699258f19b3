//! Generation-time error taxonomy.
//!
//! Everything here is fatal to a generation run: a run either produces a
//! complete artifact set per requested language or nothing at all. The
//! runtime (marshalling-time) error codes live in the *generated* code's
//! common module, not here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a schema document or emitting bindings.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document does not exist on disk.
    #[error("schema file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The document could not be read or parsed as YAML/JSON.
    #[error("failed to parse schema document: {0}")]
    Parse(String),

    /// The document lacks a `components.schemas` mapping.
    #[error("schema document has no components.schemas mapping")]
    MissingSchemasSection,

    /// Two entities share the same name.
    #[error("duplicate entity '{0}' in components.schemas")]
    DuplicateEntity(String),

    /// `x-dependency-order` names an entity that does not exist.
    #[error("x-dependency-order names unknown entity '{0}'")]
    UnknownOrderEntry(String),

    /// A `$ref` points at an entity that does not exist.
    #[error("unresolved reference '{target}' from {entity}.{property}")]
    UnresolvedReference {
        /// Entity containing the dangling reference.
        entity: String,
        /// Property holding the reference.
        property: String,
        /// The missing target name.
        target: String,
    },

    /// A `pattern` constraint is not a valid regular expression.
    #[error("invalid pattern on '{field}': {reason}")]
    InvalidPattern {
        /// Schema path of the constrained property.
        field: String,
        /// Why the pattern failed to compile.
        reason: String,
    },
}
