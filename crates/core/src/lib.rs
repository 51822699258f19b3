//! Schema binding generation for business-event documents.
//!
//! One schema document in, per-language binding sets out. The pipeline is:
//! 1. Parse: YAML or JSON -> [`schema::RawDocument`]
//! 2. Normalize: raw document -> [`graph::SchemaDocument`] (inline objects
//!    lifted, declaration order settled)
//! 3. Resolve: every by-name reference checked against the graph
//! 4. Emit: graph -> generated source artifacts per target language
//!
//! Generation is deterministic and all-or-nothing: the same document always
//! yields byte-identical artifacts, and a schema error yields none at all.

pub mod emit;
pub mod error;
pub mod graph;
pub mod rules;
pub mod schema;
pub mod target;

pub use emit::{generate, Artifact};
pub use error::SchemaError;
pub use graph::{RefResolver, SchemaDocument};
pub use target::{EmissionContext, Target};
