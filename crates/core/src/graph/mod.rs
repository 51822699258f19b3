//! Normalized schema graph.
//!
//! The raw document is normalized into a flat, ordered list of named
//! entities. All schema-language corner cases are resolved here:
//! - `$ref` paths become plain target names (resolved lazily, by name)
//! - inline nested objects are lifted into synthesized entities
//! - declaration order is pinned (insertion order, or `x-dependency-order`)
//!
//! The graph is read-only after normalization; emitters only walk it.

mod node;
mod normalize;
mod resolve;

pub use node::{Constraints, Entity, Property, SchemaDocument, SchemaNode, StringFormat};
pub use resolve::RefResolver;
