//! Lazy, by-name reference resolution.
//!
//! References are never dereferenced eagerly at load time: emitters compose
//! referenced entities by name, which is what lets forward references and
//! circular graphs (A embeds B embeds A) terminate at emission. The resolver
//! only guarantees that every named target exists before any artifact is
//! emitted.

use crate::error::SchemaError;

use super::node::{Entity, SchemaDocument, SchemaNode};

/// Resolves entity references by name against a loaded document.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    doc: &'a SchemaDocument,
}

impl<'a> RefResolver<'a> {
    /// Create a resolver over a document.
    pub fn new(doc: &'a SchemaDocument) -> Self {
        Self { doc }
    }

    /// Resolve a reference from `entity.property` to its target entity.
    pub fn resolve(
        &self,
        entity: &str,
        property: &str,
        target: &str,
    ) -> Result<&'a Entity, SchemaError> {
        self.doc
            .get(target)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                entity: entity.to_string(),
                property: property.to_string(),
                target: target.to_string(),
            })
    }

    /// Walk the whole graph and fail on the first dangling reference.
    /// Run before emission so a run never produces a partial artifact set.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for entity in self.doc.entities() {
            self.validate_node(&entity.name, "<root>", &entity.node)?;

            if let Some(union_types) = &entity.union_types {
                for target in union_types {
                    self.resolve(&entity.name, "x-union-types", target)?;
                }
            }
        }
        Ok(())
    }

    fn validate_node(
        &self,
        entity: &str,
        property: &str,
        node: &SchemaNode,
    ) -> Result<(), SchemaError> {
        match node {
            SchemaNode::Reference(target) => {
                self.resolve(entity, property, target)?;
            }
            SchemaNode::Array(items) => {
                self.validate_node(entity, property, items)?;
            }
            SchemaNode::Object(props) => {
                for prop in props {
                    self.validate_node(entity, &prop.name, &prop.node)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
