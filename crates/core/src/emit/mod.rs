//! Code emission: schema graph in, generated source files out.
//!
//! Each target produces a fixed set of five artifacts: models, validator,
//! marshaller, unmarshaller, and shared error types. Generation is
//! all-or-nothing: references are resolved and every validation rule is
//! derived before any artifact is returned, so a broken schema never yields
//! a partial set.

pub mod python;
pub mod typescript;
pub(crate) mod util;

use tracing::debug;

use crate::error::SchemaError;
use crate::graph::{RefResolver, SchemaDocument, SchemaNode};
use crate::rules;
use crate::target::Target;

/// One generated source file.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name within the target's output directory.
    pub filename: String,
    /// Full file contents.
    pub contents: String,
}

/// Generate the full artifact set for one target.
pub fn generate(doc: &SchemaDocument, target: Target) -> Result<Vec<Artifact>, SchemaError> {
    RefResolver::new(doc).validate()?;
    check_rules(doc)?;
    debug!(target = target.name(), "generating artifacts");
    let artifacts = match target {
        Target::Python => python::emit(doc)?,
        Target::TypeScript => typescript::emit(doc)?,
    };
    debug!(
        target = target.name(),
        count = artifacts.len(),
        "artifacts generated"
    );
    Ok(artifacts)
}

/// Derive every rule up front so a bad pattern fails before any emission.
fn check_rules(doc: &SchemaDocument) -> Result<(), SchemaError> {
    for entity in doc.entities() {
        if let SchemaNode::Object(props) = &entity.node {
            for prop in props {
                rules::rules_for(&entity.name, prop)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SCHEMA: &str = r##"
components:
  schemas:
    Bill:
      type: object
      required: [id]
      properties:
        id:
          type: string
          format: uuid
"##;

    #[test]
    fn each_target_yields_five_artifacts() {
        let doc = SchemaDocument::parse(SCHEMA).unwrap();
        for target in Target::all() {
            let artifacts = generate(&doc, target).unwrap();
            assert_eq!(artifacts.len(), 5);
            let ext = target.extension();
            let names: Vec<String> = artifacts.iter().map(|a| a.filename.clone()).collect();
            assert_eq!(
                names,
                [
                    format!("models.{ext}"),
                    format!("validator.{ext}"),
                    format!("marshaller.{ext}"),
                    format!("unmarshaller.{ext}"),
                    format!("common.{ext}"),
                ]
            );
        }
    }

    #[test]
    fn broken_pattern_yields_no_artifacts() {
        let schema = r##"
components:
  schemas:
    Bill:
      type: object
      properties:
        code:
          type: string
          pattern: "([unclosed"
"##;
        let doc = SchemaDocument::parse(schema).unwrap();
        let err = generate(&doc, Target::Python).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn dangling_reference_yields_no_artifacts() {
        let schema = r##"
components:
  schemas:
    Bill:
      type: object
      properties:
        vendor:
          $ref: "#/components/schemas/Vendor"
"##;
        let doc = SchemaDocument::parse(schema).unwrap();
        let err = generate(&doc, Target::TypeScript).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { .. }));
    }

    #[test]
    fn generation_is_deterministic() {
        let doc = SchemaDocument::parse(SCHEMA).unwrap();
        for target in Target::all() {
            let first = generate(&doc, target).unwrap();
            let second = generate(&doc, target).unwrap();
            for (a, b) in first.iter().zip(second.iter()) {
                assert_eq!(a.filename, b.filename);
                assert_eq!(a.contents, b.contents);
            }
        }
    }
}
