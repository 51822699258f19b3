//! Normalization from the raw document to the schema graph.
//!
//! All input-format logic lives here: `$ref` paths become plain names,
//! inline nested objects are lifted into synthesized entities named after
//! their enclosing path, and the final declaration order is pinned.

use std::collections::HashMap;

use tracing::debug;

use crate::emit::util::capitalize_first;
use crate::error::SchemaError;
use crate::schema::{RawDocument, RawSchema};

use super::node::{Constraints, Entity, Property, SchemaDocument, SchemaNode, StringFormat};

/// Normalize a parsed raw document into a [`SchemaDocument`].
pub fn normalize_document(raw: &RawDocument) -> Result<SchemaDocument, SchemaError> {
    let schemas = raw.schemas()?;

    let mut entities: Vec<Entity> = Vec::new();
    for (key, value) in schemas {
        let name = key
            .as_str()
            .ok_or_else(|| SchemaError::Parse(format!("non-string entity name: {key:?}")))?;
        let raw_schema: RawSchema = serde_yaml::from_value(value.clone())
            .map_err(|e| SchemaError::Parse(format!("entity '{name}': {e}")))?;

        let mut lifted = Vec::new();
        let entity = normalize_entity(name, &raw_schema, &mut lifted)?;
        // Lifted entities come first so every target is declared before use.
        entities.extend(lifted);
        entities.push(entity);
    }

    let entities = apply_declaration_order(entities, raw.dependency_order.as_deref())?;

    let mut index = HashMap::new();
    for (i, entity) in entities.iter().enumerate() {
        if index.insert(entity.name.clone(), i).is_some() {
            return Err(SchemaError::DuplicateEntity(entity.name.clone()));
        }
    }

    debug!(entity_count = entities.len(), "Normalized schema document.");
    Ok(SchemaDocument { entities, index })
}

/// Reorder entities per `x-dependency-order`; unlisted entities keep
/// insertion order after the listed ones.
fn apply_declaration_order(
    entities: Vec<Entity>,
    order: Option<&[String]>,
) -> Result<Vec<Entity>, SchemaError> {
    let Some(order) = order else {
        return Ok(entities);
    };

    let mut remaining: Vec<Option<Entity>> = entities.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for name in order {
        let slot = remaining
            .iter_mut()
            .find(|e| e.as_ref().is_some_and(|e| &e.name == name))
            .ok_or_else(|| SchemaError::UnknownOrderEntry(name.clone()))?;
        if let Some(entity) = slot.take() {
            ordered.push(entity);
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    Ok(ordered)
}

/// Normalize one named entity, collecting lifted inline objects.
fn normalize_entity(
    name: &str,
    raw: &RawSchema,
    lifted: &mut Vec<Entity>,
) -> Result<Entity, SchemaError> {
    let path = vec![name.to_string()];
    let (node, _) = normalize_node(&path, raw, lifted)?;
    Ok(Entity {
        name: name.to_string(),
        description: raw.description.clone(),
        node,
        union_types: raw.union_types.clone(),
        synthesized: false,
    })
}

/// Normalize one schema node at a given path. Returns the node plus the
/// constraint facets declared alongside it.
fn normalize_node(
    path: &[String],
    raw: &RawSchema,
    lifted: &mut Vec<Entity>,
) -> Result<(SchemaNode, Constraints), SchemaError> {
    // References win over everything else.
    if let Some(ref_path) = &raw.ref_path {
        return Ok((
            SchemaNode::Reference(ref_target_name(ref_path)),
            Constraints::default(),
        ));
    }

    let constraints = Constraints {
        format: raw.format.as_deref().and_then(StringFormat::parse),
        pattern: raw.pattern.clone(),
        enum_values: raw.enum_values.clone(),
        minimum: raw.minimum,
        maximum: raw.maximum,
    };

    let node = match raw.schema_type.as_deref() {
        Some("object") => normalize_object(path, raw, lifted)?,
        Some("array") => {
            let items = match &raw.items {
                Some(items) => {
                    let mut item_path = path.to_vec();
                    item_path.push("Item".to_string());
                    normalize_node(&item_path, items, lifted)?.0
                }
                None => SchemaNode::Unknown,
            };
            SchemaNode::Array(Box::new(items))
        }
        Some("string") => SchemaNode::String,
        Some("integer") => SchemaNode::Integer,
        Some("number") => SchemaNode::Number,
        Some("boolean") => SchemaNode::Boolean,
        _ => SchemaNode::Unknown,
    };

    Ok((node, constraints))
}

/// Normalize an object node. Nested (non-top-level) objects are lifted into
/// synthesized entities and replaced by a reference, so emitters compose
/// strictly by name.
fn normalize_object(
    path: &[String],
    raw: &RawSchema,
    lifted: &mut Vec<Entity>,
) -> Result<SchemaNode, SchemaError> {
    let required: Vec<&str> = raw
        .required
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(String::as_str)
        .collect();

    let mut properties = Vec::new();
    if let Some(props) = &raw.properties {
        for (key, value) in props {
            let prop_name = key.as_str().ok_or_else(|| {
                SchemaError::Parse(format!("non-string property name in '{}'", path.join(".")))
            })?;
            let raw_prop: RawSchema = serde_yaml::from_value(value.clone()).map_err(|e| {
                SchemaError::Parse(format!("property '{}.{prop_name}': {e}", path.join(".")))
            })?;

            let mut prop_path = path.to_vec();
            prop_path.push(prop_name.to_string());
            let (node, constraints) = normalize_node(&prop_path, &raw_prop, lifted)?;

            properties.push(Property {
                name: prop_name.to_string(),
                node,
                required: required.contains(&prop_name),
                description: raw_prop.description.clone(),
                default: raw_prop.default.clone(),
                constraints,
            });
        }
    }

    if path.len() == 1 {
        return Ok(SchemaNode::Object(properties));
    }

    // Inline object: lift into a synthesized entity named by the path.
    let synth_name = synthesized_name(path);
    debug!(name = %synth_name, "Lifted inline object into synthesized entity.");
    lifted.push(Entity {
        name: synth_name.clone(),
        description: raw.description.clone(),
        node: SchemaNode::Object(properties),
        union_types: None,
        synthesized: true,
    });
    Ok(SchemaNode::Reference(synth_name))
}

/// Extract the target entity name from a `$ref` path.
fn ref_target_name(ref_path: &str) -> String {
    ref_path
        .strip_prefix("#/components/schemas/")
        .unwrap_or_else(|| ref_path.rsplit('/').next().unwrap_or(ref_path))
        .to_string()
}

/// Synthesized type name from the enclosing path: `Bill.payment` -> `BillPayment`.
fn synthesized_name(path: &[String]) -> String {
    path.iter()
        .map(|part| capitalize_first(part))
        .collect::<String>()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn doc(text: &str) -> SchemaDocument {
        SchemaDocument::parse(text).unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let doc = doc(
            r##"
components:
  schemas:
    Zeta: { type: object }
    Alpha: { type: object }
    Mid: { type: object }
"##,
        );
        let names: Vec<_> = doc.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn dependency_order_overrides_insertion_order() {
        let doc = doc(
            r##"
x-dependency-order: [Bill, LineItem]
components:
  schemas:
    BillEvent: { type: object }
    LineItem: { type: object }
    Bill: { type: object }
"##,
        );
        let names: Vec<_> = doc.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bill", "LineItem", "BillEvent"]);
    }

    #[test]
    fn unknown_order_entry_is_rejected() {
        let err = SchemaDocument::parse(
            r##"
x-dependency-order: [Ghost]
components:
  schemas:
    Bill: { type: object }
"##,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownOrderEntry(name) if name == "Ghost"));
    }

    #[test]
    fn refs_are_kept_by_name() {
        let doc = doc(
            r##"
components:
  schemas:
    BillEvent:
      type: object
      properties:
        bill:
          $ref: "#/components/schemas/Bill"
    Bill: { type: object }
"##,
        );
        let event = doc.get("BillEvent").unwrap();
        let SchemaNode::Object(props) = &event.node else {
            panic!("expected object");
        };
        assert_eq!(props[0].node.reference_target(), Some("Bill"));
    }

    #[test]
    fn inline_object_is_lifted_with_path_name() {
        let doc = doc(
            r##"
components:
  schemas:
    Bill:
      type: object
      properties:
        payment:
          type: object
          properties:
            method: { type: string }
"##,
        );
        let synth = doc.get("BillPayment").unwrap();
        assert!(synth.synthesized);

        let bill = doc.get("Bill").unwrap();
        let SchemaNode::Object(props) = &bill.node else {
            panic!("expected object");
        };
        assert_eq!(props[0].node.reference_target(), Some("BillPayment"));

        // The lifted entity is declared before its referencing entity.
        let names: Vec<_> = doc.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["BillPayment", "Bill"]);
    }

    #[test]
    fn required_comes_only_from_required_list() {
        let doc = doc(
            r##"
components:
  schemas:
    Bill:
      type: object
      required: [billId]
      properties:
        billId: { type: string }
        status: { type: string, default: draft }
"##,
        );
        let bill = doc.get("Bill").unwrap();
        let SchemaNode::Object(props) = &bill.node else {
            panic!("expected object");
        };
        assert!(props[0].required);
        // A default never implies required-ness.
        assert!(!props[1].required);
        assert!(props[1].default.is_some());
    }

    #[test]
    fn array_of_refs_is_recognized() {
        let doc = doc(
            r##"
components:
  schemas:
    Bill:
      type: object
      properties:
        lineItems:
          type: array
          items:
            $ref: "#/components/schemas/LineItem"
    LineItem: { type: object }
"##,
        );
        let bill = doc.get("Bill").unwrap();
        let SchemaNode::Object(props) = &bill.node else {
            panic!("expected object");
        };
        assert_eq!(props[0].node.array_reference_target(), Some("LineItem"));
    }

    #[test]
    fn constraints_are_captured() {
        let doc = doc(
            r##"
components:
  schemas:
    Bill:
      type: object
      properties:
        billDate: { type: string, format: date }
        amount: { type: integer, minimum: 0, maximum: 100 }
        status: { type: string, enum: [draft, posted] }
"##,
        );
        let bill = doc.get("Bill").unwrap();
        let SchemaNode::Object(props) = &bill.node else {
            panic!("expected object");
        };
        assert_eq!(props[0].constraints.format, Some(StringFormat::Date));
        assert_eq!(props[1].constraints.minimum, Some(0.0));
        assert_eq!(props[1].constraints.maximum, Some(100.0));
        assert!(props[2].constraints.enum_values.is_some());
    }
}
