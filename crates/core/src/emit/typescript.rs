//! TypeScript emission: interfaces with type guards, zod schemas, and
//! marshaller/unmarshaller classes over a shared error taxonomy.
//!
//! Every entity schema is wrapped in `z.lazy`, so schema constants can
//! reference each other in any order, covering forward and circular
//! references the same way the Python side's call-time lookups do.

use crate::error::SchemaError;
use crate::graph::{Entity, Property, SchemaDocument, SchemaNode, StringFormat};
use crate::rules::{self, Predicate};
use crate::target::{map_type, Target};

use super::util::{doc_line, escape_double_quoted, lower_first};
use super::Artifact;

const HEADER: &str = "// Generated file. Do not edit by hand.\n";

/// Emit the five TypeScript artifacts for a document.
pub fn emit(doc: &SchemaDocument) -> Result<Vec<Artifact>, SchemaError> {
    Ok(vec![
        Artifact {
            filename: "models.ts".to_string(),
            contents: models_module(doc),
        },
        Artifact {
            filename: "validator.ts".to_string(),
            contents: validator_module(doc)?,
        },
        Artifact {
            filename: "marshaller.ts".to_string(),
            contents: marshaller_module(doc),
        },
        Artifact {
            filename: "unmarshaller.ts".to_string(),
            contents: unmarshaller_module(doc),
        },
        Artifact {
            filename: "common.ts".to_string(),
            contents: common_module(),
        },
    ])
}

fn object_entities(doc: &SchemaDocument) -> Vec<&Entity> {
    doc.entities()
        .filter(|e| matches!(e.node, SchemaNode::Object(_)))
        .collect()
}

// =============================================================================
// models.ts
// =============================================================================

fn models_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    let objects = object_entities(doc);
    if !objects.is_empty() {
        let schemas = objects
            .iter()
            .map(|e| format!("{}Schema", e.name))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\nimport {{ {schemas} }} from \"./validator\";\n"));
    }

    out.push_str("\n/** ISO 8601 date string (YYYY-MM-DD). */\n");
    out.push_str("export type ISO8601Date = string;\n");
    out.push_str("\n/** ISO 8601 date-time string with timezone (e.g. \"2024-01-15T10:00:00Z\"). */\n");
    out.push_str("export type ISO8601DateTime = string;\n");
    out.push_str("\n/** RFC 4122 UUID string. */\n");
    out.push_str("export type UUID = string;\n");

    for entity in doc.entities() {
        match &entity.node {
            SchemaNode::Object(props) => {
                out.push('\n');
                out.push_str(&interface(entity, props));
            }
            other => {
                let ty = map_type(other, &crate::graph::Constraints::default(), Target::TypeScript);
                out.push_str(&format!("\nexport type {} = {ty};\n", entity.name));
            }
        }
    }

    for entity in doc.entities() {
        if let Some(members) = &entity.union_types {
            out.push_str(&format!(
                "\n/** Union of the event payload types carried by {}. */\nexport type {}Types = {};\n",
                entity.name,
                entity.name,
                members.join(" | ")
            ));
        }
    }

    for entity in &objects {
        out.push_str(&type_guard(&entity.name));
    }
    out
}

fn interface(entity: &Entity, props: &[Property]) -> String {
    let mut out = String::new();
    if let Some(desc) = &entity.description {
        out.push_str(&format!("/**\n * {desc}\n */\n"));
    }
    out.push_str(&format!("export interface {} {{\n", entity.name));
    for prop in props {
        let note = prop.constraints.format.map(StringFormat::doc_note);
        if let Some(line) = doc_line(prop.description.as_deref(), note) {
            out.push_str(&format!("  /** {line} */\n"));
        }
        let ty = map_type(&prop.node, &prop.constraints, Target::TypeScript);
        let opt = if prop.required { "" } else { "?" };
        out.push_str(&format!("  {}{opt}: {ty};\n", prop.name));
    }
    out.push_str("}\n");
    out
}

fn type_guard(name: &str) -> String {
    format!(
        concat!(
            "\n/** Type guard for {name}. */\n",
            "export function is{name}(value: unknown): value is {name} {{\n",
            "  return {name}Schema.safeParse(value).success;\n",
            "}}\n",
        ),
        name = name
    )
}

// =============================================================================
// validator.ts
// =============================================================================

fn validator_module(doc: &SchemaDocument) -> Result<String, SchemaError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\nimport { z } from \"zod\";\n");
    out.push_str(&format!("\nconst DATE_RE = /{}/;\n", rules::DATE_PATTERN));
    out.push_str(&format!(
        "const DATE_TIME_RE = /{}/;\n",
        rules::DATE_TIME_PATTERN
    ));
    out.push_str(concat!(
        "\nfunction isCalendarDate(value: string): boolean {\n",
        "  const [year, month, day] = value.split(\"-\").map(Number);\n",
        "  const date = new Date(Date.UTC(year, month - 1, day));\n",
        "  return date.getUTCMonth() === month - 1 && date.getUTCDate() === day;\n",
        "}\n",
        "\nfunction isRealInstant(value: string): boolean {\n",
        "  return !Number.isNaN(Date.parse(value));\n",
        "}\n",
    ));

    for entity in doc.entities() {
        out.push('\n');
        match &entity.node {
            SchemaNode::Object(props) => {
                out.push_str(&format!(
                    "export const {}Schema: z.ZodTypeAny = z.lazy(() =>\n  z.object({{\n",
                    entity.name
                ));
                for prop in props {
                    let schema = property_schema(entity, prop)?;
                    out.push_str(&format!("    {}: {schema},\n", prop.name));
                }
                out.push_str("  })\n);\n");
            }
            other => {
                let schema = node_schema(other);
                out.push_str(&format!(
                    "export const {}Schema: z.ZodTypeAny = z.lazy(() => {schema});\n",
                    entity.name
                ));
            }
        }
    }
    Ok(out)
}

fn property_schema(entity: &Entity, prop: &Property) -> Result<String, SchemaError> {
    let mut schema = constrained_schema(entity, prop)?;
    if !prop.required {
        schema.push_str(".nullish()");
    }
    Ok(schema)
}

/// Build the zod chain for one property, applying derived rules in their
/// fixed order on top of the base type.
fn constrained_schema(entity: &Entity, prop: &Property) -> Result<String, SchemaError> {
    if let Some(target) = prop.node.reference_target() {
        return Ok(format!("{target}Schema"));
    }
    if let SchemaNode::Array(items) = &prop.node {
        return Ok(format!("z.array({})", node_schema(items)));
    }

    let derived = rules::rules_for(&entity.name, prop)?;

    if matches!(prop.node, SchemaNode::String) {
        if let Some(rule) = derived
            .iter()
            .find(|r| matches!(r.predicate, Predicate::Enum(_)))
        {
            if let Predicate::Enum(values) = &rule.predicate {
                let listed = values
                    .iter()
                    .map(|v| match v {
                        crate::schema::EnumValue::String(s) => format!("\"{s}\""),
                        other => format!("\"{}\"", rules::enum_literal(other)),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                return Ok(format!("z.enum([{listed}])"));
            }
        }
    }

    let mut schema = node_schema(&prop.node);
    for rule in &derived {
        let message = escape_double_quoted(&rule.message);
        match &rule.predicate {
            Predicate::Pattern(pattern) => {
                let escaped = escape_double_quoted(pattern);
                schema.push_str(&format!(".regex(new RegExp(\"{escaped}\"), \"{message}\")"));
            }
            Predicate::Enum(values) => {
                // String enums became z.enum above; numeric and boolean
                // enums are enforced with a membership refinement.
                let listed = values
                    .iter()
                    .map(rules::enum_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                schema.push_str(&format!(
                    ".refine((value) => [{listed}].includes(value), \"{message}\")"
                ));
            }
            Predicate::Minimum(bound) => {
                schema.push_str(&format!(
                    ".min({}, \"{message}\")",
                    rules::format_bound(*bound)
                ));
            }
            Predicate::Maximum(bound) => {
                schema.push_str(&format!(
                    ".max({}, \"{message}\")",
                    rules::format_bound(*bound)
                ));
            }
            Predicate::Format(format) => match format {
                StringFormat::Date => {
                    schema.push_str(&format!(
                        ".regex(DATE_RE, \"{message}\").refine(isCalendarDate, \"{message}\")"
                    ));
                }
                StringFormat::DateTime => {
                    schema.push_str(&format!(
                        ".regex(DATE_TIME_RE, \"{message}\").refine(isRealInstant, \"{message}\")"
                    ));
                }
                StringFormat::Uuid => schema.push_str(&format!(".uuid(\"{message}\")")),
                StringFormat::Email => schema.push_str(&format!(".email(\"{message}\")")),
            },
        }
    }
    Ok(schema)
}

fn node_schema(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Object(_) | SchemaNode::Unknown => "z.unknown()".to_string(),
        SchemaNode::Array(items) => format!("z.array({})", node_schema(items)),
        SchemaNode::String => "z.string()".to_string(),
        SchemaNode::Integer => "z.number().int()".to_string(),
        SchemaNode::Number => "z.number()".to_string(),
        SchemaNode::Boolean => "z.boolean()".to_string(),
        SchemaNode::Reference(name) => format!("{name}Schema"),
    }
}

// =============================================================================
// marshaller.ts
// =============================================================================

fn marshaller_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\nimport { z } from \"zod\";\n");
    out.push_str("\nimport { SchemaRegistryError, SchemaRegistryErrorCode } from \"./common\";\n");
    out.push_str("import * as models from \"./models\";\n");
    out.push_str("import * as validator from \"./validator\";\n");

    let objects = object_entities(doc);
    for entity in &objects {
        if let SchemaNode::Object(props) = &entity.node {
            out.push('\n');
            out.push_str(&to_wire_fn(entity, props));
        }
    }

    out.push_str(concat!(
        "\n/**\n",
        " * Serializes model instances to wire JSON. Payloads are validated\n",
        " * before serialization, and wire objects carry every declared key in\n",
        " * declaration order.\n",
        " */\n",
        "export class Marshaller {\n",
    ));
    for (i, entity) in objects.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&marshal_method(&entity.name));
    }
    out.push_str("}\n");
    out
}

fn to_wire_fn(entity: &Entity, props: &[Property]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "function {}ToWire(data: models.{}): Record<string, unknown> {{\n  return {{\n",
        lower_first(&entity.name),
        entity.name
    ));
    for prop in props {
        out.push_str(&format!("    {}: {},\n", prop.name, to_wire_value(prop)));
    }
    out.push_str("  };\n}\n");
    out
}

fn to_wire_value(prop: &Property) -> String {
    let name = &prop.name;
    if let Some(target) = prop.node.reference_target() {
        let call = format!("{}ToWire(data.{name})", lower_first(target));
        if prop.required {
            return call;
        }
        return format!(
            "data.{name} != null ? {}ToWire(data.{name}) : null",
            lower_first(target)
        );
    }
    if let Some(target) = prop.node.array_reference_target() {
        return format!(
            "(data.{name} ?? []).map((item) => {}ToWire(item))",
            lower_first(target)
        );
    }
    if matches!(prop.node, SchemaNode::Array(_)) {
        return format!("data.{name} ?? []");
    }
    if prop.required {
        format!("data.{name}")
    } else {
        format!("data.{name} ?? null")
    }
}

fn marshal_method(name: &str) -> String {
    format!(
        concat!(
            "  /**\n",
            "   * Marshal a {name} to a JSON string.\n",
            "   * @throws {{SchemaRegistryError}} VALIDATION_ERROR or MARSHAL_ERROR.\n",
            "   */\n",
            "  static marshal{name}(data: models.{name}): string {{\n",
            "    try {{\n",
            "      validator.{name}Schema.parse(data);\n",
            "      return JSON.stringify({c}ToWire(data));\n",
            "    }} catch (error) {{\n",
            "      if (error instanceof z.ZodError) {{\n",
            "        throw new SchemaRegistryError(\n",
            "          SchemaRegistryErrorCode.VALIDATION_ERROR,\n",
            "          `Invalid {name} data: ${{error.issues[0]?.message ?? error.message}}`,\n",
            "          error\n",
            "        );\n",
            "      }}\n",
            "      throw new SchemaRegistryError(\n",
            "        SchemaRegistryErrorCode.MARSHAL_ERROR,\n",
            "        `Failed to marshal {name}: ${{error instanceof Error ? error.message : \"Unknown error\"}}`,\n",
            "        error\n",
            "      );\n",
            "    }}\n",
            "  }}\n",
        ),
        name = name,
        c = lower_first(name)
    )
}

// =============================================================================
// unmarshaller.ts
// =============================================================================

fn unmarshaller_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\nimport { z } from \"zod\";\n");
    out.push_str("\nimport { SchemaRegistryError, SchemaRegistryErrorCode } from \"./common\";\n");
    out.push_str("import * as models from \"./models\";\n");
    out.push_str("import * as validator from \"./validator\";\n");

    out.push_str(concat!(
        "\n/**\n",
        " * Parses and validates wire JSON into typed model instances. Payloads\n",
        " * are validated in full before any instance is returned.\n",
        " */\n",
        "export class Unmarshaller {\n",
    ));
    for (i, entity) in object_entities(doc).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&unmarshal_method(&entity.name));
    }
    out.push_str("}\n");
    out
}

fn unmarshal_method(name: &str) -> String {
    format!(
        concat!(
            "  /**\n",
            "   * Unmarshal a JSON string (or an already-parsed object) to a {name}.\n",
            "   * @throws {{SchemaRegistryError}} PARSE_ERROR, VALIDATION_ERROR, or UNMARSHAL_ERROR.\n",
            "   */\n",
            "  static unmarshal{name}(json: unknown): models.{name} {{\n",
            "    try {{\n",
            "      const data = typeof json === \"string\" ? JSON.parse(json) : json;\n",
            "      return validator.{name}Schema.parse(data) as models.{name};\n",
            "    }} catch (error) {{\n",
            "      if (error instanceof SyntaxError) {{\n",
            "        throw new SchemaRegistryError(\n",
            "          SchemaRegistryErrorCode.PARSE_ERROR,\n",
            "          `Invalid JSON for {name}: ${{error.message}}`,\n",
            "          error\n",
            "        );\n",
            "      }}\n",
            "      if (error instanceof z.ZodError) {{\n",
            "        throw new SchemaRegistryError(\n",
            "          SchemaRegistryErrorCode.VALIDATION_ERROR,\n",
            "          `Invalid {name} data: ${{error.issues[0]?.message ?? error.message}}`,\n",
            "          error\n",
            "        );\n",
            "      }}\n",
            "      throw new SchemaRegistryError(\n",
            "        SchemaRegistryErrorCode.UNMARSHAL_ERROR,\n",
            "        `Failed to unmarshal {name}: ${{error instanceof Error ? error.message : \"Unknown error\"}}`,\n",
            "        error\n",
            "      );\n",
            "    }}\n",
            "  }}\n",
        ),
        name = name
    )
}

// =============================================================================
// common.ts
// =============================================================================

fn common_module() -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(concat!(
        "\n/** Stable error codes shared across generated targets. */\n",
        "export enum SchemaRegistryErrorCode {\n",
        "  VALIDATION_ERROR = \"VALIDATION_ERROR\",\n",
        "  PARSE_ERROR = \"PARSE_ERROR\",\n",
        "  MARSHAL_ERROR = \"MARSHAL_ERROR\",\n",
        "  UNMARSHAL_ERROR = \"UNMARSHAL_ERROR\",\n",
        "}\n",
        "\n/** Base error carrying a stable code and the underlying cause. */\n",
        "export class SchemaRegistryError extends Error {\n",
        "  constructor(\n",
        "    public code: SchemaRegistryErrorCode,\n",
        "    message: string,\n",
        "    public cause?: unknown\n",
        "  ) {\n",
        "    super(message);\n",
        "    this.name = \"SchemaRegistryError\";\n",
        "  }\n",
        "}\n",
    ));
    out
}
