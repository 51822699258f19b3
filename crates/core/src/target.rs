//! Target languages and schema-to-language type mapping.

use crate::graph::{Constraints, SchemaNode, StringFormat};
use crate::schema::EnumValue;

/// A supported output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Pydantic models plus a data-driven validator.
    Python,
    /// Interfaces plus zod schemas.
    TypeScript,
}

impl Target {
    /// Every supported target, in a stable order.
    pub fn all() -> [Target; 2] {
        [Target::Python, Target::TypeScript]
    }

    /// Lowercase language name, also the output subdirectory.
    pub fn name(self) -> &'static str {
        match self {
            Target::Python => "python",
            Target::TypeScript => "typescript",
        }
    }

    /// Source file extension for this language.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Python => "py",
            Target::TypeScript => "ts",
        }
    }
}

/// Per-target emission configuration, immutable during a run: native names
/// for the primitive kinds plus wrapper syntax for sequences and optional
/// values. Each language's emission pass owns its own context; nothing is
/// shared across languages.
#[derive(Debug, Clone, Copy)]
pub struct EmissionContext {
    target: Target,
    string_type: &'static str,
    integer_type: &'static str,
    number_type: &'static str,
    boolean_type: &'static str,
    unknown_type: &'static str,
}

impl EmissionContext {
    /// The context for one target language.
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Python => Self {
                target,
                string_type: "str",
                integer_type: "int",
                number_type: "float",
                boolean_type: "bool",
                unknown_type: "Any",
            },
            Target::TypeScript => Self {
                target,
                string_type: "string",
                integer_type: "number",
                number_type: "number",
                boolean_type: "boolean",
                unknown_type: "unknown",
            },
        }
    }

    /// The target this context emits for.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Native type name for a scalar node.
    fn primitive(&self, node: &SchemaNode) -> &'static str {
        match node {
            SchemaNode::String => self.string_type,
            SchemaNode::Integer => self.integer_type,
            SchemaNode::Number => self.number_type,
            SchemaNode::Boolean => self.boolean_type,
            _ => self.unknown_type,
        }
    }

    /// Wrap a type expression as a sequence.
    pub fn sequence_of(&self, inner: &str) -> String {
        match self.target {
            Target::Python => format!("List[{inner}]"),
            Target::TypeScript => format!("{inner}[]"),
        }
    }

    /// Wrap a type expression for a non-required property. TypeScript marks
    /// optionality on the field itself with `?`, so the expression is
    /// unchanged there.
    pub fn optional(&self, inner: &str) -> String {
        match self.target {
            Target::Python => format!("Optional[{inner}]"),
            Target::TypeScript => inner.to_string(),
        }
    }

    /// Alias (or plain native name) for a recognized string format. Python
    /// models keep formatted values as plain strings; the format is enforced
    /// by the generated validator.
    fn format_alias(&self, format: StringFormat) -> &'static str {
        match self.target {
            Target::Python => "str",
            Target::TypeScript => match format {
                StringFormat::Date => "ISO8601Date",
                StringFormat::DateTime => "ISO8601DateTime",
                StringFormat::Uuid => "UUID",
                StringFormat::Email => "string",
            },
        }
    }

    /// Enums on strings stay the plain string type in Python (enforced by
    /// validation) but become a literal union in TypeScript.
    fn enum_type(&self, values: &[EnumValue]) -> String {
        match self.target {
            Target::Python => self.string_type.to_string(),
            Target::TypeScript => values
                .iter()
                .map(|v| match v {
                    EnumValue::String(s) => format!("\"{s}\""),
                    EnumValue::Integer(i) => i.to_string(),
                    EnumValue::Float(f) => f.to_string(),
                    EnumValue::Bool(b) => b.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// Map a schema node to a type expression in the target language.
///
/// Priority is fixed: a reference names the referenced entity, then an enum
/// on a string, then a recognized format, then arrays wrapping their item
/// type, and finally the primitive map.
pub fn map_type(node: &SchemaNode, constraints: &Constraints, target: Target) -> String {
    let ctx = EmissionContext::for_target(target);
    map_type_with(node, constraints, &ctx)
}

/// [`map_type`] against an existing context.
pub fn map_type_with(node: &SchemaNode, constraints: &Constraints, ctx: &EmissionContext) -> String {
    if let Some(name) = node.reference_target() {
        return name.to_string();
    }
    if matches!(node, SchemaNode::String) {
        if let Some(values) = &constraints.enum_values {
            return ctx.enum_type(values);
        }
        if let Some(format) = constraints.format {
            return ctx.format_alias(format).to_string();
        }
    }
    if let SchemaNode::Array(items) = node {
        let inner = map_type_with(items, &Constraints::default(), ctx);
        return ctx.sequence_of(&inner);
    }
    ctx.primitive(node).to_string()
}

/// Wrap a type expression for a non-required property.
pub fn optional_type(inner: &str, target: Target) -> String {
    EmissionContext::for_target(target).optional(inner)
}
