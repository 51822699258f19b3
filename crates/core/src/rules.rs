//! Validation rules derived from property constraints.
//!
//! Each constrained property yields an ordered list of rules. The order is a
//! contract shared by every emitted validator: pattern, then enum, then
//! numeric bounds, then format — and generated validators stop at the first
//! failing rule. Messages always name the original schema field, never a
//! target-language identifier.

use regex::Regex;

use crate::error::SchemaError;
use crate::graph::{Property, StringFormat};
use crate::schema::EnumValue;

/// Exact shape of a `date` value. Calendar validity (no month 13) is a
/// separate check in the emitted validators.
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// Full ISO-8601 date-time with a `T` separator and `Z` or an explicit
/// offset. A space separator does not match.
pub const DATE_TIME_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$";

/// RFC 4122 UUID text form.
pub const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// Minimal email shape: one `@`, no whitespace, a dotted domain.
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// One runtime check to be emitted for a property.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    /// Original schema field name (also the wire key).
    pub field: String,
    /// The check to perform.
    pub predicate: Predicate,
    /// Failure message, phrased against the schema field.
    pub message: String,
}

/// Predicate kinds, in their fixed evaluation order.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Value must match a regex (unanchored search).
    Pattern(String),
    /// Value must be one of the enumerated literals.
    Enum(Vec<EnumValue>),
    /// Value must be `>=` the bound.
    Minimum(f64),
    /// Value must be `<=` the bound.
    Maximum(f64),
    /// Value must satisfy a string format.
    Format(StringFormat),
}

/// Derive the ordered rule list for one property. Fails if a schema-supplied
/// pattern does not compile, so broken patterns never reach generated code.
pub fn rules_for(entity: &str, prop: &Property) -> Result<Vec<ValidationRule>, SchemaError> {
    let mut rules = Vec::new();
    let c = &prop.constraints;

    if let Some(pattern) = &c.pattern {
        Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            field: format!("{entity}.{}", prop.name),
            reason: e.to_string(),
        })?;
        rules.push(ValidationRule {
            field: prop.name.clone(),
            predicate: Predicate::Pattern(pattern.clone()),
            message: format!("{} must match pattern {pattern}", prop.name),
        });
    }

    if let Some(values) = &c.enum_values {
        let rendered = values
            .iter()
            .map(enum_literal)
            .collect::<Vec<_>>()
            .join(", ");
        rules.push(ValidationRule {
            field: prop.name.clone(),
            predicate: Predicate::Enum(values.clone()),
            message: format!("{} must be one of [{rendered}]", prop.name),
        });
    }

    if let Some(min) = c.minimum {
        rules.push(ValidationRule {
            field: prop.name.clone(),
            predicate: Predicate::Minimum(min),
            message: format!("{} must be >= {}", prop.name, format_bound(min)),
        });
    }

    if let Some(max) = c.maximum {
        rules.push(ValidationRule {
            field: prop.name.clone(),
            predicate: Predicate::Maximum(max),
            message: format!("{} must be <= {}", prop.name, format_bound(max)),
        });
    }

    if let Some(format) = c.format {
        let noun = match format {
            StringFormat::Date => "date in YYYY-MM-DD format",
            StringFormat::DateTime => "ISO 8601 date-time with timezone",
            StringFormat::Uuid => "UUID",
            StringFormat::Email => "email address",
        };
        rules.push(ValidationRule {
            field: prop.name.clone(),
            predicate: Predicate::Format(format),
            message: format!("{} must be a valid {noun}", prop.name),
        });
    }

    Ok(rules)
}

/// Render an enum literal for messages (strings quoted, scalars bare).
pub fn enum_literal(value: &EnumValue) -> String {
    match value {
        EnumValue::String(s) => format!("'{s}'"),
        EnumValue::Integer(i) => i.to_string(),
        EnumValue::Float(f) => f.to_string(),
        EnumValue::Bool(b) => b.to_string(),
    }
}

/// Render a numeric bound without a trailing `.0` for whole numbers.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}
