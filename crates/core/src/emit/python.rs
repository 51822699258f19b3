//! Python emission: pydantic models, a data-driven validator, marshallers,
//! unmarshallers, and shared error types.
//!
//! Generated modules import each other relatively, so the output directory
//! works as a package without any install step. Cross-entity delegation is
//! by name inside method bodies, which Python resolves at call time, so
//! forward and circular references need no special ordering.

use crate::error::SchemaError;
use crate::graph::{Entity, Property, SchemaDocument, SchemaNode, StringFormat};
use crate::rules::{self, Predicate, ValidationRule};
use crate::target::{map_type, optional_type, Target};

use super::util::{doc_line, escape_double_quoted, to_snake_case};
use super::Artifact;

const HEADER: &str = "# Generated file. Do not edit by hand.\n";

/// Emit the five Python artifacts for a document.
pub fn emit(doc: &SchemaDocument) -> Result<Vec<Artifact>, SchemaError> {
    Ok(vec![
        Artifact {
            filename: "models.py".to_string(),
            contents: models_module(doc),
        },
        Artifact {
            filename: "validator.py".to_string(),
            contents: validator_module(doc)?,
        },
        Artifact {
            filename: "marshaller.py".to_string(),
            contents: marshaller_module(doc),
        },
        Artifact {
            filename: "unmarshaller.py".to_string(),
            contents: unmarshaller_module(doc),
        },
        Artifact {
            filename: "common.py".to_string(),
            contents: common_module(),
        },
    ])
}

fn model_names(doc: &SchemaDocument) -> Vec<&str> {
    doc.entities()
        .filter(|e| matches!(e.node, SchemaNode::Object(_)))
        .map(|e| e.name.as_str())
        .collect()
}

// =============================================================================
// models.py
// =============================================================================

fn models_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\"\"\"Data models for schema entities.\"\"\"\n\n");
    out.push_str("from __future__ import annotations\n\n");

    let has_unions = doc.entities().any(|e| e.union_types.is_some());
    if has_unions {
        out.push_str("from typing import Any, Dict, List, Optional, Union\n\n");
    } else {
        out.push_str("from typing import Any, Dict, List, Optional\n\n");
    }
    out.push_str("from pydantic import BaseModel, ConfigDict\n");

    for entity in doc.entities() {
        match &entity.node {
            SchemaNode::Object(props) => {
                out.push_str("\n\n");
                out.push_str(&model_class(entity, props));
            }
            other => {
                let ty = map_type(other, &crate::graph::Constraints::default(), Target::Python);
                out.push_str(&format!("\n\n{} = {ty}\n", entity.name));
            }
        }
    }

    for entity in doc.entities() {
        if let Some(members) = &entity.union_types {
            out.push_str(&format!(
                "\n\n{}Types = Union[{}]\n",
                entity.name,
                members.join(", ")
            ));
        }
    }

    out
}

fn model_class(entity: &Entity, props: &[Property]) -> String {
    let mut out = String::new();
    out.push_str(&format!("class {}(BaseModel):\n", entity.name));
    let doc = entity
        .description
        .clone()
        .unwrap_or_else(|| format!("Represents a {}.", entity.name));
    out.push_str(&format!("    \"\"\"{doc}\"\"\"\n\n"));
    out.push_str("    model_config = ConfigDict(extra=\"allow\")\n");

    for prop in props {
        out.push('\n');
        out.push_str(&model_field(prop));
    }
    out
}

fn model_field(prop: &Property) -> String {
    let mut out = String::new();
    let base = map_type(&prop.node, &prop.constraints, Target::Python);
    let default = prop.default.as_ref().map(python_literal);
    if prop.required {
        match default {
            Some(lit) => out.push_str(&format!("    {}: {base} = {lit}\n", prop.name)),
            None => out.push_str(&format!("    {}: {base}\n", prop.name)),
        }
    } else {
        let ty = optional_type(&base, Target::Python);
        let lit = default.unwrap_or_else(|| "None".to_string());
        out.push_str(&format!("    {}: {ty} = {lit}\n", prop.name));
    }
    let note = prop.constraints.format.map(StringFormat::doc_note);
    if let Some(line) = doc_line(prop.description.as_deref(), note) {
        out.push_str(&format!("    \"\"\"{line}\"\"\"\n"));
    }
    out
}

fn python_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::String(s) => format!("\"{}\"", escape_double_quoted(s)),
        other => other.to_string(),
    }
}

// =============================================================================
// validator.py
// =============================================================================

fn validator_module(doc: &SchemaDocument) -> Result<String, SchemaError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\"\"\"Field-level payload validation. Checks run in a fixed order and stop at the first failure.\"\"\"\n\n");
    out.push_str("import re\nfrom datetime import datetime\nfrom typing import Any, Dict\n\n");
    out.push_str("from .common import ValidationError\n\n");
    out.push_str(&format!("DATE_RE = re.compile(r\"{}\")\n", rules::DATE_PATTERN));
    out.push_str(&format!(
        "DATE_TIME_RE = re.compile(r\"{}\")\n",
        rules::DATE_TIME_PATTERN
    ));
    out.push_str(&format!("UUID_RE = re.compile(r\"{}\")\n", rules::UUID_PATTERN));
    out.push_str(&format!("EMAIL_RE = re.compile(r\"{}\")\n", rules::EMAIL_PATTERN));
    out.push_str("\n\nclass Validator:\n");
    out.push_str("    \"\"\"Validates wire payloads before model construction.\"\"\"\n");

    for entity in doc.entities() {
        if let SchemaNode::Object(props) = &entity.node {
            out.push('\n');
            out.push_str(&validator_method(entity, props)?);
        }
    }
    Ok(out)
}

fn validator_method(entity: &Entity, props: &[Property]) -> Result<String, SchemaError> {
    let mut out = String::new();
    let snake = to_snake_case(&entity.name);
    out.push_str("    @staticmethod\n");
    out.push_str(&format!(
        "    def validate_{snake}(data: Dict[str, Any]) -> None:\n"
    ));
    out.push_str(&format!(
        "        \"\"\"Validate a {} payload.\"\"\"\n",
        entity.name
    ));
    out.push_str("        if not isinstance(data, dict):\n");
    out.push_str(&format!(
        "            raise ValidationError(\"{} payload must be an object\")\n",
        entity.name
    ));

    let required: Vec<&str> = props
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    if !required.is_empty() {
        let listed = required
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("        for field in [{listed}]:\n"));
        out.push_str("            if field not in data or data[field] is None:\n");
        out.push_str(
            "                raise ValidationError(f\"Missing required field: {field}\")\n",
        );
    }

    for prop in props {
        out.push_str(&property_checks(entity, prop)?);
    }
    Ok(out)
}

fn property_checks(entity: &Entity, prop: &Property) -> Result<String, SchemaError> {
    let mut out = String::new();
    let name = &prop.name;

    if let Some(target) = prop.node.reference_target() {
        out.push_str(&format!("        value = data.get(\"{name}\")\n"));
        out.push_str("        if value is not None:\n");
        out.push_str(&format!(
            "            Validator.validate_{}(value)\n",
            to_snake_case(target)
        ));
        return Ok(out);
    }

    if let Some(target) = prop.node.array_reference_target() {
        out.push_str(&format!("        value = data.get(\"{name}\")\n"));
        out.push_str("        if value is not None:\n");
        out.push_str("            if not isinstance(value, list):\n");
        out.push_str(&format!(
            "                raise ValidationError(\"{name} must be a list\")\n"
        ));
        out.push_str("            for item in value:\n");
        out.push_str(&format!(
            "                Validator.validate_{}(item)\n",
            to_snake_case(target)
        ));
        return Ok(out);
    }

    let type_check = scalar_type_check(&prop.node, name);
    let derived = rules::rules_for(&entity.name, prop)?;
    if type_check.is_none() && derived.is_empty() {
        return Ok(out);
    }

    out.push_str(&format!("        value = data.get(\"{name}\")\n"));
    out.push_str("        if value is not None:\n");
    if let Some(check) = type_check {
        out.push_str(&check);
    }
    for rule in &derived {
        out.push_str(&rule_check(rule));
    }
    Ok(out)
}

fn scalar_type_check(node: &SchemaNode, name: &str) -> Option<String> {
    let (cond, noun) = match node {
        SchemaNode::String => ("not isinstance(value, str)".to_string(), "a string"),
        SchemaNode::Integer => (
            "not isinstance(value, int) or isinstance(value, bool)".to_string(),
            "an integer",
        ),
        SchemaNode::Number => (
            "not isinstance(value, (int, float)) or isinstance(value, bool)".to_string(),
            "a number",
        ),
        SchemaNode::Boolean => ("not isinstance(value, bool)".to_string(), "a boolean"),
        SchemaNode::Array(_) => ("not isinstance(value, list)".to_string(), "a list"),
        _ => return None,
    };
    Some(format!(
        "            if {cond}:\n                raise ValidationError(\"{name} must be {noun}\")\n"
    ))
}

fn rule_check(rule: &ValidationRule) -> String {
    // Patterns and messages land inside generated string literals, so both
    // are escaped; a raw r"..." literal could not hold a quote at all.
    let message = escape_double_quoted(&rule.message);
    match &rule.predicate {
        Predicate::Pattern(pattern) => format!(
            "            if not re.search(\"{}\", value):\n                raise ValidationError(\"{message}\")\n",
            escape_double_quoted(pattern)
        ),
        Predicate::Enum(values) => {
            let listed = values
                .iter()
                .map(rules::enum_literal)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "            if value not in [{listed}]:\n                raise ValidationError(\"{message}\")\n"
            )
        }
        Predicate::Minimum(bound) => format!(
            "            if value < {}:\n                raise ValidationError(\"{message}\")\n",
            rules::format_bound(*bound)
        ),
        Predicate::Maximum(bound) => format!(
            "            if value > {}:\n                raise ValidationError(\"{message}\")\n",
            rules::format_bound(*bound)
        ),
        Predicate::Format(format) => format_check(*format, &message),
    }
}

fn format_check(format: StringFormat, message: &str) -> String {
    match format {
        StringFormat::Date => format!(
            concat!(
                "            if not DATE_RE.match(value):\n",
                "                raise ValidationError(\"{message}\")\n",
                "            try:\n",
                "                datetime.strptime(value, \"%Y-%m-%d\")\n",
                "            except ValueError:\n",
                "                raise ValidationError(\"{message}\")\n",
            ),
            message = message
        ),
        StringFormat::DateTime => format!(
            concat!(
                "            if not DATE_TIME_RE.match(value):\n",
                "                raise ValidationError(\"{message}\")\n",
                "            try:\n",
                "                datetime.fromisoformat(value.replace(\"Z\", \"+00:00\"))\n",
                "            except ValueError:\n",
                "                raise ValidationError(\"{message}\")\n",
            ),
            message = message
        ),
        StringFormat::Uuid => format!(
            "            if not UUID_RE.match(value):\n                raise ValidationError(\"{message}\")\n"
        ),
        StringFormat::Email => format!(
            "            if not EMAIL_RE.match(value):\n                raise ValidationError(\"{message}\")\n"
        ),
    }
}

// =============================================================================
// marshaller.py
// =============================================================================

fn marshaller_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\"\"\"Marshalling: model instances out to wire dictionaries and JSON.\"\"\"\n\n");
    out.push_str("import json\nfrom typing import Any, Dict\n\n");
    out.push_str("from .common import MarshalError\n");
    let names = model_names(doc);
    if !names.is_empty() {
        out.push_str(&format!("from .models import {}\n", names.join(", ")));
    }

    for entity in doc.entities() {
        if let SchemaNode::Object(props) = &entity.node {
            out.push_str("\n\n");
            out.push_str(&marshaller_class(entity, props));
        }
    }
    out
}

fn marshaller_class(entity: &Entity, props: &[Property]) -> String {
    let mut out = String::new();
    let name = &entity.name;
    out.push_str(&format!("class {name}Marshaller:\n"));
    out.push_str(&format!(
        "    \"\"\"Serializes {name} instances for the wire.\"\"\"\n\n"
    ));
    out.push_str("    @staticmethod\n");
    out.push_str(&format!(
        "    def to_dict(obj: {name}) -> Dict[str, Any]:\n"
    ));
    out.push_str(&format!(
        "        \"\"\"Convert a {name} instance to a wire dictionary.\"\"\"\n"
    ));
    out.push_str("        return {\n");
    for prop in props {
        out.push_str(&format!(
            "            \"{}\": {},\n",
            prop.name,
            to_dict_value(prop)
        ));
    }
    out.push_str("        }\n\n");
    out.push_str("    @staticmethod\n");
    out.push_str(&format!("    def marshal(obj: {name}) -> str:\n"));
    out.push_str(&format!(
        "        \"\"\"Serialize a {name} instance to a JSON string.\"\"\"\n"
    ));
    out.push_str("        try:\n");
    out.push_str(&format!(
        "            return json.dumps({name}Marshaller.to_dict(obj))\n"
    ));
    out.push_str("        except (TypeError, ValueError) as exc:\n");
    out.push_str(&format!(
        "            raise MarshalError(f\"Failed to marshal {name}: {{exc}}\") from exc\n"
    ));
    out
}

fn to_dict_value(prop: &Property) -> String {
    let name = &prop.name;
    if let Some(target) = prop.node.reference_target() {
        if prop.required {
            return format!("{target}Marshaller.to_dict(obj.{name})");
        }
        return format!(
            "{target}Marshaller.to_dict(obj.{name}) if obj.{name} is not None else None"
        );
    }
    if let Some(target) = prop.node.array_reference_target() {
        return format!("[{target}Marshaller.to_dict(x) for x in (obj.{name} or [])]");
    }
    if matches!(prop.node, SchemaNode::Array(_)) {
        return format!("list(obj.{name} or [])");
    }
    format!("obj.{name}")
}

// =============================================================================
// unmarshaller.py
// =============================================================================

fn unmarshaller_module(doc: &SchemaDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(
        "\"\"\"Unmarshalling: wire payloads in, validated before construction.\"\"\"\n\n",
    );
    out.push_str("import json\nfrom typing import Any, Dict\n\n");
    out.push_str("from .common import ParseError, UnmarshalError, ValidationError\n");
    let names = model_names(doc);
    if !names.is_empty() {
        out.push_str(&format!("from .models import {}\n", names.join(", ")));
    }
    out.push_str("from .validator import Validator\n");

    for entity in doc.entities() {
        if let SchemaNode::Object(props) = &entity.node {
            out.push_str("\n\n");
            out.push_str(&unmarshaller_class(entity, props));
        }
    }
    out
}

fn unmarshaller_class(entity: &Entity, props: &[Property]) -> String {
    let mut out = String::new();
    let name = &entity.name;
    let snake = to_snake_case(name);
    out.push_str(&format!("class {name}Unmarshaller:\n"));
    out.push_str(&format!(
        "    \"\"\"Builds validated {name} instances from wire payloads.\"\"\"\n\n"
    ));
    out.push_str("    @staticmethod\n");
    out.push_str(&format!(
        "    def from_dict(data: Dict[str, Any]) -> {name}:\n"
    ));
    out.push_str(&format!(
        "        \"\"\"Validate a wire dictionary and build a {name} from it.\"\"\"\n"
    ));
    out.push_str("        if not isinstance(data, dict):\n");
    out.push_str(&format!(
        "            raise ParseError(\"{name} payload must be an object\")\n"
    ));
    out.push_str(&format!("        Validator.validate_{snake}(data)\n"));
    out.push_str("        try:\n");
    out.push_str(&format!("            return {name}(\n"));
    for prop in props {
        out.push_str(&format!(
            "                {}={},\n",
            prop.name,
            from_dict_value(prop)
        ));
    }
    out.push_str("            )\n");
    out.push_str("        except (ParseError, ValidationError, UnmarshalError):\n");
    out.push_str("            raise\n");
    out.push_str("        except Exception as exc:\n");
    out.push_str(&format!(
        "            raise UnmarshalError(f\"Failed to unmarshal {name}: {{exc}}\") from exc\n"
    ));
    out.push('\n');
    out.push_str("    @staticmethod\n");
    out.push_str(&format!("    def unmarshal(payload: str) -> {name}:\n"));
    out.push_str(&format!(
        "        \"\"\"Parse a JSON string and build a validated {name}.\"\"\"\n"
    ));
    out.push_str("        try:\n");
    out.push_str("            data = json.loads(payload)\n");
    out.push_str("        except json.JSONDecodeError as exc:\n");
    out.push_str(&format!(
        "            raise ParseError(f\"Invalid JSON payload for {name}: {{exc}}\") from exc\n"
    ));
    out.push_str(&format!("        return {name}Unmarshaller.from_dict(data)\n"));
    out
}

fn from_dict_value(prop: &Property) -> String {
    let name = &prop.name;
    if let Some(target) = prop.node.reference_target() {
        if prop.required {
            return format!("{target}Unmarshaller.from_dict(data[\"{name}\"])");
        }
        return format!(
            "{target}Unmarshaller.from_dict(data[\"{name}\"]) if data.get(\"{name}\") is not None else None"
        );
    }
    if let Some(target) = prop.node.array_reference_target() {
        return format!(
            "[{target}Unmarshaller.from_dict(item) for item in (data.get(\"{name}\") or [])]"
        );
    }
    // A declared default becomes the get() fallback so the model default is
    // applied when the wire payload omits the key.
    if let Some(default) = &prop.default {
        return format!("data.get(\"{name}\", {})", python_literal(default));
    }
    format!("data.get(\"{name}\")")
}

// =============================================================================
// common.py
// =============================================================================

fn common_module() -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\"\"\"Shared error types for generated bindings.\"\"\"\n\n");
    out.push_str("from enum import Enum\n\n\n");
    out.push_str("class SchemaRegistryErrorCode(str, Enum):\n");
    out.push_str("    \"\"\"Stable error codes shared across generated targets.\"\"\"\n\n");
    out.push_str("    VALIDATION_ERROR = \"VALIDATION_ERROR\"\n");
    out.push_str("    PARSE_ERROR = \"PARSE_ERROR\"\n");
    out.push_str("    MARSHAL_ERROR = \"MARSHAL_ERROR\"\n");
    out.push_str("    UNMARSHAL_ERROR = \"UNMARSHAL_ERROR\"\n\n\n");
    out.push_str("class SchemaRegistryError(Exception):\n");
    out.push_str("    \"\"\"Base error carrying a stable code and a message.\"\"\"\n\n");
    out.push_str(
        "    def __init__(self, code: SchemaRegistryErrorCode, message: str) -> None:\n",
    );
    out.push_str("        super().__init__(message)\n");
    out.push_str("        self.code = code\n");
    out.push_str("        self.message = message\n");
    for (class, code) in [
        ("ValidationError", "VALIDATION_ERROR"),
        ("ParseError", "PARSE_ERROR"),
        ("MarshalError", "MARSHAL_ERROR"),
        ("UnmarshalError", "UNMARSHAL_ERROR"),
    ] {
        out.push_str(&format!("\n\nclass {class}(SchemaRegistryError):\n"));
        out.push_str(&format!(
            "    \"\"\"Raised with code {code}.\"\"\"\n\n"
        ));
        out.push_str("    def __init__(self, message: str) -> None:\n");
        out.push_str(&format!(
            "        super().__init__(SchemaRegistryErrorCode.{code}, message)\n"
        ));
    }
    out
}
