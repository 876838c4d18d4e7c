//! Configuration validation against a [`Schema`].
//!
//! # Example
//!
//! ```
//! use tharsis_provider::schema::{Attribute, Schema};
//! use tharsis_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("path", Attribute::required_string())
//!     .with_attribute("full_path", Attribute::computed_string());
//!
//! assert!(validate(&schema, &json!({"path": "../workspace"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"path": 42}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("path".to_string()));
//! ```

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};

/// Validate a configuration object against a schema.
///
/// - the root must be an object (or null, treated as empty)
/// - required attributes must be present and non-null
/// - computed-only attributes are not checked
/// - attribute types must match
/// - attributes not in the schema are reported
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let empty = serde_json::Map::new();
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return vec![Diagnostic::error("Expected object")
                .with_detail(format!("Got {}", value_type_name(other)))];
        },
    };

    let mut diagnostics = Vec::new();
    for (name, attr) in &schema.attributes {
        validate_attribute(name, attr, obj.get(name), &mut diagnostics);
    }

    for name in obj.keys() {
        if !schema.attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error(format!("Unsupported attribute '{}'", name))
                    .with_detail("An attribute with this name is not expected here")
                    .with_attribute(name.as_str()),
            );
        }
    }

    diagnostics
}

/// Validate and return the diagnostics as an error if there are any.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Whether `value` is valid against `schema`.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    name: &str,
    attr: &Attribute,
    value: Option<&Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", name))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(name),
                );
            }
        },
        Some(v) => validate_type(&attr.attr_type, v, name, diagnostics),
    }
}

fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let matches = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Int64 => value.is_i64() || value.is_u64(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Dynamic => true,
        AttributeType::List(element_type) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_type(element_type, item, &format!("{}.{}", path, i), diagnostics);
                }
                true
            },
            None => false,
        },
        AttributeType::Map(value_type) => match value.as_object() {
            Some(entries) => {
                for (key, item) in entries {
                    validate_type(value_type, item, &format!("{}.{}", path, key), diagnostics);
                }
                true
            },
            None => false,
        },
    };

    if !matches {
        diagnostics.push(
            Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                .with_detail(format!(
                    "Expected {}, got {}",
                    type_name(attr_type),
                    value_type_name(value)
                ))
                .with_attribute(path),
        );
    }
}

fn type_name(attr_type: &AttributeType) -> &'static str {
    match attr_type {
        AttributeType::String => "string",
        AttributeType::Int64 => "int64",
        AttributeType::Bool => "bool",
        AttributeType::List(_) => "list",
        AttributeType::Map(_) => "map",
        AttributeType::Dynamic => "dynamic",
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
