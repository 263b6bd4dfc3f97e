//! External descriptions of function parameters and return values.
//!
//! Every function declares the shape of its input and output as an
//! [`ExternalDescription`]. Requests are checked and coerced with
//! [`validate_parameters`] before any work happens; handler output is
//! checked with [`clean_returnvalue`] before it leaves the server, and
//! [`to_json_schema`] renders a description for `functions/list`.

use serde_json::{Map, Number, Value, json};

use crate::protocol::json_type_name;
use crate::{Error, Result};

/// Scalar type of a described value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Int,
    Bool,
}

/// Whether a described key must be present.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Absent (or `null`) values take this default.
    Default(Value),
}

/// Description of a value, an object with fixed keys, or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDescription {
    Value {
        ty: ParamType,
        description: String,
        presence: Presence,
    },
    Single {
        keys: Vec<(String, ExternalDescription)>,
        description: String,
        presence: Presence,
    },
    Multiple {
        content: Box<ExternalDescription>,
        description: String,
        presence: Presence,
    },
}

impl ExternalDescription {
    /// A required scalar.
    pub fn value(ty: ParamType, description: impl Into<String>) -> Self {
        ExternalDescription::Value {
            ty,
            description: description.into(),
            presence: Presence::Required,
        }
    }

    /// A required object with the given keys, in declaration order.
    pub fn single<K: Into<String>>(
        description: impl Into<String>,
        keys: impl IntoIterator<Item = (K, ExternalDescription)>,
    ) -> Self {
        ExternalDescription::Single {
            keys: keys.into_iter().map(|(k, d)| (k.into(), d)).collect(),
            description: description.into(),
            presence: Presence::Required,
        }
    }

    /// A required list of `content`.
    pub fn multiple(description: impl Into<String>, content: ExternalDescription) -> Self {
        ExternalDescription::Multiple {
            content: Box::new(content),
            description: description.into(),
            presence: Presence::Required,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        *self.presence_mut() = Presence::Default(default);
        self
    }

    pub fn optional(mut self) -> Self {
        *self.presence_mut() = Presence::Optional;
        self
    }

    pub fn presence(&self) -> &Presence {
        match self {
            ExternalDescription::Value { presence, .. }
            | ExternalDescription::Single { presence, .. }
            | ExternalDescription::Multiple { presence, .. } => presence,
        }
    }

    fn presence_mut(&mut self) -> &mut Presence {
        match self {
            ExternalDescription::Value { presence, .. }
            | ExternalDescription::Single { presence, .. }
            | ExternalDescription::Multiple { presence, .. } => presence,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ExternalDescription::Value { description, .. }
            | ExternalDescription::Single { description, .. }
            | ExternalDescription::Multiple { description, .. } => description,
        }
    }
}

/// Check and coerce call parameters against a [`ExternalDescription::Single`].
///
/// Unexpected keys and missing required keys are rejected, defaults are
/// filled in, and scalars are coerced to their declared type.
pub fn validate_parameters(
    description: &ExternalDescription,
    params: Map<String, Value>,
) -> Result<Map<String, Value>> {
    match validate(description, Value::Object(params), "")? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidParameter(
            "parameter description must be a single structure".to_string(),
        )),
    }
}

fn validate(description: &ExternalDescription, value: Value, path: &str) -> Result<Value> {
    match description {
        ExternalDescription::Value { ty, .. } => {
            coerce(*ty, &value).map_err(|reason| Error::InvalidParameter(at(path, reason)))
        }
        ExternalDescription::Single { keys, .. } => {
            let mut input = match value {
                Value::Object(map) => map,
                other => {
                    return Err(Error::InvalidParameter(at(
                        path,
                        format!("expected object, got {}", json_type_name(&other)),
                    )));
                }
            };

            let unexpected: Vec<&str> = input
                .keys()
                .filter(|k| !keys.iter().any(|(name, _)| name == *k))
                .map(String::as_str)
                .collect();
            if !unexpected.is_empty() {
                return Err(Error::InvalidParameter(at(
                    path,
                    format!("unexpected keys ({}) detected in parameter array", unexpected.join(", ")),
                )));
            }

            let mut output = Map::new();
            for (name, sub) in keys {
                let child = join(path, name);
                match (input.remove(name), sub.presence()) {
                    (None | Some(Value::Null), Presence::Default(default)) => {
                        output.insert(name.clone(), default.clone());
                    }
                    (None | Some(Value::Null), Presence::Optional) => {}
                    (None | Some(Value::Null), Presence::Required) => {
                        return Err(Error::InvalidParameter(format!(
                            "missing required key in single structure: {child}"
                        )));
                    }
                    (Some(v), _) => {
                        output.insert(name.clone(), validate(sub, v, &child)?);
                    }
                }
            }
            Ok(Value::Object(output))
        }
        ExternalDescription::Multiple { content, .. } => {
            let items = match value {
                Value::Array(items) => items,
                other => {
                    return Err(Error::InvalidParameter(at(
                        path,
                        format!("expected array, got {}", json_type_name(&other)),
                    )));
                }
            };
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| validate(content, item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

/// Check handler output against its declared return description.
///
/// Scalars are coerced to their declared type, undeclared keys are dropped,
/// and a list may be given as an object. An object's values are taken in
/// key order, not insertion order (`serde_json::Map` is sorted), so handlers
/// that need a specific order return an array. Any other mismatch is an
/// [`Error::InvalidResponse`].
pub fn clean_returnvalue(description: &ExternalDescription, value: Value) -> Result<Value> {
    clean(description, value, "")
}

fn clean(description: &ExternalDescription, value: Value, path: &str) -> Result<Value> {
    match description {
        ExternalDescription::Value { ty, .. } => {
            if value.is_null() {
                return Err(Error::InvalidResponse(at(path, "null value".to_string())));
            }
            coerce(*ty, &value).map_err(|reason| Error::InvalidResponse(at(path, reason)))
        }
        ExternalDescription::Single { keys, .. } => {
            let mut input = match value {
                Value::Object(map) => map,
                other => {
                    return Err(Error::InvalidResponse(at(
                        path,
                        format!("expected object, got {}", json_type_name(&other)),
                    )));
                }
            };
            let mut output = Map::new();
            for (name, sub) in keys {
                let child = join(path, name);
                match (input.remove(name), sub.presence()) {
                    (Some(v), _) => {
                        output.insert(name.clone(), clean(sub, v, &child)?);
                    }
                    (None, Presence::Default(default)) => {
                        output.insert(name.clone(), default.clone());
                    }
                    (None, Presence::Optional) => {}
                    (None, Presence::Required) => {
                        return Err(Error::InvalidResponse(format!(
                            "missing required key: {child}"
                        )));
                    }
                }
            }
            Ok(Value::Object(output))
        }
        ExternalDescription::Multiple { content, .. } => {
            let items: Vec<Value> = match value {
                Value::Array(items) => items,
                Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
                other => {
                    return Err(Error::InvalidResponse(at(
                        path,
                        format!("expected array, got {}", json_type_name(&other)),
                    )));
                }
            };
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| clean(content, item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

/// Coerce a scalar to `ty`, or explain why it cannot be.
fn coerce(ty: ParamType, value: &Value) -> std::result::Result<Value, String> {
    match (ty, value) {
        (ParamType::Text, Value::String(_)) => Ok(value.clone()),
        (ParamType::Text, Value::Number(n)) => Ok(Value::String(n.to_string())),

        (ParamType::Int, Value::Number(n)) => n
            .as_i64()
            .map(|i| Value::Number(Number::from(i)))
            .ok_or_else(|| format!("'{n}' is not an integer")),
        (ParamType::Int, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|i| Value::Number(Number::from(i)))
            .map_err(|_| format!("'{s}' is not an integer")),

        (ParamType::Bool, Value::Bool(_)) => Ok(value.clone()),
        (ParamType::Bool, Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("'{n}' is not a boolean")),
        },
        (ParamType::Bool, Value::String(s)) => match s.as_str() {
            "0" | "false" => Ok(Value::Bool(false)),
            "1" | "true" => Ok(Value::Bool(true)),
            _ => Err(format!("'{s}' is not a boolean")),
        },

        (ty, other) => Err(format!(
            "expected {}, got {}",
            type_name(ty),
            json_type_name(other)
        )),
    }
}

fn type_name(ty: ParamType) -> &'static str {
    match ty {
        ParamType::Text => "text",
        ParamType::Int => "integer",
        ParamType::Bool => "boolean",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn at(path: &str, reason: String) -> String {
    if path.is_empty() {
        reason
    } else {
        format!("{path}: {reason}")
    }
}

/// Render a description as JSON Schema.
pub fn to_json_schema(description: &ExternalDescription) -> Value {
    let mut schema = match description {
        ExternalDescription::Value { ty, presence, .. } => {
            let json_type = match ty {
                ParamType::Text => "string",
                ParamType::Int => "integer",
                ParamType::Bool => "boolean",
            };
            match presence {
                Presence::Default(Value::Null) => json!({ "type": [json_type, "null"] }),
                _ => json!({ "type": json_type }),
            }
        }
        ExternalDescription::Single { keys, .. } => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (name, sub) in keys {
                properties.insert(name.clone(), to_json_schema(sub));
                if *sub.presence() == Presence::Required {
                    required.push(Value::String(name.clone()));
                }
            }
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false
            })
        }
        ExternalDescription::Multiple { content, .. } => json!({
            "type": "array",
            "items": to_json_schema(content)
        }),
    };

    if let Value::Object(map) = &mut schema {
        if !description.description().is_empty() {
            map.insert(
                "description".to_string(),
                Value::String(description.description().to_string()),
            );
        }
        if let Presence::Default(default) = description.presence() {
            map.insert("default".to_string(), default.clone());
        }
    }
    schema
}
