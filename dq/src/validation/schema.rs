//! Output schemas for generator-produced types
//!
//! Schemas are derived with `schemars`, checked with `jsonschema` on the text
//! path, and normalized for strict schema-constrained generation.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::llm::ResponseSchema;

/// A type the generator is asked to produce
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Send {
    /// Schema name shown to the generator and in errors
    const NAME: &'static str;

    /// Invariants JSON Schema cannot express
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Derived JSON Schema for one output type
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// Keywords strict mode does not accept
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "default",
    "format",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "pattern",
];

impl OutputSchema {
    pub fn of<T: StructuredOutput>() -> Self {
        debug!(name = T::NAME, "OutputSchema::of: called");
        Self {
            name: T::NAME,
            schema: schemars::schema_for!(T).to_value(),
        }
    }

    /// Pretty JSON for prompts and the `schema` command
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }

    /// Validate an instance, joining every violation into one message
    pub fn validate(&self, instance: &Value) -> Result<(), String> {
        let validator = jsonschema::validator_for(&self.schema).map_err(|e| format!("invalid schema: {}", e))?;
        let messages: Vec<String> = validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            debug!(name = self.name, count = messages.len(), "OutputSchema::validate: violations");
            Err(format!("schema validation failed: {}", messages.join("; ")))
        }
    }

    /// Schema normalized for strict schema-constrained generation
    ///
    /// Every object is closed and lists all of its properties as required;
    /// keywords strict mode rejects are removed. Invariants lost here are
    /// re-checked by `StructuredOutput::check`.
    pub fn strict(&self) -> ResponseSchema {
        let mut schema = self.schema.clone();
        normalize_strict(&mut schema);
        ResponseSchema {
            name: self.name.to_string(),
            schema,
        }
    }
}

fn normalize_strict(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for keyword in UNSUPPORTED_KEYWORDS {
                map.remove(*keyword);
            }
            if is_object_schema(map) {
                let keys: Vec<Value> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect())
                    .unwrap_or_default();
                map.insert("required".to_string(), Value::Array(keys));
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for (key, child) in map.iter_mut() {
                match key.as_str() {
                    // keyed by name, each value a schema
                    "properties" | "$defs" | "definitions" => {
                        if let Value::Object(named) = child {
                            named.values_mut().for_each(normalize_strict);
                        }
                    }
                    "enum" | "const" | "required" => {}
                    _ => normalize_strict(child),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_strict(item);
            }
        }
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
        _ => map.contains_key("properties"),
    }
}
