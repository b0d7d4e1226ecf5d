//! Untyped record payloads
//!
//! A [`RecordPayload`] is the raw field-name → string mapping that arrives
//! from a request body, a CSV row or an element of a JSON array. Which
//! fields are present matters: validation and updates only touch those.

use super::error::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw field values keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPayload {
    fields: BTreeMap<String, String>,
}

/// One parsed row of a bulk import file
pub type ImportRow = RecordPayload;

impl RecordPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build a payload from a JSON object
    ///
    /// Strings are taken as-is, numbers and booleans are stringified,
    /// `null` counts as absent. Nested arrays/objects are rejected.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, RecordError> {
        let mut fields = BTreeMap::new();

        for (key, value) in object {
            let raw = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RecordError::format(key, "expected a scalar value"))
                }
            };
            fields.insert(key.clone(), raw);
        }

        Ok(Self { fields })
    }

    pub fn from_json_value(value: &Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(object) => Self::from_json_object(object),
            other => Err(RecordError::Parse {
                line: None,
                message: format!("expected a JSON object, found {}", json_type_name(other)),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, String>> for RecordPayload {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
