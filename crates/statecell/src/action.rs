//! Actions - structural records describing a requested state transition
//!
//! An action always carries a `type` discriminant. Everything else is an
//! open, application-defined payload.

use crate::action_types;
use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A requested state transition
///
/// Serializes as a flat JSON object: `{"type": "...", ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
        }
    }

    /// Attach a payload field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "type" {
            self.payload.insert(key, value.into());
        }
        self
    }

    /// Validate an arbitrary value at the dispatch boundary
    ///
    /// Non-object values fail with `InvalidAction`, objects without a
    /// `type` (or with a `null` one) fail with `MissingActionType`.
    /// Non-string type values are kept as their JSON text.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut payload = match value {
            Value::Object(map) => map,
            other => return Err(StoreError::InvalidAction(kind_of(&other).to_string())),
        };

        let action_type = match payload.remove("type") {
            None | Some(Value::Null) => return Err(StoreError::MissingActionType),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        Ok(Self {
            action_type,
            payload,
        })
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Whether this action is one of the store's private action types
    pub fn is_reserved(&self) -> bool {
        action_types::is_reserved(&self.action_type)
    }

    pub fn is(&self, action_type: &str) -> bool {
        self.action_type == action_type
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn into_value(self) -> Value {
        let mut map = self.payload;
        map.insert("type".to_string(), Value::String(self.action_type));
        Value::Object(map)
    }
}

impl TryFrom<Value> for Action {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Short name of a JSON value's kind, used in error messages
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
