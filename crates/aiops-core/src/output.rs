//! Module results
//!
//! Success and failure are both flat JSON objects so downstream tooling can
//! read `changed`, `failed` and `msg` without unwrapping an envelope.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::AiOpsError;

/// Result of a successful module run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOutput {
    pub changed: bool,
    pub msg: Option<String>,
    pub data: Map<String, Value>,
}

impl ModuleOutput {
    pub fn new(changed: bool) -> Self {
        Self {
            changed,
            ..Default::default()
        }
    }

    pub fn changed() -> Self {
        Self::new(true)
    }

    pub fn unchanged() -> Self {
        Self::new(false)
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ModuleOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("changed", &self.changed)?;
        if let Some(msg) = &self.msg {
            map.serialize_entry("msg", msg)?;
        }
        for (key, value) in &self.data {
            if key != "changed" && key != "msg" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Result of a failed module run
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleFailure {
    pub msg: String,
    pub code: Option<String>,
    pub data: Map<String, Value>,
}

impl ModuleFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            code: None,
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<&AiOpsError> for ModuleFailure {
    fn from(err: &AiOpsError) -> Self {
        Self {
            msg: err.to_string(),
            code: err.code().map(str::to_string),
            data: Map::new(),
        }
    }
}

impl From<AiOpsError> for ModuleFailure {
    fn from(err: AiOpsError) -> Self {
        Self::from(&err)
    }
}

impl Serialize for ModuleFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("failed", &true)?;
        map.serialize_entry("changed", &false)?;
        map.serialize_entry("msg", &self.msg)?;
        if let Some(code) = &self.code {
            map.serialize_entry("error", &serde_json::json!({ "code": code }))?;
        }
        for (key, value) in &self.data {
            if !matches!(key.as_str(), "failed" | "changed" | "msg" | "error") {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_is_flat() {
        let output = ModuleOutput::changed()
            .with_msg("Agent 'a' created successfully.")
            .with("agent", json!({"agent_id": "A1"}));
        assert_eq!(
            output.to_value(),
            json!({"changed": true, "msg": "Agent 'a' created successfully.", "agent": {"agent_id": "A1"}})
        );
    }

    #[test]
    fn test_output_without_msg() {
        let output = ModuleOutput::unchanged().with("agents", json!([]));
        assert_eq!(output.to_value(), json!({"changed": false, "agents": []}));
    }

    #[test]
    fn test_failure_from_api_error() {
        let err = AiOpsError::api("CreateAgent", "ValidationException", "bad role");
        let failure = ModuleFailure::from(&err);
        assert_eq!(
            failure.to_value(),
            json!({
                "failed": true,
                "changed": false,
                "msg": "An error occurred (ValidationException) when calling the CreateAgent operation: bad role",
                "error": {"code": "ValidationException"}
            })
        );
    }

    #[test]
    fn test_failure_without_code() {
        let failure = ModuleFailure::new("Agent with name 'x' not found.").with("agent_name", "x");
        assert_eq!(
            failure.to_value(),
            json!({"failed": true, "changed": false, "msg": "Agent with name 'x' not found.", "agent_name": "x"})
        );
    }
}
