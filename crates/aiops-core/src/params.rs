//! Argument specs and parameter validation
//!
//! Every module declares a [`ModuleSpec`]: the parameters it accepts, their
//! types, defaults, choices and aliases, plus cross-parameter rules
//! (`required_if`, `required_one_of`, `mutually_exclusive`,
//! `required_together`). [`ModuleSpec::validate`] turns a raw JSON/YAML
//! argument object into [`ModuleParams`], coercing loosely typed input the
//! way playbook authors expect (`"yes"` is a bool, `"42"` is an int).
//!
//! # Example
//!
//! ```rust
//! use aiops_core::params::{ModuleSpec, ParamSpec};
//! use serde_json::json;
//!
//! let spec = ModuleSpec::new("demo", "Demo module")
//!     .param(ParamSpec::str("state").choices(&["present", "absent"]).default_value(json!("present")))
//!     .param(ParamSpec::str("name").required());
//!
//! let params = spec.validate(&json!({"name": "x"})).unwrap();
//! assert_eq!(params.str("state"), Some("present"));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::{AiOpsError, AiOpsResult};

/// Placeholder written in place of `no_log` values in logs
pub const NO_LOG_PLACEHOLDER: &str = "VALUE_SPECIFIED_IN_NO_LOG_PARAMETER";

/// Key carrying the check-mode flag in raw module arguments
pub const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// Parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Str,
    Bool,
    Int,
    List,
    Dict,
    /// Passed through untouched
    Raw,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Str => write!(f, "str"),
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::Int => write!(f, "int"),
            ParamKind::List => write!(f, "list"),
            ParamKind::Dict => write!(f, "dict"),
            ParamKind::Raw => write!(f, "raw"),
        }
    }
}

/// A single module parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ParamKind,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Element type for list parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<ParamKind>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_log: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParamSpec {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            choices: Vec::new(),
            aliases: Vec::new(),
            elements: None,
            no_log: false,
            description: String::new(),
        }
    }

    pub fn str(name: &str) -> Self {
        Self::new(name, ParamKind::Str)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, ParamKind::Bool)
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, ParamKind::Int)
    }

    pub fn dict(name: &str) -> Self {
        Self::new(name, ParamKind::Dict)
    }

    pub fn raw(name: &str) -> Self {
        Self::new(name, ParamKind::Raw)
    }

    pub fn list(name: &str, elements: ParamKind) -> Self {
        let mut spec = Self::new(name, ParamKind::List);
        spec.elements = Some(elements);
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn no_log(mut self) -> Self {
        self.no_log = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// `param == value` makes every parameter in `requirements` mandatory
#[derive(Debug, Clone, Serialize)]
pub struct RequiredIf {
    pub param: String,
    pub value: Value,
    pub requirements: Vec<String>,
}

/// Declarative description of a module's interface
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub supports_check_mode: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_if: Vec<RequiredIf>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_one_of: Vec<Vec<String>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mutually_exclusive: Vec<Vec<String>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_together: Vec<Vec<String>>,
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl ModuleSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            supports_check_mode: true,
            required_if: Vec::new(),
            required_one_of: Vec::new(),
            mutually_exclusive: Vec::new(),
            required_together: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(params);
        self
    }

    /// Append the AWS connection parameters every module accepts
    pub fn with_aws_connection(self) -> Self {
        self.params(crate::connection::aws_connection_params())
    }

    pub fn check_mode(mut self, supported: bool) -> Self {
        self.supports_check_mode = supported;
        self
    }

    pub fn required_if(mut self, param: &str, value: Value, requirements: &[&str]) -> Self {
        self.required_if.push(RequiredIf {
            param: param.to_string(),
            value,
            requirements: to_strings(requirements),
        });
        self
    }

    pub fn required_one_of(mut self, names: &[&str]) -> Self {
        self.required_one_of.push(to_strings(names));
        self
    }

    pub fn mutually_exclusive(mut self, names: &[&str]) -> Self {
        self.mutually_exclusive.push(to_strings(names));
        self
    }

    pub fn required_together(mut self, names: &[&str]) -> Self {
        self.required_together.push(to_strings(names));
        self
    }

    /// Look up a parameter by its canonical name
    pub fn get_param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Validate raw arguments against this spec
    pub fn validate(&self, raw: &Value) -> AiOpsResult<ModuleParams> {
        let empty = Map::new();
        let raw = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(AiOpsError::validation(format!(
                    "module arguments must be a mapping, got {}",
                    json_type_name(other)
                )))
            }
        };

        let check_mode = match raw.get(CHECK_MODE_KEY) {
            Some(value) => coerce_bool(value).ok_or_else(|| {
                AiOpsError::validation(format!("{} must be a boolean", CHECK_MODE_KEY))
            })?,
            None => false,
        };

        let mut lookup: HashMap<&str, &ParamSpec> = HashMap::new();
        for param in &self.params {
            lookup.insert(param.name.as_str(), param);
            for alias in &param.aliases {
                lookup.insert(alias.as_str(), param);
            }
        }

        let mut provided: Map<String, Value> = Map::new();
        let mut unsupported = BTreeSet::new();

        for (key, value) in raw {
            if key.starts_with("_ansible_") {
                continue;
            }
            let Some(param) = lookup.get(key.as_str()) else {
                unsupported.insert(key.clone());
                continue;
            };
            if value.is_null() {
                continue;
            }
            if provided.contains_key(&param.name) {
                return Err(AiOpsError::validation(format!(
                    "Both option {} and its alias {} are set.",
                    param.name, key
                )));
            }
            provided.insert(param.name.clone(), value.clone());
        }

        if !unsupported.is_empty() {
            let supported: BTreeSet<&str> = lookup.keys().copied().collect();
            return Err(AiOpsError::validation(format!(
                "Unsupported parameters for ({}) module: {}. Supported parameters include: {}.",
                self.name,
                unsupported.into_iter().collect::<Vec<_>>().join(", "),
                supported.into_iter().collect::<Vec<_>>().join(", "),
            )));
        }

        for group in &self.mutually_exclusive {
            let present: Vec<&str> = group
                .iter()
                .filter(|n| provided.contains_key(n.as_str()))
                .map(|n| n.as_str())
                .collect();
            if present.len() > 1 {
                return Err(AiOpsError::validation(format!(
                    "parameters are mutually exclusive: {}",
                    group.join("|")
                )));
            }
        }

        let missing: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required && !provided.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(AiOpsError::validation(format!(
                "missing required arguments: {}",
                missing.join(", ")
            )));
        }

        let mut values = Map::new();
        for param in &self.params {
            let value = match provided.remove(&param.name) {
                Some(value) => coerce(param, value)?,
                None => match &param.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            check_choices(param, &value)?;
            values.insert(param.name.clone(), value);
        }

        for group in &self.required_together {
            let count = group.iter().filter(|n| values.contains_key(n.as_str())).count();
            if count != 0 && count != group.len() {
                return Err(AiOpsError::validation(format!(
                    "parameters are required together: {}",
                    group.join(", ")
                )));
            }
        }

        for group in &self.required_one_of {
            if !group.iter().any(|n| values.contains_key(n.as_str())) {
                return Err(AiOpsError::validation(format!(
                    "one of the following is required: {}",
                    group.join(", ")
                )));
            }
        }

        for rule in &self.required_if {
            if values.get(&rule.param) != Some(&rule.value) {
                continue;
            }
            let missing: Vec<&str> = rule
                .requirements
                .iter()
                .filter(|n| !values.contains_key(n.as_str()))
                .map(|n| n.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(AiOpsError::validation(format!(
                    "{} is {} but all of the following are missing: {}",
                    rule.param,
                    display_scalar(&rule.value),
                    missing.join(", ")
                )));
            }
        }

        Ok(ModuleParams { values, check_mode })
    }

    /// Parameter values with `no_log` entries masked, for logging
    pub fn redact(&self, params: &ModuleParams) -> Value {
        let mut masked = params.values.clone();
        for param in self.params.iter().filter(|p| p.no_log) {
            if let Some(value) = masked.get_mut(&param.name) {
                *value = Value::String(NO_LOG_PLACEHOLDER.to_string());
            }
        }
        Value::Object(masked)
    }
}

/// Validated module parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleParams {
    values: Map<String, Value>,
    check_mode: bool,
}

impl ModuleParams {
    /// Build parameters directly, bypassing validation
    pub fn from_map(values: Map<String, Value>, check_mode: bool) -> Self {
        Self { values, check_mode }
    }

    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Typed accessor; fails when the parameter is missing
    ///
    /// Decoding errors name the offending field path inside the argument.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> AiOpsResult<T> {
        let value = self
            .raw(name)
            .ok_or_else(|| AiOpsError::validation(format!("missing required arguments: {}", name)))?;
        decode(value.clone())
            .map_err(|e| AiOpsError::validation(format!("argument '{}' has an unexpected shape: {}", name, e)))
    }

    pub fn get_opt<T: DeserializeOwned>(&self, name: &str) -> AiOpsResult<Option<T>> {
        match self.raw(name) {
            Some(_) => self.get(name).map(Some),
            None => Ok(None),
        }
    }

    /// String value; empty strings count as unset
    pub fn str(&self, name: &str) -> Option<&str> {
        self.raw(name).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
    }

    pub fn bool(&self, name: &str) -> bool {
        self.raw(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.raw(name).and_then(|v| v.as_i64())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Decode the whole parameter set into a settings struct
    ///
    /// Null entries are dropped first so `Option` fields and serde
    /// defaults behave the same for unset and null parameters.
    pub fn parse<T: DeserializeOwned>(&self) -> AiOpsResult<T> {
        let set: Map<String, Value> = self
            .values
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        decode(Value::Object(set)).map_err(|e| AiOpsError::validation(format!("unexpected module arguments: {}", e)))
    }
}

/// Deserialize through `serde_path_to_error`, prefixing the failing path
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        if path == "." {
            e.inner().to_string()
        } else {
            format!("{}: {}", path, e.inner())
        }
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn conversion_error(name: &str, value: &Value, kind: ParamKind) -> AiOpsError {
    AiOpsError::validation(format!(
        "argument '{}' is of type {} and we were unable to convert to {}",
        name,
        json_type_name(value),
        kind
    ))
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "y" | "yes" | "on" | "1" | "true" | "t" => Some(true),
            "n" | "no" | "off" | "0" | "false" | "f" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_scalar(name: &str, kind: ParamKind, value: Value) -> AiOpsResult<Value> {
    match kind {
        ParamKind::Raw => Ok(value),
        ParamKind::Str => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(conversion_error(name, &other, kind)),
        },
        ParamKind::Bool => coerce_bool(&value)
            .map(Value::Bool)
            .ok_or_else(|| conversion_error(name, &value, kind)),
        ParamKind::Int => match &value {
            Value::Number(n) if n.is_i64() => Ok(value),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| Value::from(f as i64))
                .ok_or_else(|| conversion_error(name, &value, kind)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| conversion_error(name, &value, kind)),
            _ => Err(conversion_error(name, &value, kind)),
        },
        ParamKind::Dict => match value {
            Value::Object(_) => Ok(value),
            Value::String(ref s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(conversion_error(name, &value, kind)),
            },
            other => Err(conversion_error(name, &other, kind)),
        },
        ParamKind::List => match value {
            Value::Array(_) => Ok(value),
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .filter(|part| part.as_str() != Some(""))
                    .collect(),
            )),
            Value::Object(_) | Value::Null => Err(conversion_error(name, &value, kind)),
            scalar => Ok(Value::Array(vec![scalar])),
        },
    }
}

fn coerce(param: &ParamSpec, value: Value) -> AiOpsResult<Value> {
    let value = coerce_scalar(&param.name, param.kind, value)?;
    match (param.kind, param.elements, value) {
        (ParamKind::List, Some(elements), Value::Array(items)) => {
            let items = items
                .into_iter()
                .map(|item| coerce_scalar(&param.name, elements, item))
                .collect::<AiOpsResult<Vec<_>>>()?;
            Ok(Value::Array(items))
        }
        (_, _, value) => Ok(value),
    }
}

fn check_choices(param: &ParamSpec, value: &Value) -> AiOpsResult<()> {
    if param.choices.is_empty() {
        return Ok(());
    }
    let allowed = |v: &Value| {
        v.as_str()
            .map(|s| param.choices.iter().any(|c| c == s))
            .unwrap_or(false)
    };

    match value {
        Value::Array(items) => {
            let bad: Vec<String> = items.iter().filter(|v| !allowed(v)).map(display_scalar).collect();
            if bad.is_empty() {
                Ok(())
            } else {
                Err(AiOpsError::validation(format!(
                    "value of {} must be one or more of: {}. Got no match for: {}",
                    param.name,
                    param.choices.join(", "),
                    bad.join(", ")
                )))
            }
        }
        single if allowed(single) => Ok(()),
        single => Err(AiOpsError::validation(format!(
            "value of {} must be one of: {}, got: {}",
            param.name,
            param.choices.join(", "),
            display_scalar(single)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action_group_spec() -> ModuleSpec {
        ModuleSpec::new("bedrock_agent_action_group", "test")
            .param(ParamSpec::str("state").choices(&["present", "absent"]).default_value(json!("present")))
            .param(ParamSpec::str("agent_name").required())
            .param(ParamSpec::str("lambda_arn"))
            .param(ParamSpec::str("api_schema"))
            .param(ParamSpec::int("wait_timeout").default_value(json!(600)))
            .param(ParamSpec::bool("enabled"))
            .param(ParamSpec::list("stack_names", ParamKind::Str).aliases(&["cloudformation_stack_names"]))
            .param(ParamSpec::list("severities", ParamKind::Str).choices(&["LOW", "MEDIUM", "HIGH"]))
            .param(ParamSpec::str("secret").no_log())
            .required_if("state", json!("present"), &["lambda_arn", "api_schema"])
    }

    #[test]
    fn test_defaults_applied() {
        let params = action_group_spec()
            .validate(&json!({"agent_name": "a", "state": "absent"}))
            .unwrap();
        assert_eq!(params.str("state"), Some("absent"));
        assert_eq!(params.int("wait_timeout"), Some(600));
        assert!(!params.is_set("lambda_arn"));
        assert!(!params.check_mode());
    }

    #[test]
    fn test_missing_required() {
        let err = action_group_spec().validate(&json!({"state": "absent"})).unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: agent_name");
    }

    #[test]
    fn test_required_if() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": "a", "lambda_arn": "arn"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "state is present but all of the following are missing: api_schema"
        );
    }

    #[test]
    fn test_unsupported_parameter() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": "a", "state": "absent", "bogus": 1}))
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unsupported parameters for (bedrock_agent_action_group) module: bogus."));
    }

    #[test]
    fn test_choices_rejected() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": "a", "state": "gone"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "value of state must be one of: present, absent, got: gone");
    }

    #[test]
    fn test_list_choices_rejected() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": "a", "state": "absent", "severities": ["LOW", "EXTREME"]}))
            .unwrap_err();
        assert!(err.to_string().contains("Got no match for: EXTREME"));
    }

    #[test]
    fn test_coercion() {
        let params = action_group_spec()
            .validate(&json!({
                "agent_name": 42,
                "state": "absent",
                "wait_timeout": "30",
                "enabled": "yes",
                "stack_names": "StackA, StackB"
            }))
            .unwrap();
        assert_eq!(params.str("agent_name"), Some("42"));
        assert_eq!(params.int("wait_timeout"), Some(30));
        assert!(params.bool("enabled"));
        let stacks: Vec<String> = params.get("stack_names").unwrap();
        assert_eq!(stacks, vec!["StackA", "StackB"]);
    }

    #[test]
    fn test_bad_bool() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": "a", "state": "absent", "enabled": "maybe"}))
            .unwrap_err();
        assert!(err.to_string().contains("unable to convert to bool"));
    }

    #[test]
    fn test_alias_resolution_and_conflict() {
        let spec = action_group_spec();
        let params = spec
            .validate(&json!({"agent_name": "a", "state": "absent", "cloudformation_stack_names": ["S"]}))
            .unwrap();
        assert!(params.is_set("stack_names"));

        let err = spec
            .validate(&json!({
                "agent_name": "a",
                "state": "absent",
                "stack_names": ["S"],
                "cloudformation_stack_names": ["T"]
            }))
            .unwrap_err();
        assert!(err.to_string().contains("its alias"));
    }

    #[test]
    fn test_check_mode_flag_and_internal_keys() {
        let params = action_group_spec()
            .validate(&json!({
                "agent_name": "a",
                "state": "absent",
                "_ansible_check_mode": true,
                "_ansible_verbosity": 3
            }))
            .unwrap();
        assert!(params.check_mode());
    }

    #[test]
    fn test_null_values_count_as_absent() {
        let err = action_group_spec()
            .validate(&json!({"agent_name": null, "state": "absent"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: agent_name");
    }

    #[test]
    fn test_required_one_of_and_mutually_exclusive() {
        let spec = ModuleSpec::new("insights", "test")
            .param(ParamSpec::dict("status_filter"))
            .param(ParamSpec::str("insight_id"))
            .required_one_of(&["status_filter", "insight_id"])
            .mutually_exclusive(&["status_filter", "insight_id"]);

        let err = spec.validate(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "one of the following is required: status_filter, insight_id");

        let err = spec
            .validate(&json!({"status_filter": {}, "insight_id": "x"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "parameters are mutually exclusive: status_filter|insight_id");

        assert!(spec.validate(&json!({"insight_id": "x"})).is_ok());
    }

    #[test]
    fn test_dict_from_json_string() {
        let spec = ModuleSpec::new("d", "test").param(ParamSpec::dict("config"));
        let params = spec.validate(&json!({"config": "{\"a\": 1}"})).unwrap();
        assert_eq!(params.raw("config"), Some(&json!({"a": 1})));
        assert!(spec.validate(&json!({"config": "not json"})).is_err());
    }

    #[test]
    fn test_redact_no_log() {
        let spec = action_group_spec();
        let params = spec
            .validate(&json!({"agent_name": "a", "state": "absent", "secret": "hunter2"}))
            .unwrap();
        let redacted = spec.redact(&params);
        assert_eq!(redacted["secret"], json!(NO_LOG_PLACEHOLDER));
        assert_eq!(redacted["agent_name"], json!("a"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = action_group_spec().validate(&json!(["a"])).unwrap_err();
        assert_eq!(err.to_string(), "module arguments must be a mapping, got list");
    }

    #[test]
    fn test_parse_into_struct() {
        #[derive(serde::Deserialize)]
        struct Settings {
            agent_name: String,
            #[serde(default)]
            description: Option<String>,
        }

        let mut values = Map::new();
        values.insert("agent_name".into(), json!("support"));
        values.insert("description".into(), Value::Null);
        values.insert("region".into(), json!("us-east-1"));
        let settings: Settings = ModuleParams::from_map(values, false).parse().unwrap();
        assert_eq!(settings.agent_name, "support");
        assert!(settings.description.is_none());
    }

    #[test]
    fn test_decode_errors_name_the_field() {
        #[derive(Debug, serde::Deserialize)]
        struct Route {
            #[allow(dead_code)]
            agent_version: String,
        }

        let mut values = Map::new();
        values.insert("routing_configuration".into(), json!([{"agent_version": "1"}, {"agent_version": 2}]));
        let params = ModuleParams::from_map(values, false);

        let err = params.get::<Vec<Route>>("routing_configuration").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("argument 'routing_configuration' has an unexpected shape: [1].agent_version:"), "{}", msg);
    }
}
