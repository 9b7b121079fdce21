//! Run a module (ansible-style: one invocation, one JSON result)

use aiops_core::ConnectionConfig;
use aiops_modules::ModuleRegistry;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::output::{print_result, Format};

/// Key some callers wrap module arguments in
const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// Run `module` with arguments from `args_file` and `-a key=value` pairs
///
/// The module result is printed either way; a failed module exits 1.
pub async fn execute(
    module: &str,
    args_file: Option<&Path>,
    args: &[String],
    check: bool,
    output: Format,
    config: Option<ConnectionConfig>,
) -> Result<ExitCode> {
    let mut arguments = match args_file {
        Some(path) => load_args_file(path)?,
        None => Map::new(),
    };
    for pair in args {
        let (key, value) = parse_arg(pair)?;
        arguments.insert(key, value);
    }
    if check {
        arguments.insert(CHECK_MODE_KEY.to_string(), Value::Bool(true));
    }

    let mut executor = ModuleRegistry::with_builtin().into_executor();
    if let Some(config) = config {
        executor = executor.with_config(config);
    }

    info!("Running module {}", module);
    let (result, code) = match executor.execute(module, &Value::Object(arguments)).await {
        Ok(result) => (result.to_value(), ExitCode::SUCCESS),
        Err(failure) => (failure.to_value(), ExitCode::FAILURE),
    };

    print_result(module, &result, output)?;
    Ok(code)
}

/// Read a JSON or YAML arguments file
pub fn load_args_file(path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read arguments file: {:?}", path))?;
    parse_args(&content).with_context(|| format!("Failed to parse arguments file: {:?}", path))
}

/// Arguments document as a map, unwrapping `ANSIBLE_MODULE_ARGS`
pub fn parse_args(content: &str) -> Result<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    // YAML is a superset of JSON
    let document: Value = serde_yaml::from_str(content)?;
    let document = match document {
        Value::Object(mut map) if map.contains_key(WRAPPER_KEY) => map.remove(WRAPPER_KEY).unwrap_or(Value::Null),
        other => other,
    };
    match document {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => anyhow::bail!("module arguments must be a mapping"),
    }
}

/// `key=value`
///
/// Numbers, booleans and `[..]` lists keep their YAML type and `{..}` is
/// read as a mapping; anything else is taken verbatim as a string.
pub fn parse_arg(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid argument '{}': expected KEY=VALUE", pair))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid argument '{}': empty key", pair);
    }
    if raw.trim().is_empty() {
        return Ok((key.to_string(), Value::Null));
    }
    let trimmed = raw.trim_start();
    let value = match serde_yaml::from_str::<Value>(raw) {
        Ok(v @ (Value::Bool(_) | Value::Number(_))) => v,
        Ok(v @ Value::Array(_)) if trimmed.starts_with('[') => v,
        Ok(v @ Value::Object(_)) if trimmed.starts_with('{') => v,
        _ => Value::String(raw.to_string()),
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arg_keeps_prose_as_string() {
        assert_eq!(
            parse_arg("instruction=You are: concise").unwrap().1,
            json!("You are: concise")
        );
        assert_eq!(parse_arg("prompt=key: value, more").unwrap().1, json!("key: value, more"));
        assert_eq!(parse_arg("input_text=- not a list").unwrap().1, json!("- not a list"));
    }

    #[test]
    fn test_parse_args_json_and_yaml() {
        let json_args = parse_args(r#"{"agent_name": "support", "wait_timeout": 30}"#).unwrap();
        assert_eq!(json_args["wait_timeout"], json!(30));

        let yaml_args = parse_args("agent_name: support\ntags:\n  team: ops\n").unwrap();
        assert_eq!(yaml_args["tags"], json!({"team": "ops"}));
    }

    #[test]
    fn test_parse_args_unwraps_ansible_module_args() {
        let args = parse_args(r#"{"ANSIBLE_MODULE_ARGS": {"model_id": "m", "prompt": "hi"}}"#).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args["prompt"], json!("hi"));
    }

    #[test]
    fn test_parse_args_rejects_non_mapping() {
        assert!(parse_args("- a\n- b\n").is_err());
        assert!(parse_args("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("agent_name=support").unwrap(), ("agent_name".into(), json!("support")));
        assert_eq!(parse_arg("wait_timeout=30").unwrap().1, json!(30));
        assert_eq!(parse_arg("stack_names=[a, b]").unwrap().1, json!(["a", "b"]));
        assert_eq!(parse_arg("end_session=true").unwrap().1, json!(true));
        assert_eq!(parse_arg("tags={team: ops}").unwrap().1, json!({"team": "ops"}));
        assert_eq!(parse_arg("description=null").unwrap().1, json!("null"));
        assert_eq!(parse_arg("description=").unwrap().1, Value::Null);
        assert!(parse_arg("no-equals").is_err());
        assert!(parse_arg("=value").is_err());
    }
}
