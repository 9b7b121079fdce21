//! Key-case transforms between service payloads and module outputs
//!
//! Service APIs speak camelCase (or PascalCase); module parameters and
//! outputs speak snake_case.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn plural_acronym() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]{3,}s$").expect("static regex"))
}

fn first_cap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("static regex"))
}

fn all_cap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z]+)").expect("static regex"))
}

/// Convert one camelCase/PascalCase name to snake_case
///
/// `AppBoundaryKey` → `app_boundary_key`, `agentARN` → `agent_arn`,
/// `TargetGroupARNs` → `target_group_arns`.
pub fn camel_to_snake(name: &str) -> String {
    let mut name = name.to_string();

    if let Some(m) = plural_acronym().find(&name) {
        let (start, end) = (m.start(), m.end());
        let replacement = format!("_{}", name[start..end].to_lowercase());
        name.replace_range(start..end, &replacement);
        if start == 0 {
            name.remove(0);
        }
    }

    let name = first_cap().replace_all(&name, "${1}_${2}");
    let name = all_cap().replace_all(&name, "${1}_${2}");
    name.to_lowercase()
}

/// Convert one snake_case name to camelCase (or PascalCase)
///
/// Segments keep their remaining characters as written, so a key that is
/// already camelCase comes back unchanged.
pub fn snake_to_camel(name: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    for (idx, part) in name.split('_').enumerate() {
        if idx == 0 && !capitalize_first {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        match chars.next() {
            Some(first) => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            None => out.push('_'),
        }
    }
    out
}

/// Recursively snake_case every object key
///
/// Values under keys named in `ignore_list` (matched on the original key)
/// are copied as-is, e.g. user-supplied tag maps.
pub fn camel_dict_to_snake_dict(value: &Value, ignore_list: &[&str]) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                let converted = if ignore_list.contains(&key.as_str()) {
                    val.clone()
                } else {
                    camel_dict_to_snake_dict(val, ignore_list)
                };
                out.insert(camel_to_snake(key), converted);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| camel_dict_to_snake_dict(item, ignore_list))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Recursively camelCase every object key
pub fn snake_dict_to_camel_dict(value: &Value, capitalize_first: bool) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    (
                        snake_to_camel(key, capitalize_first),
                        snake_dict_to_camel_dict(val, capitalize_first),
                    )
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| snake_dict_to_camel_dict(item, capitalize_first))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Drop null entries from objects, recursively
pub fn scrub_none(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), scrub_none(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(scrub_none).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("AppBoundaryKey"), "app_boundary_key");
        assert_eq!(camel_to_snake("agentARN"), "agent_arn");
        assert_eq!(camel_to_snake("TargetGroupARNs"), "target_group_arns");
        assert_eq!(camel_to_snake("agentId"), "agent_id");
        assert_eq!(camel_to_snake("idleSessionTTLInSeconds"), "idle_session_ttl_in_seconds");
        assert_eq!(camel_to_snake("CloudFormation"), "cloud_formation");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("agent_resource_role_arn", false), "agentResourceRoleArn");
        assert_eq!(snake_to_camel("topic_arn", true), "TopicArn");
        assert_eq!(snake_to_camel("agentVersion", false), "agentVersion");
        assert_eq!(snake_to_camel("TopicArn", true), "TopicArn");
    }

    #[test]
    fn test_camel_dict_to_snake_dict_nested() {
        let input = json!({
            "agentSummaries": [{"agentId": "A1", "latestAgentVersion": "1"}],
            "Tags": {"MyKey": "MyValue"}
        });
        let output = camel_dict_to_snake_dict(&input, &["Tags"]);
        assert_eq!(
            output,
            json!({
                "agent_summaries": [{"agent_id": "A1", "latest_agent_version": "1"}],
                "tags": {"MyKey": "MyValue"}
            })
        );
    }

    #[test]
    fn test_snake_dict_to_camel_dict_nested() {
        let input = json!({"sns": {"topic_arn": "arn"}, "filters": {"severities": ["HIGH"]}});
        assert_eq!(
            snake_dict_to_camel_dict(&input, true),
            json!({"Sns": {"TopicArn": "arn"}, "Filters": {"Severities": ["HIGH"]}})
        );
    }

    #[test]
    fn test_scrub_none() {
        let input = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}]});
        assert_eq!(scrub_none(&input), json!({"b": {"d": 1}, "e": [{}]}));
    }
}
