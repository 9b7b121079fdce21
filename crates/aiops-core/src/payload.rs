//! Request/response body helpers for the Bedrock runtime

use serde_json::{Map, Value};

use crate::{AiOpsError, AiOpsResult};

/// Encode a model request body
pub fn encode_body(body: &Value) -> AiOpsResult<Vec<u8>> {
    match body {
        Value::Object(_) | Value::Array(_) => Ok(serde_json::to_vec(body)?),
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        _ => Err(AiOpsError::validation("body must be a dict, list, or string")),
    }
}

fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

/// Pull the human-readable answer out of a model response
///
/// Handles Anthropic text completions (`completion`), Nova/Converse
/// (`output.message.content[0].text`), Cohere (`generations[0].text`) and
/// Anthropic messages (`content[0].text`).
pub fn extract_completion(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => {
            if let Some(completion) = map.get("completion") {
                return completion.as_str().map(str::to_string);
            }
            if map.contains_key("output") {
                return text_at(body, "/output/message/content/0/text");
            }
            if map.contains_key("generations") {
                return text_at(body, "/generations/0/text");
            }
            if map.contains_key("content") {
                return text_at(body, "/content/0/text");
            }
            None
        }
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Shallow-merge `source` into an object, or into every object of an array
pub fn merge_data(target: &mut Value, source: &Map<String, Value>) {
    match target {
        Value::Object(map) => {
            for (key, value) in source {
                map.insert(key.clone(), value.clone());
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut().filter(|i| i.is_object()) {
                merge_data(item, source);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_body() {
        assert_eq!(encode_body(&json!({"key": "value"})).unwrap(), br#"{"key":"value"}"#.to_vec());
        assert_eq!(encode_body(&json!([1, 2, 3])).unwrap(), b"[1,2,3]".to_vec());
        assert_eq!(encode_body(&json!("hello")).unwrap(), b"hello".to_vec());
        let err = encode_body(&json!(123)).unwrap_err();
        assert_eq!(err.to_string(), "body must be a dict, list, or string");
    }

    #[test]
    fn test_extract_completion() {
        assert_eq!(extract_completion(&json!({"completion": "Hello world"})).as_deref(), Some("Hello world"));
        assert_eq!(
            extract_completion(&json!({"output": {"message": {"content": [{"text": "Nova answer"}]}}})).as_deref(),
            Some("Nova answer")
        );
        assert_eq!(
            extract_completion(&json!({"generations": [{"text": "Cohere response"}]})).as_deref(),
            Some("Cohere response")
        );
        assert_eq!(
            extract_completion(&json!({"content": [{"type": "text", "text": "Claude says hi"}]})).as_deref(),
            Some("Claude says hi")
        );
        assert_eq!(extract_completion(&json!("Just a string")).as_deref(), Some("Just a string"));
    }

    #[test]
    fn test_extract_completion_malformed() {
        assert_eq!(extract_completion(&json!({"output": {"message": {"content": []}}})), None);
        assert_eq!(extract_completion(&json!({"output": {}})), None);
        assert_eq!(extract_completion(&json!({"generations": []})), None);
        assert_eq!(extract_completion(&json!({"generations": [{}]})), None);
        assert_eq!(extract_completion(&json!(12345)), None);
        assert_eq!(extract_completion(&Value::Null), None);
        assert_eq!(extract_completion(&json!([])), None);
    }

    #[test]
    fn test_merge_data() {
        let source = json!({"b": 3, "c": 4});
        let source = source.as_object().unwrap();

        let mut target = json!({"a": 1, "b": 2});
        merge_data(&mut target, source);
        assert_eq!(target, json!({"a": 1, "b": 3, "c": 4}));

        let mut target = json!([{"a": 1}, {"b": 2}]);
        merge_data(&mut target, source);
        assert_eq!(target, json!([{"a": 1, "b": 3, "c": 4}, {"b": 3, "c": 4}]));

        let mut target = json!([]);
        merge_data(&mut target, source);
        assert_eq!(target, json!([]));
    }
}
