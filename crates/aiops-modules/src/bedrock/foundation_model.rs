//! Foundation model catalogue lookups

use aiops_core::{camel_dict_to_snake_dict, AiOpsResult};
use serde_json::Value;

use super::api::BedrockApi;
use super::types::FoundationModelFilter;

/// Model summaries matching `filter`, with snake_case keys
pub async fn list_models_with_filters(api: &dyn BedrockApi, filter: &FoundationModelFilter) -> AiOpsResult<Vec<Value>> {
    let models = api.list_foundation_models(filter).await?;
    models
        .iter()
        .map(|model| -> AiOpsResult<Value> { Ok(camel_dict_to_snake_dict(&serde_json::to_value(model)?, &[])) })
        .collect()
}

/// Details of one model, with snake_case keys
pub async fn get_model_details(api: &dyn BedrockApi, model_id: &str) -> AiOpsResult<Value> {
    let model = api.get_foundation_model(model_id).await?;
    Ok(camel_dict_to_snake_dict(&serde_json::to_value(&model)?, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBedrock;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_filters_and_snake_cases() {
        let api = FakeBedrock::with_models(vec![
            json!({"modelId": "anthropic.claude-v2", "providerName": "Anthropic", "outputModalities": ["TEXT"]}),
            json!({"modelId": "amazon.titan-embed-text-v1", "providerName": "Amazon", "outputModalities": ["EMBEDDING"]}),
        ]);

        let filter = FoundationModelFilter {
            by_provider: Some("Anthropic".into()),
            ..Default::default()
        };
        let models = list_models_with_filters(&api, &filter).await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0]["model_id"], json!("anthropic.claude-v2"));
        assert_eq!(models[0]["output_modalities"], json!(["TEXT"]));
    }

    #[tokio::test]
    async fn test_model_details() {
        let api = FakeBedrock::with_models(vec![json!({"modelId": "anthropic.claude-v2", "modelName": "Claude"})]);
        let details = get_model_details(&api, "anthropic.claude-v2").await.unwrap();
        assert_eq!(details["model_name"], json!("Claude"));

        let err = get_model_details(&api, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
