//! `bedrock_foundation_models_info` - Query the foundation model catalogue

use aiops_core::{AiOpsResult, ModuleOutput, ModuleSpec, ParamSpec};
use async_trait::async_trait;
use serde_json::Value;

use crate::bedrock::foundation_model::{get_model_details, list_models_with_filters};
use crate::bedrock::types::FoundationModelFilter;
use crate::module::{Module, ModuleContext};

/// List foundation models, or describe one by id
pub struct BedrockFoundationModelsInfoModule {
    spec: ModuleSpec,
}

impl BedrockFoundationModelsInfoModule {
    pub fn new() -> Self {
        let spec = ModuleSpec::new(
            "bedrock_foundation_models_info",
            "Gather information about Amazon Bedrock foundation models",
        )
        .params([
            ParamSpec::str("by_provider").describe("Model provider, e.g. Anthropic"),
            ParamSpec::str("by_customization_type").choices(&["FINE_TUNING", "CONTINUED_PRE_TRAINING", "DISTILLATION"]),
            ParamSpec::str("by_output_modality").choices(&["TEXT", "IMAGE", "EMBEDDING"]),
            ParamSpec::str("by_inference_type").choices(&["ON_DEMAND", "PROVISIONED"]),
            ParamSpec::str("model_id").describe("Describe this model instead of listing"),
        ])
        .with_aws_connection();
        Self { spec }
    }
}

impl Default for BedrockFoundationModelsInfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BedrockFoundationModelsInfoModule {
    fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput> {
        let client = ctx.clients.bedrock().await?;
        let api = client.as_ref();

        if let Some(model_id) = ctx.params.str("model_id") {
            let details = get_model_details(api, model_id).await?;
            return Ok(ModuleOutput::unchanged().with("model_details", details));
        }

        let owned = |name: &str| ctx.params.str(name).map(str::to_string);
        let filter = FoundationModelFilter {
            by_provider: owned("by_provider"),
            by_customization_type: owned("by_customization_type"),
            by_output_modality: owned("by_output_modality"),
            by_inference_type: owned("by_inference_type"),
        };
        let models = list_models_with_filters(api, &filter).await?;
        Ok(ModuleOutput::unchanged().with("model_summaries", Value::Array(models)))
    }
}
