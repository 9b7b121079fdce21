//! Bedrock runtime clients over the AWS SDK
//!
//! InvokeModel returns a binary body and InvokeAgent an event stream,
//! neither of which the CLI transport can carry, so both go through the SDK.

use aiops_core::{AiOpsError, AiOpsResult, AwsConnection};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_bedrockagentruntime::types::{ResponseStream, SessionState as SdkSessionState};
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{PerformanceConfigLatency, Trace};
use tracing::{debug, warn};

use super::retry::{with_retry, RetryPolicy};
use crate::bedrock::api::{BedrockAgentRuntimeApi, BedrockRuntimeApi};
use crate::bedrock::types::{AgentStreamEvent, InvokeAgentRequest, InvokeModelRequest};

/// Build the shared SDK configuration for one connection
pub async fn load_sdk_config(connection: &AwsConnection) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(ref region) = connection.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(ref profile) = connection.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(ref endpoint) = connection.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(key), Some(secret)) = (&connection.access_key, &connection.secret_key) {
        let credentials = aws_sdk_bedrockruntime::config::Credentials::new(
            key.clone(),
            secret.clone(),
            connection.session_token.clone(),
            None,
            "aiops-module-params",
        );
        loader = loader.credentials_provider(credentials);
    }
    if !connection.validate_certs || connection.ca_bundle.is_some() {
        warn!("validate_certs and aws_ca_bundle are not applied to Bedrock runtime calls");
    }

    loader.load().await
}

/// Map an SDK failure onto the shared error type
fn sdk_error<E>(operation: &str, err: E) -> AiOpsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match err.code() {
        Some(code) => AiOpsError::api(operation, code, err.message().unwrap_or_default()),
        None => AiOpsError::connection(DisplayErrorContext(&err).to_string()),
    }
}

pub struct SdkBedrockRuntime {
    client: aws_sdk_bedrockruntime::Client,
    retry: RetryPolicy,
}

impl SdkBedrockRuntime {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            retry: RetryPolicy::default(),
        }
    }

    async fn invoke_once(&self, request: &InvokeModelRequest) -> AiOpsResult<Vec<u8>> {
        let mut call = self
            .client
            .invoke_model()
            .model_id(request.model_id.clone())
            .body(Blob::new(request.body.clone()))
            .content_type(request.content_type.clone())
            .accept(request.accept.clone());

        if let Some(ref trace) = request.trace {
            call = call.trace(Trace::from(trace.as_str()));
        }
        if let Some(ref guardrail) = request.guardrail_identifier {
            call = call.guardrail_identifier(guardrail.clone());
        }
        if let Some(ref version) = request.guardrail_version {
            call = call.guardrail_version(version.clone());
        }
        if let Some(ref latency) = request.performance_config_latency {
            call = call.performance_config_latency(PerformanceConfigLatency::from(latency.as_str()));
        }

        debug!(model_id = %request.model_id, "Invoking model");
        let output = call.send().await.map_err(|e| sdk_error("InvokeModel", e))?;
        Ok(output.body.into_inner())
    }
}

#[async_trait]
impl BedrockRuntimeApi for SdkBedrockRuntime {
    async fn invoke_model(&self, request: &InvokeModelRequest) -> AiOpsResult<Vec<u8>> {
        with_retry(&self.retry, "InvokeModel", || self.invoke_once(request)).await
    }
}

pub struct SdkBedrockAgentRuntime {
    client: aws_sdk_bedrockagentruntime::Client,
    retry: RetryPolicy,
}

/// `ReturnControl(..)` → `returnControl`
fn event_name(event: &ResponseStream) -> String {
    let debug = format!("{:?}", event);
    let variant = debug.split(|c: char| !c.is_alphanumeric()).next().unwrap_or("unknown");
    let mut chars = variant.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "unknown".to_string(),
    }
}

impl SdkBedrockAgentRuntime {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagentruntime::Client::new(config),
            retry: RetryPolicy::default(),
        }
    }

    async fn invoke_once(&self, request: &InvokeAgentRequest) -> AiOpsResult<Vec<AgentStreamEvent>> {
        let mut call = self
            .client
            .invoke_agent()
            .agent_id(request.agent_id.clone())
            .agent_alias_id(request.agent_alias_id.clone())
            .session_id(request.session_id.clone())
            .input_text(request.input_text.clone())
            .end_session(request.end_session)
            .enable_trace(request.enable_trace);

        if let Some(ref state) = request.session_state {
            if !state.extra.is_empty() {
                let keys: Vec<&str> = state.extra.keys().map(String::as_str).collect();
                warn!(keys = ?keys, "session_state keys not sent over the SDK transport");
            }
            call = call.session_state(
                SdkSessionState::builder()
                    .set_session_attributes(state.session_attributes.clone())
                    .set_prompt_session_attributes(state.prompt_session_attributes.clone())
                    .set_invocation_id(state.invocation_id.clone())
                    .build(),
            );
        }

        debug!(agent_id = %request.agent_id, session_id = %request.session_id, "Invoking agent");
        let mut output = call.send().await.map_err(|e| sdk_error("InvokeAgent", e))?;

        let mut events = Vec::new();
        while let Some(event) = output
            .completion
            .recv()
            .await
            .map_err(|e| sdk_error("InvokeAgent", e))?
        {
            match event {
                ResponseStream::Chunk(part) => {
                    if let Some(bytes) = part.bytes() {
                        events.push(AgentStreamEvent::Chunk(bytes.as_ref().to_vec()));
                    }
                }
                ResponseStream::Trace(trace) => events.push(AgentStreamEvent::Trace(format!("{:?}", trace))),
                other => events.push(AgentStreamEvent::Other(event_name(&other))),
            }
        }
        Ok(events)
    }
}

#[async_trait]
impl BedrockAgentRuntimeApi for SdkBedrockAgentRuntime {
    async fn invoke_agent(&self, request: &InvokeAgentRequest) -> AiOpsResult<Vec<AgentStreamEvent>> {
        with_retry(&self.retry, "InvokeAgent", || self.invoke_once(request)).await
    }
}
