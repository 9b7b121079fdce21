//! Service client wiring
//!
//! Modules never build clients themselves: they ask their
//! [`ServiceClients`] for the API they need. Production clients are
//! created lazily, so a module that only talks to DevOps Guru never
//! touches the Bedrock runtime SDK.

use aiops_core::{AiOpsResult, AwsConnection};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::aws::cli::AwsCli;
use crate::bedrock::api::{
    BedrockAgentApi, BedrockAgentRuntimeApi, BedrockApi, BedrockRuntimeApi, CliBedrock, CliBedrockAgent,
};
use crate::devopsguru::api::{CliDevOpsGuru, DevOpsGuruApi};

/// Per-invocation access to the service APIs
#[async_trait]
pub trait ServiceClients: Send + Sync {
    async fn bedrock(&self) -> AiOpsResult<Arc<dyn BedrockApi>>;
    async fn bedrock_agent(&self) -> AiOpsResult<Arc<dyn BedrockAgentApi>>;
    async fn bedrock_runtime(&self) -> AiOpsResult<Arc<dyn BedrockRuntimeApi>>;
    async fn bedrock_agent_runtime(&self) -> AiOpsResult<Arc<dyn BedrockAgentRuntimeApi>>;
    async fn devops_guru(&self) -> AiOpsResult<Arc<dyn DevOpsGuruApi>>;
}

/// Builds [`ServiceClients`] for a resolved connection
pub trait ClientProvider: Send + Sync {
    fn connect(&self, connection: AwsConnection) -> Arc<dyn ServiceClients>;
}

/// Production provider: AWS CLI for control-plane calls, SDK for runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsClientProvider;

impl ClientProvider for AwsClientProvider {
    fn connect(&self, connection: AwsConnection) -> Arc<dyn ServiceClients> {
        Arc::new(AwsServiceClients::new(connection))
    }
}

pub struct AwsServiceClients {
    connection: AwsConnection,
    cli: OnceCell<Arc<AwsCli>>,
    #[cfg(feature = "bedrock")]
    sdk: OnceCell<aws_config::SdkConfig>,
}

impl AwsServiceClients {
    pub fn new(connection: AwsConnection) -> Self {
        Self {
            connection,
            cli: OnceCell::new(),
            #[cfg(feature = "bedrock")]
            sdk: OnceCell::new(),
        }
    }

    async fn cli(&self) -> AiOpsResult<Arc<AwsCli>> {
        let cli = self
            .cli
            .get_or_try_init(|| async {
                debug!(connection = ?self.connection, "Resolving AWS CLI");
                AwsCli::new(self.connection.clone()).map(Arc::new)
            })
            .await?;
        Ok(cli.clone())
    }

    #[cfg(feature = "bedrock")]
    async fn sdk_config(&self) -> &aws_config::SdkConfig {
        self.sdk
            .get_or_init(|| crate::aws::sdk::load_sdk_config(&self.connection))
            .await
    }
}

#[cfg(not(feature = "bedrock"))]
fn runtime_unavailable(service: &str) -> aiops_core::AiOpsError {
    aiops_core::AiOpsError::connection(format!(
        "{} requires the 'bedrock' feature, which this build does not include",
        service
    ))
}

#[async_trait]
impl ServiceClients for AwsServiceClients {
    async fn bedrock(&self) -> AiOpsResult<Arc<dyn BedrockApi>> {
        Ok(Arc::new(CliBedrock::new(self.cli().await?)))
    }

    async fn bedrock_agent(&self) -> AiOpsResult<Arc<dyn BedrockAgentApi>> {
        Ok(Arc::new(CliBedrockAgent::new(self.cli().await?)))
    }

    #[cfg(feature = "bedrock")]
    async fn bedrock_runtime(&self) -> AiOpsResult<Arc<dyn BedrockRuntimeApi>> {
        let config = self.sdk_config().await;
        Ok(Arc::new(crate::aws::sdk::SdkBedrockRuntime::new(config)))
    }

    #[cfg(not(feature = "bedrock"))]
    async fn bedrock_runtime(&self) -> AiOpsResult<Arc<dyn BedrockRuntimeApi>> {
        Err(runtime_unavailable("Bedrock runtime"))
    }

    #[cfg(feature = "bedrock")]
    async fn bedrock_agent_runtime(&self) -> AiOpsResult<Arc<dyn BedrockAgentRuntimeApi>> {
        let config = self.sdk_config().await;
        Ok(Arc::new(crate::aws::sdk::SdkBedrockAgentRuntime::new(config)))
    }

    #[cfg(not(feature = "bedrock"))]
    async fn bedrock_agent_runtime(&self) -> AiOpsResult<Arc<dyn BedrockAgentRuntimeApi>> {
        Err(runtime_unavailable("Bedrock agent runtime"))
    }

    async fn devops_guru(&self) -> AiOpsResult<Arc<dyn DevOpsGuruApi>> {
        Ok(Arc::new(CliDevOpsGuru::new(self.cli().await?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_cli_is_connection_error() {
        let connection = AwsConnection {
            aws_cli: "aiops-no-such-aws-cli".into(),
            ..Default::default()
        };
        let clients = AwsClientProvider.connect(connection);
        let err = clients.bedrock_agent().await.err().unwrap();
        assert!(matches!(err, aiops_core::AiOpsError::Connection(_)));
        assert!(clients.devops_guru().await.is_err());
    }

    #[cfg(not(feature = "bedrock"))]
    #[tokio::test]
    async fn test_runtime_requires_feature() {
        let clients = AwsServiceClients::new(AwsConnection::default());
        let err = clients.bedrock_runtime().await.err().unwrap();
        assert!(err.to_string().contains("'bedrock' feature"));
    }
}
