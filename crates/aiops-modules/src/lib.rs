//! aiops Modules - Bedrock Agents and DevOps Guru automation modules
//!
//! Each module declares an argument spec and reconciles one kind of AWS
//! resource towards the state described by its arguments, reporting
//! whether anything changed.
//!
//! # Modules
//!
//! - `bedrock_agent`, `bedrock_agent_info`
//! - `bedrock_agent_alias`, `bedrock_agent_alias_info`
//! - `bedrock_agent_action_group`, `bedrock_agent_action_group_info`
//! - `bedrock_foundation_models_info`
//! - `bedrock_model_inference`, `bedrock_invoke_agent`
//! - `devopsguru_resource_collection`, `devopsguru_resource_collection_info`
//! - `devopsguru_insight_info`
//!
//! # Feature Flags
//!
//! - `bedrock` - Runtime calls (`InvokeModel`, `InvokeAgent`) through the AWS SDK
//!
//! # Example
//!
//! ```rust,ignore
//! use aiops_modules::ModuleRegistry;
//! use serde_json::json;
//!
//! let executor = ModuleRegistry::with_builtin().into_executor();
//! let result = executor
//!     .execute("bedrock_agent_info", &json!({"region": "us-east-1"}))
//!     .await;
//! ```

pub mod aws;
pub mod bedrock;
pub mod clients;
pub mod devopsguru;
pub mod module;
pub mod modules;
pub mod outcome;
pub mod registry;
pub mod testing;

pub use clients::{AwsClientProvider, AwsServiceClients, ClientProvider, ServiceClients};
pub use module::{Module, ModuleContext};
pub use outcome::Outcome;
pub use registry::{ModuleExecutor, ModuleRegistry};

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::module::{Module, ModuleContext};
    pub use super::registry::{ModuleExecutor, ModuleRegistry};
    pub use aiops_core::{AiOpsError, AiOpsResult, ModuleFailure, ModuleOutput, ModuleParams, ModuleSpec, ParamSpec};
}
