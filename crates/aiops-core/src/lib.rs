// aiops Core - Foundation types for the aiops automation modules
//
// Argument specs, module results, errors and the payload/key transforms
// shared by every Bedrock and DevOps Guru module.

pub mod connection;
pub mod error;
pub mod output;
pub mod params;
pub mod payload;
pub mod timerange;
pub mod transform;

// Re-export core types
pub use connection::{aws_connection_params, AwsConnection, ConnectionConfig};
pub use error::{AiOpsError, AiOpsResult};
pub use output::{ModuleFailure, ModuleOutput};
pub use params::{ModuleParams, ModuleSpec, ParamKind, ParamSpec, RequiredIf};
pub use payload::{encode_body, extract_completion, merge_data};
pub use timerange::convert_time_ranges;
pub use transform::{camel_dict_to_snake_dict, camel_to_snake, scrub_none, snake_dict_to_camel_dict, snake_to_camel};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
