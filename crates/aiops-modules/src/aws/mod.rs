//! AWS transports
//!
//! - `cli` - control-plane calls through the AWS CLI
//! - `retry` - throttling retries
//! - `waiter` - status polling
//! - `sdk` - Bedrock runtime over the AWS SDK (feature `bedrock`)

pub mod cli;
pub mod retry;
pub mod waiter;

#[cfg(feature = "bedrock")]
pub mod sdk;

/// Upper bound on concurrent AWS calls in one fan-out (each CLI call is a child process)
pub const MAX_CONCURRENT_CALLS: usize = 4;

pub use cli::{execute_command, AwsCli, CommandOutput};
pub use retry::{with_retry, RetryPolicy};
pub use waiter::Waiter;
