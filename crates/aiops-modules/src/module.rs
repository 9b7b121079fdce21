//! Module trait and the context a module runs in

use aiops_core::{AiOpsError, AiOpsResult, ModuleOutput, ModuleParams, ModuleSpec};
use async_trait::async_trait;
use std::sync::Arc;

use crate::aws::waiter::{Waiter, DEFAULT_WAIT_TIMEOUT_SECS};
use crate::clients::ServiceClients;

/// Everything a module needs for one run
pub struct ModuleContext {
    pub params: ModuleParams,
    pub clients: Arc<dyn ServiceClients>,
}

impl ModuleContext {
    pub fn new(params: ModuleParams, clients: Arc<dyn ServiceClients>) -> Self {
        Self { params, clients }
    }

    pub fn check_mode(&self) -> bool {
        self.params.check_mode()
    }

    /// Waiter honouring the module's `wait_timeout` parameter
    pub fn waiter(&self) -> Waiter {
        let timeout = self
            .params
            .int("wait_timeout")
            .map(|secs| secs.max(0) as u64)
            .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS);
        Waiter::new(timeout)
    }

    /// Required string parameter
    pub fn required_str(&self, name: &str) -> AiOpsResult<&str> {
        self.params
            .str(name)
            .ok_or_else(|| AiOpsError::validation(format!("missing required arguments: {}", name)))
    }

    /// `state` parameter is `present` (the default)
    pub fn state_present(&self) -> bool {
        self.params.str("state").unwrap_or("present") == "present"
    }
}

/// A declarative automation module
#[async_trait]
pub trait Module: Send + Sync {
    /// Argument spec the executor validates against
    fn spec(&self) -> &ModuleSpec;

    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Run with already validated parameters
    async fn run(&self, ctx: &ModuleContext) -> AiOpsResult<ModuleOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeClients;
    use serde_json::{json, Map, Value};
    use std::time::Duration;

    fn context(values: Value, check_mode: bool) -> ModuleContext {
        let map: Map<String, Value> = values.as_object().cloned().unwrap_or_default();
        ModuleContext::new(ModuleParams::from_map(map, check_mode), Arc::new(FakeClients::default()))
    }

    #[test]
    fn test_waiter_uses_wait_timeout() {
        assert_eq!(context(json!({}), false).waiter().timeout, Duration::from_secs(600));
        assert_eq!(
            context(json!({"wait_timeout": 30}), false).waiter().timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_state_and_required_str() {
        let ctx = context(json!({"state": "absent", "agent_name": ""}), true);
        assert!(ctx.check_mode());
        assert!(!ctx.state_present());
        assert_eq!(
            ctx.required_str("agent_name").unwrap_err().to_string(),
            "missing required arguments: agent_name"
        );
        assert!(context(json!({}), false).state_present());
    }
}
