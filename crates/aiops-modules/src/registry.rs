//! Module Registry - Central registration and execution of modules
//!
//! The registry maps module names to implementations. Turning it into a
//! [`ModuleExecutor`] binds it to a [`ClientProvider`] so modules can be
//! run by name against validated arguments.

use aiops_core::{AiOpsError, AwsConnection, ConnectionConfig, ModuleFailure, ModuleOutput, ModuleSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::clients::{AwsClientProvider, ClientProvider};
use crate::module::{Module, ModuleContext};

/// Module registry
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in module
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_all(crate::modules::all());
        registry
    }

    /// Register a single module
    pub fn register<M: Module + 'static>(&mut self, module: M) -> &mut Self {
        let name = module.name().to_string();
        info!(module = %name, "Registering module");
        self.modules.insert(name, Arc::new(module));
        self
    }

    /// Register boxed modules
    pub fn register_all(&mut self, modules: Vec<Box<dyn Module>>) -> &mut Self {
        for module in modules {
            let name = module.name().to_string();
            debug!(module = %name, "Registering module");
            self.modules.insert(name, Arc::from(module));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    /// Module names, sorted
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Argument specs, sorted by module name
    pub fn specs(&self) -> Vec<&ModuleSpec> {
        let mut specs: Vec<&ModuleSpec> = self.modules.values().map(|m| m.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Executor talking to AWS
    pub fn into_executor(self) -> ModuleExecutor {
        ModuleExecutor::new(self, Arc::new(AwsClientProvider))
    }
}

/// Runs registered modules by name
pub struct ModuleExecutor {
    modules: HashMap<String, Arc<dyn Module>>,
    provider: Arc<dyn ClientProvider>,
    config: Option<ConnectionConfig>,
}

impl ModuleExecutor {
    pub fn new(registry: ModuleRegistry, provider: Arc<dyn ClientProvider>) -> Self {
        Self {
            modules: registry.modules,
            provider,
            config: None,
        }
    }

    /// Connection defaults applied below module arguments
    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate `args`, resolve the connection and run the module
    pub async fn execute(&self, name: &str, args: &Value) -> Result<ModuleOutput, ModuleFailure> {
        let module = self
            .modules
            .get(name)
            .ok_or_else(|| ModuleFailure::new(format!("Module not found: {}", name)))?;
        let spec = module.spec();

        let params = spec.validate(args).map_err(|e| {
            warn!(module = %name, error = %e, "Invalid module arguments");
            ModuleFailure::from(e)
        })?;
        debug!(module = %name, params = %spec.redact(&params), check_mode = params.check_mode(), "Executing module");

        if params.check_mode() && !spec.supports_check_mode {
            return Ok(ModuleOutput::unchanged().with_msg(format!("{} does not support check mode", name)));
        }

        let connection = AwsConnection::from_env(&params, self.config.as_ref());
        let clients = self.provider.connect(connection);
        let ctx = ModuleContext::new(params, clients);

        let start = Instant::now();
        match module.run(&ctx).await {
            Ok(output) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(module = %name, elapsed_ms = %elapsed, changed = %output.changed, "Module execution complete");
                Ok(output)
            }
            Err(e) => {
                warn!(module = %name, error = %e, "Module execution failed");
                Err(failure(e))
            }
        }
    }
}

/// Failure result; throttling that outlived the retries is called out
fn failure(err: AiOpsError) -> ModuleFailure {
    let throttled = err.is_throttling();
    let failure = ModuleFailure::from(err);
    if throttled {
        failure.with("throttled", true)
    } else {
        failure
    }
}
