use aiops_modules::ModuleRegistry;

/// Show version information
pub fn execute() {
    println!("aiopsctl {}", env!("CARGO_PKG_VERSION"));
    println!("aiops-core {}", aiops_core::VERSION);
    println!("modules: {}", ModuleRegistry::with_builtin().len());
}
