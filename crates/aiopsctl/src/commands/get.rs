use aiops_core::ModuleSpec;
use aiops_modules::ModuleRegistry;
use anyhow::Result;
use serde_json::json;

use crate::output::{render, Format};

/// Resource types `get` and `describe` understand
pub fn is_module_resource(resource_type: &str) -> bool {
    matches!(resource_type, "modules" | "module" | "mod" | "mods")
}

/// List resources (verb-first: get modules)
pub fn execute(resource_type: &str, output: &str) -> Result<()> {
    if !is_module_resource(resource_type) {
        anyhow::bail!("Unknown resource type: {}", resource_type);
    }

    let registry = ModuleRegistry::with_builtin();
    let specs = registry.specs();

    match output {
        "name" => {
            for spec in specs {
                println!("module/{}", spec.name);
            }
        }
        "wide" => {
            println!("{:<40} {:<12} {}", "NAME", "CHECK MODE", "DESCRIPTION");
            for spec in specs {
                println!("{}", table_row(spec));
            }
        }
        other => {
            let format = Format::parse(other).ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", other))?;
            let list = json!({
                "kind": "ModuleList",
                "items": specs,
            });
            println!("{}", render(&list, format)?.trim_end());
        }
    }

    Ok(())
}

fn table_row(spec: &ModuleSpec) -> String {
    let check_mode = if spec.supports_check_mode { "yes" } else { "no" };
    format!("{:<40} {:<12} {}", spec.name, check_mode, spec.description)
}
