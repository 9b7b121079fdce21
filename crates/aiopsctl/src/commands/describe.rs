//! Describe a module's argument spec (kubectl describe style)

use aiops_core::{ModuleSpec, ParamSpec};
use aiops_modules::ModuleRegistry;
use anyhow::Result;
use std::fmt::Write;

use super::get::is_module_resource;
use crate::output::{render, Format};

/// Describe a resource in detail
pub fn execute(resource_type: &str, name: &str, output: &str) -> Result<()> {
    if !is_module_resource(resource_type) {
        anyhow::bail!("Unknown resource type: {}", resource_type);
    }

    let registry = ModuleRegistry::with_builtin();
    let module = registry.get(name).ok_or_else(|| {
        anyhow::anyhow!("Module '{}' not found. Use 'aiopsctl get modules' to list.", name)
    })?;
    let spec = module.spec();

    match output {
        "text" => print!("{}", describe_text(spec)),
        other => {
            let format = Format::parse(other).ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", other))?;
            println!("{}", render(spec, format)?.trim_end());
        }
    }
    Ok(())
}

/// Human-readable module description
pub fn describe_text(spec: &ModuleSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name:         {}", spec.name);
    let _ = writeln!(out, "Description:  {}", spec.description);
    let _ = writeln!(
        out,
        "Check mode:   {}",
        if spec.supports_check_mode { "supported" } else { "not supported" }
    );

    let _ = writeln!(out, "\nParameters:");
    for param in &spec.params {
        let _ = writeln!(out, "  {}", param_line(param));
        if !param.description.is_empty() {
            let _ = writeln!(out, "      {}", param.description);
        }
    }

    let has_constraints = !spec.required_if.is_empty()
        || !spec.required_one_of.is_empty()
        || !spec.mutually_exclusive.is_empty()
        || !spec.required_together.is_empty();
    if has_constraints {
        let _ = writeln!(out, "\nConstraints:");
        for rule in &spec.required_if {
            let _ = writeln!(
                out,
                "  required if {} = {}: {}",
                rule.param,
                rule.value,
                rule.requirements.join(", ")
            );
        }
        for group in &spec.required_one_of {
            let _ = writeln!(out, "  one of: {}", group.join(", "));
        }
        for group in &spec.mutually_exclusive {
            let _ = writeln!(out, "  mutually exclusive: {}", group.join(", "));
        }
        for group in &spec.required_together {
            let _ = writeln!(out, "  required together: {}", group.join(", "));
        }
    }
    out
}

fn param_line(param: &ParamSpec) -> String {
    let mut kind = param.kind.to_string();
    if let Some(elements) = param.elements {
        kind = format!("{}[{}]", kind, elements);
    }
    let mut line = format!("{:<28} {:<10}", param.name, kind);
    if param.required {
        line.push_str(" required");
    }
    if let Some(default) = &param.default {
        let _ = write!(line, " default={}", default);
    }
    if !param.choices.is_empty() {
        let _ = write!(line, " choices=[{}]", param.choices.join(", "));
    }
    if !param.aliases.is_empty() {
        let _ = write!(line, " aliases=[{}]", param.aliases.join(", "));
    }
    if param.no_log {
        line.push_str(" no_log");
    }
    line.trim_end().to_string()
}
