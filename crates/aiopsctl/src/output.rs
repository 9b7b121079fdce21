//! Result rendering for aiopsctl
//!
//! Module results go to stdout as JSON or YAML; a one-line colored status
//! summary goes to stderr when it is a terminal.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use std::io::IsTerminal;

/// ANSI color codes for terminal styling
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

use colors::*;

/// Structured output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Render any serializable value in `format`
pub fn render<T: Serialize>(value: &T, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

/// `failed`, `changed` or `ok`, read from a module result
pub fn status(result: &Value) -> &'static str {
    if result.get("failed").and_then(Value::as_bool).unwrap_or(false) {
        "failed"
    } else if result.get("changed").and_then(Value::as_bool).unwrap_or(false) {
        "changed"
    } else {
        "ok"
    }
}

/// Status line in ansible style: `changed: [bedrock_agent]`
pub fn status_line(module: &str, result: &Value, use_colors: bool) -> String {
    let status = status(result);
    if !use_colors {
        return format!("{}: [{}]", status, module);
    }
    let color = match status {
        "failed" => RED,
        "changed" => YELLOW,
        _ => GREEN,
    };
    format!("{color}{BOLD}{status}{RESET}: [{module}]")
}

/// Print a module result to stdout and its status line to stderr
pub fn print_result(module: &str, result: &Value, format: Format) -> anyhow::Result<()> {
    let stderr_tty = std::io::stderr().is_terminal();
    if stderr_tty {
        eprintln!("{}", status_line(module, result, true));
    }
    println!("{}", render(result, format)?.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status() {
        assert_eq!(status(&json!({"changed": false})), "ok");
        assert_eq!(status(&json!({"changed": true})), "changed");
        assert_eq!(status(&json!({"failed": true, "changed": false})), "failed");
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line("bedrock_agent", &json!({"changed": true}), false), "changed: [bedrock_agent]");
        assert!(status_line("bedrock_agent", &json!({"changed": false}), true).contains(GREEN));
    }

    #[test]
    fn test_render_formats() {
        let value = json!({"changed": false, "msg": "ok"});
        assert!(render(&value, Format::Json).unwrap().contains("\"msg\": \"ok\""));
        assert!(render(&value, Format::Yaml).unwrap().contains("msg: ok"));
        assert_eq!(Format::parse("yml"), Some(Format::Yaml));
        assert_eq!(Format::parse("wide"), None);
    }
}
