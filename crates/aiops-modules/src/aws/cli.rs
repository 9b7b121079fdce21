//! AWS CLI transport
//!
//! Control-plane calls run `aws <service> <operation> --cli-input-json <json>
//! --output json`. The CLI resolves credentials and follows pagination
//! tokens; this layer only shapes arguments and parses results.

use aiops_core::{camel_to_snake, AiOpsError, AiOpsResult, AwsConnection};
use regex::Regex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::retry::{with_retry, RetryPolicy};

/// Execute a command and return structured output
pub async fn execute_command(
    program: &str,
    args: &[String],
    env: &[(&str, String)],
    timeout: Duration,
) -> AiOpsResult<CommandOutput> {
    use tokio::process::Command;

    let mut cmd = Command::new(program);
    cmd.args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }

    // Capture output
    cmd.stdin(std::process::Stdio::null());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| AiOpsError::connection(format!("Failed to spawn {}: {}", program, e)))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| AiOpsError::timeout(format!("Command timed out after {}s", timeout.as_secs())))?
        .map_err(|e| AiOpsError::connection(format!("Command failed: {}", e)))?;

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Command execution output
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

fn cli_error_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)An error occurred \((?P<code>[^)]+)\) when calling the (?P<op>\w+) operation(?: \([^)]*\))?: (?P<msg>.*)",
        )
        .expect("static regex")
    })
}

/// Stderr fragments that mean the CLI never reached the service
const CONNECTION_FAILURES: &[&str] = &[
    "Unable to locate credentials",
    "Could not connect to the endpoint URL",
    "The config profile",
    "You must specify a region",
    "SSL validation failed",
];

/// Turn CLI stderr into a typed error
pub fn parse_cli_error(operation: &str, stderr: &str) -> AiOpsError {
    let stderr = stderr.trim();
    if let Some(caps) = cli_error_pattern().captures(stderr) {
        return AiOpsError::api(&caps["op"], &caps["code"], caps["msg"].trim());
    }
    if CONNECTION_FAILURES.iter().any(|needle| stderr.contains(needle)) {
        return AiOpsError::connection(stderr.to_string());
    }
    AiOpsError::api(operation, "CliError", stderr)
}

/// `ListAgents` → `list-agents`
pub fn cli_command_name(operation: &str) -> String {
    camel_to_snake(operation).replace('_', "-")
}

/// A resolved AWS CLI bound to one connection
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    connection: AwsConnection,
    retry: RetryPolicy,
}

impl AwsCli {
    /// Locate the CLI binary; a missing binary is a connection failure
    pub fn new(connection: AwsConnection) -> AiOpsResult<Self> {
        let program = which::which(&connection.aws_cli).map_err(|e| {
            AiOpsError::connection(format!("AWS CLI '{}' not found: {}", connection.aws_cli, e))
        })?;
        Ok(Self {
            program,
            connection,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn connection(&self) -> &AwsConnection {
        &self.connection
    }

    /// Full argument list for one call
    pub fn build_args(&self, service: &str, operation: &str, input: &Value) -> AiOpsResult<Vec<String>> {
        let mut args = vec![
            service.to_string(),
            cli_command_name(operation),
            "--cli-input-json".to_string(),
            serde_json::to_string(input)?,
            "--output".to_string(),
            "json".to_string(),
        ];

        let conn = &self.connection;
        if let Some(ref region) = conn.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(ref profile) = conn.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(ref endpoint) = conn.endpoint_url {
            args.push("--endpoint-url".to_string());
            args.push(endpoint.clone());
        }
        if !conn.validate_certs {
            args.push("--no-verify-ssl".to_string());
        }
        if let Some(ref bundle) = conn.ca_bundle {
            args.push("--ca-bundle".to_string());
            args.push(bundle.clone());
        }

        Ok(args)
    }

    fn env(&self) -> Vec<(&'static str, String)> {
        let mut env = self.connection.credential_env();
        env.push(("AWS_PAGER", String::new()));
        env
    }

    async fn call_once(&self, service: &str, operation: &str, input: &Value) -> AiOpsResult<Value> {
        let args = self.build_args(service, operation, input)?;
        let program = self.program.to_string_lossy();

        debug!(service = %service, operation = %operation, "Calling AWS");
        let output = execute_command(&program, &args, &self.env(), self.connection.call_timeout).await?;

        if !output.success {
            return Err(parse_cli_error(operation, &output.stderr));
        }

        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(stdout).map_err(|e| {
            AiOpsError::api(operation, "InvalidResponse", format!("unparseable CLI output: {}", e))
        })
    }

    /// Call an operation, retrying throttled requests
    pub async fn call(&self, service: &str, operation: &str, input: Value) -> AiOpsResult<Value> {
        with_retry(&self.retry, operation, || self.call_once(service, operation, &input)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cli(connection: AwsConnection) -> AwsCli {
        AwsCli {
            program: PathBuf::from("aws"),
            connection,
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn test_cli_command_name() {
        assert_eq!(cli_command_name("ListAgents"), "list-agents");
        assert_eq!(cli_command_name("GetAgentActionGroup"), "get-agent-action-group");
        assert_eq!(cli_command_name("ListAnomaliesForInsight"), "list-anomalies-for-insight");
    }

    #[test]
    fn test_parse_api_error() {
        let err = parse_cli_error(
            "GetAgent",
            "\nAn error occurred (ResourceNotFoundException) when calling the GetAgent operation: Agent ABC not found\n",
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "An error occurred (ResourceNotFoundException) when calling the GetAgent operation: Agent ABC not found"
        );
    }

    #[test]
    fn test_parse_throttling_after_cli_retries() {
        let err = parse_cli_error(
            "ListInsights",
            "An error occurred (ThrottlingException) when calling the ListInsights operation (reached max retries: 2): Rate exceeded",
        );
        assert!(err.is_throttling());
        assert!(err.to_string().ends_with("Rate exceeded"));
    }

    #[test]
    fn test_parse_connection_failures() {
        let err = parse_cli_error("ListAgents", "Unable to locate credentials. You can configure credentials by running \"aws configure\".");
        assert!(matches!(err, AiOpsError::Connection(_)));

        let err = parse_cli_error("ListAgents", "usage: aws [options]\naws: error: argument operation: Invalid choice");
        assert_eq!(err.code(), Some("CliError"));
    }

    #[test]
    fn test_build_args_with_connection_flags() {
        let connection = AwsConnection {
            region: Some("us-east-1".into()),
            profile: Some("dev".into()),
            endpoint_url: Some("http://localhost:4566".into()),
            validate_certs: false,
            ca_bundle: Some("/etc/ca.pem".into()),
            ..Default::default()
        };
        let args = cli(connection)
            .build_args("bedrock-agent", "GetAgent", &json!({"agentId": "A1"}))
            .unwrap();
        assert_eq!(
            args,
            vec![
                "bedrock-agent",
                "get-agent",
                "--cli-input-json",
                r#"{"agentId":"A1"}"#,
                "--output",
                "json",
                "--region",
                "us-east-1",
                "--profile",
                "dev",
                "--endpoint-url",
                "http://localhost:4566",
                "--no-verify-ssl",
                "--ca-bundle",
                "/etc/ca.pem",
            ]
        );
    }

    #[test]
    fn test_missing_cli_is_connection_error() {
        let connection = AwsConnection {
            aws_cli: "aiops-definitely-not-installed-aws".into(),
            ..Default::default()
        };
        let err = AwsCli::new(connection).unwrap_err();
        assert!(err.to_string().starts_with("Failed to connect to AWS"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_command_captures_output() {
        let output = execute_command(
            "sh",
            &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()],
            &[("AIOPS_TEST", "1".to_string())],
            Duration::from_secs(10),
        )
        .await
        .unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_call_parses_json_from_fake_cli() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("aws");
        std::fs::write(&script, "#!/bin/sh\necho '{\"agentSummaries\": []}'\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let connection = AwsConnection {
            aws_cli: script.to_string_lossy().to_string(),
            ..Default::default()
        };
        let cli = AwsCli::new(connection).unwrap();
        let out = cli.call("bedrock-agent", "ListAgents", json!({})).await.unwrap();
        assert_eq!(out, json!({"agentSummaries": []}));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_call_surfaces_api_error_from_fake_cli() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("aws");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'An error occurred (AccessDeniedException) when calling the ListAgents operation: nope' >&2\nexit 254\n",
        )
        .unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let connection = AwsConnection {
            aws_cli: script.to_string_lossy().to_string(),
            ..Default::default()
        };
        let err = AwsCli::new(connection)
            .unwrap()
            .call("bedrock-agent", "ListAgents", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("AccessDeniedException"));
    }
}
