//! AWS connection settings
//!
//! A connection is resolved from three layers: module parameters, an
//! optional YAML connection file, then the process environment.
//!
//! ```yaml
//! region: us-east-1
//! profile: ${AWS_PROFILE}
//! endpoint_url: http://localhost:4566
//! aws_cli: /usr/local/bin/aws
//! call_timeout_secs: 120
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::params::{ModuleParams, ParamSpec};
use crate::{AiOpsError, AiOpsResult};

pub const DEFAULT_AWS_CLI: &str = "aws";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

/// Connection parameters accepted by every module
pub fn aws_connection_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::str("region")
            .aliases(&["aws_region", "ec2_region"])
            .describe("AWS region to use"),
        ParamSpec::str("profile")
            .aliases(&["aws_profile"])
            .describe("Named profile from the AWS config files"),
        ParamSpec::str("endpoint_url")
            .aliases(&["aws_endpoint_url", "ec2_url", "s3_url"])
            .describe("Override the service endpoint URL"),
        ParamSpec::str("access_key")
            .aliases(&["aws_access_key_id", "aws_access_key", "ec2_access_key"])
            .no_log()
            .describe("AWS access key ID"),
        ParamSpec::str("secret_key")
            .aliases(&["aws_secret_access_key", "aws_secret_key", "ec2_secret_key"])
            .no_log()
            .describe("AWS secret access key"),
        ParamSpec::str("session_token")
            .aliases(&["aws_session_token", "security_token", "aws_security_token"])
            .no_log()
            .describe("AWS STS session token"),
        ParamSpec::bool("validate_certs").describe("Verify TLS certificates (default true)"),
        ParamSpec::str("aws_ca_bundle").describe("CA bundle used to verify TLS certificates"),
    ]
}

/// YAML connection file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub validate_certs: Option<bool>,
    pub ca_bundle: Option<String>,
    /// AWS CLI binary (name on PATH or absolute path)
    pub aws_cli: Option<String>,
    pub call_timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    pub fn from_yaml(yaml: &str) -> AiOpsResult<Self> {
        let expanded = expand_env_vars(yaml);
        let deserializer = serde_yaml::Deserializer::from_str(&expanded);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            AiOpsError::config(format!(
                "Failed to parse connection config at '{}': {}",
                e.path(),
                e.inner()
            ))
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> AiOpsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AiOpsError::config(format!("Failed to read connection config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }
}

fn env_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

/// Expand `${VAR_NAME}` patterns; unknown variables are left as written
pub fn expand_env_vars(value: &str) -> String {
    env_pattern()
        .replace_all(value, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Fully resolved connection used by the transports
#[derive(Clone, PartialEq)]
pub struct AwsConnection {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub validate_certs: bool,
    pub ca_bundle: Option<String>,
    pub aws_cli: String,
    pub call_timeout: Duration,
}

impl Default for AwsConnection {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            validate_certs: true,
            ca_bundle: None,
            aws_cli: DEFAULT_AWS_CLI.to_string(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for AwsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("AwsConnection")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &mask(&self.secret_key))
            .field("session_token", &mask(&self.session_token))
            .field("validate_certs", &self.validate_certs)
            .field("ca_bundle", &self.ca_bundle)
            .field("aws_cli", &self.aws_cli)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl AwsConnection {
    /// Resolve with explicit environment lookup
    pub fn resolve<F>(params: &ModuleParams, config: Option<&ConnectionConfig>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let param = |name: &str| params.str(name).map(str::to_string);
        let from_config = |pick: fn(&ConnectionConfig) -> Option<String>| config.and_then(pick);
        let from_env = |names: &[&str]| names.iter().find_map(|n| env(n).filter(|v| !v.is_empty()));

        let region = param("region")
            .or_else(|| from_config(|c| c.region.clone()))
            .or_else(|| from_env(&["AWS_REGION", "AWS_DEFAULT_REGION"]));
        let profile = param("profile")
            .or_else(|| from_config(|c| c.profile.clone()))
            .or_else(|| from_env(&["AWS_PROFILE"]));
        let endpoint_url = param("endpoint_url")
            .or_else(|| from_config(|c| c.endpoint_url.clone()))
            .or_else(|| from_env(&["AWS_ENDPOINT_URL"]));
        let ca_bundle = param("aws_ca_bundle")
            .or_else(|| from_config(|c| c.ca_bundle.clone()))
            .or_else(|| from_env(&["AWS_CA_BUNDLE"]));

        let validate_certs = params
            .raw("validate_certs")
            .and_then(|v| v.as_bool())
            .or_else(|| config.and_then(|c| c.validate_certs))
            .unwrap_or(true);

        Self {
            region,
            profile,
            endpoint_url,
            access_key: param("access_key"),
            secret_key: param("secret_key"),
            session_token: param("session_token"),
            validate_certs,
            ca_bundle,
            aws_cli: from_config(|c| c.aws_cli.clone()).unwrap_or_else(|| DEFAULT_AWS_CLI.to_string()),
            call_timeout: Duration::from_secs(
                config
                    .and_then(|c| c.call_timeout_secs)
                    .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS),
            ),
        }
    }

    /// Resolve against the process environment
    pub fn from_env(params: &ModuleParams, config: Option<&ConnectionConfig>) -> Self {
        Self::resolve(params, config, |name| std::env::var(name).ok())
    }

    /// Explicit credentials as environment variables for child processes
    pub fn credential_env(&self) -> Vec<(&'static str, String)> {
        let mut env = Vec::new();
        if let (Some(key), Some(secret)) = (&self.access_key, &self.secret_key) {
            env.push(("AWS_ACCESS_KEY_ID", key.clone()));
            env.push(("AWS_SECRET_ACCESS_KEY", secret.clone()));
            if let Some(token) = &self.session_token {
                env.push(("AWS_SESSION_TOKEN", token.clone()));
            }
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use std::io::Write;

    fn params(value: Value) -> ModuleParams {
        let map: Map<String, Value> = value.as_object().cloned().unwrap_or_default();
        ModuleParams::from_map(map, false)
    }

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_params_override_config_and_env() {
        let config = ConnectionConfig {
            region: Some("eu-west-1".into()),
            profile: Some("cfg".into()),
            ..Default::default()
        };
        let conn = AwsConnection::resolve(
            &params(json!({"region": "us-west-2"})),
            Some(&config),
            env_of(&[("AWS_REGION", "ap-south-1"), ("AWS_PROFILE", "envprof")]),
        );
        assert_eq!(conn.region.as_deref(), Some("us-west-2"));
        assert_eq!(conn.profile.as_deref(), Some("cfg"));
        assert!(conn.validate_certs);
        assert_eq!(conn.aws_cli, "aws");
    }

    #[test]
    fn test_env_fallback() {
        let conn = AwsConnection::resolve(
            &params(json!({})),
            None,
            env_of(&[("AWS_DEFAULT_REGION", "us-east-2"), ("AWS_ENDPOINT_URL", "http://localhost:4566")]),
        );
        assert_eq!(conn.region.as_deref(), Some("us-east-2"));
        assert_eq!(conn.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(conn.call_timeout, Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS));
    }

    #[test]
    fn test_validate_certs_layers() {
        let config = ConnectionConfig {
            validate_certs: Some(false),
            ..Default::default()
        };
        let conn = AwsConnection::resolve(&params(json!({})), Some(&config), |_| None);
        assert!(!conn.validate_certs);

        let conn = AwsConnection::resolve(&params(json!({"validate_certs": true})), Some(&config), |_| None);
        assert!(conn.validate_certs);
    }

    #[test]
    fn test_credential_env_and_debug_masking() {
        let conn = AwsConnection::resolve(
            &params(json!({"access_key": "AKIA", "secret_key": "s3cret", "session_token": "tok"})),
            None,
            |_| None,
        );
        let env = conn.credential_env();
        assert_eq!(env.len(), 3);
        assert!(env.contains(&("AWS_SECRET_ACCESS_KEY", "s3cret".to_string())));

        let debug = format!("{:?}", conn);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("tok\""));
    }

    #[test]
    fn test_config_from_file_with_env_expansion() {
        std::env::set_var("AIOPS_TEST_REGION", "sa-east-1");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "region: ${{AIOPS_TEST_REGION}}\naws_cli: /opt/aws/bin/aws\ncall_timeout_secs: 30").unwrap();

        let config = ConnectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.region.as_deref(), Some("sa-east-1"));
        assert_eq!(config.aws_cli.as_deref(), Some("/opt/aws/bin/aws"));

        let conn = AwsConnection::resolve(&params(json!({})), Some(&config), |_| None);
        assert_eq!(conn.call_timeout, Duration::from_secs(30));
        assert_eq!(conn.aws_cli, "/opt/aws/bin/aws");
    }

    #[test]
    fn test_config_error_names_path() {
        let err = ConnectionConfig::from_yaml("call_timeout_secs: soon").unwrap_err();
        assert!(err.to_string().contains("call_timeout_secs"));

        let err = ConnectionConfig::from_yaml("regoin: us-east-1").unwrap_err();
        assert!(err.to_string().contains("regoin"));
    }

    #[test]
    fn test_unknown_env_var_left_alone() {
        assert_eq!(expand_env_vars("x-${AIOPS_SURELY_UNSET_VAR}"), "x-${AIOPS_SURELY_UNSET_VAR}");
    }
}
