use thiserror::Error;

/// Error codes that mean the service asked us to slow down.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// Core error type for aiops modules
#[derive(Error, Debug)]
pub enum AiOpsError {
    #[error("{0}")]
    Validation(String),

    #[error("An error occurred ({code}) when calling the {operation} operation: {message}")]
    Api {
        operation: String,
        code: String,
        message: String,
    },

    #[error("Failed to connect to AWS: {0}")]
    Connection(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Module(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AiOpsResult<T> = Result<T, AiOpsError>;

impl AiOpsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn module(msg: impl Into<String>) -> Self {
        Self::Module(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn api(
        operation: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Service error code, when the error came back from an API call
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some("ResourceNotFoundException")
    }

    pub fn is_throttling(&self) -> bool {
        self.code()
            .map(|code| THROTTLING_CODES.contains(&code))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_matches_cli_format() {
        let err = AiOpsError::api("GetAgent", "ResourceNotFoundException", "Agent ABC not found");
        assert_eq!(
            err.to_string(),
            "An error occurred (ResourceNotFoundException) when calling the GetAgent operation: Agent ABC not found"
        );
        assert!(err.is_not_found());
        assert!(!err.is_throttling());
    }

    #[test]
    fn test_throttling_codes() {
        assert!(AiOpsError::api("ListAgents", "ThrottlingException", "slow down").is_throttling());
        assert!(AiOpsError::api("ListInsights", "TooManyRequestsException", "").is_throttling());
        assert!(!AiOpsError::validation("bad").is_throttling());
        assert_eq!(AiOpsError::validation("bad").code(), None);
    }
}
