use thiserror::Error;

/// Error types for the translation client and relay
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Invalid or missing configuration (endpoint, proxy, session)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Language tag that cannot be sent to the backend
    #[error("Invalid language code: {0}")]
    InvalidLocale(String),
    /// HTTP transport failure
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Error during translation phase
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Backend answered with something we could not decode
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for MtError {
    fn from(err: serde_json::Error) -> Self {
        MtError::Serialization(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MtError::InvalidLocale("x@y".to_string()).to_string(),
            "Invalid language code: x@y"
        );
        assert_eq!(
            MtError::ConfigError("bad proxy".to_string()).to_string(),
            "Configuration error: bad proxy"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        match MtError::from(err) {
            MtError::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization, got {:?}", other),
        }
    }
}
