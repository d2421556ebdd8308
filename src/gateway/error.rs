use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Generic message used when the gateway rejects a call without explaining why.
pub const NO_MESSAGE: &str = "Received non-OK response from Zota API with no error message";

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Received non-OK response from Zota API: code={code}, message={message}")]
    Rejected { code: String, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },
}

impl GatewayError {
    pub fn rejected(code: impl Into<String>, message: Option<String>) -> Self {
        GatewayError::Rejected {
            code: code.into(),
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| NO_MESSAGE.to_string()),
        }
    }

    /// Transport and decode failures may clear up on the next call; a rejection will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Rejected { .. } => false,
            GatewayError::Transport { .. } => true,
            GatewayError::Decode { .. } => true,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            GatewayError::Rejected { .. } => 400,
            GatewayError::Transport { .. } => 503,
            GatewayError::Decode { .. } => 502,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Transport { .. } => {
                "Payment gateway is temporarily unavailable".to_string()
            }
            GatewayError::Decode { .. } => {
                "Payment gateway returned an unexpected response".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_without_message_uses_generic_text() {
        let err = GatewayError::rejected("400", None);
        assert_eq!(err.user_message(), NO_MESSAGE);

        let err = GatewayError::rejected("400", Some("   ".to_string()));
        assert_eq!(err.user_message(), NO_MESSAGE);
    }

    #[test]
    fn rejected_keeps_gateway_message() {
        let err = GatewayError::rejected("401", Some("invalid signature".to_string()));
        assert_eq!(err.user_message(), "invalid signature");
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid signature"));
    }

    #[test]
    fn status_code_mapping_is_correct() {
        assert_eq!(GatewayError::rejected("400", None).http_status_code(), 400);
        assert_eq!(
            GatewayError::Transport {
                message: "connection refused".to_string()
            }
            .http_status_code(),
            503
        );
        assert_eq!(
            GatewayError::Decode {
                message: "expected value".to_string()
            }
            .http_status_code(),
            502
        );
    }

    #[test]
    fn retryable_flags_are_set() {
        assert!(GatewayError::Transport {
            message: "timeout".to_string()
        }
        .is_retryable());
        assert!(!GatewayError::rejected("500", None).is_retryable());
    }
}
