//! Client error types
//!
//! Every fallible operation in the client core returns [`ClientResult`]. Views
//! turn errors into strings for inline display or toasts; nothing here is fatal.

use thiserror::Error;

use crate::audio::CaptureError;

/// Errors that can occur while talking to the backend or the host platform
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Transport failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Decode(String),

    /// Form input rejected before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Microphone or speech capture failed
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Auth token could not be read or persisted
    #[error("Token storage error: {0}")]
    Storage(String),

    /// A status poll hit its attempt cap without reaching a terminal state
    #[error("No final status after {attempts} checks")]
    PollTimeout { attempts: u32 },

    /// Backend reported that voice cloning failed
    #[error("Voice cloning failed")]
    VoiceCloneFailed,

    /// The operation was cancelled by its owner
    #[error("Cancelled")]
    Cancelled,
}

impl ClientError {
    /// HTTP status code, when the error came from a backend response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 responses, which mean the stored token is no longer valid
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Input validation failures for auth and persona forms
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0} is required")]
    Required(&'static str),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Http {
            status: 409,
            message: "User already exists".to_string(),
        };
        assert_eq!(err.to_string(), "User already exists");

        let err = ClientError::PollTimeout { attempts: 60 };
        assert_eq!(err.to_string(), "No final status after 60 checks");

        let err: ClientError = ValidationError::PasswordTooShort { min: 6 }.into();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = ClientError::Http {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!ClientError::Timeout.is_unauthorized());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
