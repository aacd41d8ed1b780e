use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanbookError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Not authenticated: a session must be acquired before {0}")]
    Unauthenticated(String),

    #[error("Session expired for user {user_id}")]
    SessionExpired { user_id: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanbookError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanbookError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(field: &str) -> Self {
        LoanbookError::invalid(field, "Result exceeds the representable decimal range")
    }
}

impl From<serde_json::Error> for LoanbookError {
    fn from(e: serde_json::Error) -> Self {
        LoanbookError::SerializationError(e.to_string())
    }
}
