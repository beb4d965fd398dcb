use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaLoanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// A formula would divide by zero (e.g. DTI against zero income).
    #[error("Cannot compute {context}: arithmetic is undefined for these inputs")]
    ArithmeticDegenerate { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VaLoanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        VaLoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VaLoanError {
    fn from(e: serde_json::Error) -> Self {
        VaLoanError::SerializationError(e.to_string())
    }
}
