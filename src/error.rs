use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
    #[error("Generation failed: {0}")]
    ExternalFailure(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Generation cancelled")]
    Cancelled,
}

/// Coarse classification callers branch on when deciding what to show the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredential,
    ExternalFailure,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredential => "invalid_credential",
            ErrorKind::ExternalFailure => "external_failure",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        }
    }
}

impl ThumbnailError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThumbnailError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            ThumbnailError::ExternalFailure(_)
            | ThumbnailError::RequestError(_)
            | ThumbnailError::ResponseError(_) => ErrorKind::ExternalFailure,
            ThumbnailError::InvalidInput(_) => ErrorKind::InvalidInput,
            ThumbnailError::ConfigError(_)
            | ThumbnailError::SerializationError(_)
            | ThumbnailError::StorageError(_)
            | ThumbnailError::Cancelled => ErrorKind::Internal,
        }
    }

    pub fn is_invalid_credential(&self) -> bool {
        self.kind() == ErrorKind::InvalidCredential
    }
}

impl From<serde_json::Error> for ThumbnailError {
    fn from(e: serde_json::Error) -> Self {
        ThumbnailError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_keep_provider_message() {
        let err = ThumbnailError::InvalidCredential(
            "API key not valid. Please pass a valid API key.".into(),
        );
        assert!(err.is_invalid_credential());
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn transport_errors_count_as_external() {
        assert_eq!(
            ThumbnailError::RequestError("connection reset".into()).kind(),
            ErrorKind::ExternalFailure
        );
        assert_eq!(ThumbnailError::Cancelled.kind(), ErrorKind::Internal);
        assert_eq!(ErrorKind::InvalidInput.as_str(), "invalid_input");
    }
}
