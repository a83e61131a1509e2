use thiserror::Error;

/// Errors raised by the server side: the service, its revalidation gate and
/// the storage behind it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced by the remote predicate client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Server unreachable, connection reset, timeout.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The server-side gate refused the write. Only a `validation_failed`
    /// error body counts; any other 4xx is a [`ClientError::Server`].
    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failure of a form submission. Field-level validation never reaches this
/// type; an unsubmittable form simply does not submit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Save rejected by server: {0}")]
    WriteRejected(String),

    /// Anything other than the gate refusing the write: the server was
    /// unreachable, failed, or did not understand the request.
    #[error("Save failed, try again: {0}")]
    Transport(String),

    #[error("Save affected no rows")]
    NotSaved,
}

impl From<ClientError> for SubmitError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => Self::WriteRejected(message),
            other => Self::Transport(other.to_string()),
        }
    }
}
