use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a failure envelope.
    #[error("{message} ({status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        /// Field errors of a validation failure, in order.
        errors: Vec<String>,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("session store: {0}")]
    Store(#[from] std::io::Error),

    #[error("auto-saver has stopped")]
    Closed,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Validation errors carried by a 400, empty otherwise.
    pub fn field_errors(&self) -> &[String] {
        match self {
            ClientError::Api { errors, .. } => errors,
            _ => &[],
        }
    }
}
