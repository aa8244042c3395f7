//! Error types for dermx-client.

use thiserror::Error;

/// Main error type for dermx-client operations.
#[derive(Error, Debug)]
pub enum DermxError {
    /// A privileged call was attempted without a bearer token.
    #[error("not authenticated: no auth token")]
    Unauthenticated,

    /// The backend answered with a non-success status.
    #[error("{operation} failed: backend returned HTTP {status}")]
    Rejected {
        operation: &'static str,
        status: u16,
    },

    /// The diagnosis endpoint rejected the upload.
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    /// Network or protocol failure talking to the backend.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Identity provider failure.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// A file was offered for analysis that is not an image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Analysis was requested before any image was selected.
    #[error("Please select an image file to analyze")]
    NoImageSelected,

    /// Login was attempted without a password.
    #[error("password required: pass --password or set DERMX_PASSWORD")]
    MissingPassword,

    /// Persisted token could not be read or written.
    #[error("token store error: {0}")]
    TokenStore(String),

    /// Backend base URL could not be used.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DermxError {
    /// Whether this error was raised before any request left the client.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::InvalidImage(_)
                | Self::NoImageSelected
                | Self::MissingPassword
        )
    }
}

/// Convenience Result type for dermx-client operations.
pub type Result<T> = std::result::Result<T, DermxError>;
