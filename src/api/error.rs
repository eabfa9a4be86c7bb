use std::path::PathBuf;

/// Errors from talking to the booth backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Build a `Status` error from a failed response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ApiError::Status { status, body }
    }

    /// Whether this is an HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}
