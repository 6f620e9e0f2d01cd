use thiserror::Error;

use crate::models::ResourceKind;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Could not read local data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => FetchError::AccessDenied(truncated),
            404 => FetchError::NotFound(truncated),
            500..=599 => FetchError::ServerError(truncated),
            _ => FetchError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

/// A collection could not be loaded. Always tagged with the collection it concerns.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Unable to load {kind}: {source}")]
    Fetch {
        kind: ResourceKind,
        #[source]
        source: FetchError,
    },

    #[error("Unable to parse {kind} data: {source}")]
    Malformed {
        kind: ResourceKind,
        #[source]
        source: serde_json::Error,
    },
}

impl DataLoadError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            DataLoadError::Fetch { kind, .. } | DataLoadError::Malformed { kind, .. } => *kind,
        }
    }

    /// Explanation suitable for showing in place of the missing collection.
    pub fn user_message(&self) -> String {
        let kind = self.kind();
        let mut title = kind.name().to_string();
        if let Some(first) = title.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        format!(
            "Unable to load {title}. We're having trouble loading the {name} data \
             (network problem, missing data/{file}, or server configuration). Try again.",
            title = title,
            name = kind.name(),
            file = kind.file_name(),
        )
    }
}
