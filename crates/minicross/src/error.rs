use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid puzzle {id}: {}", .violations.join("; "))]
    InvalidPuzzle { id: String, violations: Vec<String> },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for failures reported by a remote store.
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
