//! Error types for the drawing engine and its service layer

use thiserror::Error;

/// Result type alias for sketchgrid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while drawing, storing or serving drawings
#[derive(Error, Debug)]
pub enum Error {
    /// No rectangles were supplied
    #[error("at least one request is required")]
    EmptyInput,

    /// A draw request failed validation
    #[error("{0}")]
    InvalidSpec(String),

    /// A fill or outline symbol is not acceptable
    #[error("invalid character: {0}")]
    InvalidSymbol(String),

    /// The bounding box would exceed the configured cell budget
    #[error("canvas of {width}x{height} cells exceeds the allowed size")]
    CanvasTooLarge { width: usize, height: usize },

    /// Rasterizing the batch would touch more cells than allowed
    #[error("{specs} rectangles on a {cells}-cell canvas exceed the allowed work per request")]
    BatchTooLarge { specs: usize, cells: usize },

    /// No drawing is stored under the given identifier
    #[error("drawing '{0}' not found")]
    NotFound(String),

    /// Persistence backend failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// HTTP server failure
    #[error("Server error: {0}")]
    ServerError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by the
    /// system. The HTTP layer maps these to `400 Bad Request`.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput
                | Error::InvalidSpec(_)
                | Error::InvalidSymbol(_)
                | Error::CanvasTooLarge { .. }
                | Error::BatchTooLarge { .. }
                | Error::Json(_)
        )
    }
}
