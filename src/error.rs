//! Global error handling for filedog
//!
//! Selection mutations never fail; errors only come out of the edges of the
//! engine: reading or writing session documents, writing combined output and
//! validating configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for filedog operations
#[derive(Error, Debug)]
pub enum FileDogError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A session document could not be parsed; `path` is `None` for
    /// documents given as text
    #[error("Invalid session document{}: {source}", origin(.path))]
    InvalidSession {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },

    /// Output destination could not be written
    #[error("Cannot write {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No root directory has been chosen for the session
    #[error("No root directory selected")]
    NoRoot,

    /// The resolved selection is empty
    #[error("No files selected")]
    NothingSelected,

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Specialized Result type for filedog operations
pub type Result<T> = std::result::Result<T, FileDogError>;

/// Creates a FileDogError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::FileDogError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
