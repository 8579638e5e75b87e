//! Packageify Utilities
//!
//! Shared building blocks for the packageify workspace: the utility error
//! type, logging setup, layered configuration loading, shallow directory
//! helpers and the quoted-literal filter used by reference detection.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod file;
pub mod string;
pub mod config;
pub mod logging;

/// Re-export commonly used utilities
pub use file::{
    list_entries, read_text_file, ensure_dir, copy_file_overwrite, copy_dir_recursive,
    has_extension,
};
pub use string::strip_quoted_literals;
pub use config::{load_config, ConfigBuilder};

/// Result type used throughout packageify utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path operation error
    #[error("Path operation error: {0}")]
    PathOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Directory walk failed part way
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
