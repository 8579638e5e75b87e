//! Packageify Transform - Namespace Reorganization Engine
//!
//! Takes a flat directory of source files plus a mapping file of
//! `unit;namespace.path` lines and produces a destination tree where each
//! mapped unit lives under its namespace directory with a rewritten header.
//!
//! Key features:
//! - Mapping-file parsing into ordered records
//! - Namespace declaration and reference-injection headers
//! - Textual cross-reference detection outside quoted literals
//! - Passthrough copy of non-managed files
//! - Dry-run planning and run summaries

#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod definitions;
pub mod engine;
pub mod references;
pub mod types;

// Re-export main types for convenience
pub use config::{DirectoryPolicy, ReorganizerConfig};
pub use definitions::DefinitionTable;
pub use engine::{Reorganizer, RunPaths};
pub use references::detect_references;
pub use types::{Placement, PassthroughAction, Record, ReorganizationPlan, RunSummary};

use std::path::PathBuf;

/// Result type for reorganization operations
pub type Result<T> = std::result::Result<T, PackageifyError>;

/// Coarse error classification, stable for callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    MalformedDefinition,
    MissingUnit,
    Io,
    Config,
}

/// Error types for reorganization operations
#[derive(Debug, thiserror::Error)]
pub enum PackageifyError {
    /// Usage or validation failure detected before any output
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A mapping-file line does not have two non-empty fields
    #[error("Malformed definition on line {line_number}: {reason}: {line:?}")]
    MalformedDefinition {
        line_number: usize,
        line: String,
        reason: String,
    },

    /// A record names a unit with no source file
    #[error("Unit {unit} does not exist at {}", expected.display())]
    MissingUnit { unit: String, expected: PathBuf },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O operation failed on a known path
    #[error("I/O error at {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] packageify_utils::UtilError),
}

impl PackageifyError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackageifyError::InvalidInput(_) => ErrorKind::InvalidInput,
            PackageifyError::MalformedDefinition { .. } => ErrorKind::MalformedDefinition,
            PackageifyError::MissingUnit { .. } => ErrorKind::MissingUnit,
            PackageifyError::Io(_) | PackageifyError::IoAt { .. } => ErrorKind::Io,
            PackageifyError::Config(_) => ErrorKind::Config,
            PackageifyError::Util(packageify_utils::UtilError::Config(_)) => ErrorKind::Config,
            PackageifyError::Util(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PackageifyError::IoAt { path, source }
    }

    pub(crate) fn util_at(path: impl Into<PathBuf>) -> impl FnOnce(packageify_utils::UtilError) -> Self {
        let path = path.into();
        move |err| match err {
            packageify_utils::UtilError::Io(source) => PackageifyError::IoAt { path, source },
            other => PackageifyError::Util(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PackageifyError::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
        let missing = PackageifyError::MissingUnit {
            unit: "Game".into(),
            expected: PathBuf::from("src/Game.java"),
        };
        assert_eq!(missing.kind(), ErrorKind::MissingUnit);
        assert_eq!(missing.to_string(), "Unit Game does not exist at src/Game.java");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(PackageifyError::io_at("out/com")(io).kind(), ErrorKind::Io);
        assert_eq!(
            PackageifyError::Util(packageify_utils::UtilError::Config("bad".into())).kind(),
            ErrorKind::Config
        );
    }
}
