//! Error types for sift.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::exclude::RuleError;
use crate::output::OutputError;
use crate::tokens::UnknownEncoding;

/// Top-level error type for conditions that fail a run.
///
/// Missing roots and unreadable files are not errors; they surface as
/// [`ScanWarning`](crate::scan::ScanWarning)s.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error("project root not found: {}", .0.display())]
    ProjectRootNotFound(PathBuf),

    #[error("project root is not a directory: {}", .0.display())]
    ProjectRootNotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid exclusion rule: {0}")]
    Rule(#[from] RuleError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error(transparent)]
    Encoding(#[from] UnknownEncoding),
}

/// Map an error to its exit code.
pub fn exit_code(error: &SiftError) -> i32 {
    match error {
        SiftError::ProjectRootNotFound(_) => 3,
        SiftError::ProjectRootNotADirectory(_) => 3,
        SiftError::Io(_) => 1,
        SiftError::Rule(_) => 2,
        SiftError::Config(_) => 2,
        SiftError::Output(_) => 4,
        SiftError::Encoding(_) => 2,
    }
}
