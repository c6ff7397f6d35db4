//! Error types shared by every engine operation.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failure kinds surfaced to the route/CLI layer.
///
/// A missing file is never an error at any layer; readers turn it into an
/// empty servers map before any of these variants can be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown client id, or a server name absent where one is required.
    #[error("{0}")]
    NotFound(String),

    /// An existing file is not valid for its declared format.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Any filesystem failure other than "does not exist".
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input, e.g. a batch request missing required fields.
    #[error("{0}")]
    Validation(String),
}

impl ConfigError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable lowercase tag for programmatic handling.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
            Self::Validation(_) => "validation",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ConfigError::not_found("x").kind(), "not_found");
        assert_eq!(ConfigError::validation("x").kind(), "validation");
        assert_eq!(ConfigError::parse(Path::new("a.json"), "bad").kind(), "parse");
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ConfigError::io("Failed to read", Path::new("a"), io).kind(), "io");
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = ConfigError::parse(Path::new("/tmp/client.json"), "expected value");
        assert_eq!(
            err.to_string(),
            "Failed to parse /tmp/client.json: expected value"
        );
    }
}
