//! Error types for `studio-core`.
//!
//! Asset resolution returns [`CoreResult<T>`], an alias for
//! `Result<T, CoreError>`. The search client has its own error type in
//! [`crate::search::SearchError`].

use std::path::PathBuf;

/// Unified error type for asset operations.
///
/// A missing file is never an error here: the resolver turns it into a
/// fallback. Only faults the caller must tell apart from "not found" get a
/// variant.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The request path is malformed or tries to escape the document root.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The document root does not exist or is not a directory.
    #[error("document root not found: {0}")]
    RootNotFound(PathBuf),

    /// A resource that was selected for serving could not be found when opened.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The fallback document is missing or unreadable.
    #[error("fallback document unavailable: {0}")]
    MissingFallback(String),

    /// The file store could not be reached.
    #[error("file store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Wraps an I/O fault raised while touching `path`.
    pub fn store_unavailable(path: impl Into<String>, source: std::io::Error) -> Self {
        CoreError::StoreUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout `studio-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_path_displays_message() {
        let err = CoreError::InvalidPath("../etc/passwd".to_string());
        assert_eq!(err.to_string(), "invalid request path: ../etc/passwd");
    }

    #[test]
    fn root_not_found_displays_path() {
        let err = CoreError::RootNotFound(PathBuf::from("/srv/missing"));
        assert_eq!(err.to_string(), "document root not found: /srv/missing");
    }

    #[test]
    fn missing_fallback_displays_name() {
        let err = CoreError::MissingFallback("index.html".to_string());
        assert_eq!(err.to_string(), "fallback document unavailable: index.html");
    }

    #[test]
    fn store_unavailable_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = CoreError::store_unavailable("static/app.js", io_err);
        assert!(err.to_string().contains("static/app.js"));
        assert!(err.to_string().contains("disk gone"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn error_is_debug() {
        let err = CoreError::NotFound("app.js".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
