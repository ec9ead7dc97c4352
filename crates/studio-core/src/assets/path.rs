//! Normalized request paths relative to the document root.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A slash-separated path relative to the document root.
///
/// Never starts with a slash. Empty and `.` segments are dropped while a
/// trailing slash is kept, so `/api/` normalizes to `api/` and still matches
/// an `api/` exclusion prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestPath(pub(crate) String);

impl RequestPath {
    /// Normalizes a decoded request path.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidPath`] if the path contains a `..` segment, a
    /// backslash or a NUL byte.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if raw.contains('\\') || raw.contains('\0') {
            return Err(CoreError::InvalidPath(raw.to_string()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(CoreError::InvalidPath(raw.to_string())),
                s => segments.push(s),
            }
        }

        let mut normalized = segments.join("/");
        if !normalized.is_empty() && raw.ends_with('/') {
            normalized.push('/');
        }
        Ok(Self(normalized))
    }

    /// The document root itself (`""` or `"/"` before normalization).
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this path denotes a directory (trailing slash).
    pub fn is_dir_like(&self) -> bool {
        self.0.ends_with('/')
    }
}

impl AsRef<str> for RequestPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_slash() {
        let path = RequestPath::parse("/static/app.js").unwrap();
        assert_eq!(path.as_str(), "static/app.js");
    }

    #[test]
    fn collapses_empty_and_dot_segments() {
        let path = RequestPath::parse("//static/./js//app.js").unwrap();
        assert_eq!(path.as_str(), "static/js/app.js");
    }

    #[test]
    fn keeps_trailing_slash() {
        let path = RequestPath::parse("/api/").unwrap();
        assert_eq!(path.as_str(), "api/");
        assert!(path.is_dir_like());
    }

    #[test]
    fn empty_and_slash_are_root() {
        assert!(RequestPath::parse("").unwrap().is_root());
        assert!(RequestPath::parse("/").unwrap().is_root());
        assert!(RequestPath::parse("//").unwrap().is_root());
        assert_eq!(RequestPath::root(), RequestPath::parse("/").unwrap());
    }

    #[test]
    fn rejects_parent_segments() {
        let err = RequestPath::parse("static/../../etc/passwd").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath(_)));
    }

    #[test]
    fn rejects_backslash_and_nul() {
        assert!(RequestPath::parse("static\\app.js").is_err());
        assert!(RequestPath::parse("app\0.js").is_err());
    }

    #[test]
    fn dots_inside_names_are_fine() {
        let path = RequestPath::parse("assets/app..min.js").unwrap();
        assert_eq!(path.as_str(), "assets/app..min.js");
    }

    #[test]
    fn display_matches_as_str() {
        let path = RequestPath::parse("dashboard/settings").unwrap();
        assert_eq!(path.to_string(), "dashboard/settings");
    }
}
