//! Error types for reading and writing encoded trees

use maphist_tree::TreeError;
use std::path::{Path, PathBuf};

/// Errors while decoding or encoding mapping and diff files
///
/// Every decoding error is fatal for the file it occurs in.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// First field is not a known record tag
    #[error("line {line}: unknown record tag '{tag}'")]
    UnknownTag { line: usize, tag: String },

    /// Record has the wrong number of fields
    #[error("line {line}: '{tag}' record expects {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        tag: String,
        expected: String,
        found: usize,
    },

    /// Record is syntactically broken
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Record violates tree ownership rules
    #[error("line {line}: {source}")]
    Structure {
        line: usize,
        #[source]
        source: TreeError,
    },

    /// IO error on a file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding error inside a named file
    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<FormatError>,
    },

    /// No format registered under a name or extension
    #[error("no format registered for '{0}'")]
    UnknownFormat(String),
}

impl FormatError {
    /// Create malformed-record error
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the file the error came from
    #[must_use]
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            Self::Io { .. } | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// Line number of a decoding error
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownTag { line, .. }
            | Self::FieldCount { line, .. }
            | Self::Malformed { line, .. }
            | Self::Structure { line, .. } => Some(*line),
            Self::InFile { source, .. } => source.line(),
            Self::Io { .. } | Self::UnknownFormat(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_file_keeps_line() {
        let err = FormatError::malformed(7, "bad index").in_file(Path::new("1.0.flatmap"));
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.to_string(), "1.0.flatmap: line 7: bad index");
    }

    #[test]
    fn io_errors_are_not_wrapped_twice() {
        let err = FormatError::io("x", std::io::Error::from(std::io::ErrorKind::NotFound))
            .in_file(Path::new("y"));
        assert!(matches!(err, FormatError::Io { .. }));
        assert_eq!(err.line(), None);
    }
}
