//! Error types for packing and unpacking document streams.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Why a document path was refused by the safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The normalized path lies outside the output root.
    EscapesRoot {
        /// The normalized absolute path the candidate resolved to.
        resolved: PathBuf,
        /// The output root it was checked against.
        root: PathBuf,
    },
    /// The path contains a NUL byte.
    NulByte,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::EscapesRoot { resolved, root } => {
                write!(f, "resolves to {} outside of {}", resolved.display(), root.display())
            }
            Violation::NulByte => write!(f, "contains a NUL byte"),
        }
    }
}

/// Errors that can occur while packing or unpacking.
#[derive(Error, Debug)]
pub enum Error {
    /// The stream has no `<documents>` wrapper at all.
    #[error("stream does not contain a <documents> tag")]
    MissingPrologue,

    /// A document was started but one of its delimiters never shows up.
    #[error("document {index}: missing {delimiter} before end of stream")]
    Malformed {
        /// 1-based position of the document in the stream.
        index: usize,
        /// The delimiter that was not found.
        delimiter: &'static str,
    },

    /// A document path would be written outside the output root.
    #[error("document {index}: unsafe path '{path}': {violation}")]
    PathUnsafe {
        /// 1-based position of the document in the stream.
        index: usize,
        /// The raw path taken from the stream.
        path: String,
        /// What is wrong with it.
        violation: Violation,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the packed stream to its sink failed.
    #[error("failed to write stream: {0}")]
    Sink(#[source] std::io::Error),

    /// File content is not valid UTF-8.
    #[error("{} is not valid UTF-8", .path.display())]
    Encoding {
        /// The offending file.
        path: PathBuf,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    /// Returns `true` if this error is a refused document path.
    ///
    /// ```
    /// use doctar::{Error, Violation};
    ///
    /// let err = Error::PathUnsafe {
    ///     index: 1,
    ///     path: "\0".to_string(),
    ///     violation: Violation::NulByte,
    /// };
    /// assert!(err.is_security_violation());
    /// assert!(!Error::MissingPrologue.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Error::PathUnsafe { .. })
    }

    /// Position of the document the error belongs to, if any.
    pub fn document_index(&self) -> Option<usize> {
        match self {
            Error::Malformed { index, .. } | Error::PathUnsafe { index, .. } => Some(*index),
            _ => None,
        }
    }
}
