//! Document data structures

use crate::error::{Error, Result};
use std::path::Path;

// Wire format delimiters
pub const DOCUMENTS_OPEN: &str = "<documents>";
pub const DOCUMENTS_CLOSE: &str = "</documents>";
/// Matches `<document index="N">` without looking at the attribute.
pub const DOCUMENT_OPEN: &str = "<document";
pub const DOCUMENT_CLOSE: &str = "</document>";
pub const SOURCE_OPEN: &str = "<source>";
pub const SOURCE_CLOSE: &str = "</source>";
pub const CONTENT_OPEN: &str = "<document_content>";
pub const CONTENT_CLOSE: &str = "</document_content>";

/// A single file inside a document stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path exactly as given by the caller or read from the stream
    pub path: String,
    /// Text content of the file
    pub content: String,
}

impl Document {
    /// Create a new document with the given path and content
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk, keeping `path` as its stream path
    pub fn from_file(path: &Path, stream_path: impl Into<String>) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let content = String::from_utf8(data).map_err(|_| Error::Encoding {
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(stream_path, content))
    }

    /// Whether the content or path contain a delimiter that would break the
    /// stream when unpacked
    pub fn has_delimiter_conflict(&self) -> bool {
        self.path.contains(SOURCE_CLOSE) || self.content.contains(CONTENT_CLOSE)
    }
}

/// An ordered list of documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    /// Documents in stream order
    pub documents: Vec<Document>,
}

impl Archive {
    /// Create a new empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. Duplicate paths are kept; on unpack the later one wins.
    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Add a document from a path on disk, stored under the same path string
    pub fn add_document_from_path(&mut self, path: &str) -> Result<()> {
        let document = Document::from_file(Path::new(path), path)?;
        self.add_document(document);
        Ok(())
    }

    /// Iterate document paths in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for Archive {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}
