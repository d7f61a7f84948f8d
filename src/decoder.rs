//! Document stream decoder

use crate::archive::{
    Archive, Document, CONTENT_CLOSE, CONTENT_OPEN, DOCUMENTS_OPEN, DOCUMENT_OPEN, SOURCE_CLOSE,
    SOURCE_OPEN,
};
use crate::error::{Error, Result};
use crate::scanner::{NotFound, Scanner};

/// A document as it appears in the stream, borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// 1-based position in the stream
    pub index: usize,
    /// Raw text between `<source>` and `</source>`
    pub path: &'a str,
    /// Raw text between `<document_content>` and `</document_content>`
    pub content: &'a str,
}

impl Entry<'_> {
    pub fn to_document(&self) -> Document {
        Document::new(self.path, self.content)
    }
}

/// Decodes a `<documents>` stream
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Fail when the stream has no `<documents>` tag instead of reading it as empty
    require_prologue: bool,
}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self { require_prologue: true }
    }

    /// Set whether a missing `<documents>` tag is an error (the default) or
    /// an empty stream
    pub fn with_require_prologue(mut self, require: bool) -> Self {
        self.require_prologue = require;
        self
    }

    /// Start scanning `input`, returning an iterator over its documents.
    ///
    /// The iterator ends cleanly when no further `<document` marker exists.
    /// A document that was opened but is missing one of its delimiters yields
    /// [`Error::Malformed`] and then ends the iteration.
    pub fn documents<'a>(&self, input: &'a str) -> Result<Documents<'a>> {
        let mut scanner = Scanner::new(input);
        let done = match scanner.read_until(DOCUMENTS_OPEN) {
            Ok(_) => false,
            Err(_) if self.require_prologue => return Err(Error::MissingPrologue),
            Err(_) => true,
        };

        Ok(Documents { scanner, index: 0, done })
    }

    /// Decode a whole stream into an archive, failing on the first malformed
    /// document. Paths are not validated here.
    pub fn decode(&self, input: &str) -> Result<Archive> {
        let mut archive = Archive::new();
        for entry in self.documents(input)? {
            let entry = entry?;
            tracing::debug!(index = entry.index, path = entry.path, "decoded document");
            archive.add_document(entry.to_document());
        }
        Ok(archive)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the documents of a stream, see [`Decoder::documents`]
#[derive(Debug, Clone)]
pub struct Documents<'a> {
    scanner: Scanner<'a>,
    index: usize,
    done: bool,
}

impl<'a> Documents<'a> {
    /// Read the source and content of the document whose `<document` marker
    /// was just consumed
    fn read_document(&mut self) -> Result<Entry<'a>> {
        let index = self.index;
        let malformed = move |miss: NotFound| Error::Malformed {
            index,
            delimiter: miss.target,
        };

        self.scanner.read_until(SOURCE_OPEN).map_err(malformed)?;
        let path = self.scanner.read_until(SOURCE_CLOSE).map_err(malformed)?;

        self.scanner.read_until(CONTENT_OPEN).map_err(malformed)?;
        let content = self.scanner.read_until(CONTENT_CLOSE).map_err(malformed)?;

        Ok(Entry { index, path, content })
    }
}

impl<'a> Iterator for Documents<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // The only clean way out: no more document markers
        if self.scanner.read_until(DOCUMENT_OPEN).is_err() {
            self.done = true;
            return None;
        }

        self.index += 1;
        let result = self.read_document();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for Documents<'_> {}
