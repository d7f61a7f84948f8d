//! Document stream encoder (the packer)

use crate::archive::{
    Archive, Document, CONTENT_CLOSE, CONTENT_OPEN, DOCUMENTS_CLOSE, DOCUMENTS_OPEN, DOCUMENT_CLOSE,
    SOURCE_CLOSE, SOURCE_OPEN,
};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Supplies file content for the packer, keyed by the path string that will
/// appear in the stream.
pub trait ContentSource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;

    /// Where `path` lives, for error messages
    fn locate(&self, path: &str) -> PathBuf {
        PathBuf::from(path)
    }
}

impl<F> ContentSource for F
where
    F: Fn(&str) -> std::io::Result<Vec<u8>>,
{
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self(path)
    }
}

/// Reads files from disk, resolving relative paths against a base directory
#[derive(Debug, Clone)]
pub struct FsSource {
    base: PathBuf,
}

impl FsSource {
    /// Read relative paths from the process working directory
    pub fn new() -> Self {
        Self::with_base(".")
    }

    /// Read relative paths from `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for FsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSource for FsSource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.locate(path))
    }

    fn locate(&self, path: &str) -> PathBuf {
        // Absolute paths replace the base in `join`
        self.base.join(Path::new(path))
    }
}

/// Split a newline-delimited path list. Whitespace around each entry is
/// trimmed and blank lines are ignored.
pub fn parse_path_list(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Encodes documents into the `<documents>` stream format
pub struct Encoder {}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {}
    }

    /// Encode an archive to a string
    pub fn encode(&self, archive: &Archive) -> String {
        let mut output = String::new();
        output.push_str(DOCUMENTS_OPEN);
        output.push('\n');

        for (i, document) in archive.documents.iter().enumerate() {
            self.encode_document(&mut output, i + 1, document);
        }

        output.push_str(DOCUMENTS_CLOSE);
        output.push('\n');
        output
    }

    /// Encode a single document with its 1-based position
    fn encode_document(&self, output: &mut String, index: usize, document: &Document) {
        if document.has_delimiter_conflict() {
            tracing::warn!(
                path = %document.path,
                "document contains a closing delimiter and will not unpack intact"
            );
        }

        output.push_str(&format!("<document index=\"{}\">\n", index));

        output.push_str(SOURCE_OPEN);
        output.push_str(&document.path);
        output.push_str(SOURCE_CLOSE);
        output.push('\n');

        output.push_str(CONTENT_OPEN);
        output.push_str(&document.content);
        output.push_str(CONTENT_CLOSE);
        output.push('\n');

        output.push_str(DOCUMENT_CLOSE);
        output.push('\n');
    }

    /// Encode an archive directly to a writer
    pub fn encode_to_writer<W: Write>(&self, archive: &Archive, mut writer: W) -> Result<()> {
        let encoded = self.encode(archive);
        writer.write_all(encoded.as_bytes()).map_err(Error::Sink)?;
        writer.flush().map_err(Error::Sink)?;
        Ok(())
    }

    /// Read each path from `source` and stream it to `sink` as it goes.
    ///
    /// Stops at the first file that cannot be read or is not UTF-8. Documents
    /// already written stay in the sink; the closing `</documents>` is only
    /// written on success. Returns the number of documents written.
    pub fn pack<I, P, S, W>(&self, paths: I, source: &S, mut sink: W) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
        S: ContentSource + ?Sized,
        W: Write,
    {
        writeln!(sink, "{}", DOCUMENTS_OPEN).map_err(Error::Sink)?;

        let mut count = 0;
        for path in paths {
            let path = path.as_ref();
            let data = source.read(path).map_err(|e| Error::io(source.locate(path), e))?;
            let content = String::from_utf8(data).map_err(|_| Error::Encoding {
                path: source.locate(path),
            })?;

            count += 1;
            let mut chunk = String::new();
            self.encode_document(&mut chunk, count, &Document::new(path, content));
            sink.write_all(chunk.as_bytes()).map_err(Error::Sink)?;

            tracing::debug!(index = count, path, "packed document");
        }

        writeln!(sink, "{}", DOCUMENTS_CLOSE).map_err(Error::Sink)?;
        sink.flush().map_err(Error::Sink)?;
        Ok(count)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
