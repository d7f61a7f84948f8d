//! Materializing a document stream under an output root.

use crate::decoder::{Decoder, Entry};
use crate::error::{Error, Result};
use crate::safe_path::{OutputRoot, SafePath};
use std::io::Read;
use std::path::PathBuf;

/// What to do with a document that cannot be unpacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first malformed or unsafe document and return its error.
    #[default]
    Strict,
    /// Skip unsafe documents and keep going. A malformed document still ends
    /// the scan, since nothing after a missing delimiter can be parsed. Both
    /// are recorded in [`UnpackReport::failures`].
    Lenient,
}

/// Options for [`Unpacker`]
#[derive(Debug, Clone, Default)]
pub struct UnpackOptions {
    pub policy: ErrorPolicy,
}

impl UnpackOptions {
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Outcome of an unpack run
#[derive(Debug, Default)]
pub struct UnpackReport {
    /// Files written, in stream order. A path appears once per document that
    /// wrote it.
    pub written: Vec<PathBuf>,
    /// Documents rejected in lenient mode
    pub failures: Vec<Error>,
}

impl UnpackReport {
    /// `true` when no document was rejected
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes the documents of a stream below an [`OutputRoot`]
#[derive(Debug, Clone)]
pub struct Unpacker {
    root: OutputRoot,
    options: UnpackOptions,
    decoder: Decoder,
}

impl Unpacker {
    /// Create an unpacker writing under `root` with default (strict) options
    pub fn new(root: OutputRoot) -> Self {
        Self::with_options(root, UnpackOptions::default())
    }

    pub fn with_options(root: OutputRoot, options: UnpackOptions) -> Self {
        Self {
            root,
            options,
            decoder: Decoder::new(),
        }
    }

    pub fn root(&self) -> &OutputRoot {
        &self.root
    }

    /// Unpack a whole stream held in memory.
    ///
    /// In strict mode the first malformed or unsafe document is returned as
    /// the error; files written before it stay on disk. I/O errors abort in
    /// either mode.
    pub fn unpack_str(&self, input: &str) -> Result<UnpackReport> {
        let mut report = UnpackReport::default();

        for entry in self.decoder.documents(input)? {
            let outcome = entry.and_then(|entry| {
                let target = self.root.resolve(entry.path, entry.index)?;
                Ok((entry, target))
            });

            match outcome {
                Ok((entry, target)) => {
                    self.write_entry(&entry, &target)?;
                    report.written.push(target.as_path().to_path_buf());
                }
                Err(err @ Error::Io { .. }) => return Err(err),
                Err(err) if self.options.policy == ErrorPolicy::Strict => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping document");
                    report.failures.push(err);
                }
            }
        }

        Ok(report)
    }

    /// Read `reader` to the end and unpack it
    pub fn unpack_reader<R: Read>(&self, mut reader: R) -> Result<UnpackReport> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::io("<input>", e))?;
        let input = String::from_utf8(data).map_err(|_| Error::Encoding {
            path: PathBuf::from("<input>"),
        })?;
        self.unpack_str(&input)
    }

    fn write_entry(&self, entry: &Entry<'_>, target: &SafePath) -> Result<()> {
        let path = target.as_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(path, entry.content.as_bytes()).map_err(|e| Error::io(path, e))?;

        tracing::info!(index = entry.index, path = entry.path, "extracted");
        Ok(())
    }
}

/// Unpack `input` under `root` with strict error handling
pub fn unpack(input: &str, root: &OutputRoot) -> Result<UnpackReport> {
    Unpacker::new(root.clone()).unpack_str(input)
}
