//! # doctar
//!
//! Pack a list of text files into one `<documents>` stream and unpack such a
//! stream back into files, without ever writing outside the output directory.
//!
//! ## Stream Format
//!
//! ```text
//! <documents>
//! <document index="1">
//! <source>src/main.rs</source>
//! <document_content>fn main() {}
//! </document_content>
//! </document>
//! </documents>
//! ```
//!
//! The `index` attribute is informational and never read back. Nothing is
//! escaped: a path containing `</source>` or content containing
//! `</document_content>` does not survive a round trip.
//!
//! ## Unpacking
//!
//! The decoder is a forward-only literal scanner over the whole buffer. The
//! end of the stream is detected only when no further `<document` marker
//! exists; a document that is opened but never closed is reported as
//! [`Error::Malformed`]. Every path is normalized lexically against an explicit
//! [`OutputRoot`] and refused with [`Error::PathUnsafe`] if it escapes it.
//!
//! ```no_run
//! use doctar::{OutputRoot, Unpacker};
//!
//! # fn main() -> doctar::Result<()> {
//! let root = OutputRoot::new("/tmp/out")?;
//! let report = Unpacker::new(root).unpack_str(
//!     "<documents><document index=\"1\"><source>a.txt</source>\
//!      <document_content>hello</document_content></document></documents>",
//! )?;
//! assert_eq!(report.written.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod safe_path;
pub mod scanner;
pub mod unpack;

pub use archive::{Archive, Document};
pub use decoder::{Decoder, Documents, Entry};
pub use encoder::{parse_path_list, ContentSource, Encoder, FsSource};
pub use error::{Error, Result, Violation};
pub use safe_path::{OutputRoot, SafePath};
pub use unpack::{unpack, ErrorPolicy, UnpackOptions, UnpackReport, Unpacker};
