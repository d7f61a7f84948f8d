//! Forward-only literal scanner over an in-memory stream

/// A delimiter was not found between the cursor and the end of the buffer.
///
/// This is the only signal the scanner produces. Callers decide whether a miss
/// means "end of stream" or "malformed document".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound {
    /// The literal that was searched for
    pub target: &'static str,
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' not found", self.target)
    }
}

impl std::error::Error for NotFound {}

/// Cursor over a text buffer that only ever moves forward
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `data`
    pub fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset of the cursor
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the cursor has reached the end of the buffer
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Find `target` at or after the cursor, move the cursor just past it and
    /// return the text that was skipped over.
    ///
    /// On a miss the cursor does not move.
    ///
    /// ```
    /// use doctar::scanner::Scanner;
    ///
    /// let mut scanner = Scanner::new("<source>a.txt</source>rest");
    /// assert_eq!(scanner.read_until("<source>").unwrap(), "");
    /// assert_eq!(scanner.read_until("</source>").unwrap(), "a.txt");
    /// assert!(scanner.read_until("<source>").is_err());
    /// ```
    pub fn read_until(&mut self, target: &'static str) -> Result<&'a str, NotFound> {
        // `pos` always sits on a char boundary: it only ever lands right after a
        // matched literal.
        let rest = &self.data[self.pos..];
        let found = rest.find(target).ok_or(NotFound { target })?;

        let skipped = &rest[..found];
        self.pos += found + target.len();
        Ok(skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_returns_skipped_text() {
        let mut scanner = Scanner::new("abc<x>def<y>");
        assert_eq!(scanner.read_until("<x>"), Ok("abc"));
        assert_eq!(scanner.position(), 6);
        assert_eq!(scanner.read_until("<y>"), Ok("def"));
        assert!(scanner.is_exhausted());
    }

    #[test]
    fn test_read_until_miss_keeps_position() {
        let mut scanner = Scanner::new("abc<x>def");
        scanner.read_until("<x>").unwrap();
        let err = scanner.read_until("<y>").unwrap_err();
        assert_eq!(err.target, "<y>");
        assert_eq!(scanner.position(), 6);
    }

    #[test]
    fn test_read_until_never_backtracks() {
        let mut scanner = Scanner::new("<a>1<a>2");
        assert_eq!(scanner.read_until("<a>"), Ok(""));
        assert_eq!(scanner.read_until("<a>"), Ok("1"));
        assert!(scanner.read_until("<a>").is_err());
    }

    #[test]
    fn test_document_prefix_does_not_match_closing_tag() {
        let mut scanner = Scanner::new("</document></documents>");
        assert!(scanner.read_until("<document").is_err());
    }

    #[test]
    fn test_multibyte_text() {
        let mut scanner = Scanner::new("héllo<x>世界<y>");
        assert_eq!(scanner.read_until("<x>"), Ok("héllo"));
        assert_eq!(scanner.read_until("<y>"), Ok("世界"));
    }

    #[test]
    fn test_not_found_display() {
        let err = NotFound { target: "</source>" };
        assert_eq!(err.to_string(), "'</source>' not found");
    }
}
