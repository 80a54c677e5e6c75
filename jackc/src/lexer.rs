//! Byte-level scanner for Jack source text.
//!
//! The lexer is a cursor over the whole source with one-byte unread. The
//! `need_*` and `peek_*` primitives skip whitespace and comments to the
//! nearest token; the `read_*` primitives consume the nearest run without
//! skipping. All failures are fatal and carry the rest of the offending
//! source line as context.

use std::fmt;
use std::io;

const PEEK_BUFFER: usize = 80;

/// Fatal compilation failure. No partial output is recovered.
#[derive(Debug)]
pub enum CompileError {
    Io(io::Error),
    Syntax { message: String, context: String },
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            context: context.into(),
        }
    }
}

impl std::error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Syntax { message, context } => write!(f, "{message} at: '{context}'"),
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

pub(crate) fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

/// Identifier bytes: ASCII letters and underscore.
pub(crate) fn is_literal(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

pub(crate) fn is_integer(c: u8) -> bool {
    c.is_ascii_digit()
}

pub struct Lexer {
    buf: Vec<u8>,
    pos: usize,
}

impl Lexer {
    pub fn new(src: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: src.into(),
            pos: 0,
        }
    }

    pub(crate) fn read_byte(&mut self) -> Option<u8> {
        let c = self.buf.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    pub(crate) fn unread_byte(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.buf.get(self.pos + ahead).copied()
    }

    /// Advances past whitespace, `//` comments and `/* ... */` comments.
    /// Returns whether anything was skipped, which callers use as a token
    /// boundary hint.
    pub fn skip_to_char(&mut self) -> bool {
        let mut skipped = false;
        loop {
            let Some(c) = self.peek_byte(0) else {
                return skipped;
            };
            if is_space(c) {
                self.pos += 1;
                skipped = true;
                continue;
            }
            match (c, self.peek_byte(1)) {
                (b'/', Some(b'/')) => {
                    self.skip_line();
                    skipped = true;
                }
                (b'/', Some(b'*')) => {
                    self.skip_multiline_comment();
                    skipped = true;
                }
                _ => return skipped,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.read_byte() {
            if c == b'\n' {
                return;
            }
        }
    }

    // Consumes through the first `*/`. An unterminated comment ends at EOF.
    fn skip_multiline_comment(&mut self) {
        self.pos += 2;
        let mut expect_end = false;
        while let Some(c) = self.read_byte() {
            match c {
                b'*' => expect_end = true,
                b'/' if expect_end => return,
                _ => expect_end = false,
            }
        }
    }

    /// Reads a maximal run of identifier bytes. May be empty.
    pub fn read_literal(&mut self) -> String {
        let start = self.pos;
        while self.peek_byte(0).is_some_and(is_literal) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned()
    }

    /// Reads a maximal run of decimal digits.
    pub fn read_int(&mut self) -> i32 {
        let start = self.pos;
        while self.peek_byte(0).is_some_and(is_integer) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.buf[start..self.pos])
            .parse()
            .unwrap_or(0)
    }

    /// Reads up to and including the next `"`, returning the enclosed
    /// bytes. The opening quote must already be consumed.
    pub fn read_string(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.read_byte() {
            if c == b'"' {
                return String::from_utf8_lossy(&self.buf[start..self.pos - 1]).into_owned();
            }
        }
        String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned()
    }

    /// Skips to the next token and requires a non-empty literal there.
    pub fn need_literal(&mut self) -> Result<String, CompileError> {
        self.skip_to_char();
        let s = self.read_literal();
        if s.is_empty() {
            return Err(self.fail("expecting literal"));
        }
        Ok(s)
    }

    /// Skips to the next token and requires it to be the byte `want`.
    pub fn need_char(&mut self, want: u8) -> Result<(), CompileError> {
        self.skip_to_char();
        match self.read_byte() {
            Some(c) if c == want => Ok(()),
            Some(_) => {
                self.unread_byte();
                Err(self.fail(format!("expecting symbol '{}'", want as char)))
            }
            None => Err(self.fail(format!("expecting symbol '{}'", want as char))),
        }
    }

    /// Next token's first byte without consuming it; 0 at end of input.
    pub fn peek_char(&mut self) -> u8 {
        self.skip_to_char();
        self.peek_byte(0).unwrap_or(0)
    }

    /// Next token's literal without consuming it. Empty when the next
    /// token is not a literal.
    pub fn peek_literal(&mut self) -> String {
        self.skip_to_char();
        let end = (self.pos + PEEK_BUFFER).min(self.buf.len());
        let stop = self.buf[self.pos..end]
            .iter()
            .position(|&c| !is_literal(c))
            .map_or(end, |i| self.pos + i);
        String::from_utf8_lossy(&self.buf[self.pos..stop]).into_owned()
    }

    /// Builds a fatal error whose context is the rest of the current line.
    pub fn fail(&self, message: impl Into<String>) -> CompileError {
        let rest = &self.buf[self.pos.min(self.buf.len())..];
        if rest.is_empty() {
            return CompileError::syntax(message, "end of input");
        }
        let end = rest
            .iter()
            .position(|&c| c == b'\n')
            .unwrap_or(rest.len())
            .min(PEEK_BUFFER);
        let context = String::from_utf8_lossy(&rest[..end]).trim_end().to_string();
        CompileError::syntax(message, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_to_char_over_comments() {
        let input = "
// comment

/* some comment
**
*/
\tfoo";
        let mut lx = Lexer::new(input);
        assert!(lx.skip_to_char());
        assert_eq!(lx.read_literal(), "foo");
    }

    #[test]
    fn test_skip_to_char_nothing_to_skip() {
        let mut lx = Lexer::new("foo");
        assert!(!lx.skip_to_char());
        assert_eq!(lx.read_literal(), "foo");
    }

    #[test]
    fn test_space_literal() {
        let mut lx = Lexer::new("\r\n\r\n  foo");
        assert_eq!(lx.peek_literal(), "foo");
        assert_eq!(lx.need_literal().unwrap(), "foo");
    }

    #[test]
    fn test_newline_char() {
        let mut lx = Lexer::new("\nfoo");
        assert_eq!(lx.peek_char(), b'f');
        lx.need_char(b'f').unwrap();
    }

    #[test]
    fn test_line_comment_before_token() {
        let mut lx = Lexer::new("//some comment\nfoo");
        assert_eq!(lx.peek_literal(), "foo");
        assert_eq!(lx.need_literal().unwrap(), "foo");
    }

    #[test]
    fn test_unterminated_multiline_comment() {
        let mut lx = Lexer::new("/* never closed");
        assert!(lx.skip_to_char());
        assert_eq!(lx.peek_char(), 0);
    }

    #[test]
    fn test_read_int() {
        let mut lx = Lexer::new("12345x");
        assert_eq!(lx.read_int(), 12345);
        assert_eq!(lx.read_literal(), "x");
    }

    #[test]
    fn test_read_string() {
        let mut lx = Lexer::new("hello world\" rest");
        assert_eq!(lx.read_string(), "hello world");
        assert_eq!(lx.peek_char(), b'r');
    }

    #[test]
    fn test_literal_predicate_rejects_punctuation() {
        // '[', '\\', ']', '^', '`' sit between 'Z' and 'a' in ASCII and
        // are not identifier bytes; underscore is.
        let mut lx = Lexer::new("a_b[c");
        assert_eq!(lx.read_literal(), "a_b");
        assert_eq!(lx.peek_char(), b'[');
    }

    #[test]
    fn test_need_literal_failure_has_context() {
        let mut lx = Lexer::new("123 rest of line\nnext");
        let err = lx.need_literal().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expecting literal"));
        assert!(msg.contains("123 rest of line"));
    }

    #[test]
    fn test_need_char_mismatch_does_not_consume() {
        let mut lx = Lexer::new("x");
        assert!(lx.need_char(b'{').is_err());
        assert_eq!(lx.peek_char(), b'x');
    }
}
