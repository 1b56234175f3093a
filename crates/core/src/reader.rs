//! Cursor over an immutable input buffer.
//!
//! [`StrReader`] is the single reader shared by the parser, the suggestion
//! engine, and every argument type. It is cheap to clone (the buffer is
//! shared, only the cursor is copied), which is how the parser snapshots and
//! rewinds across competing alternatives.

use std::sync::Arc;

use crate::error::{CommandError, ErrorKind};

/// The single character that separates arguments.
pub const ARGUMENT_SEPARATOR: char = ' ';

/// Characters permitted in an unquoted token.
///
/// Anything else (including the argument separator and list separators)
/// terminates the token, which is what lets typed reads compose with list
/// wrappers without lookahead.
fn is_unquoted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-' || c == '.'
}

/// Cursor + shared immutable input string.
#[derive(Debug, Clone)]
pub struct StrReader {
    input: Arc<str>,
    cursor: usize,
}

impl StrReader {
    /// Wrap an input string with the cursor at 0.
    pub fn new(input: impl Into<Arc<str>>) -> Self {
        Self {
            input: input.into(),
            cursor: 0,
        }
    }

    /// The full input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to an absolute byte offset (rewind or fast-forward).
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Whether at least `n` more bytes remain.
    pub fn can_read(&self, n: usize) -> bool {
        self.cursor + n <= self.input.len()
    }

    /// Whether any input remains.
    pub fn can_read_any(&self) -> bool {
        self.can_read(1)
    }

    /// The unread tail of the input.
    pub fn remaining(&self) -> &str {
        &self.input[self.cursor..]
    }

    /// The consumed head of the input.
    pub fn consumed(&self) -> &str {
        &self.input[..self.cursor]
    }

    /// Next character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance past one character.
    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.cursor += c.len_utf8();
        }
    }

    /// Consume characters while `pred` holds, returning the consumed slice.
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &str {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.cursor += c.len_utf8();
        }
        &self.input[start..self.cursor]
    }

    /// The next whitespace-delimited token, without advancing.
    pub fn peek_word(&self) -> &str {
        let rest = self.remaining();
        let end = rest.find(ARGUMENT_SEPARATOR).unwrap_or(rest.len());
        &rest[..end]
    }

    // ── Primitive token reads ───────────────────────────────────────────

    /// Read an unquoted token (see [`is_unquoted`] for the charset).
    ///
    /// May be empty when the next character is not a token character; callers
    /// that require content must check.
    pub fn read_unquoted(&mut self) -> &str {
        self.read_while(is_unquoted)
    }

    /// Read a signed integer.
    pub fn read_i64(&mut self) -> Result<i64, CommandError> {
        let start = self.cursor;
        let text = self.read_while(is_number_char).to_owned();
        match text.parse::<i64>() {
            Ok(n) => Ok(n),
            Err(_) => {
                self.cursor = start;
                Err(self.error_here(ErrorKind::Expected("integer".into())))
            }
        }
    }

    /// Read a floating-point number.
    pub fn read_f64(&mut self) -> Result<f64, CommandError> {
        let start = self.cursor;
        let text = self.read_while(is_number_char).to_owned();
        match text.parse::<f64>() {
            Ok(n) => Ok(n),
            Err(_) => {
                self.cursor = start;
                Err(self.error_here(ErrorKind::Expected("float".into())))
            }
        }
    }

    /// Read `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool, CommandError> {
        let start = self.cursor;
        let value = match self.read_unquoted() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
        value.ok_or_else(|| {
            self.cursor = start;
            self.error_here(ErrorKind::Expected("bool (true or false)".into()))
        })
    }

    /// Read a string token: quoted (with `\` escapes) when the next character
    /// is a quote, unquoted otherwise.
    pub fn read_string(&mut self) -> Result<String, CommandError> {
        match self.peek() {
            Some(c) if is_quote(c) => {
                self.skip();
                self.read_until_quote(c)
            }
            _ => Ok(self.read_unquoted().to_owned()),
        }
    }

    /// Read the body of a quoted string after the opening quote was consumed.
    fn read_until_quote(&mut self, quote: char) -> Result<String, CommandError> {
        let mut out = String::new();
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.skip();
            if escaped {
                if c == quote || c == '\\' {
                    out.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(self.error_here(ErrorKind::Expected("valid escape sequence".into())));
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Ok(out);
            } else {
                out.push(c);
            }
        }
        Err(self.error_here(ErrorKind::Expected("end of quote".into())))
    }

    /// A [`CommandError`] pinned at the current cursor.
    pub fn error_here(&self, kind: ErrorKind) -> CommandError {
        CommandError::with_reader(kind, self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_buffer_but_not_cursor() {
        let mut a = StrReader::new("hello world");
        let b = a.clone();
        a.set_cursor(6);
        assert_eq!(a.remaining(), "world");
        assert_eq!(b.remaining(), "hello world");
    }

    #[test]
    fn peek_word_stops_at_separator_without_advancing() {
        let r = StrReader::new("tp home base");
        assert_eq!(r.peek_word(), "tp");
        assert_eq!(r.cursor(), 0);
    }

    #[test]
    fn read_unquoted_stops_at_foreign_chars() {
        let mut r = StrReader::new("abc,def");
        assert_eq!(r.read_unquoted(), "abc");
        assert_eq!(r.peek(), Some(','));
    }

    #[test]
    fn read_i64_rejects_garbage_and_rewinds() {
        let mut r = StrReader::new("12x");
        // "12" parses; trailing 'x' is simply not part of the token.
        assert_eq!(r.read_i64().unwrap(), 12);
        assert_eq!(r.remaining(), "x");

        let mut r = StrReader::new("--4");
        let err = r.read_i64().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Expected(_)));
        assert_eq!(r.cursor(), 0, "failed read must rewind");
    }

    #[test]
    fn read_quoted_handles_escapes() {
        let mut r = StrReader::new(r#""a \"b\" c" tail"#);
        assert_eq!(r.read_string().unwrap(), "a \"b\" c");
        assert_eq!(r.remaining(), " tail");
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let mut r = StrReader::new("\"oops");
        let err = r.read_string().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Expected(_)));
    }

    #[test]
    fn read_bool_only_accepts_exact_words() {
        let mut r = StrReader::new("truthy");
        assert!(r.read_bool().is_err());
        assert_eq!(r.cursor(), 0);
    }
}
