//! Error hierarchy and source spans.
//!
//! Every failure the parser, dispatcher, or an argument type can produce is a
//! [`CommandError`]: an [`ErrorKind`] plus an optional reader pinned at the
//! offending position, so consumers can underline the exact substring that
//! caused the failure.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::reader::StrReader;

// ─── Span ────────────────────────────────────────────────────────────────────

/// Byte span in the original input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// The smallest span containing both `a` and `b`.
    pub fn encompassing(a: Span, b: Span) -> Self {
        Self {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    /// Whether the span covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether `pos` lies inside the span (both endpoints inclusive).
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// The covered slice of `input`, clamped to the input length.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        let start = self.start.min(input.len());
        let end = self.end.min(input.len()).max(start);
        &input[start..end]
    }
}

// ─── Error kinds ─────────────────────────────────────────────────────────────

/// Which bound a range violation crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeFail {
    /// The value fell below the minimum.
    Below,
    /// The value exceeded the maximum.
    Above,
}

impl RangeFail {
    fn adverb(&self) -> &'static str {
        match self {
            RangeFail::Below => "less",
            RangeFail::Above => "more",
        }
    }

    fn limit<'a>(&self, min: &'a str, max: &'a str) -> &'a str {
        match self {
            RangeFail::Below => min,
            RangeFail::Above => max,
        }
    }
}

/// Classification of a command failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A token of the named kind was required but absent or malformed.
    #[error("Expected {0}")]
    Expected(Cow<'static, str>),
    /// Nothing at the current position matched (end-of-parse semantic error).
    #[error("Unknown {0}")]
    Unknown(Cow<'static, str>),
    /// A parsed token must be followed by the argument separator.
    #[error("Expected whitespace to end one argument, but found trailing data")]
    ExpectedArgumentSeparator,
    /// The source failed a node's requirement predicate, with a stated reason.
    #[error("{0}")]
    RequirementFailed(String),
    /// Input did not match the expected literal.
    #[error("Expected literal {0}")]
    Literal(String),
    /// A list argument encountered a separator other than the configured one.
    #[error("Bad list separator {0:?}")]
    BadSeparator(char),
    /// A numeric value or list cardinality violated its `[min, max]` bounds.
    #[error("{what} must not be {} than {}, found {got}", .fail.adverb(), .fail.limit(.min, .max))]
    Range {
        /// Which bound was crossed.
        fail: RangeFail,
        /// What was being bounded ("Integer", "List length", ...).
        what: Cow<'static, str>,
        /// The offending value, rendered.
        got: String,
        /// Lower bound, rendered.
        min: String,
        /// Upper bound, rendered.
        max: String,
    },
    /// Free-form failure raised by an argument type, loader, or executor.
    #[error("{0}")]
    Message(String),
}

// ─── CommandError ────────────────────────────────────────────────────────────

/// How many characters of trailing context to show before `<--[HERE]`.
const CONTEXT_AMOUNT: usize = 10;

/// A user-displayable command failure.
///
/// Carries the [`ErrorKind`] plus an optional [`StrReader`] whose cursor marks
/// where the failure occurred. When `should_rewind` is `false`, the reader is
/// pinned somewhere *inside* the failed token and callers backtracking over
/// the failure must restore their cursor to the pinned position rather than
/// to the token start.
#[derive(Debug, Clone)]
pub struct CommandError {
    kind: ErrorKind,
    reader: Option<StrReader>,
    rewind: bool,
}

impl CommandError {
    /// A failure with no position information.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            reader: None,
            rewind: true,
        }
    }

    /// A failure pinned at the reader's current cursor.
    pub fn with_reader(kind: ErrorKind, reader: StrReader) -> Self {
        Self {
            kind,
            reader: Some(reader),
            rewind: true,
        }
    }

    /// A free-form failure message (argument loaders, executors).
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message(text.into()))
    }

    /// Mark that backtracking must keep the pinned cursor instead of
    /// restoring the pre-parse position.
    pub fn keep_cursor(mut self) -> Self {
        self.rewind = false;
        self
    }

    /// Attach a pinned reader if none is present yet.
    pub(crate) fn or_pin(mut self, reader: &StrReader, cursor: usize) -> Self {
        if self.reader.is_none() {
            let mut pinned = reader.clone();
            pinned.set_cursor(cursor);
            self.reader = Some(pinned);
        }
        self
    }

    /// The failure classification.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The reader pinned at the failure position, if any.
    pub fn reader(&self) -> Option<&StrReader> {
        self.reader.as_ref()
    }

    /// Byte offset of the failure, if position information is available.
    pub fn cursor(&self) -> Option<usize> {
        self.reader.as_ref().map(|r| r.cursor())
    }

    /// Whether callers should restore their cursor to the pre-parse position
    /// when backtracking over this failure.
    pub fn should_rewind(&self) -> bool {
        self.rewind
    }

    /// The trailing input context before the failure position, for display.
    fn context(&self) -> Option<String> {
        let reader = self.reader.as_ref()?;
        let input = reader.input();
        let cursor = reader.cursor().min(input.len());
        let mut out = String::new();
        if cursor > CONTEXT_AMOUNT {
            out.push('…');
        }
        let start = cursor.saturating_sub(CONTEXT_AMOUNT);
        // Clamp to a char boundary so multi-byte input cannot split.
        let start = (start..=cursor)
            .find(|&i| input.is_char_boundary(i))
            .unwrap_or(cursor);
        out.push_str(&input[start..cursor]);
        out.push_str("<--[HERE]");
        Some(out)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ctx) = self.context() {
            write!(f, " at position {}: {}", self.cursor().unwrap_or(0), ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandError {}

impl From<ErrorKind> for CommandError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_encompassing_takes_extremes() {
        let s = Span::encompassing(Span::new(2, 4), Span::new(3, 9));
        assert_eq!(s, Span::new(2, 9));
    }

    #[test]
    fn display_appends_cursor_context() {
        let mut reader = StrReader::new("foo barbazqux");
        reader.set_cursor(13);
        let err = CommandError::with_reader(ErrorKind::Expected("integer".into()), reader);
        let text = err.to_string();
        assert!(
            text.contains("… barbazqux<--[HERE]"),
            "context missing from {text:?}"
        );
        assert!(text.starts_with("Expected integer"), "got {text:?}");
    }

    #[test]
    fn range_error_picks_the_crossed_bound() {
        let kind = ErrorKind::Range {
            fail: RangeFail::Above,
            what: "Integer".into(),
            got: "12".into(),
            min: "0".into(),
            max: "9".into(),
        };
        assert_eq!(kind.to_string(), "Integer must not be more than 9, found 12");
    }
}
