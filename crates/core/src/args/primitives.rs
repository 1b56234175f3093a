//! Stock argument types for primitive values.

use std::borrow::Cow;

use crate::args::SimpleArgumentType;
use crate::error::{CommandError, ErrorKind, RangeFail};
use crate::reader::StrReader;

fn range_error(
    reader: &StrReader,
    start: usize,
    fail: RangeFail,
    what: &'static str,
    got: impl ToString,
    min: impl ToString,
    max: impl ToString,
) -> CommandError {
    let mut pinned = reader.clone();
    pinned.set_cursor(start);
    CommandError::with_reader(
        ErrorKind::Range {
            fail,
            what: Cow::Borrowed(what),
            got: got.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        },
        pinned,
    )
}

// ─── Integer ─────────────────────────────────────────────────────────────────

/// Signed integer argument with optional `[min, max]` bounds.
#[derive(Debug, Clone, Copy)]
pub struct IntegerArgument {
    min: i64,
    max: i64,
}

impl IntegerArgument {
    /// An unbounded integer.
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// An integer bounded to `[min, max]` (inclusive).
    pub fn between(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// An integer bounded below.
    pub fn at_least(min: i64) -> Self {
        Self { min, max: i64::MAX }
    }
}

impl Default for IntegerArgument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleArgumentType for IntegerArgument {
    type Value = i64;

    fn parse_value(&self, reader: &mut StrReader) -> Result<i64, CommandError> {
        let start = reader.cursor();
        let value = reader.read_i64()?;
        if value < self.min {
            return Err(range_error(
                reader,
                start,
                RangeFail::Below,
                "Integer",
                value,
                self.min,
                self.max,
            ));
        }
        if value > self.max {
            return Err(range_error(
                reader,
                start,
                RangeFail::Above,
                "Integer",
                value,
                self.min,
                self.max,
            ));
        }
        Ok(value)
    }

    fn examples(&self) -> Vec<String> {
        vec!["0".into(), "123".into(), "-123".into()]
    }
}

// ─── Float ───────────────────────────────────────────────────────────────────

/// Floating-point argument with optional `[min, max]` bounds.
#[derive(Debug, Clone, Copy)]
pub struct FloatArgument {
    min: f64,
    max: f64,
}

impl FloatArgument {
    /// An unbounded float.
    pub fn new() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// A float bounded to `[min, max]` (inclusive).
    pub fn between(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for FloatArgument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleArgumentType for FloatArgument {
    type Value = f64;

    fn parse_value(&self, reader: &mut StrReader) -> Result<f64, CommandError> {
        let start = reader.cursor();
        let value = reader.read_f64()?;
        if value < self.min {
            return Err(range_error(
                reader,
                start,
                RangeFail::Below,
                "Float",
                value,
                self.min,
                self.max,
            ));
        }
        if value > self.max {
            return Err(range_error(
                reader,
                start,
                RangeFail::Above,
                "Float",
                value,
                self.min,
                self.max,
            ));
        }
        Ok(value)
    }

    fn examples(&self) -> Vec<String> {
        vec!["0".into(), "1.2".into(), ".5".into(), "-1".into()]
    }
}

// ─── Bool ────────────────────────────────────────────────────────────────────

/// `true` / `false` argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolArgument;

impl BoolArgument {
    /// A boolean argument.
    pub fn new() -> Self {
        Self
    }
}

impl SimpleArgumentType for BoolArgument {
    type Value = bool;

    fn parse_value(&self, reader: &mut StrReader) -> Result<bool, CommandError> {
        reader.read_bool()
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".into(), "false".into()]
    }
}

// ─── String ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringMode {
    SingleWord,
    QuotedPhrase,
    GreedyPhrase,
}

/// String argument in one of three shapes: a single unquoted word, an
/// optionally-quoted phrase, or the greedy remainder of the input.
#[derive(Debug, Clone, Copy)]
pub struct StringArgument {
    mode: StringMode,
}

impl StringArgument {
    /// A single unquoted word.
    pub fn word() -> Self {
        Self {
            mode: StringMode::SingleWord,
        }
    }

    /// A quoted phrase, or a bare word when unquoted.
    pub fn quoted() -> Self {
        Self {
            mode: StringMode::QuotedPhrase,
        }
    }

    /// Everything up to the end of the input, spaces included.
    pub fn greedy() -> Self {
        Self {
            mode: StringMode::GreedyPhrase,
        }
    }
}

impl SimpleArgumentType for StringArgument {
    type Value = String;

    fn parse_value(&self, reader: &mut StrReader) -> Result<String, CommandError> {
        match self.mode {
            StringMode::SingleWord => Ok(reader.read_unquoted().to_owned()),
            StringMode::QuotedPhrase => reader.read_string(),
            StringMode::GreedyPhrase => {
                let text = reader.remaining().to_owned();
                reader.set_cursor(reader.input().len());
                Ok(text)
            }
        }
    }

    fn examples(&self) -> Vec<String> {
        match self.mode {
            StringMode::SingleWord => vec!["word".into(), "words_with_underscores".into()],
            StringMode::QuotedPhrase => vec!["\"quoted phrase\"".into(), "word".into()],
            StringMode::GreedyPhrase => vec!["word".into(), "words with spaces".into()],
        }
    }
}
