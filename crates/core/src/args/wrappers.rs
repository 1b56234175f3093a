//! Combinators over argument types: deferred parsing, separated lists, and
//! primary-with-fallback alternation.

use async_trait::async_trait;

use crate::args::ArgumentType;
use crate::error::{CommandError, ErrorKind, RangeFail};
use crate::reader::{StrReader, ARGUMENT_SEPARATOR};
use crate::suggest::SuggestionsBuilder;

// ─── Lazy ────────────────────────────────────────────────────────────────────

/// Defers the inner type's `parse` to load time.
///
/// `parse` commits an opaque token (everything up to the next separator);
/// the real parse runs inside `load`, after the parser has already chosen
/// this branch. Useful when the inner parse is expensive enough that losing
/// it to backtracking matters.
pub struct LazyArgument<A> {
    inner: A,
}

impl<A: ArgumentType> LazyArgument<A> {
    /// Wrap `inner`.
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: ArgumentType> ArgumentType for LazyArgument<A> {
    type Parsed = String;
    type Loaded = A::Loaded;

    fn parse(&self, reader: &mut StrReader) -> Result<String, CommandError> {
        let raw = reader.read_while(|c| c != ARGUMENT_SEPARATOR).to_owned();
        if raw.is_empty() {
            return Err(reader.error_here(ErrorKind::Expected("value".into())));
        }
        Ok(raw)
    }

    async fn load(&self, parsed: String) -> Result<Self::Loaded, CommandError> {
        let mut reader = StrReader::new(parsed);
        let inner_parsed = self.inner.parse(&mut reader)?;
        if reader.can_read_any() {
            return Err(reader.error_here(ErrorKind::Expected("end of value".into())));
        }
        self.inner.load(inner_parsed).await
    }

    async fn list_suggestions(&self, builder: &mut SuggestionsBuilder) {
        self.inner.list_suggestions(builder).await;
    }

    fn examples(&self) -> Vec<String> {
        self.inner.examples()
    }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// When a list drops duplicate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    /// Keep duplicates.
    None,
    /// Drop duplicates of the parsed form, before load.
    Parsed,
    /// Drop duplicates of the loaded value.
    Loaded,
}

/// Collects one or more inner values separated by a configured character.
///
/// Cardinality is checked against `[min, max]` after deduplication (in
/// whichever phase dedup is configured for). The separator must differ from
/// the argument separator; an unexpected character between elements raises a
/// bad-separator error.
pub struct ListArgument<A> {
    inner: A,
    separator: char,
    min: usize,
    max: usize,
    dedup: Dedup,
}

impl<A: ArgumentType> ListArgument<A> {
    /// A list of `inner` values separated by `separator`, any length ≥ 1.
    pub fn new(inner: A, separator: char) -> Self {
        assert!(
            separator != ARGUMENT_SEPARATOR,
            "list separator cannot be the argument separator"
        );
        Self {
            inner,
            separator,
            min: 1,
            max: usize::MAX,
            dedup: Dedup::None,
        }
    }

    /// Require between `min` and `max` elements (inclusive).
    pub fn bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Configure duplicate elimination.
    pub fn dedup(mut self, mode: Dedup) -> Self {
        self.dedup = mode;
        self
    }

    fn check_bounds(&self, len: usize, reader: Option<&StrReader>, start: usize) -> Result<(), CommandError> {
        let fail = if len < self.min {
            Some(RangeFail::Below)
        } else if len > self.max {
            Some(RangeFail::Above)
        } else {
            None
        };
        let Some(fail) = fail else { return Ok(()) };
        let kind = ErrorKind::Range {
            fail,
            what: "List length".into(),
            got: len.to_string(),
            min: self.min.to_string(),
            max: self.max.to_string(),
        };
        Err(match reader {
            Some(reader) => {
                let mut pinned = reader.clone();
                pinned.set_cursor(start);
                CommandError::with_reader(kind, pinned)
            }
            None => CommandError::new(kind),
        })
    }
}

fn dedup_in_place<T: PartialEq>(items: &mut Vec<T>) {
    let mut i = 0;
    while i < items.len() {
        if items[..i].contains(&items[i]) {
            items.remove(i);
        } else {
            i += 1;
        }
    }
}

#[async_trait]
impl<A> ArgumentType for ListArgument<A>
where
    A: ArgumentType,
    A::Parsed: PartialEq,
    A::Loaded: PartialEq,
{
    type Parsed = Vec<A::Parsed>;
    type Loaded = Vec<A::Loaded>;

    fn parse(&self, reader: &mut StrReader) -> Result<Vec<A::Parsed>, CommandError> {
        let start = reader.cursor();
        let mut items = vec![self.inner.parse(reader)?];
        while let Some(c) = reader.peek() {
            if c == self.separator {
                reader.skip();
                items.push(self.inner.parse(reader)?);
            } else if c == ARGUMENT_SEPARATOR {
                break;
            } else {
                return Err(reader.error_here(ErrorKind::BadSeparator(c)));
            }
        }
        if self.dedup == Dedup::Parsed {
            dedup_in_place(&mut items);
        }
        if self.dedup != Dedup::Loaded {
            self.check_bounds(items.len(), Some(reader), start)?;
        }
        Ok(items)
    }

    async fn load(&self, parsed: Vec<A::Parsed>) -> Result<Vec<A::Loaded>, CommandError> {
        let mut loaded = Vec::with_capacity(parsed.len());
        for item in parsed {
            loaded.push(self.inner.load(item).await?);
        }
        if self.dedup == Dedup::Loaded {
            dedup_in_place(&mut loaded);
            self.check_bounds(loaded.len(), None, 0)?;
        }
        Ok(loaded)
    }

    fn examples(&self) -> Vec<String> {
        let inner = self.inner.examples();
        match inner.as_slice() {
            [] => Vec::new(),
            [only] => vec![only.clone(), format!("{only}{}{only}", self.separator)],
            [first, second, ..] => {
                vec![first.clone(), format!("{first}{}{second}", self.separator)]
            }
        }
    }
}

// ─── Errorable ───────────────────────────────────────────────────────────────

/// Which branch of an [`ErrorableArgument`] produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alternative<P, F> {
    /// The primary type accepted the input.
    Primary(P),
    /// The primary's parse failed; the fallback accepted it.
    Fallback(F),
}

/// Tries a primary type, falling back to a secondary when its *parse* fails.
///
/// A load failure of the committed branch is not retried — by then the raw
/// token is gone.
pub struct ErrorableArgument<A, B> {
    primary: A,
    fallback: B,
}

impl<A: ArgumentType, B: ArgumentType> ErrorableArgument<A, B> {
    /// Combine `primary` with `fallback`.
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<A: ArgumentType, B: ArgumentType> ArgumentType for ErrorableArgument<A, B> {
    type Parsed = Alternative<A::Parsed, B::Parsed>;
    type Loaded = Alternative<A::Loaded, B::Loaded>;

    fn parse(&self, reader: &mut StrReader) -> Result<Self::Parsed, CommandError> {
        let start = reader.cursor();
        match self.primary.parse(reader) {
            Ok(parsed) => Ok(Alternative::Primary(parsed)),
            Err(_) => {
                reader.set_cursor(start);
                self.fallback.parse(reader).map(Alternative::Fallback)
            }
        }
    }

    async fn load(&self, parsed: Self::Parsed) -> Result<Self::Loaded, CommandError> {
        match parsed {
            Alternative::Primary(p) => self.primary.load(p).await.map(Alternative::Primary),
            Alternative::Fallback(f) => self.fallback.load(f).await.map(Alternative::Fallback),
        }
    }

    fn examples(&self) -> Vec<String> {
        let mut examples = self.primary.examples();
        examples.extend(self.fallback.examples());
        examples
    }
}
