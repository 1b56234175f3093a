//! Argument types: the typed plugin contract and its stock implementations.
//!
//! An argument type splits consumption into a synchronous `parse` (reads the
//! raw token, commits the cursor) and an asynchronous `load` (turns the
//! parsed form into the final value — the place for expensive resolution).
//! The tree stores argument types behind an object-safe erased facade; typed
//! values travel as `Any` and are downcast back at
//! [`CommandContext::argument`](crate::context::CommandContext::argument).

mod primitives;
mod wrappers;

pub use primitives::{BoolArgument, FloatArgument, IntegerArgument, StringArgument};
pub use wrappers::{Alternative, Dedup, ErrorableArgument, LazyArgument, ListArgument};

use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

use crate::context::ArgValue;
use crate::error::CommandError;
use crate::reader::{StrReader, ARGUMENT_SEPARATOR};
use crate::suggest::SuggestionsBuilder;

/// A typed argument parser/loader.
///
/// `Parsed` is the cheap intermediate committed during the parser's descent;
/// `Loaded` is the final value stored in the context. Types whose two forms
/// coincide implement [`SimpleArgumentType`] instead and get the identity
/// `load` for free.
#[async_trait]
pub trait ArgumentType: Send + Sync + 'static {
    /// Intermediate form produced by `parse`.
    type Parsed: Send + Sync + 'static;
    /// Final form produced by `load`.
    type Loaded: Send + Sync + 'static;

    /// Read one argument from the reader, up to the next separator or a
    /// type-specific terminator. On failure the returned error should be
    /// pinned at the offending position.
    fn parse(&self, reader: &mut StrReader) -> Result<Self::Parsed, CommandError>;

    /// Resolve the parsed form into the final value.
    async fn load(&self, parsed: Self::Parsed) -> Result<Self::Loaded, CommandError>;

    /// Fill `builder` with completions. The default offers every example
    /// that begins with the text already typed.
    async fn list_suggestions(&self, builder: &mut SuggestionsBuilder) {
        let remaining = builder.remaining().to_owned();
        for example in self.examples() {
            if example.starts_with(&remaining) {
                builder.suggest(example);
            }
        }
    }

    /// A small finite set of sample inputs, used for default suggestions and
    /// ambiguity detection.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

/// An argument type whose loaded value is its parsed value.
///
/// Blanket-implemented into [`ArgumentType`] with an identity `load`.
pub trait SimpleArgumentType: Send + Sync + 'static {
    /// The single parsed-and-loaded value type.
    type Value: Send + Sync + 'static;

    /// Read one value from the reader.
    fn parse_value(&self, reader: &mut StrReader) -> Result<Self::Value, CommandError>;

    /// Sample inputs; see [`ArgumentType::examples`].
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

#[async_trait]
impl<A: SimpleArgumentType> ArgumentType for A {
    type Parsed = A::Value;
    type Loaded = A::Value;

    fn parse(&self, reader: &mut StrReader) -> Result<Self::Parsed, CommandError> {
        self.parse_value(reader)
    }

    async fn load(&self, parsed: Self::Parsed) -> Result<Self::Loaded, CommandError> {
        Ok(parsed)
    }

    fn examples(&self) -> Vec<String> {
        SimpleArgumentType::examples(self)
    }
}

// ─── Erasure ─────────────────────────────────────────────────────────────────

/// A parsed intermediate in type-erased form.
pub(crate) type ParsedValue = Box<dyn Any + Send + Sync>;

/// Object-safe facade over [`ArgumentType`], stored in argument nodes.
#[async_trait]
pub(crate) trait ErasedArgumentType: Send + Sync {
    fn parse_erased(&self, reader: &mut StrReader) -> Result<ParsedValue, CommandError>;

    async fn load_erased(&self, parsed: ParsedValue) -> Result<ArgValue, CommandError>;

    async fn suggest_erased(&self, builder: &mut SuggestionsBuilder);

    fn examples_erased(&self) -> Vec<String>;

    fn is_valid_input(&self, input: &str) -> bool;
}

#[async_trait]
impl<A: ArgumentType> ErasedArgumentType for A {
    fn parse_erased(&self, reader: &mut StrReader) -> Result<ParsedValue, CommandError> {
        Ok(Box::new(self.parse(reader)?))
    }

    async fn load_erased(&self, parsed: ParsedValue) -> Result<ArgValue, CommandError> {
        let parsed = parsed
            .downcast::<A::Parsed>()
            .expect("parsed value came from this argument type");
        let loaded = self.load(*parsed).await?;
        Ok(Arc::new(loaded))
    }

    async fn suggest_erased(&self, builder: &mut SuggestionsBuilder) {
        self.list_suggestions(builder).await;
    }

    fn examples_erased(&self) -> Vec<String> {
        self.examples()
    }

    fn is_valid_input(&self, input: &str) -> bool {
        let mut reader = StrReader::new(input);
        match self.parse(&mut reader) {
            // Same terminator rule as literals: the match must reach the end
            // of the input or stop at the argument separator.
            Ok(_) => !reader.can_read_any() || reader.peek() == Some(ARGUMENT_SEPARATOR),
            Err(_) => false,
        }
    }
}
