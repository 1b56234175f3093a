//! Command grammar tree library.
//!
//! Declaratively build a tree of literal and typed-argument command nodes,
//! parse free-form input against it, execute the matched command, and offer
//! context-sensitive completion suggestions for partial input.  The main
//! entry point is [`CommandDispatcher`]; subtrees are assembled with the
//! [`literal`] and [`argument`] builders.

#![warn(missing_docs)]

/// Argument types: the typed plugin contract and stock implementations.
pub mod args;
/// Executor and hook traits.
pub mod command;
/// Parse contexts: mutable builder and frozen execution view.
pub mod context;
/// The dispatcher façade.
pub mod dispatch;
/// Error hierarchy and source spans.
pub mod error;
/// The parser engine and its result type.
pub mod parse;
/// Cursor over the input buffer.
pub mod reader;
/// Completion suggestions and the suggestion engine.
pub mod suggest;
/// The grammar tree and its fluent builder.
pub mod tree;

mod usage;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Dispatcher
pub use dispatch::{Ambiguity, CommandDispatcher, ExecRecord};

// Tree and builder
pub use tree::{
    argument, literal, BuiltNode, CommandBuilder, CommandNode, Gate, LiteralNames, NodeId,
    RequirementFailure,
};

// Parsing
pub use parse::ParseResults;
pub use reader::{StrReader, ARGUMENT_SEPARATOR};

// Contexts
pub use context::{ArgValue, CommandContext, ContextBuilder, ParsedArgument, ParsedNode};

// Executors and hooks
pub use command::{
    AsyncCommand, Command, FnCommand, RedirectModifier, ResultConsumer, Source, SuggestionProvider,
};

// Argument types
pub use args::{
    Alternative, ArgumentType, BoolArgument, Dedup, ErrorableArgument, FloatArgument,
    IntegerArgument, LazyArgument, ListArgument, SimpleArgumentType, StringArgument,
};

// Suggestions
pub use suggest::{Suggestion, SuggestionKind, Suggestions, SuggestionsBuilder};

// Errors
pub use error::{CommandError, ErrorKind, RangeFail, Span};
