//! Executor and hook traits wired into the tree.
//!
//! These are the four asynchronous seams of the library: executors
//! ([`Command`]), redirect modifiers ([`RedirectModifier`], synchronous by
//! design), per-node suggestion overrides ([`SuggestionProvider`]), and the
//! dispatcher-level [`ResultConsumer`]. Everything else in the engine is
//! synchronous.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::CommandContext;
use crate::error::CommandError;
use crate::suggest::SuggestionsBuilder;

/// Bounds every caller-provided source value must satisfy.
///
/// Blanket-implemented; callers never implement this by hand. The source is
/// cloned into each execution branch, so forked redirects can hand every
/// branch its own derived value.
pub trait Source: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Source for T {}

// ─── Executors ───────────────────────────────────────────────────────────────

/// An executor attached to a command node.
///
/// The return value is the command's result payload; `None` means the
/// executor completed without a value.
#[async_trait]
pub trait Command<S: Source>: Send + Sync {
    /// Run the command against a frozen context.
    async fn run(&self, ctx: &CommandContext<S>) -> Result<Option<i32>, CommandError>;
}

/// Adapter turning a synchronous closure into a [`Command`].
pub struct FnCommand<F>(pub F);

#[async_trait]
impl<S, F> Command<S> for FnCommand<F>
where
    S: Source,
    F: Fn(&CommandContext<S>) -> Result<Option<i32>, CommandError> + Send + Sync,
{
    async fn run(&self, ctx: &CommandContext<S>) -> Result<Option<i32>, CommandError> {
        (self.0)(ctx)
    }
}

/// Adapter for executors that need to await.
pub struct AsyncCommand<F>(pub F);

#[async_trait]
impl<S, F> Command<S> for AsyncCommand<F>
where
    S: Source,
    F: for<'a> Fn(&'a CommandContext<S>) -> BoxFuture<'a, Result<Option<i32>, CommandError>>
        + Send
        + Sync,
{
    async fn run(&self, ctx: &CommandContext<S>) -> Result<Option<i32>, CommandError> {
        (self.0)(ctx).await
    }
}

// ─── Redirect modifiers ──────────────────────────────────────────────────────

/// Derives the source value(s) a redirect hands to the target subtree.
///
/// Returning more than one source forks the execution: every derived source
/// gets its own branch, and branch failures are collected instead of aborting
/// the whole run.
pub trait RedirectModifier<S: Source>: Send + Sync {
    /// Compute the derived sources from the context at the redirect point.
    fn sources(&self, ctx: &CommandContext<S>) -> Result<Vec<S>, CommandError>;
}

impl<S, F> RedirectModifier<S> for F
where
    S: Source,
    F: Fn(&CommandContext<S>) -> Result<Vec<S>, CommandError> + Send + Sync,
{
    fn sources(&self, ctx: &CommandContext<S>) -> Result<Vec<S>, CommandError> {
        self(ctx)
    }
}

// ─── Suggestion providers ────────────────────────────────────────────────────

/// Per-node completion override for argument nodes.
///
/// When present on a node it replaces the argument type's own
/// `list_suggestions`. Errors are swallowed by the suggestion engine so one
/// failing provider cannot poison the whole completion set.
#[async_trait]
pub trait SuggestionProvider<S: Source>: Send + Sync {
    /// Fill `builder` with completions valid at the builder's anchor.
    async fn suggest(
        &self,
        ctx: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Result<(), CommandError>;
}

#[async_trait]
impl<S, F> SuggestionProvider<S> for F
where
    S: Source,
    F: Fn(&CommandContext<S>, &mut SuggestionsBuilder) -> Result<(), CommandError> + Send + Sync,
{
    async fn suggest(
        &self,
        ctx: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Result<(), CommandError> {
        self(ctx, builder)
    }
}

// ─── Result consumer ─────────────────────────────────────────────────────────

/// Dispatcher-level hook notified after every executor completion.
pub trait ResultConsumer<S: Source>: Send + Sync {
    /// Called with the branch context, whether the executor succeeded, and
    /// its value when it did.
    fn command_complete(&self, ctx: &CommandContext<S>, success: bool, value: Option<i32>);
}

impl<S, F> ResultConsumer<S> for F
where
    S: Source,
    F: Fn(&CommandContext<S>, bool, Option<i32>) + Send + Sync,
{
    fn command_complete(&self, ctx: &CommandContext<S>, success: bool, value: Option<i32>) {
        self(ctx, success, value)
    }
}
