//! Parse contexts: the mutable builder the parser accumulates into, and the
//! immutable context executors and suggestion providers receive.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{Command, RedirectModifier, Source};
use crate::error::{CommandError, ErrorKind, Span};
use crate::tree::NodeId;

/// A loaded argument value, type-erased for storage in the context.
pub type ArgValue = Arc<dyn Any + Send + Sync>;

/// One parsed argument: the input range it was read from and its loaded value.
#[derive(Clone)]
pub struct ParsedArgument {
    /// Byte range of the raw token in the original input.
    pub span: Span,
    /// The value produced by the argument type's `load`.
    pub value: ArgValue,
}

/// One traversed node and the input range it consumed.
#[derive(Debug, Clone, Copy)]
pub struct ParsedNode {
    /// The traversed node.
    pub node: NodeId,
    /// The range the node's `parse` consumed.
    pub span: Span,
}

/// Where the suggestion engine should anchor completions for a cursor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SuggestionAnchor {
    /// Node whose children are offered.
    pub parent: NodeId,
    /// Byte offset where the completion range starts.
    pub start: usize,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Mutable parse state accumulated during the parser's descent.
///
/// Copied cheaply for every attempted alternative (argument values are
/// shared behind [`Arc`]); frozen into a [`CommandContext`] via [`build`].
///
/// [`build`]: ContextBuilder::build
pub struct ContextBuilder<S: Source> {
    source: S,
    root: NodeId,
    arguments: HashMap<String, ParsedArgument>,
    nodes: Vec<ParsedNode>,
    command: Option<Arc<dyn Command<S>>>,
    modifier: Option<Arc<dyn RedirectModifier<S>>>,
    range: Span,
    child: Option<Box<ContextBuilder<S>>>,
}

impl<S: Source> Clone for ContextBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            root: self.root,
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            command: self.command.clone(),
            modifier: self.modifier.clone(),
            range: self.range,
            child: self.child.clone(),
        }
    }
}

impl<S: Source> ContextBuilder<S> {
    /// A fresh builder rooted at `root`, starting at byte offset `start`.
    pub fn new(source: S, root: NodeId, start: usize) -> Self {
        Self {
            source,
            root,
            arguments: HashMap::new(),
            nodes: Vec::new(),
            command: None,
            modifier: None,
            range: Span::at(start),
            child: None,
        }
    }

    /// The source value this parse runs for.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The node this builder descends from (the tree root, or a redirect
    /// target for child builders).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Overall input range covered so far.
    pub fn range(&self) -> Span {
        self.range
    }

    /// Traversed `(node, range)` pairs, in descent order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// The nested builder opened by a redirect, if any.
    pub fn child(&self) -> Option<&ContextBuilder<S>> {
        self.child.as_deref()
    }

    pub(crate) fn with_argument(&mut self, name: String, argument: ParsedArgument) {
        self.arguments.insert(name, argument);
    }

    pub(crate) fn with_command(&mut self, command: Option<Arc<dyn Command<S>>>) {
        self.command = command;
    }

    pub(crate) fn with_node(
        &mut self,
        node: NodeId,
        span: Span,
        modifier: Option<Arc<dyn RedirectModifier<S>>>,
    ) {
        self.nodes.push(ParsedNode { node, span });
        self.range = Span::encompassing(self.range, span);
        self.modifier = modifier;
    }

    pub(crate) fn with_child(&mut self, child: ContextBuilder<S>) {
        self.child = Some(Box::new(child));
    }

    /// Freeze into an immutable [`CommandContext`] over `input`.
    pub fn build(&self, input: &str) -> CommandContext<S> {
        CommandContext {
            source: self.source.clone(),
            input: input.to_owned(),
            arguments: self.arguments.clone(),
            command: self.command.clone(),
            root: self.root,
            nodes: self.nodes.clone(),
            range: self.range,
            modifier: self.modifier.clone(),
            child: self.child.as_ref().map(|c| Arc::new(c.build(input))),
        }
    }

    /// Locate the node whose children complete the input at `cursor`.
    ///
    /// Recurses into the redirect child when the cursor lies past this
    /// builder's range; inside the range, the parent is the node *preceding*
    /// the one whose range contains the cursor. Returns `None` only when the
    /// cursor precedes the builder's start, which a cursor clamped to the
    /// input cannot produce.
    pub(crate) fn find_suggestion_anchor(&self, cursor: usize) -> Option<SuggestionAnchor> {
        if self.range.start > cursor {
            return None;
        }
        if self.range.end < cursor {
            if let Some(child) = &self.child {
                return child.find_suggestion_anchor(cursor);
            }
            return Some(match self.nodes.last() {
                Some(last) => SuggestionAnchor {
                    parent: last.node,
                    start: last.span.end + 1,
                },
                None => SuggestionAnchor {
                    parent: self.root,
                    start: self.range.start,
                },
            });
        }
        let mut prev = self.root;
        for parsed in &self.nodes {
            if parsed.span.contains(cursor) {
                return Some(SuggestionAnchor {
                    parent: prev,
                    start: parsed.span.start,
                });
            }
            prev = parsed.node;
        }
        Some(SuggestionAnchor {
            parent: prev,
            start: self.range.start,
        })
    }
}

// ─── Frozen context ──────────────────────────────────────────────────────────

/// Immutable view of one parse branch, handed to executors, redirect
/// modifiers, and suggestion providers.
pub struct CommandContext<S: Source> {
    source: S,
    input: String,
    arguments: HashMap<String, ParsedArgument>,
    command: Option<Arc<dyn Command<S>>>,
    root: NodeId,
    nodes: Vec<ParsedNode>,
    range: Span,
    modifier: Option<Arc<dyn RedirectModifier<S>>>,
    child: Option<Arc<CommandContext<S>>>,
}

impl<S: Source> Clone for CommandContext<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            input: self.input.clone(),
            arguments: self.arguments.clone(),
            command: self.command.clone(),
            root: self.root,
            nodes: self.nodes.clone(),
            range: self.range,
            modifier: self.modifier.clone(),
            child: self.child.clone(),
        }
    }
}

impl<S: Source> CommandContext<S> {
    /// The source value for this branch.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The input the context was built over (truncated for suggestions).
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Overall input range this context covers.
    pub fn range(&self) -> Span {
        self.range
    }

    /// Traversed `(node, range)` pairs, in descent order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// Whether the parser traversed any node in this context.
    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// The redirect child context, when a redirect was taken.
    pub fn child(&self) -> Option<&CommandContext<S>> {
        self.child.as_deref()
    }

    pub(crate) fn command(&self) -> Option<&Arc<dyn Command<S>>> {
        self.command.as_ref()
    }

    pub(crate) fn modifier(&self) -> Option<&Arc<dyn RedirectModifier<S>>> {
        self.modifier.as_ref()
    }

    /// The raw `(range, value)` entry for a named argument, if parsed.
    pub fn parsed_argument(&self, name: &str) -> Option<&ParsedArgument> {
        self.arguments.get(name)
    }

    /// The loaded value of a named argument, downcast to `T`.
    ///
    /// The builder guarantees one type per argument name, so a mismatch here
    /// is a caller bug; it is reported as an error rather than a panic.
    pub fn argument<T: Any + Send + Sync>(&self, name: &str) -> Result<&T, CommandError> {
        let parsed = self
            .arguments
            .get(name)
            .ok_or_else(|| CommandError::new(ErrorKind::Unknown(format!("argument {name}").into())))?;
        parsed.value.downcast_ref::<T>().ok_or_else(|| {
            CommandError::message(format!("argument {name} has a different type"))
        })
    }

    /// The same context re-rooted on a different source (forked execution).
    pub fn copy_for(&self, source: S) -> Self {
        let mut copy = self.clone();
        copy.source = source;
        copy
    }
}
