//! Fluent construction of command subtrees.
//!
//! Builders assemble detached [`BuiltNode`] trees; registering them with the
//! dispatcher materializes arena nodes and merges into any existing commands
//! of the same name. Builder misuse (children on a redirect, a provider on a
//! literal) is a programming error and panics.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::args::{ArgumentType, ErasedArgumentType};
use crate::command::{
    AsyncCommand, Command, FnCommand, RedirectModifier, Source, SuggestionProvider,
};
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::tree::node::{Gate, NodeId, RequirementFn};

/// A detached node tree produced by a [`CommandBuilder`].
pub struct BuiltNode<S: Source> {
    pub(crate) kind: BuiltKind<S>,
    pub(crate) children: Vec<BuiltNode<S>>,
    pub(crate) command: Option<Arc<dyn Command<S>>>,
    pub(crate) description: Option<String>,
    pub(crate) requirements: Vec<RequirementFn<S>>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<Arc<dyn RedirectModifier<S>>>,
}

pub(crate) enum BuiltKind<S: Source> {
    Literal {
        names: Vec<String>,
    },
    Argument {
        name: String,
        ty: Arc<dyn ErasedArgumentType>,
        provider: Option<Arc<dyn SuggestionProvider<S>>>,
    },
}

impl<S: Source> BuiltNode<S> {
    /// Canonical name (literal text or argument name).
    pub fn name(&self) -> &str {
        match &self.kind {
            BuiltKind::Literal { names } => &names[0],
            BuiltKind::Argument { name, .. } => name,
        }
    }
}

/// One or more literal names: canonical first, aliases after.
pub trait LiteralNames {
    /// The name list; must be non-empty.
    fn into_names(self) -> Vec<String>;
}

impl LiteralNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl LiteralNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> LiteralNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        assert!(N > 0, "a literal needs at least one name");
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl LiteralNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        assert!(!self.is_empty(), "a literal needs at least one name");
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

/// Start building a literal node.
pub fn literal<S: Source>(names: impl LiteralNames) -> CommandBuilder<S> {
    CommandBuilder {
        node: BuiltNode {
            kind: BuiltKind::Literal {
                names: names.into_names(),
            },
            children: Vec::new(),
            command: None,
            description: None,
            requirements: Vec::new(),
            redirect: None,
            modifier: None,
        },
    }
}

/// Start building an argument node with the given argument type.
pub fn argument<S: Source>(name: impl Into<String>, ty: impl ArgumentType) -> CommandBuilder<S> {
    CommandBuilder {
        node: BuiltNode {
            kind: BuiltKind::Argument {
                name: name.into(),
                ty: Arc::new(ty),
                provider: None,
            },
            children: Vec::new(),
            command: None,
            description: None,
            requirements: Vec::new(),
            redirect: None,
            modifier: None,
        },
    }
}

/// Fluent builder for one node and its subtree.
pub struct CommandBuilder<S: Source> {
    node: BuiltNode<S>,
}

impl<S: Source> CommandBuilder<S> {
    /// Add a literal child, configured by `sub`.
    pub fn then_literal(
        self,
        names: impl LiteralNames,
        sub: impl FnOnce(CommandBuilder<S>) -> CommandBuilder<S>,
    ) -> Self {
        self.then(sub(literal(names)))
    }

    /// Add an argument child, configured by `sub`.
    pub fn then_argument(
        self,
        name: impl Into<String>,
        ty: impl ArgumentType,
        sub: impl FnOnce(CommandBuilder<S>) -> CommandBuilder<S>,
    ) -> Self {
        self.then(sub(argument(name, ty)))
    }

    /// Add an already-configured child builder.
    pub fn then(mut self, child: CommandBuilder<S>) -> Self {
        assert!(
            self.node.redirect.is_none(),
            "a redirecting node cannot have children"
        );
        self.node.children.push(child.node);
        self
    }

    /// Attach an executor written as a synchronous closure.
    pub fn executes(
        mut self,
        command: impl Fn(&CommandContext<S>) -> Result<Option<i32>, CommandError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.node.command = Some(Arc::new(FnCommand(command)));
        self
    }

    /// Attach an executor that needs to await.
    pub fn executes_async(
        mut self,
        command: impl for<'a> Fn(&'a CommandContext<S>) -> BoxFuture<'a, Result<Option<i32>, CommandError>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.node.command = Some(Arc::new(AsyncCommand(command)));
        self
    }

    /// Attach any [`Command`] implementation as the executor.
    pub fn executes_command(mut self, command: impl Command<S> + 'static) -> Self {
        self.node.command = Some(Arc::new(command));
        self
    }

    /// Attach a human description (shown in suggestion metadata).
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.node.description = Some(text.into());
        self
    }

    /// Gate the node behind a predicate over the source.
    ///
    /// Accumulating: every added predicate must allow.
    pub fn requires(mut self, predicate: impl Fn(&S) -> Gate + Send + Sync + 'static) -> Self {
        self.node.requirements.push(Arc::new(predicate));
        self
    }

    /// Redirect further parsing to another node in the tree.
    pub fn redirect(mut self, target: NodeId) -> Self {
        assert!(
            self.node.children.is_empty(),
            "a node with children cannot redirect"
        );
        self.node.redirect = Some(target);
        self
    }

    /// Redirect with a modifier deriving the source(s) for the target.
    pub fn redirect_with(
        mut self,
        target: NodeId,
        modifier: impl RedirectModifier<S> + 'static,
    ) -> Self {
        self = self.redirect(target);
        self.node.modifier = Some(Arc::new(modifier));
        self
    }

    /// Override the argument type's suggestions for this node.
    pub fn suggests(mut self, provider: impl SuggestionProvider<S> + 'static) -> Self {
        match &mut self.node.kind {
            BuiltKind::Argument { provider: slot, .. } => *slot = Some(Arc::new(provider)),
            BuiltKind::Literal { .. } => {
                panic!("suggestion providers apply to argument nodes only")
            }
        }
        self
    }

    /// Finish building, yielding the detached node tree.
    pub fn build(self) -> BuiltNode<S> {
        self.node
    }
}
