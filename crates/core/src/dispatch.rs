//! The dispatcher façade: owns the tree, registers commands, and drives
//! parse, execution (including redirects and forks), suggestions, usage, and
//! ambiguity reporting.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{ResultConsumer, Source};
use crate::context::CommandContext;
use crate::error::{CommandError, ErrorKind};
use crate::parse::{parse_input, ParseResults};
use crate::suggest::{completion_suggestions, Suggestions};
use crate::tree::{BuiltNode, CommandBuilder, CommandNode, NodeId, Tree, ROOT};
use crate::usage;

/// Outcome of one execution branch.
#[derive(Debug)]
pub enum ExecRecord {
    /// The branch's executor completed.
    Success {
        /// The executor's result payload, when it produced one.
        value: Option<i32>,
    },
    /// The branch failed (only collected under forked execution).
    Failure {
        /// The error the branch raised.
        error: CommandError,
    },
}

impl ExecRecord {
    /// Whether this branch succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ExecRecord::Success { .. })
    }
}

/// One ambiguity found by [`CommandDispatcher::find_ambiguities`]: an example
/// of `child` that `sibling` would also accept.
#[derive(Debug, Clone)]
pub struct Ambiguity {
    /// The node whose children overlap.
    pub parent: NodeId,
    /// The child whose examples were probed.
    pub child: NodeId,
    /// The sibling that also accepts them.
    pub sibling: NodeId,
    /// The overlapping examples.
    pub inputs: Vec<String>,
}

/// The entry point: a registry of commands plus the parse / execute /
/// suggest operations over it.
///
/// Registration must not race with parses of the same dispatcher; parses
/// against an unchanging dispatcher may run concurrently.
pub struct CommandDispatcher<S: Source> {
    tree: Tree<S>,
    consumer: Option<Arc<dyn ResultConsumer<S>>>,
}

impl<S: Source> Default for CommandDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Source> CommandDispatcher<S> {
    /// An empty dispatcher.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            consumer: None,
        }
    }

    /// Handle of the implicit root node.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Read-only access to a node.
    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        self.tree.node(id)
    }

    /// Install a hook notified after every executor completion.
    pub fn set_consumer(&mut self, consumer: impl ResultConsumer<S> + 'static) {
        self.consumer = Some(Arc::new(consumer));
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Register a command subtree under the root.
    ///
    /// Merges with an existing top-level command of the same name (the
    /// incoming executor wins, grandchildren are folded in) and returns the
    /// handle of the resulting node.
    pub fn register(&mut self, builder: CommandBuilder<S>) -> NodeId {
        self.register_built(builder.build())
    }

    /// Register an already-built node tree under the root.
    pub fn register_built(&mut self, node: BuiltNode<S>) -> NodeId {
        self.tree.add_child(ROOT, node)
    }

    /// Remove a previously registered subtree.
    ///
    /// Returns `false` when `node` is the root or is not linked in the tree.
    pub fn unregister(&mut self, node: NodeId) -> bool {
        self.tree.unlink(node)
    }

    // ── Parse ───────────────────────────────────────────────────────────

    /// Parse `input` for `source`.
    ///
    /// Never fails as such: rejected alternatives are collected in the
    /// result's error map, and execution decides what to surface.
    pub async fn parse(&self, input: &str, source: S) -> ParseResults<S> {
        parse_input(&self.tree, ROOT, input, source).await
    }

    // ── Execute ─────────────────────────────────────────────────────────

    /// Parse and execute in one step.
    pub async fn execute(&self, input: &str, source: S) -> Result<Vec<ExecRecord>, CommandError> {
        let parse = self.parse(input, source).await;
        self.execute_results(parse).await
    }

    /// Execute a successful parse, walking redirect child contexts and
    /// fanning out over forked sources.
    ///
    /// Returns one record per executed branch. Errors abort the run unless a
    /// modifier has already forked it, in which case they are collected.
    pub async fn execute_results(
        &self,
        parse: ParseResults<S>,
    ) -> Result<Vec<ExecRecord>, CommandError> {
        let ParseResults {
            context,
            reader,
            exceptions,
        } = parse;

        if reader.can_read_any() {
            return Err(match sole_error(exceptions) {
                Some(err) => err,
                None => {
                    let kind = if context.range().is_empty() {
                        ErrorKind::Unknown("command".into())
                    } else {
                        ErrorKind::Unknown("argument".into())
                    };
                    CommandError::with_reader(kind, reader)
                }
            });
        }

        let original = context.build(reader.input());
        let mut records = Vec::new();
        let mut contexts = vec![original];
        let mut next: Vec<CommandContext<S>> = Vec::new();
        let mut forked = false;
        let mut found = false;

        while !contexts.is_empty() {
            for ctx in &contexts {
                // A redirect child that matched nothing does not count; the
                // context's own executor still does.
                if let Some(child) = ctx.child().filter(|c| c.has_nodes()) {
                    found = true;
                    match ctx.modifier() {
                        None => next.push(child.copy_for(ctx.source().clone())),
                        Some(modifier) => match modifier.sources(ctx) {
                            Ok(sources) => {
                                if sources.len() != 1 {
                                    forked = true;
                                }
                                for source in sources {
                                    next.push(child.copy_for(source));
                                }
                            }
                            Err(error) => {
                                self.notify(ctx, false, None);
                                if !forked {
                                    return Err(error);
                                }
                                records.push(ExecRecord::Failure { error });
                            }
                        },
                    }
                } else if let Some(command) = ctx.command() {
                    found = true;
                    match command.run(ctx).await {
                        Ok(value) => {
                            self.notify(ctx, true, value);
                            records.push(ExecRecord::Success { value });
                        }
                        Err(error) => {
                            self.notify(ctx, false, None);
                            if !forked {
                                return Err(error);
                            }
                            records.push(ExecRecord::Failure { error });
                        }
                    }
                }
            }
            contexts = std::mem::take(&mut next);
        }

        if !found {
            return Err(CommandError::with_reader(
                ErrorKind::Unknown("command".into()),
                reader,
            ));
        }
        Ok(records)
    }

    fn notify(&self, ctx: &CommandContext<S>, success: bool, value: Option<i32>) {
        if let Some(consumer) = &self.consumer {
            consumer.command_complete(ctx, success, value);
        }
    }

    // ── Suggestions ─────────────────────────────────────────────────────

    /// Completions at the end of the parsed input.
    pub async fn completion_suggestions(&self, parse: &ParseResults<S>) -> Suggestions {
        self.completion_suggestions_at(parse, parse.reader.input().len())
            .await
    }

    /// Completions at an explicit cursor position.
    pub async fn completion_suggestions_at(
        &self,
        parse: &ParseResults<S>,
        cursor: usize,
    ) -> Suggestions {
        completion_suggestions(&self.tree, parse, cursor).await
    }

    // ── Usage ───────────────────────────────────────────────────────────

    /// Every full command line under `node`, one string per executable path.
    ///
    /// With `restricted`, subtrees hidden from `source` are omitted.
    pub fn all_usage(&self, node: NodeId, source: &S, restricted: bool) -> Vec<String> {
        usage::all_usage(&self.tree, node, source, restricted)
    }

    /// Condensed usage per visible child of `node`, with `[optional]`,
    /// `(required)`, and `|` alternation.
    pub fn smart_usage(&self, node: NodeId, source: &S) -> Vec<(NodeId, String)> {
        usage::smart_usage(&self.tree, node, source)
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    /// Walk a space-separated path of child names (literal aliases allowed,
    /// case-insensitive) from the root.
    pub fn find_node(&self, path: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for token in path.split_whitespace() {
            let node = &self.tree[current];
            let next = node
                .by_name
                .get(token)
                .or_else(|| node.literal_lookup.get(&token.to_ascii_lowercase()))
                .copied()?;
            current = next;
        }
        Some(current)
    }

    /// Like [`find_node`](Self::find_node), but unknown or hidden paths are
    /// reported as an unknown-command error.
    pub fn get_node(&self, path: &str, source: &S) -> Result<NodeId, CommandError> {
        match self.find_node(path) {
            Some(id) if self.tree.visible(id, source) => Ok(id),
            _ => Err(CommandError::new(ErrorKind::Unknown("command".into()))),
        }
    }

    // ── Ambiguities ─────────────────────────────────────────────────────

    /// Probe the whole tree for children whose examples a sibling would also
    /// accept, reporting each finding to `consumer`.
    pub fn find_ambiguities(&self, mut consumer: impl FnMut(Ambiguity)) {
        self.find_ambiguities_at(ROOT, &mut consumer);
    }

    fn find_ambiguities_at(&self, node: NodeId, consumer: &mut impl FnMut(Ambiguity)) {
        let children = self.tree[node].children();
        for &child in children {
            for &sibling in children {
                if child == sibling {
                    continue;
                }
                let inputs: Vec<String> = self.tree[child]
                    .examples()
                    .into_iter()
                    .filter(|input| self.tree[sibling].is_valid_input(input))
                    .collect();
                if !inputs.is_empty() {
                    consumer(Ambiguity {
                        parent: node,
                        child,
                        sibling,
                        inputs,
                    });
                }
            }
            self.find_ambiguities_at(child, consumer);
        }
    }
}

fn sole_error(map: HashMap<NodeId, CommandError>) -> Option<CommandError> {
    if map.len() == 1 {
        map.into_values().next()
    } else {
        None
    }
}
