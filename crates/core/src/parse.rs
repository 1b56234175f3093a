//! The parser: non-deterministic descent over the grammar tree.
//!
//! Every child of the current node is attempted against a cloned reader and a
//! copied context; failures land in a per-call error map keyed by the child,
//! and surviving alternatives compete under a deterministic tie-break. The
//! descent suspends only inside an argument type's `load`.

use std::collections::HashMap;

use futures::future::{BoxFuture, FutureExt};

use crate::command::Source;
use crate::context::{ContextBuilder, ParsedArgument};
use crate::error::{CommandError, ErrorKind, Span};
use crate::reader::{StrReader, ARGUMENT_SEPARATOR};
use crate::tree::{NodeId, NodeKind, Tree};

/// Outcome of a parse: the deepest successful state, the reader at the point
/// the parse stopped, and the errors of rejected alternatives.
///
/// An empty error map with a fully-consumed reader signals complete success.
pub struct ParseResults<S: Source> {
    /// Deepest context builder reached.
    pub context: ContextBuilder<S>,
    /// Reader positioned where the parse stopped.
    pub reader: StrReader,
    /// Errors of the children that were tried and rejected.
    pub exceptions: HashMap<NodeId, CommandError>,
}

impl<S: Source> ParseResults<S> {
    /// Whether the whole input was consumed with no rejected alternative
    /// left standing.
    pub fn is_complete(&self) -> bool {
        self.exceptions.is_empty() && !self.reader.can_read_any()
    }
}

/// Parse `input` against the tree starting at `root`.
pub(crate) async fn parse_input<S: Source>(
    tree: &Tree<S>,
    root: NodeId,
    input: &str,
    source: S,
) -> ParseResults<S> {
    let reader = StrReader::new(input);
    let context = ContextBuilder::new(source, root, reader.cursor());
    parse_nodes(tree, root, reader, context).await
}

/// One level of descent: try every relevant child of `node`.
///
/// Boxed because the redirect and child recursions make this future
/// self-referential in type.
fn parse_nodes<'t, S: Source>(
    tree: &'t Tree<S>,
    node: NodeId,
    reader: StrReader,
    context_so_far: ContextBuilder<S>,
) -> BoxFuture<'t, ParseResults<S>> {
    async move {
        let source = context_so_far.source().clone();
        let cursor = reader.cursor();
        let mut errors: HashMap<NodeId, CommandError> = HashMap::new();
        let mut potentials: Vec<ParseResults<S>> = Vec::new();

        for child in tree.relevant_children(node, &reader) {
            if let Some(failure) = tree.check_requirement(child, &source) {
                if let Some(reason) = failure.reason {
                    let mut pinned = reader.clone();
                    pinned.set_cursor(cursor);
                    errors.insert(
                        child,
                        CommandError::with_reader(ErrorKind::RequirementFailed(reason), pinned),
                    );
                }
                continue;
            }

            let mut context = context_so_far.clone();
            let mut child_reader = reader.clone();
            if let Err(err) = parse_child(tree, child, &mut child_reader, &mut context).await {
                errors.insert(child, err);
                continue;
            }
            // A matched token must end the input or be followed by the
            // argument separator.
            if child_reader.can_read_any() && child_reader.peek() != Some(ARGUMENT_SEPARATOR) {
                errors.insert(
                    child,
                    child_reader.error_here(ErrorKind::ExpectedArgumentSeparator),
                );
                continue;
            }
            context.with_command(tree[child].command.clone());

            // A redirect re-enters the tree right after the separator, so one
            // character of lookahead suffices; a normal descent needs the
            // separator plus at least one character for the next child.
            let needed = if tree[child].redirect.is_some() { 1 } else { 2 };
            if child_reader.can_read(needed) {
                child_reader.skip();
                if let Some(target) = tree[child].redirect {
                    let child_context =
                        ContextBuilder::new(source.clone(), target, child_reader.cursor());
                    let parse = parse_nodes(tree, target, child_reader, child_context).await;
                    context.with_child(parse.context);
                    return ParseResults {
                        context,
                        reader: parse.reader,
                        exceptions: parse.exceptions,
                    };
                }
                potentials.push(parse_nodes(tree, child, child_reader, context).await);
            } else {
                potentials.push(ParseResults {
                    context,
                    reader: child_reader,
                    exceptions: HashMap::new(),
                });
            }
        }

        if !potentials.is_empty() {
            // Fully-consumed input beats leftover; error-free beats errored.
            // The sort is stable, so insertion order (literals before
            // arguments, then name order) breaks remaining ties.
            potentials.sort_by_key(|p| (p.reader.can_read_any(), !p.exceptions.is_empty()));
            return potentials.remove(0);
        }

        ParseResults {
            context: context_so_far,
            reader,
            exceptions: errors,
        }
    }
    .boxed()
}

/// Consume one child node from the reader, stamping the context.
async fn parse_child<S: Source>(
    tree: &Tree<S>,
    child: NodeId,
    reader: &mut StrReader,
    context: &mut ContextBuilder<S>,
) -> Result<(), CommandError> {
    let node = &tree[child];
    let start = reader.cursor();
    match &node.kind {
        NodeKind::Root => {
            let mut pinned = reader.clone();
            pinned.set_cursor(start);
            Err(CommandError::with_reader(
                ErrorKind::Unknown("command".into()),
                pinned,
            ))
        }
        NodeKind::Literal { names } => match node.literal_match_len(reader) {
            Some(len) => {
                reader.set_cursor(start + len);
                let span = Span::new(start, reader.cursor());
                context.with_node(child, span, node.modifier.clone());
                Ok(())
            }
            None => {
                let mut pinned = reader.clone();
                pinned.set_cursor(start);
                Err(CommandError::with_reader(
                    ErrorKind::Literal(names[0].clone()),
                    pinned,
                ))
            }
        },
        NodeKind::Argument { name, ty, .. } => {
            let parsed = match ty.parse_erased(reader) {
                Ok(parsed) => parsed,
                Err(err) if err.should_rewind() => return Err(err.or_pin(reader, start)),
                Err(err) => {
                    // The thrower pinned an inner position and asked us not
                    // to rewind past it.
                    if let Some(inner) = err.cursor() {
                        reader.set_cursor(inner);
                    }
                    return Err(err);
                }
            };
            let span = Span::new(start, reader.cursor());
            let value = match ty.load_erased(parsed).await {
                Ok(value) => value,
                Err(err) => return Err(err.or_pin(reader, start)),
            };
            context.with_argument(name.clone(), ParsedArgument { span, value });
            context.with_node(child, span, node.modifier.clone());
            Ok(())
        }
    }
}
