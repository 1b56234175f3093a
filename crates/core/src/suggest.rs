//! Completion suggestions: the data model, the per-node builder, and the
//! engine that locates the cursor in a parse result and collects child
//! completions.

use serde::Serialize;

use crate::command::Source;
use crate::error::Span;
use crate::parse::ParseResults;
use crate::tree::{NodeId, NodeKind, Tree};

/// Whether a suggestion completes a literal keyword or an argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Completes a fixed keyword.
    Literal,
    /// Completes a typed argument.
    Argument,
}

/// One candidate completion.
///
/// `range` is the slice of the input the text would replace. The metadata
/// fields describe the originating node so a consumer UI can style entries.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Input range the completion replaces.
    pub range: Span,
    /// Replacement text.
    pub text: String,
    /// Extra hover detail (literal aliases, provider-supplied hints).
    pub tooltip: Option<String>,
    /// Originating node kind.
    pub kind: Option<SuggestionKind>,
    /// Usage fragment of the originating node.
    pub usage: Option<String>,
    /// Description of the originating node.
    pub description: Option<String>,
    /// The originating node.
    pub node: Option<NodeId>,
}

impl Suggestion {
    /// `input` with the suggestion applied over its range.
    pub fn apply(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + self.text.len());
        out.push_str(&input[..self.range.start.min(input.len())]);
        out.push_str(&self.text);
        if self.range.end < input.len() {
            out.push_str(&input[self.range.end..]);
        }
        out
    }

    /// Widen to `range`, pulling the surrounding slices of `input` into the
    /// text so the replacement stays equivalent.
    fn expand(mut self, input: &str, range: Span) -> Suggestion {
        if range == self.range {
            return self;
        }
        let mut text = String::new();
        if range.start < self.range.start {
            text.push_str(&input[range.start..self.range.start.min(input.len())]);
        }
        text.push_str(&self.text);
        if range.end > self.range.end && self.range.end < input.len() {
            text.push_str(&input[self.range.end..range.end.min(input.len())]);
        }
        self.text = text;
        self.range = range;
        self
    }
}

/// A merged, sorted, deduplicated set of suggestions over one covering range.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    range: Span,
    entries: Vec<Suggestion>,
}

impl Suggestions {
    /// The empty set.
    pub fn empty() -> Self {
        Self {
            range: Span::at(0),
            entries: Vec::new(),
        }
    }

    /// Input range all entries replace.
    pub fn range(&self) -> Span {
        self.range
    }

    /// The suggestions, in sorted order.
    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    /// Whether no suggestion survived.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Just the completion texts, in order (test and display helper).
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.text.as_str()).collect()
    }

    /// Merge several per-node sets into one covering set.
    pub fn merge(input: &str, groups: Vec<Suggestions>) -> Self {
        let entries: Vec<Suggestion> = groups.into_iter().flat_map(|g| g.entries).collect();
        Self::create(input, entries)
    }

    /// Normalize raw suggestions: compute the covering range, expand each
    /// entry to it, drop duplicates, sort case-insensitively by text.
    pub fn create(input: &str, suggestions: Vec<Suggestion>) -> Self {
        if suggestions.is_empty() {
            return Self::empty();
        }
        let mut start = usize::MAX;
        let mut end = 0;
        for s in &suggestions {
            start = start.min(s.range.start);
            end = end.max(s.range.end);
        }
        let range = Span::new(start, end);
        let mut entries: Vec<Suggestion> = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let expanded = suggestion.expand(input, range);
            if !entries
                .iter()
                .any(|e| e.text == expanded.text && e.tooltip == expanded.tooltip)
            {
                entries.push(expanded);
            }
        }
        entries.sort_by(|a, b| {
            a.text
                .to_ascii_lowercase()
                .cmp(&b.text.to_ascii_lowercase())
                .then_with(|| a.text.cmp(&b.text))
        });
        Self { range, entries }
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates suggestions for one node, anchored at a fixed input offset.
///
/// `remaining` is the text already typed past the anchor; a suggestion equal
/// to it verbatim is dropped — never offer what the user already has.
pub struct SuggestionsBuilder {
    input: String,
    start: usize,
    remaining: String,
    kind: Option<SuggestionKind>,
    usage: Option<String>,
    description: Option<String>,
    node: Option<NodeId>,
    entries: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    /// A builder over `input` (already truncated at the cursor), anchored at
    /// byte offset `start`.
    pub fn new(input: &str, start: usize) -> Self {
        let start = start.min(input.len());
        Self {
            input: input.to_owned(),
            start,
            remaining: input[start..].to_owned(),
            kind: None,
            usage: None,
            description: None,
            node: None,
            entries: Vec::new(),
        }
    }

    pub(crate) fn with_node_meta(
        mut self,
        kind: SuggestionKind,
        usage: String,
        description: Option<String>,
        node: NodeId,
    ) -> Self {
        self.kind = Some(kind);
        self.usage = Some(usage);
        self.description = description;
        self.node = Some(node);
        self
    }

    /// The truncated input this builder completes.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The anchor offset suggestions replace from.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Text already typed between the anchor and the cursor.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// Offer a completion.
    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(text.into(), None);
        self
    }

    /// Offer a completion with a tooltip.
    pub fn suggest_with_tooltip(
        &mut self,
        text: impl Into<String>,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        self.push(text.into(), Some(tooltip.into()));
        self
    }

    fn push(&mut self, text: String, tooltip: Option<String>) {
        if text == self.remaining {
            return;
        }
        self.entries.push(Suggestion {
            range: Span::new(self.start, self.input.len()),
            text,
            tooltip,
            kind: self.kind,
            usage: self.usage.clone(),
            description: self.description.clone(),
            node: self.node,
        });
    }

    /// Finish, producing a normalized [`Suggestions`] set.
    pub fn build(self) -> Suggestions {
        Suggestions::create(&self.input, self.entries)
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Collect the completions valid at `cursor` inside `parse`'s input.
pub(crate) async fn completion_suggestions<S: Source>(
    tree: &Tree<S>,
    parse: &ParseResults<S>,
    cursor: usize,
) -> Suggestions {
    let Some(anchor) = parse.context.find_suggestion_anchor(cursor) else {
        return Suggestions::empty();
    };
    let start = anchor.start.min(cursor);
    let full_input = parse.reader.input();
    let truncated = &full_input[..cursor.min(full_input.len())];
    let context = parse.context.build(truncated);
    let source = parse.context.source();

    let mut groups = Vec::new();
    for &child in tree[anchor.parent].children() {
        if !tree.visible(child, source) {
            continue;
        }
        let node = &tree[child];
        let kind = if node.is_literal() {
            SuggestionKind::Literal
        } else {
            SuggestionKind::Argument
        };
        let mut builder = SuggestionsBuilder::new(truncated, start).with_node_meta(
            kind,
            node.usage_text(),
            node.description().map(str::to_owned),
            child,
        );
        match &node.kind {
            NodeKind::Root => {}
            NodeKind::Literal { names } => {
                let remaining = builder.remaining().to_ascii_lowercase();
                let aliases = if names.len() > 1 {
                    Some(names[1..].join(", "))
                } else {
                    None
                };
                for name in names {
                    if name.to_ascii_lowercase().starts_with(&remaining) {
                        match &aliases {
                            Some(tooltip) => builder.suggest_with_tooltip(name.clone(), tooltip),
                            None => builder.suggest(name.clone()),
                        };
                    }
                }
            }
            NodeKind::Argument { ty, provider, .. } => match provider {
                // One failing provider must not poison the whole panel.
                Some(provider) => {
                    let _ = provider.suggest(&context, &mut builder).await;
                }
                None => ty.suggest_erased(&mut builder).await,
            },
        }
        groups.push(builder.build());
    }
    Suggestions::merge(full_input, groups)
}
