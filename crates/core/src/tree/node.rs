//! The grammar tree: arena-allocated nodes, child ordering, merge-on-insert,
//! and requirement (visibility) evaluation.
//!
//! Nodes form a directed graph: `children` edges own their target, `redirect`
//! edges do not, so cycles (redirect to the root, redirect to an ancestor)
//! need no reference counting. All parse-time access is read-only; the tree
//! only mutates while commands are being registered or removed.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::args::ErasedArgumentType;
use crate::command::{Command, RedirectModifier, Source, SuggestionProvider};
use crate::reader::StrReader;
use crate::tree::builder::{BuiltKind, BuiltNode};

/// Handle to a node in the dispatcher's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

/// The arena slot of the implicit root node.
pub(crate) const ROOT: NodeId = NodeId(0);

// ─── Requirements ────────────────────────────────────────────────────────────

/// Outcome of a requirement predicate.
pub enum Gate {
    /// The source may see and use the node.
    Allow,
    /// The source may not; see [`RequirementFailure`] for how loudly.
    Deny(RequirementFailure),
}

impl Gate {
    /// Deny without a reason: the node is silently omitted everywhere.
    pub fn hidden() -> Self {
        Gate::Deny(RequirementFailure {
            show_in_tree: false,
            reason: None,
        })
    }

    /// Deny with a reason the parser reports; the node stays listed in
    /// help and suggestions.
    pub fn denied(reason: impl Into<String>) -> Self {
        Gate::Deny(RequirementFailure {
            show_in_tree: true,
            reason: Some(reason.into()),
        })
    }
}

/// A failed requirement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementFailure {
    /// Whether the node is still listed in help and suggestions.
    pub show_in_tree: bool,
    /// Reported to the caller when present; absent means silently omitted.
    pub reason: Option<String>,
}

pub(crate) type RequirementFn<S> = Arc<dyn Fn(&S) -> Gate + Send + Sync>;

/// Prefer a reason-carrying failure over a silent one.
fn more_specific(a: RequirementFailure, b: RequirementFailure) -> RequirementFailure {
    if a.reason.is_some() || b.reason.is_none() {
        a
    } else {
        b
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

pub(crate) enum NodeKind<S: Source> {
    Root,
    Literal {
        /// Index 0 is the canonical name; the rest are aliases.
        names: Vec<String>,
    },
    Argument {
        name: String,
        ty: Arc<dyn ErasedArgumentType>,
        provider: Option<Arc<dyn SuggestionProvider<S>>>,
    },
}

/// One vertex of the grammar tree.
pub struct CommandNode<S: Source> {
    pub(crate) kind: NodeKind<S>,
    /// Sorted: literals before arguments, then by name.
    pub(crate) children: Vec<NodeId>,
    /// Children by canonical name.
    pub(crate) by_name: HashMap<String, NodeId>,
    /// Literal children by every lowercased name and alias.
    pub(crate) literal_lookup: HashMap<String, NodeId>,
    pub(crate) command: Option<Arc<dyn Command<S>>>,
    pub(crate) description: Option<String>,
    pub(crate) requirements: Vec<RequirementFn<S>>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) modifier: Option<Arc<dyn RedirectModifier<S>>>,
}

impl<S: Source> CommandNode<S> {
    fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            children: Vec::new(),
            by_name: HashMap::new(),
            literal_lookup: HashMap::new(),
            command: None,
            description: None,
            requirements: Vec::new(),
            redirect: None,
            modifier: None,
        }
    }

    fn from_built(built: BuiltNode<S>) -> (Self, Vec<BuiltNode<S>>) {
        let kind = match built.kind {
            BuiltKind::Literal { names } => NodeKind::Literal { names },
            BuiltKind::Argument { name, ty, provider } => NodeKind::Argument { name, ty, provider },
        };
        let node = Self {
            kind,
            children: Vec::new(),
            by_name: HashMap::new(),
            literal_lookup: HashMap::new(),
            command: built.command,
            description: built.description,
            requirements: built.requirements,
            redirect: built.redirect,
            modifier: built.modifier,
        };
        (node, built.children)
    }

    /// Canonical name: literal text, argument name, `""` for the root.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Literal { names } => &names[0],
            NodeKind::Argument { name, .. } => name,
        }
    }

    /// Alias names of a literal node (empty otherwise).
    pub fn aliases(&self) -> &[String] {
        match &self.kind {
            NodeKind::Literal { names } => &names[1..],
            _ => &[],
        }
    }

    /// Whether this is a literal node.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal { .. })
    }

    /// Whether this is an argument node.
    pub fn is_argument(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { .. })
    }

    /// Whether this is the root node.
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    /// Whether the node carries an executor.
    pub fn is_executable(&self) -> bool {
        self.command.is_some()
    }

    /// The node's children, in enumeration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The redirect target, if any.
    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    /// The human description attached via the builder, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Usage fragment: the canonical literal name, or `<name>` for arguments.
    pub fn usage_text(&self) -> String {
        match &self.kind {
            NodeKind::Root => String::new(),
            NodeKind::Literal { names } => names[0].clone(),
            NodeKind::Argument { name, .. } => format!("<{name}>"),
        }
    }

    /// Inputs used for default suggestions and ambiguity detection.
    pub fn examples(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::Root => Vec::new(),
            NodeKind::Literal { names } => vec![names[0].clone()],
            NodeKind::Argument { ty, .. } => ty.examples_erased(),
        }
    }

    /// Whether `input` could be consumed by this node.
    ///
    /// Literals additionally require end-of-input or the argument separator
    /// right after the matched name. The root never matches.
    pub fn is_valid_input(&self, input: &str) -> bool {
        match &self.kind {
            NodeKind::Root => false,
            NodeKind::Literal { names } => names.iter().any(|name| {
                matches_literal_prefix(input, name)
                    && (input.len() == name.len() || input.as_bytes()[name.len()] == b' ')
            }),
            NodeKind::Argument { ty, .. } => ty.is_valid_input(input),
        }
    }

    /// Byte length of the literal name matching at the reader's cursor, with
    /// the required end-of-input / separator terminator.
    pub(crate) fn literal_match_len(&self, reader: &StrReader) -> Option<usize> {
        let NodeKind::Literal { names } = &self.kind else {
            return None;
        };
        let input = reader.input();
        let start = reader.cursor();
        names.iter().find_map(|name| {
            let end = start + name.len();
            let slice = input.get(start..end)?;
            if slice.eq_ignore_ascii_case(name)
                && (end == input.len() || input.as_bytes()[end] == b' ')
            {
                Some(name.len())
            } else {
                None
            }
        })
    }

    fn sort_rank(&self) -> u8 {
        match self.kind {
            NodeKind::Literal { .. } => 0,
            _ => 1,
        }
    }
}

fn matches_literal_prefix(input: &str, name: &str) -> bool {
    input
        .get(..name.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(name))
}

// ─── Arena ───────────────────────────────────────────────────────────────────

/// Arena of nodes; slot 0 is the root.
///
/// Removal only unlinks a subtree from its parent — slots are not reused.
/// Registration is rare and parse-time access never observes unlinked nodes.
pub struct Tree<S: Source> {
    nodes: Vec<CommandNode<S>>,
}

impl<S: Source> Tree<S> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![CommandNode::root()],
        }
    }

    /// Immutable access to a node.
    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut CommandNode<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Attach `built` under `parent`, merging with an existing child of the
    /// same name: the incoming executor (and description) override when
    /// present, and grandchildren are folded in recursively.
    pub(crate) fn add_child(&mut self, parent: NodeId, built: BuiltNode<S>) -> NodeId {
        assert!(
            self.node(parent).redirect.is_none(),
            "cannot add children to a redirecting node"
        );
        if let Some(&existing) = self.node(parent).by_name.get(built.name()) {
            let (incoming, grandchildren) = CommandNode::from_built(built);
            {
                let node = self.node_mut(existing);
                if incoming.command.is_some() {
                    node.command = incoming.command;
                }
                if incoming.description.is_some() {
                    node.description = incoming.description;
                }
            }
            for grandchild in grandchildren {
                self.add_child(existing, grandchild);
            }
            return existing;
        }

        let (node, grandchildren) = CommandNode::from_built(built);
        let id = NodeId(self.nodes.len() as u32);
        let name = node.name().to_owned();
        let literal_names: Vec<String> = match &node.kind {
            NodeKind::Literal { names } => {
                names.iter().map(|n| n.to_ascii_lowercase()).collect()
            }
            _ => Vec::new(),
        };
        self.nodes.push(node);

        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        parent_node.by_name.insert(name, id);
        for lowered in literal_names {
            parent_node.literal_lookup.insert(lowered, id);
        }
        self.resort_children(parent);

        for grandchild in grandchildren {
            self.add_child(id, grandchild);
        }
        id
    }

    /// Re-sort a node's children: literals before arguments, then by name.
    fn resort_children(&mut self, parent: NodeId) {
        let mut children = std::mem::take(&mut self.node_mut(parent).children);
        children.sort_by(|&a, &b| {
            let (na, nb) = (self.node(a), self.node(b));
            na.sort_rank()
                .cmp(&nb.sort_rank())
                .then_with(|| na.name().cmp(nb.name()))
        });
        self.node_mut(parent).children = children;
    }

    /// Unlink the subtree rooted at `id` from its parent.
    ///
    /// Returns `false` when `id` is the root or not linked anywhere.
    pub(crate) fn unlink(&mut self, id: NodeId) -> bool {
        if id == ROOT {
            return false;
        }
        let Some(parent) = (0..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .find(|&p| self.node(p).children.contains(&id))
        else {
            return false;
        };
        let name = self.node(id).name().to_owned();
        let parent_node = self.node_mut(parent);
        parent_node.children.retain(|&c| c != id);
        parent_node.by_name.remove(&name);
        parent_node.literal_lookup.retain(|_, &mut c| c != id);
        true
    }

    /// The children worth attempting at the reader's position.
    ///
    /// When a whitespace-delimited token matches a literal child (by name or
    /// alias, case-insensitively), only that child competes; otherwise every
    /// argument child does.
    pub(crate) fn relevant_children(&self, id: NodeId, reader: &StrReader) -> Vec<NodeId> {
        let node = self.node(id);
        if !node.literal_lookup.is_empty() {
            let word = reader.peek_word().to_ascii_lowercase();
            if let Some(&literal) = node.literal_lookup.get(&word) {
                return vec![literal];
            }
        }
        node.children
            .iter()
            .copied()
            .filter(|&c| self.node(c).is_argument())
            .collect()
    }

    /// Evaluate visibility of `id` for `source`.
    ///
    /// `None` means permitted. A node without its own executor is implicitly
    /// permitted when its redirect target or any child is; otherwise the most
    /// specific failure seen below it is reported.
    pub(crate) fn check_requirement(
        &self,
        id: NodeId,
        source: &S,
    ) -> Option<RequirementFailure> {
        let mut visited = HashSet::new();
        self.check_requirement_inner(id, source, &mut visited)
    }

    fn check_requirement_inner(
        &self,
        id: NodeId,
        source: &S,
        visited: &mut HashSet<NodeId>,
    ) -> Option<RequirementFailure> {
        if !visited.insert(id) {
            // Cycle: this path cannot establish permission by itself.
            return Some(RequirementFailure {
                show_in_tree: false,
                reason: None,
            });
        }
        let node = self.node(id);
        for requirement in &node.requirements {
            if let Gate::Deny(failure) = requirement(source) {
                return Some(failure);
            }
        }
        if node.command.is_some() {
            return None;
        }
        if let Some(target) = node.redirect {
            return self.check_requirement_inner(target, source, visited);
        }
        let mut best: Option<RequirementFailure> = None;
        for &child in &node.children {
            match self.check_requirement_inner(child, source, visited) {
                None => return None,
                Some(failure) => {
                    best = Some(match best {
                        Some(current) => more_specific(current, failure),
                        None => failure,
                    });
                }
            }
        }
        best
    }

    /// Whether the node is shown in help and suggestions for `source`:
    /// permitted, or denied with `show_in_tree`.
    pub(crate) fn visible(&self, id: NodeId, source: &S) -> bool {
        match self.check_requirement(id, source) {
            None => true,
            Some(failure) => failure.show_in_tree,
        }
    }
}

impl<S: Source> std::ops::Index<NodeId> for Tree<S> {
    type Output = CommandNode<S>;

    fn index(&self, id: NodeId) -> &CommandNode<S> {
        self.node(id)
    }
}
