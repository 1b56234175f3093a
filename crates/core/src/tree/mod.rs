//! Grammar tree: node model, arena, and the fluent builder.

mod builder;
mod node;

pub use builder::{argument, literal, BuiltNode, CommandBuilder, LiteralNames};
pub use node::{CommandNode, Gate, NodeId, RequirementFailure, Tree};

pub(crate) use node::{NodeKind, ROOT};
