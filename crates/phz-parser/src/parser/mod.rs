//! Tolerant recursive-descent parser for PHP.

pub mod base;
pub mod node;
pub mod state;

mod declarations;
mod expressions;
mod statements;

pub use base::{Child, ListContext, NodeIndex};
pub use node::{NodeArena, NodeData, NodeKind};
pub use state::ParserState;
