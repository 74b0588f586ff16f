//! PHP parser and syntax tree for phz.
//!
//! This crate provides:
//! - the node model and `NodeArena` with parent back-pointers
//! - `ParserState` — error-tolerant recursive descent parser
//!
//! The parser never fails on malformed input; every byte of the source is
//! covered by the produced tree.

pub mod parser;

pub use parser::base::{Child, ListContext, NodeIndex};
pub use parser::node::{NodeArena, NodeData, NodeKind};
pub use parser::state::ParserState;
