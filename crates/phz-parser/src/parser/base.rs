//! Shared parser base types.

use phz_scanner::Token;
use serde::Serialize;

/// Index into the node arena. Used instead of references so the tree can
/// carry parent back-pointers without cycles, and node identity stays stable
/// under postfix re-parenting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Hash)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }
}

/// A tree child: either a token held by value or a node handle. Lists and
/// expression-valued slots use this, since recovery can put a token (missing
/// or skipped) where a node would normally sit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Child {
    Token(Token),
    Node(NodeIndex),
}

impl Child {
    #[inline]
    pub fn as_node(&self) -> Option<NodeIndex> {
        match self {
            Child::Node(index) => Some(*index),
            Child::Token(_) => None,
        }
    }

    #[inline]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(token) => Some(token),
            Child::Node(_) => None,
        }
    }
}

/// Identifies which grammar list is being parsed. Drives the terminator and
/// starter predicates and the element dispatch of the list driver, and
/// doubles as the bit position in the active-context mask (each context kind
/// appears at most once on the stack, so one bit suffices).
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ListContext {
    SourceElements = 0,
    BlockStatements,
    ClassMembers,
    InterfaceMembers,
    TraitMembers,
    SwitchStatementElements,
    CaseStatementElements,
    WhileStatementElements,
    ForStatementElements,
    ForeachStatementElements,
    DeclareStatementElements,
    IfClauseElements,
}

impl ListContext {
    pub const COUNT: u32 = 12;

    #[inline]
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn from_bit_index(index: u32) -> ListContext {
        use ListContext::*;
        match index {
            0 => SourceElements,
            1 => BlockStatements,
            2 => ClassMembers,
            3 => InterfaceMembers,
            4 => TraitMembers,
            5 => SwitchStatementElements,
            6 => CaseStatementElements,
            7 => WhileStatementElements,
            8 => ForStatementElements,
            9 => ForeachStatementElements,
            10 => DeclareStatementElements,
            11 => IfClauseElements,
            _ => unreachable!("unknown list context bit {index}"),
        }
    }
}
