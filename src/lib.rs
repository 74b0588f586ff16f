//! Error-tolerant PHP parser producing a lossless concrete syntax tree.
//!
//! The tree covers every byte of input — whitespace, comments, and
//! unrecognized bytes inclusive — and parsing never fails on syntax errors,
//! so downstream tools (formatters, linters, IDE services) can operate on
//! broken or partial source.
//!
//! ```
//! let tree = phz::parse_source_file("<?php echo 1 + 2;");
//! assert_eq!(tree.reconstructed_text(), "<?php echo 1 + 2;");
//! ```

pub use phz_parser::{Child, ListContext, NodeArena, NodeData, NodeIndex, NodeKind, ParserState};
pub use phz_scanner::{LexerState, Token, TokenKind, TokenVariant};

/// A completed parse: the arena holding every node (and the source text for
/// offset resolution) plus the root `SourceFile` index.
pub struct ParseTree {
    pub arena: NodeArena,
    pub root: NodeIndex,
}

impl ParseTree {
    pub fn root_node(&self) -> &NodeData {
        self.arena.get(self.root)
    }

    pub fn source_text(&self) -> &str {
        self.arena.source_text()
    }

    /// All leaf tokens in a left-to-right pre-order traversal.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        collect_tokens(&self.arena, self.root, &mut tokens);
        tokens
    }

    /// Concatenation of every leaf's full text in tree order. Equals the
    /// original source byte-for-byte.
    pub fn reconstructed_text(&self) -> String {
        let source = self.arena.source_text();
        self.tokens()
            .iter()
            .map(|t| t.full_text(source))
            .collect()
    }
}

fn collect_tokens(arena: &NodeArena, index: NodeIndex, out: &mut Vec<Token>) {
    let mut children: Vec<Child> = Vec::new();
    arena.get(index).for_each_child(&mut |c| children.push(c));
    for child in children {
        match child {
            Child::Token(token) => out.push(token),
            Child::Node(node) => collect_tokens(arena, node, out),
        }
    }
}

/// Parse a complete source text into a tree.
pub fn parse_source_file(source: &str) -> ParseTree {
    let mut parser = ParserState::new(source);
    let root = parser.parse_source_file();
    ParseTree {
        arena: parser.arena,
        root,
    }
}
