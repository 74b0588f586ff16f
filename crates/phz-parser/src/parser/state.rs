//! Parser state: the one-token window over the lexer, the consumption
//! primitives, and the list-parse driver with its error-recovery state
//! machine.
//!
//! The parser never fails on malformed input. Everything surfaces as tree
//! shape: expected-but-absent tokens become zero-width missing tokens,
//! unplaceable tokens become skipped tokens appended next to ordinary list
//! elements, and tokens an enclosing list would accept terminate the inner
//! list early.

use phz_scanner::{LexerState, Token, TokenKind};
use tracing::trace;

use super::base::{Child, ListContext, NodeIndex};
use super::node::{NodeArena, NodeData, SourceFileNode};

pub struct ParserState {
    pub(crate) lexer: LexerState,
    pub arena: NodeArena,
    /// Current token window.
    pub(crate) token: Token,
    /// Bitset of active list contexts; bit `i` is set iff list-context `i`
    /// is an ancestor of the list being parsed.
    pub(crate) context_mask: u32,
}

impl ParserState {
    pub fn new(source: &str) -> ParserState {
        let mut lexer = LexerState::new(source);
        let arena = NodeArena::new(lexer.source_arc());
        let token = lexer.scan();
        ParserState {
            lexer,
            arena,
            token,
            context_mask: 0,
        }
    }

    /// Parse a complete source file. The returned index is the root
    /// `SourceFile` node; the arena retains the source for offset
    /// resolution.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let mut statements = Vec::new();
        // Pre-script text (or the opening tag itself) becomes a leading
        // inline-HTML island before the source-elements list begins.
        if !self.check(TokenKind::EndOfFile) {
            statements.push(Child::Node(self.parse_inline_html()));
        }
        statements.extend(self.parse_list(ListContext::SourceElements));
        let end_of_file = self.eat1(TokenKind::EndOfFile);
        self.arena.add(NodeData::SourceFile(SourceFileNode {
            statements,
            end_of_file,
        }))
    }

    // =========================================================================
    // Token consumption primitives
    // =========================================================================

    /// Current token (no mutation).
    #[inline]
    pub(crate) fn token(&self) -> Token {
        self.token
    }

    /// Pull the next token from the lexer, returning the one consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let consumed = self.token;
        self.token = self.lexer.scan();
        consumed
    }

    /// Pure kind test against the window.
    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    /// Consume the current token if its kind matches any of `kinds`;
    /// otherwise synthesize a missing token of the first expected kind at
    /// the current full start, without advancing.
    pub(crate) fn eat(&mut self, kinds: &[TokenKind]) -> Token {
        if kinds.contains(&self.token.kind) {
            self.advance()
        } else {
            Token::missing(kinds[0], self.token.full_start)
        }
    }

    #[inline]
    pub(crate) fn eat1(&mut self, kind: TokenKind) -> Token {
        self.eat(&[kind])
    }

    /// Consume the current token if it matches; never advances on a miss.
    pub(crate) fn eat_optional(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.token.kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn eat_optional1(&mut self, kind: TokenKind) -> Option<Token> {
        self.eat_optional(&[kind])
    }

    /// Consume the current token with its kind coerced to `Name`. Used for
    /// member names and qualified-name parts, where any keyword or reserved
    /// word serves as a name.
    pub(crate) fn eat_as_name(&mut self) -> Token {
        let mut token = self.advance();
        token.kind = TokenKind::Name;
        token
    }

    /// Run `probe` against the stream, then restore both the lexer position
    /// and the token window. Lookahead must be non-destructive on every exit
    /// path; callers probe up to a few tokens deep on every iteration, so the
    /// snapshot is O(1).
    pub(crate) fn look_ahead<R>(&mut self, probe: impl FnOnce(&mut Self) -> R) -> R {
        let snapshot = self.lexer.save_state();
        let window = self.token;
        let result = probe(self);
        self.lexer.restore_state(snapshot);
        self.token = window;
        result
    }

    /// Succeeds iff the next `pattern.len()` tokens after the current one
    /// each match the corresponding kind set.
    pub(crate) fn look_ahead_kinds(&mut self, pattern: &[&[TokenKind]]) -> bool {
        self.look_ahead(|parser| {
            for kinds in pattern {
                parser.advance();
                if !kinds.contains(&parser.token.kind) {
                    return false;
                }
            }
            true
        })
    }

    /// One-deep lookahead for a single kind.
    pub(crate) fn next_token_is(&mut self, kind: TokenKind) -> bool {
        self.look_ahead_kinds(&[&[kind]])
    }

    // =========================================================================
    // List-parse driver
    // =========================================================================

    /// Parse one homogeneous list. Terminates on the context's terminator or
    /// end of file; parses elements at valid starters; defers to an
    /// enclosing context that would accept the current token; otherwise
    /// wraps the token as skipped and retries.
    pub(crate) fn parse_list(&mut self, context: ListContext) -> Vec<Child> {
        let saved_mask = self.context_mask;
        self.context_mask |= context.bit();
        let mut elements: Vec<Child> = Vec::new();
        loop {
            let kind = self.token.kind;
            if kind == TokenKind::EndOfFile || self.is_list_terminator(context, kind) {
                break;
            }
            if self.is_valid_list_element(context, kind) {
                elements.push(self.parse_list_element(context));
                continue;
            }
            if self.is_valid_in_enclosing_contexts(kind) {
                trace!(?context, ?kind, "deferring token to enclosing list");
                break;
            }
            trace!(?context, ?kind, offset = self.token.start, "skipping token");
            let skipped = Token::skipped(self.advance());
            elements.push(Child::Token(skipped));
        }
        self.context_mask = saved_mask;
        elements
    }

    /// Would any active enclosing context accept the token, either as a
    /// starter or as its terminator?
    fn is_valid_in_enclosing_contexts(&self, kind: TokenKind) -> bool {
        for bit in 0..ListContext::COUNT {
            if self.context_mask & (1 << bit) != 0 {
                let context = ListContext::from_bit_index(bit);
                if self.is_list_terminator(context, kind)
                    || self.is_valid_list_element(context, kind)
                {
                    return true;
                }
            }
        }
        false
    }

    fn is_list_terminator(&self, context: ListContext, kind: TokenKind) -> bool {
        use ListContext::*;
        use TokenKind::*;
        match context {
            // Only end of file terminates the top level.
            SourceElements => false,
            BlockStatements | ClassMembers | InterfaceMembers | TraitMembers => kind == CloseBrace,
            SwitchStatementElements => kind == CloseBrace || kind == EndSwitchKeyword,
            CaseStatementElements => {
                matches!(kind, CaseKeyword | DefaultKeyword | CloseBrace | EndSwitchKeyword)
            }
            WhileStatementElements => kind == EndWhileKeyword,
            ForStatementElements => kind == EndForKeyword,
            ForeachStatementElements => kind == EndForEachKeyword,
            DeclareStatementElements => kind == EndDeclareKeyword,
            IfClauseElements => matches!(kind, ElseIfKeyword | ElseKeyword | EndIfKeyword),
        }
    }

    fn is_valid_list_element(&self, context: ListContext, kind: TokenKind) -> bool {
        use ListContext::*;
        match context {
            SourceElements
            | BlockStatements
            | CaseStatementElements
            | WhileStatementElements
            | ForStatementElements
            | ForeachStatementElements
            | DeclareStatementElements
            | IfClauseElements => self.is_statement_start(kind),
            ClassMembers | InterfaceMembers | TraitMembers => Self::is_class_member_start(kind),
            SwitchStatementElements => {
                matches!(kind, TokenKind::CaseKeyword | TokenKind::DefaultKeyword)
            }
        }
    }

    fn parse_list_element(&mut self, context: ListContext) -> Child {
        use ListContext::*;
        match context {
            SourceElements
            | BlockStatements
            | CaseStatementElements
            | WhileStatementElements
            | ForStatementElements
            | ForeachStatementElements
            | DeclareStatementElements
            | IfClauseElements => self.parse_statement(),
            ClassMembers | TraitMembers => Child::Node(self.parse_class_member()),
            InterfaceMembers => Child::Node(self.parse_interface_member()),
            SwitchStatementElements => Child::Node(self.parse_case_statement()),
        }
    }

    // =========================================================================
    // Starter predicates
    // =========================================================================

    pub(crate) fn is_statement_start(&self, kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            OpenBrace
                | IfKeyword
                | SwitchKeyword
                | WhileKeyword
                | DoKeyword
                | ForKeyword
                | ForEachKeyword
                | GotoKeyword
                | ContinueKeyword
                | BreakKeyword
                | ReturnKeyword
                | ThrowKeyword
                | TryKeyword
                | DeclareKeyword
                | AbstractKeyword
                | FinalKeyword
                | ClassKeyword
                | InterfaceKeyword
                | TraitKeyword
                | UseKeyword
                | GlobalKeyword
                | ConstKeyword
                | Semicolon
                | ScriptSectionEndTag
                | ScriptSectionStartTag
                | InlineHtml
        ) || self.is_expression_start(kind)
    }

    pub(crate) fn is_expression_start(&self, kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            Plus | Minus
                | Exclamation
                | Tilde
                | At
                | PlusPlus
                | MinusMinus
                | OpenParen
                | OpenBracket
                | NewKeyword
                | CloneKeyword
                | VariableName
                | Dollar
                | Name
                | Backslash
                | NamespaceKeyword
                | StringLiteral
                | TemplateStringStart
                | DoubleQuote
                | Backtick
                | HeredocStart
                | IntegerLiteral
                | FloatingLiteral
                | ArrayKeyword
                | EchoKeyword
                | ListKeyword
                | UnsetKeyword
                | EmptyKeyword
                | EvalKeyword
                | ExitKeyword
                | DieKeyword
                | IsSetKeyword
                | PrintKeyword
                | IncludeKeyword
                | IncludeOnceKeyword
                | RequireKeyword
                | RequireOnceKeyword
                | StaticKeyword
                | FunctionKeyword
        ) || phz_scanner::token_is_reserved_word(kind)
    }

    pub(crate) fn is_modifier(kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            PublicKeyword
                | ProtectedKeyword
                | PrivateKeyword
                | StaticKeyword
                | AbstractKeyword
                | FinalKeyword
                | VarKeyword
        )
    }

    fn is_class_member_start(kind: TokenKind) -> bool {
        use TokenKind::*;
        Self::is_modifier(kind)
            || matches!(kind, ConstKeyword | FunctionKeyword | VariableName | UseKeyword)
    }
}
