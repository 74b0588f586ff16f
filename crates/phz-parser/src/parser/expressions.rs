//! Expression parsing: the precedence climb, the unary/cast/creation front
//! end, primary dispatch, the postfix chain, and interpolated strings.

use phz_scanner::{token_is_keyword_or_reserved_word, Token, TokenKind};

use super::base::{Child, NodeIndex};
use super::node::*;
use super::state::ParserState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Assoc {
    None,
    Left,
    Right,
}

/// Binary operator precedence and associativity. Higher binds tighter.
/// Returns `None` for tokens that are not binary operators.
fn precedence_and_associativity(kind: TokenKind) -> Option<(u8, Assoc)> {
    use TokenKind::*;
    Some(match kind {
        OrKeyword => (6, Assoc::Left),
        XorKeyword => (7, Assoc::Left),
        AndKeyword => (8, Assoc::Left),
        Equals
        | AsteriskAsteriskEquals
        | AsteriskEquals
        | SlashEquals
        | PercentEquals
        | PlusEquals
        | MinusEquals
        | DotEquals
        | LessThanLessThanEquals
        | GreaterThanGreaterThanEquals
        | AmpersandEquals
        | CaretEquals
        | BarEquals
        | QuestionQuestion => (9, Assoc::Right),
        Question => (10, Assoc::Left),
        BarBar => (12, Assoc::Left),
        AmpersandAmpersand => (13, Assoc::Left),
        Bar => (14, Assoc::Left),
        Caret => (15, Assoc::Left),
        Ampersand => (16, Assoc::Left),
        EqualsEquals | ExclamationEquals | LessThanGreaterThan | EqualsEqualsEquals
        | ExclamationEqualsEquals => (17, Assoc::None),
        LessThan | GreaterThan | LessThanEquals | GreaterThanEquals
        | LessThanEqualsGreaterThan => (18, Assoc::None),
        LessThanLessThan | GreaterThanGreaterThan => (19, Assoc::Left),
        Plus | Minus | Dot => (20, Assoc::Left),
        Asterisk | Slash | Percent => (21, Assoc::Left),
        InstanceOfKeyword => (22, Assoc::None),
        AsteriskAsterisk => (23, Assoc::Right),
        _ => return None,
    })
}

fn is_assignment_operator(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Equals
            | AsteriskAsteriskEquals
            | AsteriskEquals
            | SlashEquals
            | PercentEquals
            | PlusEquals
            | MinusEquals
            | DotEquals
            | LessThanLessThanEquals
            | GreaterThanGreaterThanEquals
            | AmpersandEquals
            | CaretEquals
            | BarEquals
    )
}

impl ParserState {
    // =========================================================================
    // Outer form
    // =========================================================================

    /// Parse an expression. Always produces a child: at end of file (or when
    /// no expression can start) the result is a missing token of the
    /// `Expression` pseudo-kind.
    pub(crate) fn parse_expression(&mut self) -> Child {
        use TokenKind::*;
        if self.check(EndOfFile) {
            return Child::Token(Token::missing(Expression, self.token.full_start));
        }
        if matches!(
            self.token.kind,
            IncludeKeyword | IncludeOnceKeyword | RequireKeyword | RequireOnceKeyword
        ) {
            let require_or_include_keyword = self.advance();
            let expression = self.parse_expression();
            return Child::Node(self.arena.add(NodeData::ScriptInclusionExpression(
                ScriptInclusionExpressionNode {
                    require_or_include_keyword,
                    expression,
                },
            )));
        }
        self.parse_binary_expression_or_higher(0)
    }

    /// Forced variant: when the climb yields only a missing token at a
    /// position that is not end of file, the unrecognized token is wrapped
    /// as skipped and the stream advances, guaranteeing forward progress for
    /// expression statements.
    pub(crate) fn parse_expression_forced(&mut self) -> (Child, Option<Token>) {
        let expression = self.parse_expression();
        if let Child::Token(token) = expression {
            if token.is_missing() && !self.check(TokenKind::EndOfFile) {
                let skipped = Token::skipped(self.advance());
                return (expression, Some(skipped));
            }
        }
        (expression, None)
    }

    // =========================================================================
    // Precedence climb
    // =========================================================================

    pub(crate) fn parse_binary_expression_or_higher(&mut self, min_precedence: u8) -> Child {
        let mut left = self.parse_unary_expression_or_higher(true);
        let mut previous: Option<(u8, Assoc)> = None;
        loop {
            let operator_kind = self.token.kind;
            let Some((precedence, associativity)) = precedence_and_associativity(operator_kind)
            else {
                break;
            };
            // Non-associative operators refuse to chain at their own level:
            // `$a < $b < $c` stops after the first comparison.
            if let Some((previous_precedence, Assoc::None)) = previous {
                if previous_precedence == precedence {
                    break;
                }
            }
            let consume = if associativity == Assoc::Right {
                precedence >= min_precedence
            } else {
                precedence > min_precedence
            };
            if !consume {
                break;
            }
            let operator = self.advance();
            left = if operator_kind == TokenKind::Question {
                self.parse_ternary_expression_rest(left, operator)
            } else if operator_kind == TokenKind::Equals {
                let by_ref = self.eat_optional1(TokenKind::Ampersand);
                let right = self.parse_binary_expression_or_higher(precedence);
                Child::Node(self.arena.add(NodeData::AssignmentExpression(
                    AssignmentExpressionNode {
                        left,
                        operator,
                        by_ref,
                        right,
                    },
                )))
            } else if is_assignment_operator(operator_kind) {
                let right = self.parse_binary_expression_or_higher(precedence);
                Child::Node(self.arena.add(NodeData::AssignmentExpression(
                    AssignmentExpressionNode {
                        left,
                        operator,
                        by_ref: None,
                        right,
                    },
                )))
            } else if operator_kind == TokenKind::AsteriskAsterisk && self.is_unary_op_node(left) {
                self.parse_exponent_under_unary(left, operator, precedence)
            } else {
                let right = self.parse_binary_expression_or_higher(precedence);
                Child::Node(
                    self.arena
                        .add(NodeData::BinaryExpression(BinaryExpressionNode {
                            left,
                            operator,
                            right,
                        })),
                )
            };
            previous = Some((precedence, associativity));
        }
        left
    }

    fn is_unary_op_node(&self, child: Child) -> bool {
        child
            .as_node()
            .is_some_and(|index| self.arena.kind(index) == NodeKind::UnaryOpExpression)
    }

    /// `**` binds tighter than a unary prefix on its left operand: unwrap
    /// the unary expression, bind the exponentiation against its inner
    /// operand, and re-wrap, so `-3**2` reads as `-(3**2)`.
    fn parse_exponent_under_unary(
        &mut self,
        left: Child,
        operator: Token,
        precedence: u8,
    ) -> Child {
        let unary = left.as_node().expect("checked by is_unary_op_node");
        let inner = match self.arena.get(unary) {
            NodeData::UnaryOpExpression(node) => node.operand,
            _ => unreachable!("checked by is_unary_op_node"),
        };
        let right = self.parse_binary_expression_or_higher(precedence);
        let binary = self
            .arena
            .add(NodeData::BinaryExpression(BinaryExpressionNode {
                left: inner,
                operator,
                right,
            }));
        match self.arena.node_mut(unary) {
            NodeData::UnaryOpExpression(node) => node.operand = Child::Node(binary),
            _ => unreachable!("checked by is_unary_op_node"),
        }
        self.arena.reparent(binary, unary);
        Child::Node(unary)
    }

    /// Ternary rest, entered after `?`. The middle expression is optional
    /// (short ternary); the else branch binds at precedence 9 so it wins
    /// against the surrounding assignment level.
    fn parse_ternary_expression_rest(&mut self, condition: Child, question: Token) -> Child {
        let if_expression = if self.check(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expression())
        };
        let colon = self.eat1(TokenKind::Colon);
        let else_expression = self.parse_binary_expression_or_higher(9);
        Child::Node(
            self.arena
                .add(NodeData::TernaryExpression(TernaryExpressionNode {
                    condition,
                    question,
                    if_expression,
                    colon,
                    else_expression,
                })),
        )
    }

    // =========================================================================
    // Unary front end
    // =========================================================================

    pub(crate) fn parse_unary_expression_or_higher(&mut self, allow_update: bool) -> Child {
        use TokenKind::*;
        let kind = self.token.kind;
        match kind {
            Plus | Minus | Exclamation | Tilde => {
                let operator = self.advance();
                let operand = self.parse_unary_expression_or_higher(allow_update);
                Child::Node(
                    self.arena
                        .add(NodeData::UnaryOpExpression(UnaryOpExpressionNode {
                            operator,
                            operand,
                        })),
                )
            }
            At => {
                let operator = self.advance();
                let operand = self.parse_unary_expression_or_higher(allow_update);
                Child::Node(self.arena.add(NodeData::ErrorControlExpression(
                    ErrorControlExpressionNode { operator, operand },
                )))
            }
            PlusPlus | MinusMinus => {
                let increment_or_decrement = self.advance();
                let operand = self.parse_unary_expression_or_higher(false);
                Child::Node(self.arena.add(NodeData::PrefixUpdateExpression(
                    PrefixUpdateExpressionNode {
                        increment_or_decrement,
                        operand,
                    },
                )))
            }
            OpenParen if self.is_cast_expression_start() => self.parse_cast_expression(),
            NewKeyword => self.parse_object_creation_expression(),
            CloneKeyword => {
                let clone_keyword = self.advance();
                let operand = self.parse_unary_expression_or_higher(allow_update);
                Child::Node(
                    self.arena
                        .add(NodeData::CloneExpression(CloneExpressionNode {
                            clone_keyword,
                            operand,
                        })),
                )
            }
            _ => {
                let primary = self.parse_primary_expression();
                self.parse_postfix_expression_rest(primary, allow_update)
            }
        }
    }

    /// Recognize `( typename )` against the fixed cast-name set.
    fn is_cast_expression_start(&mut self) -> bool {
        self.look_ahead(|parser| {
            parser.advance();
            if !parser.is_cast_type_token() {
                return false;
            }
            parser.advance();
            parser.check(TokenKind::CloseParen)
        })
    }

    fn is_cast_type_token(&self) -> bool {
        use TokenKind::*;
        match self.token.kind {
            ArrayKeyword | UnsetKeyword | IntReservedWord | FloatReservedWord
            | BoolReservedWord | StringReservedWord | ObjectReservedWord => true,
            Name => {
                let text = self.token.text(self.lexer.source_text());
                text.eq_ignore_ascii_case("binary")
                    || text.eq_ignore_ascii_case("boolean")
                    || text.eq_ignore_ascii_case("double")
                    || text.eq_ignore_ascii_case("integer")
                    || text.eq_ignore_ascii_case("real")
            }
            _ => false,
        }
    }

    fn parse_cast_expression(&mut self) -> Child {
        let open_paren = self.advance();
        let cast_type = self.advance();
        let close_paren = self.eat1(TokenKind::CloseParen);
        let operand = self.parse_unary_expression_or_higher(true);
        Child::Node(
            self.arena
                .add(NodeData::CastExpression(CastExpressionNode {
                    open_paren,
                    cast_type,
                    close_paren,
                    operand,
                })),
        )
    }

    fn parse_object_creation_expression(&mut self) -> Child {
        use TokenKind::*;
        let new_keyword = self.advance();
        let class_type_designator = match self.token.kind {
            Name | Backslash | NamespaceKeyword => Child::Node(self.parse_qualified_name()),
            StaticKeyword => Child::Token(self.advance()),
            VariableName | Dollar => Child::Node(self.parse_simple_variable()),
            _ => Child::Token(Token::missing(Expression, self.token.full_start)),
        };
        let (open_paren, arguments, close_paren) = if self.check(OpenParen) {
            let open = self.advance();
            let arguments = self.parse_argument_list();
            let close = self.eat1(CloseParen);
            (Some(open), arguments, Some(close))
        } else {
            (None, None, None)
        };
        Child::Node(self.arena.add(NodeData::ObjectCreationExpression(
            ObjectCreationExpressionNode {
                new_keyword,
                class_type_designator,
                open_paren,
                arguments,
                close_paren,
            },
        )))
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> Child {
        use TokenKind::*;
        let kind = self.token.kind;
        match kind {
            VariableName | Dollar => Child::Node(self.parse_simple_variable()),
            Name | Backslash | NamespaceKeyword => Child::Node(self.parse_qualified_name()),
            TemplateStringStart => Child::Node(self.parse_template_string()),
            StringLiteral => {
                let token = self.advance();
                Child::Node(self.arena.add(NodeData::StringLiteral(StringLiteralNode {
                    start_quote: None,
                    children: vec![Child::Token(token)],
                    end_quote: None,
                })))
            }
            DoubleQuote | Backtick | HeredocStart => Child::Node(self.parse_quoted_string()),
            IntegerLiteral | FloatingLiteral => {
                let token = self.advance();
                Child::Node(
                    self.arena
                        .add(NodeData::NumericLiteral(NumericLiteralNode { token })),
                )
            }
            ArrayKeyword | OpenBracket => Child::Node(self.parse_array_creation_expression()),
            EchoKeyword => {
                let echo_keyword = self.advance();
                let expressions = self.parse_expression_list();
                Child::Node(
                    self.arena
                        .add(NodeData::EchoExpression(EchoExpressionNode {
                            echo_keyword,
                            expressions,
                        })),
                )
            }
            ListKeyword => self.parse_list_intrinsic(),
            UnsetKeyword => self.parse_unset_intrinsic(),
            EmptyKeyword => self.parse_empty_intrinsic(),
            EvalKeyword => self.parse_eval_intrinsic(),
            ExitKeyword | DieKeyword => self.parse_exit_intrinsic(),
            IsSetKeyword => self.parse_isset_intrinsic(),
            PrintKeyword => {
                let print_keyword = self.advance();
                let expression = self.parse_expression();
                Child::Node(self.arena.add(NodeData::PrintIntrinsicExpression(
                    PrintIntrinsicExpressionNode {
                        print_keyword,
                        expression,
                    },
                )))
            }
            OpenParen => Child::Node(self.parse_parenthesized_expression()),
            FunctionKeyword => Child::Node(self.parse_anonymous_function(None)),
            StaticKeyword if self.next_token_is(FunctionKeyword) => {
                let static_modifier = Some(self.advance());
                Child::Node(self.parse_anonymous_function(static_modifier))
            }
            StaticKeyword => {
                // `static::` / `static(`: usable as a scope qualifier.
                let token = self.eat_as_name();
                Child::Node(self.arena.add(NodeData::QualifiedName(QualifiedNameNode {
                    parts: vec![Child::Token(token)],
                })))
            }
            TrueReservedWord | FalseReservedWord | NullReservedWord => {
                if self.look_ahead_kinds(&[&[Backslash, ColonColon, OpenParen]]) {
                    Child::Node(self.parse_qualified_name())
                } else {
                    let token = self.advance();
                    Child::Node(
                        self.arena
                            .add(NodeData::ReservedWord(ReservedWordNode { token })),
                    )
                }
            }
            kind if phz_scanner::token_is_reserved_word(kind) => {
                Child::Node(self.parse_qualified_name())
            }
            _ => Child::Token(Token::missing(Expression, self.token.full_start)),
        }
    }

    pub(crate) fn parse_simple_variable(&mut self) -> NodeIndex {
        let name = self.eat(&[TokenKind::VariableName, TokenKind::Dollar]);
        self.arena.add(NodeData::Variable(VariableNode { name }))
    }

    /// Qualified name: optional leading `\` or `namespace\` prefix, then
    /// backslash-joined parts. Keywords and reserved words coerce to names
    /// in part position.
    pub(crate) fn parse_qualified_name(&mut self) -> NodeIndex {
        use TokenKind::*;
        let mut parts: Vec<Child> = Vec::new();
        if self.check(NamespaceKeyword) {
            parts.push(Child::Token(self.advance()));
            parts.push(Child::Token(self.eat1(Backslash)));
        } else if self.check(Backslash) {
            parts.push(Child::Token(self.advance()));
        }
        parts.push(Child::Token(self.eat_name_part()));
        while self.check(Backslash) && self.look_ahead(|p| {
            p.advance();
            p.check(Name) || token_is_keyword_or_reserved_word(p.token.kind)
        }) {
            parts.push(Child::Token(self.advance()));
            parts.push(Child::Token(self.eat_name_part()));
        }
        self.arena
            .add(NodeData::QualifiedName(QualifiedNameNode { parts }))
    }

    fn eat_name_part(&mut self) -> Token {
        if self.check(TokenKind::Name) {
            self.advance()
        } else if token_is_keyword_or_reserved_word(self.token.kind) {
            self.eat_as_name()
        } else {
            Token::missing(TokenKind::Name, self.token.full_start)
        }
    }

    fn parse_parenthesized_expression(&mut self) -> NodeIndex {
        let open_paren = self.advance();
        let expression = self.parse_expression();
        let close_paren = self.eat1(TokenKind::CloseParen);
        self.arena.add(NodeData::ParenthesizedExpression(
            ParenthesizedExpressionNode {
                open_paren,
                expression,
                close_paren,
            },
        ))
    }

    // =========================================================================
    // Postfix chain
    // =========================================================================

    /// Postfix rest applies only to dereferencable shapes; an array creation
    /// may only be followed by a subscript; a call immediately followed by
    /// `(` is first wrapped in a synthetic parenthesized expression, since
    /// calls nest only through parentheses.
    pub(crate) fn parse_postfix_expression_rest(
        &mut self,
        mut expression: Child,
        allow_update: bool,
    ) -> Child {
        use TokenKind::*;
        loop {
            let Some(index) = expression.as_node() else {
                return expression;
            };
            let node_kind = self.arena.kind(index);
            let eligible = matches!(
                node_kind,
                NodeKind::Variable
                    | NodeKind::ParenthesizedExpression
                    | NodeKind::QualifiedName
                    | NodeKind::CallExpression
                    | NodeKind::MemberAccessExpression
                    | NodeKind::SubscriptExpression
                    | NodeKind::ScopedPropertyAccessExpression
                    | NodeKind::StringLiteral
                    | NodeKind::ArrayCreationExpression
            );
            if !eligible {
                return expression;
            }
            if node_kind == NodeKind::ArrayCreationExpression
                && !matches!(self.token.kind, OpenBracket | OpenBrace)
            {
                return expression;
            }
            match self.token.kind {
                OpenBracket | OpenBrace => {
                    expression = self.parse_subscript_rest(expression);
                }
                Arrow => {
                    let arrow = self.advance();
                    let member_name = self.parse_member_name();
                    expression = Child::Node(self.arena.add(NodeData::MemberAccessExpression(
                        MemberAccessExpressionNode {
                            dereferencable_expression: expression,
                            arrow,
                            member_name,
                        },
                    )));
                }
                ColonColon => {
                    let double_colon = self.advance();
                    let member_name = self.parse_member_name();
                    expression =
                        Child::Node(self.arena.add(NodeData::ScopedPropertyAccessExpression(
                            ScopedPropertyAccessExpressionNode {
                                scope_resolution_qualifier: expression,
                                double_colon,
                                member_name,
                            },
                        )));
                }
                OpenParen => {
                    let open_paren = self.advance();
                    let arguments = self.parse_argument_list();
                    let close_paren = self.eat1(CloseParen);
                    let call = Child::Node(self.arena.add(NodeData::CallExpression(
                        CallExpressionNode {
                            callable_expression: expression,
                            open_paren,
                            arguments,
                            close_paren,
                        },
                    )));
                    // Calls nest only through parentheses: a call followed
                    // directly by `(` gets a zero-width paren wrapper, and
                    // the chain continues with a call on the wrapper, so
                    // `f()()` reads as `(f())()`.
                    expression = if self.check(OpenParen) {
                        let offset = self.token.full_start;
                        Child::Node(self.arena.add(NodeData::ParenthesizedExpression(
                            ParenthesizedExpressionNode {
                                open_paren: Token::missing(OpenParen, offset),
                                expression: call,
                                close_paren: Token::missing(CloseParen, offset),
                            },
                        )))
                    } else {
                        call
                    };
                }
                PlusPlus | MinusMinus if allow_update => {
                    let increment_or_decrement = self.advance();
                    return Child::Node(self.arena.add(NodeData::PostfixUpdateExpression(
                        PostfixUpdateExpressionNode {
                            operand: expression,
                            increment_or_decrement,
                        },
                    )));
                }
                _ => return expression,
            }
        }
    }

    fn parse_subscript_rest(&mut self, postfix_expression: Child) -> Child {
        let open = self.advance();
        let close_kind = if open.kind == TokenKind::OpenBracket {
            TokenKind::CloseBracket
        } else {
            TokenKind::CloseBrace
        };
        let access_expression = if self.check(close_kind) {
            None
        } else {
            Some(self.parse_expression())
        };
        let close = self.eat1(close_kind);
        Child::Node(
            self.arena
                .add(NodeData::SubscriptExpression(SubscriptExpressionNode {
                    postfix_expression,
                    open_bracket_or_brace: open,
                    access_expression,
                    close_bracket_or_brace: close,
                })),
        )
    }

    /// Member name after `->` / `::`: a name, a simple variable, a braced
    /// expression, or any keyword/reserved word coerced to a name.
    fn parse_member_name(&mut self) -> Child {
        use TokenKind::*;
        match self.token.kind {
            Name => Child::Token(self.advance()),
            VariableName | Dollar => Child::Node(self.parse_simple_variable()),
            OpenBrace => {
                let open_brace = self.advance();
                let expression = self.parse_expression();
                let close_brace = self.eat1(CloseBrace);
                Child::Node(
                    self.arena
                        .add(NodeData::BracedExpression(BracedExpressionNode {
                            open_brace,
                            expression,
                            close_brace,
                        })),
                )
            }
            kind if token_is_keyword_or_reserved_word(kind) => Child::Token(self.eat_as_name()),
            _ => Child::Token(Token::missing(Name, self.token.full_start)),
        }
    }

    // =========================================================================
    // Delimited lists
    // =========================================================================

    /// Homogeneous delimited list; returns `None` when no children were
    /// collected. A trailing delimiter stays in place at the sequence end.
    pub(crate) fn parse_delimited_list(
        &mut self,
        delimiter: TokenKind,
        mut is_element_start: impl FnMut(&mut Self) -> bool,
        mut parse_element: impl FnMut(&mut Self) -> Child,
    ) -> Option<NodeIndex> {
        let mut children: Vec<Child> = Vec::new();
        loop {
            if is_element_start(self) {
                children.push(parse_element(self));
            }
            match self.eat_optional1(delimiter) {
                Some(token) => children.push(Child::Token(token)),
                None => break,
            }
        }
        if children.is_empty() {
            None
        } else {
            Some(
                self.arena
                    .add(NodeData::DelimitedList(DelimitedListNode { children })),
            )
        }
    }

    pub(crate) fn parse_expression_list(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| p.is_expression_start(p.token.kind),
            |p| p.parse_expression(),
        )
    }

    pub(crate) fn parse_qualified_name_list(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| {
                matches!(
                    p.token.kind,
                    TokenKind::Name | TokenKind::Backslash | TokenKind::NamespaceKeyword
                )
            },
            |p| Child::Node(p.parse_qualified_name()),
        )
    }

    pub(crate) fn parse_argument_list(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| p.is_expression_start(p.token.kind) || p.check(TokenKind::DotDotDot),
            |p| {
                let dot_dot_dot = p.eat_optional1(TokenKind::DotDotDot);
                let expression = p.parse_expression();
                Child::Node(p.arena.add(NodeData::ArgumentExpression(
                    ArgumentExpressionNode {
                        dot_dot_dot,
                        expression,
                    },
                )))
            },
        )
    }

    fn parse_array_element_list(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| p.is_expression_start(p.token.kind) || p.check(TokenKind::Ampersand),
            |p| Child::Node(p.parse_array_element()),
        )
    }

    fn parse_array_element(&mut self) -> NodeIndex {
        use TokenKind::*;
        if let Some(by_ref) = self.eat_optional1(Ampersand) {
            let value = self.parse_expression();
            return self.arena.add(NodeData::ArrayElement(ArrayElementNode {
                key: None,
                arrow: None,
                by_ref: Some(by_ref),
                value,
            }));
        }
        let first = self.parse_expression();
        if self.check(DoubleArrow) {
            let arrow = Some(self.advance());
            let by_ref = self.eat_optional1(Ampersand);
            let value = self.parse_expression();
            self.arena.add(NodeData::ArrayElement(ArrayElementNode {
                key: Some(first),
                arrow,
                by_ref,
                value,
            }))
        } else {
            self.arena.add(NodeData::ArrayElement(ArrayElementNode {
                key: None,
                arrow: None,
                by_ref: None,
                value: first,
            }))
        }
    }

    // =========================================================================
    // Array creation and intrinsics
    // =========================================================================

    fn parse_array_creation_expression(&mut self) -> NodeIndex {
        use TokenKind::*;
        let (array_keyword, open, close_kind) = if self.check(ArrayKeyword) {
            let keyword = self.advance();
            (Some(keyword), self.eat1(OpenParen), CloseParen)
        } else {
            (None, self.eat1(OpenBracket), CloseBracket)
        };
        let array_elements = self.parse_array_element_list();
        let close = self.eat1(close_kind);
        self.arena
            .add(NodeData::ArrayCreationExpression(ArrayCreationExpressionNode {
                array_keyword,
                open_paren_or_bracket: open,
                array_elements,
                close_paren_or_bracket: close,
            }))
    }

    fn parse_list_intrinsic(&mut self) -> Child {
        let list_keyword = self.advance();
        let open_paren = self.eat1(TokenKind::OpenParen);
        let list_elements = self.parse_array_element_list();
        let close_paren = self.eat1(TokenKind::CloseParen);
        Child::Node(self.arena.add(NodeData::ListIntrinsicExpression(
            ListIntrinsicExpressionNode {
                list_keyword,
                open_paren,
                list_elements,
                close_paren,
            },
        )))
    }

    fn parse_unset_intrinsic(&mut self) -> Child {
        let unset_keyword = self.advance();
        let open_paren = self.eat1(TokenKind::OpenParen);
        let expressions = self.parse_expression_list();
        let close_paren = self.eat1(TokenKind::CloseParen);
        Child::Node(self.arena.add(NodeData::UnsetIntrinsicExpression(
            UnsetIntrinsicExpressionNode {
                unset_keyword,
                open_paren,
                expressions,
                close_paren,
            },
        )))
    }

    fn parse_empty_intrinsic(&mut self) -> Child {
        let empty_keyword = self.advance();
        let open_paren = self.eat1(TokenKind::OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(TokenKind::CloseParen);
        Child::Node(self.arena.add(NodeData::EmptyIntrinsicExpression(
            EmptyIntrinsicExpressionNode {
                empty_keyword,
                open_paren,
                expression,
                close_paren,
            },
        )))
    }

    fn parse_eval_intrinsic(&mut self) -> Child {
        let eval_keyword = self.advance();
        let open_paren = self.eat1(TokenKind::OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(TokenKind::CloseParen);
        Child::Node(self.arena.add(NodeData::EvalIntrinsicExpression(
            EvalIntrinsicExpressionNode {
                eval_keyword,
                open_paren,
                expression,
                close_paren,
            },
        )))
    }

    fn parse_exit_intrinsic(&mut self) -> Child {
        let exit_or_die_keyword = self.advance();
        let (open_paren, expression, close_paren) = if self.check(TokenKind::OpenParen) {
            let open = self.advance();
            let expression = if self.check(TokenKind::CloseParen) {
                None
            } else {
                Some(self.parse_expression())
            };
            let close = self.eat1(TokenKind::CloseParen);
            (Some(open), expression, Some(close))
        } else {
            (None, None, None)
        };
        Child::Node(self.arena.add(NodeData::ExitIntrinsicExpression(
            ExitIntrinsicExpressionNode {
                exit_or_die_keyword,
                open_paren,
                expression,
                close_paren,
            },
        )))
    }

    fn parse_isset_intrinsic(&mut self) -> Child {
        let isset_keyword = self.advance();
        let open_paren = self.eat1(TokenKind::OpenParen);
        let expressions = self.parse_expression_list();
        let close_paren = self.eat1(TokenKind::CloseParen);
        Child::Node(self.arena.add(NodeData::IssetIntrinsicExpression(
            IssetIntrinsicExpressionNode {
                isset_keyword,
                open_paren,
                expressions,
                close_paren,
            },
        )))
    }

    // =========================================================================
    // Interpolated strings
    // =========================================================================

    /// Template flow: start token, then alternating variables (each followed
    /// by a template rescan that replaces the window) and middle runs, then
    /// the end token.
    fn parse_template_string(&mut self) -> NodeIndex {
        let mut children: Vec<Child> = Vec::new();
        loop {
            children.push(Child::Token(self.advance()));
            if self.check(TokenKind::VariableName) {
                let variable = self.token();
                children.push(Child::Token(variable));
                self.token = self.lexer.rescan_template(&variable);
            }
            if !self.check(TokenKind::TemplateStringMiddle) {
                break;
            }
        }
        children.push(Child::Token(self.eat1(TokenKind::TemplateStringEnd)));
        self.arena
            .add(NodeData::TemplateExpression(TemplateExpressionNode {
                children,
            }))
    }

    /// Quote-delimited flow: open quote, then encapsed runs, variables, and
    /// `${`/`{$` embedded expressions that must close with `}`; terminates
    /// on the matching close quote (or end of file, leaving a missing close).
    fn parse_quoted_string(&mut self) -> NodeIndex {
        use TokenKind::*;
        let start_quote = self.advance();
        let close_kind = match start_quote.kind {
            HeredocStart => HeredocEnd,
            Backtick => Backtick,
            _ => DoubleQuote,
        };
        let mut children: Vec<Child> = Vec::new();
        let end_quote = loop {
            let kind = self.token.kind;
            if kind == close_kind {
                break Some(self.advance());
            }
            if kind == EndOfFile {
                break Some(Token::missing(close_kind, self.token.full_start));
            }
            if kind == DollarOpenBrace || kind == OpenBraceDollar {
                children.push(Child::Token(self.advance()));
                children.push(self.parse_expression());
                children.push(Child::Token(self.eat1(CloseBrace)));
                continue;
            }
            children.push(Child::Token(self.advance()));
        };
        self.arena.add(NodeData::StringLiteral(StringLiteralNode {
            start_quote: Some(start_quote),
            children,
            end_quote,
        }))
    }

    // =========================================================================
    // Anonymous functions
    // =========================================================================

    pub(crate) fn parse_anonymous_function(
        &mut self,
        static_modifier: Option<Token>,
    ) -> NodeIndex {
        use TokenKind::*;
        let function_keyword = self.eat1(FunctionKeyword);
        let by_ref = self.eat_optional1(Ampersand);
        // A name on an anonymous function is kept, flagged as skipped.
        let skipped_name = if self.check(Name) {
            Some(Token::skipped(self.advance()))
        } else {
            None
        };
        let open_paren = self.eat1(OpenParen);
        let parameters = self.parse_parameter_list();
        let close_paren = self.eat1(CloseParen);
        let use_clause = if self.check(UseKeyword) {
            Some(self.parse_anonymous_function_use_clause())
        } else {
            None
        };
        let (colon, return_type) = self.parse_return_type();
        let compound_statement = self.parse_compound_statement();
        self.arena.add(NodeData::AnonymousFunctionCreationExpression(
            AnonymousFunctionCreationExpressionNode {
                static_modifier,
                function_keyword,
                by_ref,
                skipped_name,
                open_paren,
                parameters,
                close_paren,
                use_clause,
                colon,
                return_type,
                compound_statement,
            },
        ))
    }

    fn parse_anonymous_function_use_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let use_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let use_variables = self.parse_delimited_list(
            Comma,
            |p| matches!(p.token.kind, VariableName | Ampersand),
            |p| {
                let by_ref = p.eat_optional1(Ampersand);
                let variable_name = p.eat1(VariableName);
                Child::Node(p.arena.add(NodeData::UseVariableName(UseVariableNameNode {
                    by_ref,
                    variable_name,
                })))
            },
        );
        let close_paren = self.eat1(CloseParen);
        self.arena.add(NodeData::AnonymousFunctionUseClause(
            AnonymousFunctionUseClauseNode {
                use_keyword,
                open_paren,
                use_variables,
                close_paren,
            },
        ))
    }
}
