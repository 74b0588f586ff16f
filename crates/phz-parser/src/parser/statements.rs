//! Statement parsing: dispatch on the leading token to one of the statement
//! productions, plus the control-flow statements with their two body forms
//! (single statement or colon-delimited list terminated by `endX`).

use phz_scanner::{Token, TokenKind};

use super::base::{Child, ListContext, NodeIndex};
use super::node::*;
use super::state::ParserState;

impl ParserState {
    pub(crate) fn parse_statement(&mut self) -> Child {
        use TokenKind::*;
        let kind = self.token.kind;
        match kind {
            OpenBrace => Child::Node(self.parse_compound_statement()),
            Name if self.next_token_is(Colon) => Child::Node(self.parse_named_label_statement()),
            IfKeyword => Child::Node(self.parse_if_statement()),
            SwitchKeyword => Child::Node(self.parse_switch_statement()),
            WhileKeyword => Child::Node(self.parse_while_statement()),
            DoKeyword => Child::Node(self.parse_do_statement()),
            ForKeyword => Child::Node(self.parse_for_statement()),
            ForEachKeyword => Child::Node(self.parse_foreach_statement()),
            GotoKeyword => Child::Node(self.parse_goto_statement()),
            BreakKeyword | ContinueKeyword => Child::Node(self.parse_break_or_continue_statement()),
            ReturnKeyword => Child::Node(self.parse_return_statement()),
            ThrowKeyword => Child::Node(self.parse_throw_statement()),
            TryKeyword => Child::Node(self.parse_try_statement()),
            DeclareKeyword => Child::Node(self.parse_declare_statement()),
            FunctionKeyword if self.is_function_declaration_start() => {
                Child::Node(self.parse_function_declaration())
            }
            // `final`/`abstract` at statement level only start a class
            // declaration; anything else makes the token a skipped element
            // and the list loop retries.
            AbstractKeyword | FinalKeyword => {
                if self.is_class_modifier_before_class() {
                    Child::Node(self.parse_class_declaration())
                } else {
                    Child::Token(Token::skipped(self.advance()))
                }
            }
            ClassKeyword => Child::Node(self.parse_class_declaration()),
            InterfaceKeyword => Child::Node(self.parse_interface_declaration()),
            TraitKeyword => Child::Node(self.parse_trait_declaration()),
            // `namespace\Foo` is a relative qualified name, not a definition.
            NamespaceKeyword if !self.next_token_is(Backslash) => {
                Child::Node(self.parse_namespace_definition())
            }
            UseKeyword => Child::Node(self.parse_namespace_use_declaration()),
            GlobalKeyword => Child::Node(self.parse_global_declaration()),
            ConstKeyword => Child::Node(self.parse_const_declaration()),
            // `static` followed by `function`, `(`, or `::` falls through to
            // the expression parser; the order of these tests is load-bearing.
            StaticKeyword
                if !self.look_ahead_kinds(&[&[FunctionKeyword, OpenParen, ColonColon]]) =>
            {
                Child::Node(self.parse_function_static_declaration())
            }
            Semicolon => {
                let semicolon = self.advance();
                Child::Node(
                    self.arena
                        .add(NodeData::EmptyStatement(EmptyStatementNode { semicolon })),
                )
            }
            ScriptSectionEndTag | InlineHtml | ScriptSectionStartTag => {
                Child::Node(self.parse_inline_html())
            }
            _ => Child::Node(self.parse_expression_statement()),
        }
    }

    fn is_function_declaration_start(&mut self) -> bool {
        self.look_ahead(|parser| {
            parser.advance();
            if parser.check(TokenKind::Ampersand) {
                parser.advance();
            }
            parser.check(TokenKind::Name)
                || phz_scanner::token_is_keyword_or_reserved_word(parser.token.kind)
        })
    }

    fn is_class_modifier_before_class(&mut self) -> bool {
        self.look_ahead(|parser| {
            // Allow a run of `abstract`/`final` before `class`.
            loop {
                parser.advance();
                match parser.token.kind {
                    TokenKind::AbstractKeyword | TokenKind::FinalKeyword => {}
                    TokenKind::ClassKeyword => return true,
                    _ => return false,
                }
            }
        })
    }

    /// Inline-HTML island: optional close tag, optional text, optional open
    /// tag. Also emitted at top of file for pre-script text.
    pub(crate) fn parse_inline_html(&mut self) -> NodeIndex {
        let script_section_end = self.eat_optional1(TokenKind::ScriptSectionEndTag);
        let text = self.eat_optional1(TokenKind::InlineHtml);
        let script_section_start = self.eat_optional1(TokenKind::ScriptSectionStartTag);
        self.arena.add(NodeData::InlineHtml(InlineHtmlNode {
            script_section_end,
            text,
            script_section_start,
        }))
    }

    pub(crate) fn parse_compound_statement(&mut self) -> NodeIndex {
        let open_brace = self.eat1(TokenKind::OpenBrace);
        let statements = self.parse_list(ListContext::BlockStatements);
        let close_brace = self.eat1(TokenKind::CloseBrace);
        self.arena
            .add(NodeData::CompoundStatement(CompoundStatementNode {
                open_brace,
                statements,
                close_brace,
            }))
    }

    fn parse_named_label_statement(&mut self) -> NodeIndex {
        let name = self.eat1(TokenKind::Name);
        let colon = self.eat1(TokenKind::Colon);
        let statement = self.parse_statement();
        self.arena
            .add(NodeData::NamedLabelStatement(NamedLabelStatementNode {
                name,
                colon,
                statement,
            }))
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let (expression, skipped) = self.parse_expression_forced();
        let semicolon = self.parse_statement_termination();
        self.arena
            .add(NodeData::ExpressionStatement(ExpressionStatementNode {
                expression,
                skipped,
                semicolon,
            }))
    }

    /// An expression-statement's semicolon is satisfied by a script-section
    /// end tag: the tag stays in the stream for the next inline-HTML island.
    fn parse_statement_termination(&mut self) -> Option<Token> {
        if self.check(TokenKind::ScriptSectionEndTag) {
            None
        } else {
            Some(self.eat1(TokenKind::Semicolon))
        }
    }

    // =========================================================================
    // Selection statements
    // =========================================================================

    fn parse_if_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let if_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        let statements = if colon.is_some() {
            self.parse_list(ListContext::IfClauseElements)
        } else {
            vec![self.parse_statement()]
        };
        let mut elseif_clauses: Vec<Child> = Vec::new();
        while self.check(ElseIfKeyword) {
            elseif_clauses.push(Child::Node(self.parse_elseif_clause()));
        }
        let else_clause = if self.check(ElseKeyword) {
            Some(self.parse_else_clause())
        } else {
            None
        };
        let (endif_keyword, semicolon) = if colon.is_some() {
            (Some(self.eat1(EndIfKeyword)), Some(self.eat1(Semicolon)))
        } else {
            (None, None)
        };
        self.arena.add(NodeData::IfStatement(IfStatementNode {
            if_keyword,
            open_paren,
            expression,
            close_paren,
            colon,
            statements,
            elseif_clauses,
            else_clause,
            endif_keyword,
            semicolon,
        }))
    }

    fn parse_elseif_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let elseif_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        let statements = if colon.is_some() {
            self.parse_list(ListContext::IfClauseElements)
        } else {
            vec![self.parse_statement()]
        };
        self.arena.add(NodeData::ElseIfClause(ElseIfClauseNode {
            elseif_keyword,
            open_paren,
            expression,
            close_paren,
            colon,
            statements,
        }))
    }

    fn parse_else_clause(&mut self) -> NodeIndex {
        let else_keyword = self.advance();
        let colon = self.eat_optional1(TokenKind::Colon);
        let statements = if colon.is_some() {
            self.parse_list(ListContext::IfClauseElements)
        } else {
            vec![self.parse_statement()]
        };
        self.arena.add(NodeData::ElseClause(ElseClauseNode {
            else_keyword,
            colon,
            statements,
        }))
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let switch_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        if let Some(colon) = colon {
            let case_statements = self.parse_list(ListContext::SwitchStatementElements);
            let endswitch_keyword = Some(self.eat1(EndSwitchKeyword));
            let semicolon = Some(self.eat1(Semicolon));
            return self.arena.add(NodeData::SwitchStatement(SwitchStatementNode {
                switch_keyword,
                open_paren,
                expression,
                close_paren,
                colon: Some(colon),
                open_brace: None,
                case_statements,
                close_brace: None,
                endswitch_keyword,
                semicolon,
            }));
        }
        let open_brace = Some(self.eat1(OpenBrace));
        let case_statements = self.parse_list(ListContext::SwitchStatementElements);
        let close_brace = Some(self.eat1(CloseBrace));
        self.arena.add(NodeData::SwitchStatement(SwitchStatementNode {
            switch_keyword,
            open_paren,
            expression,
            close_paren,
            colon: None,
            open_brace,
            case_statements,
            close_brace,
            endswitch_keyword: None,
            semicolon: None,
        }))
    }

    pub(crate) fn parse_case_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let case_keyword = self.eat(&[CaseKeyword, DefaultKeyword]);
        let expression = if case_keyword.kind == CaseKeyword {
            Some(self.parse_expression())
        } else {
            None
        };
        // The case label ends in a colon, or (legacy) a semicolon.
        let colon_or_semicolon = self.eat(&[Colon, Semicolon]);
        let statements = self.parse_list(ListContext::CaseStatementElements);
        self.arena.add(NodeData::CaseStatement(CaseStatementNode {
            case_keyword,
            expression,
            colon_or_semicolon,
            statements,
        }))
    }

    // =========================================================================
    // Iteration statements
    // =========================================================================

    fn parse_while_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let while_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        let (statements, endwhile_keyword, semicolon) = if colon.is_some() {
            let statements = self.parse_list(ListContext::WhileStatementElements);
            (
                statements,
                Some(self.eat1(EndWhileKeyword)),
                Some(self.eat1(Semicolon)),
            )
        } else {
            (vec![self.parse_statement()], None, None)
        };
        self.arena.add(NodeData::WhileStatement(WhileStatementNode {
            while_keyword,
            open_paren,
            expression,
            close_paren,
            colon,
            statements,
            endwhile_keyword,
            semicolon,
        }))
    }

    fn parse_do_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let do_keyword = self.advance();
        let statement = self.parse_statement();
        let while_keyword = self.eat1(WhileKeyword);
        let open_paren = self.eat1(OpenParen);
        let expression = self.parse_expression();
        let close_paren = self.eat1(CloseParen);
        let semicolon = self.eat1(Semicolon);
        self.arena.add(NodeData::DoStatement(DoStatementNode {
            do_keyword,
            statement,
            while_keyword,
            open_paren,
            expression,
            close_paren,
            semicolon,
        }))
    }

    fn parse_for_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let for_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let initializer = self.parse_expression_list();
        let first_semicolon = self.eat1(Semicolon);
        let control = self.parse_expression_list();
        let second_semicolon = self.eat1(Semicolon);
        let increment = self.parse_expression_list();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        let (statements, endfor_keyword, semicolon) = if colon.is_some() {
            let statements = self.parse_list(ListContext::ForStatementElements);
            (
                statements,
                Some(self.eat1(EndForKeyword)),
                Some(self.eat1(Semicolon)),
            )
        } else {
            (vec![self.parse_statement()], None, None)
        };
        self.arena.add(NodeData::ForStatement(ForStatementNode {
            for_keyword,
            open_paren,
            initializer,
            first_semicolon,
            control,
            second_semicolon,
            increment,
            close_paren,
            colon,
            statements,
            endfor_keyword,
            semicolon,
        }))
    }

    fn parse_foreach_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let foreach_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let collection = self.parse_expression();
        let as_keyword = self.eat1(AsKeyword);
        let (key, value) = self.parse_foreach_key_and_value();
        let close_paren = self.eat1(CloseParen);
        let colon = self.eat_optional1(Colon);
        let (statements, endforeach_keyword, semicolon) = if colon.is_some() {
            let statements = self.parse_list(ListContext::ForeachStatementElements);
            (
                statements,
                Some(self.eat1(EndForEachKeyword)),
                Some(self.eat1(Semicolon)),
            )
        } else {
            (vec![self.parse_statement()], None, None)
        };
        self.arena.add(NodeData::ForeachStatement(ForeachStatementNode {
            foreach_keyword,
            open_paren,
            collection,
            as_keyword,
            key,
            value,
            close_paren,
            colon,
            statements,
            endforeach_keyword,
            semicolon,
        }))
    }

    fn parse_foreach_key_and_value(&mut self) -> (Option<NodeIndex>, Option<NodeIndex>) {
        use TokenKind::*;
        if let Some(ampersand) = self.eat_optional1(Ampersand) {
            let expression = self.parse_expression();
            let value = self.arena.add(NodeData::ForeachValue(ForeachValueNode {
                ampersand: Some(ampersand),
                expression,
            }));
            return (None, Some(value));
        }
        let first = self.parse_expression();
        if self.check(DoubleArrow) {
            let arrow = self.advance();
            let key = self.arena.add(NodeData::ForeachKey(ForeachKeyNode {
                expression: first,
                arrow,
            }));
            let ampersand = self.eat_optional1(Ampersand);
            let expression = self.parse_expression();
            let value = self.arena.add(NodeData::ForeachValue(ForeachValueNode {
                ampersand,
                expression,
            }));
            (Some(key), Some(value))
        } else {
            let value = self.arena.add(NodeData::ForeachValue(ForeachValueNode {
                ampersand: None,
                expression: first,
            }));
            (None, Some(value))
        }
    }

    // =========================================================================
    // Jump statements
    // =========================================================================

    fn parse_goto_statement(&mut self) -> NodeIndex {
        let goto_keyword = self.advance();
        let name = self.eat1(TokenKind::Name);
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena.add(NodeData::GotoStatement(GotoStatementNode {
            goto_keyword,
            name,
            semicolon,
        }))
    }

    fn parse_break_or_continue_statement(&mut self) -> NodeIndex {
        let keyword = self.advance();
        // Only an integer breakout level is accepted.
        let breakout_level = if self.check(TokenKind::IntegerLiteral) {
            let token = self.advance();
            Some(Child::Node(
                self.arena
                    .add(NodeData::NumericLiteral(NumericLiteralNode { token })),
            ))
        } else {
            None
        };
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena.add(NodeData::BreakOrContinueStatement(
            BreakOrContinueStatementNode {
                keyword,
                breakout_level,
                semicolon,
            },
        ))
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let return_keyword = self.advance();
        let expression = if self.is_expression_start(self.token.kind) {
            Some(self.parse_expression())
        } else {
            None
        };
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena.add(NodeData::ReturnStatement(ReturnStatementNode {
            return_keyword,
            expression,
            semicolon,
        }))
    }

    fn parse_throw_statement(&mut self) -> NodeIndex {
        let throw_keyword = self.advance();
        let expression = self.parse_expression();
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena.add(NodeData::ThrowStatement(ThrowStatementNode {
            throw_keyword,
            expression,
            semicolon,
        }))
    }

    // =========================================================================
    // Try statement
    // =========================================================================

    fn parse_try_statement(&mut self) -> NodeIndex {
        let try_keyword = self.advance();
        let compound_statement = self.parse_compound_statement();
        let mut catch_clauses: Vec<Child> = Vec::new();
        while self.check(TokenKind::CatchKeyword) {
            catch_clauses.push(Child::Node(self.parse_catch_clause()));
        }
        let finally_clause = if self.check(TokenKind::FinallyKeyword) {
            Some(self.parse_finally_clause())
        } else {
            None
        };
        self.arena.add(NodeData::TryStatement(TryStatementNode {
            try_keyword,
            compound_statement,
            catch_clauses,
            finally_clause,
        }))
    }

    fn parse_catch_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let catch_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let class_name = Child::Node(self.parse_qualified_name());
        let variable_name = self.eat1(VariableName);
        let close_paren = self.eat1(CloseParen);
        let compound_statement = self.parse_compound_statement();
        self.arena.add(NodeData::CatchClause(CatchClauseNode {
            catch_keyword,
            open_paren,
            class_name,
            variable_name,
            close_paren,
            compound_statement,
        }))
    }

    fn parse_finally_clause(&mut self) -> NodeIndex {
        let finally_keyword = self.advance();
        let compound_statement = self.parse_compound_statement();
        self.arena.add(NodeData::FinallyClause(FinallyClauseNode {
            finally_keyword,
            compound_statement,
        }))
    }

    // =========================================================================
    // Declare statement
    // =========================================================================

    fn parse_declare_statement(&mut self) -> NodeIndex {
        use TokenKind::*;
        let declare_keyword = self.advance();
        let open_paren = self.eat1(OpenParen);
        let directives = self.parse_declare_directive_list();
        let close_paren = self.eat1(CloseParen);
        if let Some(semicolon) = self.eat_optional1(Semicolon) {
            return self.arena.add(NodeData::DeclareStatement(DeclareStatementNode {
                declare_keyword,
                open_paren,
                directives,
                close_paren,
                colon: None,
                statements: Vec::new(),
                enddeclare_keyword: None,
                semicolon: Some(semicolon),
            }));
        }
        let colon = self.eat_optional1(Colon);
        let (statements, enddeclare_keyword, semicolon) = if colon.is_some() {
            let statements = self.parse_list(ListContext::DeclareStatementElements);
            (
                statements,
                Some(self.eat1(EndDeclareKeyword)),
                Some(self.eat1(Semicolon)),
            )
        } else {
            (vec![self.parse_statement()], None, None)
        };
        self.arena.add(NodeData::DeclareStatement(DeclareStatementNode {
            declare_keyword,
            open_paren,
            directives,
            close_paren,
            colon,
            statements,
            enddeclare_keyword,
            semicolon,
        }))
    }

    fn parse_declare_directive_list(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| p.check(TokenKind::Name),
            |p| Child::Node(p.parse_declare_directive()),
        )
    }

    fn parse_declare_directive(&mut self) -> NodeIndex {
        use TokenKind::*;
        let name = self.eat1(Name);
        let equals = self.eat1(Equals);
        let literal = self.eat(&[IntegerLiteral, FloatingLiteral, StringLiteral]);
        self.arena.add(NodeData::DeclareDirective(DeclareDirectiveNode {
            name,
            equals,
            literal,
        }))
    }
}
