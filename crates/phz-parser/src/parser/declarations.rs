//! Declaration parsing: functions and methods, classes, interfaces, traits
//! and their member lists, namespaces and use declarations, and the
//! statement-level `global`/`const`/`static` declarations.

use phz_scanner::{token_is_keyword_or_reserved_word, Token, TokenKind};

use super::base::{Child, ListContext, NodeIndex};
use super::node::*;
use super::state::ParserState;

impl ParserState {
    // =========================================================================
    // Functions and methods
    // =========================================================================

    pub(crate) fn parse_function_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let function_keyword = self.eat1(FunctionKeyword);
        let by_ref = self.eat_optional1(Ampersand);
        let name = self.eat_declaration_name();
        let open_paren = self.eat1(OpenParen);
        let parameters = self.parse_parameter_list();
        let close_paren = self.eat1(CloseParen);
        let (colon, return_type) = self.parse_return_type();
        let compound_statement = self.parse_compound_statement();
        self.arena
            .add(NodeData::FunctionDeclaration(FunctionDeclarationNode {
                function_keyword,
                by_ref,
                name,
                open_paren,
                parameters,
                close_paren,
                colon,
                return_type,
                compound_statement,
            }))
    }

    /// Declaration names accept keywords coerced to names, so a method named
    /// `list` or `use` keeps parsing.
    fn eat_declaration_name(&mut self) -> Token {
        if self.check(TokenKind::Name) {
            self.advance()
        } else if token_is_keyword_or_reserved_word(self.token.kind) {
            self.eat_as_name()
        } else {
            Token::missing(TokenKind::Name, self.token.full_start)
        }
    }

    pub(crate) fn parse_parameter_list(&mut self) -> Option<NodeIndex> {
        use TokenKind::*;
        self.parse_delimited_list(
            Comma,
            |p| {
                matches!(
                    p.token.kind,
                    Name | Backslash
                        | NamespaceKeyword
                        | ArrayKeyword
                        | CallableKeyword
                        | Ampersand
                        | DotDotDot
                        | VariableName
                ) || phz_scanner::token_is_reserved_word(p.token.kind)
            },
            |p| Child::Node(p.parse_parameter()),
        )
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        use TokenKind::*;
        let type_declaration = self.parse_type_declaration();
        let by_ref = self.eat_optional1(Ampersand);
        let dot_dot_dot = self.eat_optional1(DotDotDot);
        let variable_name = self.eat1(VariableName);
        let (equals, default) = if self.check(Equals) {
            let equals = self.advance();
            (Some(equals), Some(self.parse_expression()))
        } else {
            (None, None)
        };
        self.arena.add(NodeData::Parameter(ParameterNode {
            type_declaration,
            by_ref,
            dot_dot_dot,
            variable_name,
            equals,
            default,
        }))
    }

    /// A type is a scalar-type reserved word, `array`/`callable`, or a
    /// qualified name.
    fn parse_type_declaration(&mut self) -> Option<Child> {
        use TokenKind::*;
        match self.token.kind {
            ArrayKeyword | CallableKeyword => Some(Child::Token(self.advance())),
            kind if phz_scanner::token_is_reserved_word(kind) => {
                Some(Child::Token(self.advance()))
            }
            Name | Backslash | NamespaceKeyword => {
                Some(Child::Node(self.parse_qualified_name()))
            }
            _ => None,
        }
    }

    pub(crate) fn parse_return_type(&mut self) -> (Option<Token>, Option<Child>) {
        let colon = self.eat_optional1(TokenKind::Colon);
        if colon.is_none() {
            return (None, None);
        }
        let return_type = self.parse_type_declaration().unwrap_or(Child::Token(
            Token::missing(TokenKind::Name, self.token.full_start),
        ));
        (colon, Some(return_type))
    }

    // =========================================================================
    // Class declarations
    // =========================================================================

    pub(crate) fn parse_class_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let mut modifiers: Vec<Token> = Vec::new();
        while matches!(self.token.kind, AbstractKeyword | FinalKeyword) {
            modifiers.push(self.advance());
        }
        let class_keyword = self.eat1(ClassKeyword);
        let name = self.eat1(Name);
        let base_clause = if self.check(ExtendsKeyword) {
            let extends_keyword = self.advance();
            let base_class = Child::Node(self.parse_qualified_name());
            Some(self.arena.add(NodeData::ClassBaseClause(ClassBaseClauseNode {
                extends_keyword,
                base_class,
            })))
        } else {
            None
        };
        let interface_clause = if self.check(ImplementsKeyword) {
            let implements_keyword = self.advance();
            let interface_list = self.parse_qualified_name_list();
            Some(self.arena.add(NodeData::ClassInterfaceClause(
                ClassInterfaceClauseNode {
                    implements_keyword,
                    interface_list,
                },
            )))
        } else {
            None
        };
        let members = self.parse_member_block(ListContext::ClassMembers);
        self.arena
            .add(NodeData::ClassDeclaration(ClassDeclarationNode {
                modifiers,
                class_keyword,
                name,
                base_clause,
                interface_clause,
                members,
            }))
    }

    fn parse_member_block(&mut self, context: ListContext) -> NodeIndex {
        let open_brace = self.eat1(TokenKind::OpenBrace);
        let members = self.parse_list(context);
        let close_brace = self.eat1(TokenKind::CloseBrace);
        self.arena.add(NodeData::ClassMembers(ClassMembersNode {
            open_brace,
            members,
            close_brace,
        }))
    }

    pub(crate) fn parse_interface_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let interface_keyword = self.advance();
        let name = self.eat1(Name);
        let base_clause = if self.check(ExtendsKeyword) {
            let extends_keyword = self.advance();
            let interface_list = self.parse_qualified_name_list();
            Some(self.arena.add(NodeData::InterfaceBaseClause(
                InterfaceBaseClauseNode {
                    extends_keyword,
                    interface_list,
                },
            )))
        } else {
            None
        };
        let members = self.parse_member_block(ListContext::InterfaceMembers);
        self.arena
            .add(NodeData::InterfaceDeclaration(InterfaceDeclarationNode {
                interface_keyword,
                name,
                base_clause,
                members,
            }))
    }

    pub(crate) fn parse_trait_declaration(&mut self) -> NodeIndex {
        let trait_keyword = self.advance();
        let name = self.eat1(TokenKind::Name);
        let members = self.parse_member_block(ListContext::TraitMembers);
        self.arena
            .add(NodeData::TraitDeclaration(TraitDeclarationNode {
                trait_keyword,
                name,
                members,
            }))
    }

    // =========================================================================
    // Class members
    // =========================================================================

    /// Modifier prefix, then dispatch. A run of modifiers followed by
    /// nothing parseable yields a `MissingMemberDeclaration`; the list
    /// driver recovers from whatever comes next.
    pub(crate) fn parse_class_member(&mut self) -> NodeIndex {
        use TokenKind::*;
        let modifiers = self.parse_modifiers();
        match self.token.kind {
            ConstKeyword => self.parse_class_const_declaration(modifiers),
            FunctionKeyword => self.parse_method_declaration(modifiers),
            VariableName => self.parse_property_declaration(modifiers),
            UseKeyword => self.parse_trait_use_clause(),
            _ => self
                .arena
                .add(NodeData::MissingMemberDeclaration(
                    MissingMemberDeclarationNode { modifiers },
                )),
        }
    }

    /// Interface members are limited to constants and (abstract) methods.
    pub(crate) fn parse_interface_member(&mut self) -> NodeIndex {
        use TokenKind::*;
        let modifiers = self.parse_modifiers();
        match self.token.kind {
            ConstKeyword => self.parse_class_const_declaration(modifiers),
            FunctionKeyword => self.parse_method_declaration(modifiers),
            _ => self
                .arena
                .add(NodeData::MissingMemberDeclaration(
                    MissingMemberDeclarationNode { modifiers },
                )),
        }
    }

    fn parse_modifiers(&mut self) -> Vec<Token> {
        let mut modifiers: Vec<Token> = Vec::new();
        while Self::is_modifier(self.token.kind) {
            modifiers.push(self.advance());
        }
        modifiers
    }

    fn parse_class_const_declaration(&mut self, modifiers: Vec<Token>) -> NodeIndex {
        let const_keyword = self.advance();
        let const_elements = self.parse_const_elements();
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena
            .add(NodeData::ClassConstDeclaration(ClassConstDeclarationNode {
                modifiers,
                const_keyword,
                const_elements,
                semicolon,
            }))
    }

    fn parse_method_declaration(&mut self, modifiers: Vec<Token>) -> NodeIndex {
        use TokenKind::*;
        let function_keyword = self.advance();
        let by_ref = self.eat_optional1(Ampersand);
        let name = self.eat_declaration_name();
        let open_paren = self.eat1(OpenParen);
        let parameters = self.parse_parameter_list();
        let close_paren = self.eat1(CloseParen);
        let (colon, return_type) = self.parse_return_type();
        // Abstract methods end in a semicolon instead of a body.
        let (compound_statement, semicolon) = if self.check(Semicolon) {
            (None, Some(self.advance()))
        } else {
            (Some(self.parse_compound_statement()), None)
        };
        self.arena
            .add(NodeData::MethodDeclaration(MethodDeclarationNode {
                modifiers,
                function_keyword,
                by_ref,
                name,
                open_paren,
                parameters,
                close_paren,
                colon,
                return_type,
                compound_statement,
                semicolon,
            }))
    }

    fn parse_property_declaration(&mut self, modifiers: Vec<Token>) -> NodeIndex {
        let property_elements = self.parse_expression_list();
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena
            .add(NodeData::PropertyDeclaration(PropertyDeclarationNode {
                modifiers,
                property_elements,
                semicolon,
            }))
    }

    fn parse_trait_use_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let use_keyword = self.advance();
        let trait_names = self.parse_qualified_name_list();
        if self.check(OpenBrace) {
            let open_brace = Some(self.advance());
            let select_or_alias_clauses = self.parse_delimited_list(
                Semicolon,
                |p| {
                    matches!(
                        p.token.kind,
                        Name | Backslash | NamespaceKeyword
                    ) || token_is_keyword_or_reserved_word(p.token.kind)
                },
                |p| Child::Node(p.parse_trait_select_or_alias_clause()),
            );
            let close_brace = Some(self.eat1(CloseBrace));
            self.arena.add(NodeData::TraitUseClause(TraitUseClauseNode {
                use_keyword,
                trait_names,
                open_brace,
                select_or_alias_clauses,
                close_brace,
                semicolon: None,
            }))
        } else {
            let semicolon = Some(self.eat1(Semicolon));
            self.arena.add(NodeData::TraitUseClause(TraitUseClauseNode {
                use_keyword,
                trait_names,
                open_brace: None,
                select_or_alias_clauses: None,
                close_brace: None,
                semicolon,
            }))
        }
    }

    /// `A::member insteadof B` or `A::member as [modifier] alias`.
    fn parse_trait_select_or_alias_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let mut name = Child::Node(self.parse_qualified_name());
        if self.check(ColonColon) {
            let double_colon = self.advance();
            let member_name = if self.check(Name) || token_is_keyword_or_reserved_word(self.token.kind)
            {
                Child::Token(self.eat_as_name())
            } else {
                Child::Token(Token::missing(Name, self.token.full_start))
            };
            name = Child::Node(self.arena.add(NodeData::ScopedPropertyAccessExpression(
                ScopedPropertyAccessExpressionNode {
                    scope_resolution_qualifier: name,
                    double_colon,
                    member_name,
                },
            )));
        }
        let operation = self.eat(&[InsteadOfKeyword, AsKeyword]);
        let modifiers = self.parse_modifiers();
        let target_name = if self.check(Name)
            || matches!(self.token.kind, Backslash | NamespaceKeyword)
        {
            Some(Child::Node(self.parse_qualified_name()))
        } else {
            None
        };
        self.arena.add(NodeData::TraitSelectOrAliasClause(
            TraitSelectOrAliasClauseNode {
                name,
                operation,
                modifiers,
                target_name,
            },
        ))
    }

    fn parse_const_elements(&mut self) -> Option<NodeIndex> {
        self.parse_delimited_list(
            TokenKind::Comma,
            |p| p.check(TokenKind::Name),
            |p| {
                let name = p.eat1(TokenKind::Name);
                let equals = p.eat1(TokenKind::Equals);
                let assignment = p.parse_expression();
                Child::Node(p.arena.add(NodeData::ConstElement(ConstElementNode {
                    name,
                    equals,
                    assignment,
                })))
            },
        )
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    pub(crate) fn parse_namespace_definition(&mut self) -> NodeIndex {
        use TokenKind::*;
        let namespace_keyword = self.advance();
        let name = if self.check(Name) {
            Some(self.parse_qualified_name())
        } else {
            None
        };
        let compound_statement_or_semicolon = if self.check(OpenBrace) {
            Child::Node(self.parse_compound_statement())
        } else {
            Child::Token(self.eat1(Semicolon))
        };
        self.arena
            .add(NodeData::NamespaceDefinition(NamespaceDefinitionNode {
                namespace_keyword,
                name,
                compound_statement_or_semicolon,
            }))
    }

    pub(crate) fn parse_namespace_use_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let use_keyword = self.advance();
        let function_or_const = self.eat_optional(&[FunctionKeyword, ConstKeyword]);
        let use_clauses = self.parse_delimited_list(
            Comma,
            |p| matches!(p.token.kind, Name | Backslash | NamespaceKeyword),
            |p| Child::Node(p.parse_namespace_use_clause()),
        );
        let semicolon = self.eat1(Semicolon);
        self.arena.add(NodeData::NamespaceUseDeclaration(
            NamespaceUseDeclarationNode {
                use_keyword,
                function_or_const,
                use_clauses,
                semicolon,
            },
        ))
    }

    fn parse_namespace_use_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let name = Child::Node(self.parse_qualified_name());
        if self.check(AsKeyword) {
            let alias = Some(self.parse_namespace_aliasing_clause());
            return self.arena.add(NodeData::NamespaceUseClause(NamespaceUseClauseNode {
                name,
                alias,
                backslash: None,
                open_brace: None,
                group_clauses: None,
                close_brace: None,
            }));
        }
        // Brace group: `use A\B\{C, function D, const E as F};`
        let backslash = self.eat_optional1(Backslash);
        if backslash.is_some() || self.check(OpenBrace) {
            let open_brace = Some(self.eat1(OpenBrace));
            let group_clauses = self.parse_delimited_list(
                Comma,
                |p| {
                    matches!(
                        p.token.kind,
                        Name | Backslash | NamespaceKeyword | FunctionKeyword | ConstKeyword
                    )
                },
                |p| Child::Node(p.parse_namespace_use_group_clause()),
            );
            let close_brace = Some(self.eat1(CloseBrace));
            return self.arena.add(NodeData::NamespaceUseClause(NamespaceUseClauseNode {
                name,
                alias: None,
                backslash,
                open_brace,
                group_clauses,
                close_brace,
            }));
        }
        self.arena.add(NodeData::NamespaceUseClause(NamespaceUseClauseNode {
            name,
            alias: None,
            backslash: None,
            open_brace: None,
            group_clauses: None,
            close_brace: None,
        }))
    }

    fn parse_namespace_use_group_clause(&mut self) -> NodeIndex {
        use TokenKind::*;
        let function_or_const = self.eat_optional(&[FunctionKeyword, ConstKeyword]);
        let name = Child::Node(self.parse_qualified_name());
        let alias = if self.check(AsKeyword) {
            Some(self.parse_namespace_aliasing_clause())
        } else {
            None
        };
        self.arena.add(NodeData::NamespaceUseGroupClause(
            NamespaceUseGroupClauseNode {
                function_or_const,
                name,
                alias,
            },
        ))
    }

    fn parse_namespace_aliasing_clause(&mut self) -> NodeIndex {
        let as_keyword = self.advance();
        let name = self.eat1(TokenKind::Name);
        self.arena.add(NodeData::NamespaceAliasingClause(
            NamespaceAliasingClauseNode { as_keyword, name },
        ))
    }

    // =========================================================================
    // global / const / function-static
    // =========================================================================

    pub(crate) fn parse_global_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let global_keyword = self.advance();
        let variable_names = self.parse_delimited_list(
            Comma,
            |p| matches!(p.token.kind, VariableName | Dollar),
            |p| Child::Node(p.parse_simple_variable()),
        );
        let semicolon = self.eat1(Semicolon);
        self.arena
            .add(NodeData::GlobalDeclaration(GlobalDeclarationNode {
                global_keyword,
                variable_names,
                semicolon,
            }))
    }

    pub(crate) fn parse_const_declaration(&mut self) -> NodeIndex {
        let const_keyword = self.advance();
        let const_elements = self.parse_const_elements();
        let semicolon = self.eat1(TokenKind::Semicolon);
        self.arena
            .add(NodeData::ConstDeclaration(ConstDeclarationNode {
                const_keyword,
                const_elements,
                semicolon,
            }))
    }

    pub(crate) fn parse_function_static_declaration(&mut self) -> NodeIndex {
        use TokenKind::*;
        let static_keyword = self.advance();
        let static_variables = self.parse_delimited_list(
            Comma,
            |p| p.check(VariableName),
            |p| {
                let variable_name = p.eat1(VariableName);
                let (equals, assignment) = if p.check(Equals) {
                    let equals = p.advance();
                    (Some(equals), Some(p.parse_expression()))
                } else {
                    (None, None)
                };
                Child::Node(p.arena.add(NodeData::StaticVariableDeclaration(
                    StaticVariableDeclarationNode {
                        variable_name,
                        equals,
                        assignment,
                    },
                )))
            },
        );
        let semicolon = self.eat1(Semicolon);
        self.arena.add(NodeData::FunctionStaticDeclaration(
            FunctionStaticDeclarationNode {
                static_keyword,
                static_variables,
                semicolon,
            },
        ))
    }
}
