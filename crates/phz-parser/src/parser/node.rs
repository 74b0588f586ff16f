//! Syntax tree node model.
//!
//! One struct per node kind with named slots, a `NodeData` sum type over all
//! kinds, and the `NodeArena` that owns the entries and their parent
//! back-pointers. Struct fields are declared in source order; the traversal
//! in `for_each_child` emits them in field order and is the single source of
//! truth for parent assignment, the coverage round-trip, and consumer walks.
//!
//! Slot typing conventions:
//! - a required token slot is `Token` (a missing token when absent, never an
//!   `Option` and never a wrong-kind real token);
//! - an expression-valued slot is `Child`, since an expression may itself be
//!   a missing token;
//! - list slots are `Vec<Child>`, since recovery appends skipped tokens next
//!   to ordinary elements.

use std::sync::Arc;

use phz_scanner::Token;
use serde::Serialize;

use super::base::{Child, NodeIndex};

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct SourceFileNode {
    pub statements: Vec<Child>,
    pub end_of_file: Token,
}

/// An inline-HTML island: text outside the script sections, together with
/// the tags delimiting it. All three slots are optional; at least one is
/// present in practice.
#[derive(Clone, Debug, Serialize)]
pub struct InlineHtmlNode {
    pub script_section_end: Option<Token>,
    pub text: Option<Token>,
    pub script_section_start: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompoundStatementNode {
    pub open_brace: Token,
    pub statements: Vec<Child>,
    pub close_brace: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamedLabelStatementNode {
    pub name: Token,
    pub colon: Token,
    pub statement: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExpressionStatementNode {
    pub expression: Child,
    /// Present when forced expression parsing had to skip a token to make
    /// progress.
    pub skipped: Option<Token>,
    /// Absent when a script-section-end tag satisfied the terminator.
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmptyStatementNode {
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfStatementNode {
    pub if_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
    pub elseif_clauses: Vec<Child>,
    pub else_clause: Option<NodeIndex>,
    pub endif_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ElseIfClauseNode {
    pub elseif_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ElseClauseNode {
    pub else_keyword: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SwitchStatementNode {
    pub switch_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub open_brace: Option<Token>,
    pub case_statements: Vec<Child>,
    pub close_brace: Option<Token>,
    pub endswitch_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CaseStatementNode {
    /// `case` or `default`.
    pub case_keyword: Token,
    pub expression: Option<Child>,
    pub colon_or_semicolon: Token,
    pub statements: Vec<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WhileStatementNode {
    pub while_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
    pub endwhile_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DoStatementNode {
    pub do_keyword: Token,
    pub statement: Child,
    pub while_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForStatementNode {
    pub for_keyword: Token,
    pub open_paren: Token,
    pub initializer: Option<NodeIndex>,
    pub first_semicolon: Token,
    pub control: Option<NodeIndex>,
    pub second_semicolon: Token,
    pub increment: Option<NodeIndex>,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
    pub endfor_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForeachStatementNode {
    pub foreach_keyword: Token,
    pub open_paren: Token,
    pub collection: Child,
    pub as_keyword: Token,
    pub key: Option<NodeIndex>,
    pub value: Option<NodeIndex>,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
    pub endforeach_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForeachKeyNode {
    pub expression: Child,
    pub arrow: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForeachValueNode {
    pub ampersand: Option<Token>,
    pub expression: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct GotoStatementNode {
    pub goto_keyword: Token,
    pub name: Token,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct BreakOrContinueStatementNode {
    /// `break` or `continue`.
    pub keyword: Token,
    pub breakout_level: Option<Child>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReturnStatementNode {
    pub return_keyword: Token,
    pub expression: Option<Child>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ThrowStatementNode {
    pub throw_keyword: Token,
    pub expression: Child,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct TryStatementNode {
    pub try_keyword: Token,
    pub compound_statement: NodeIndex,
    pub catch_clauses: Vec<Child>,
    pub finally_clause: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CatchClauseNode {
    pub catch_keyword: Token,
    pub open_paren: Token,
    pub class_name: Child,
    pub variable_name: Token,
    pub close_paren: Token,
    pub compound_statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct FinallyClauseNode {
    pub finally_keyword: Token,
    pub compound_statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeclareStatementNode {
    pub declare_keyword: Token,
    pub open_paren: Token,
    pub directives: Option<NodeIndex>,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub statements: Vec<Child>,
    pub enddeclare_keyword: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeclareDirectiveNode {
    pub name: Token,
    pub equals: Token,
    pub literal: Token,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct FunctionDeclarationNode {
    pub function_keyword: Token,
    pub by_ref: Option<Token>,
    pub name: Token,
    pub open_paren: Token,
    pub parameters: Option<NodeIndex>,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub return_type: Option<Child>,
    pub compound_statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassDeclarationNode {
    pub modifiers: Vec<Token>,
    pub class_keyword: Token,
    pub name: Token,
    pub base_clause: Option<NodeIndex>,
    pub interface_clause: Option<NodeIndex>,
    pub members: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassBaseClauseNode {
    pub extends_keyword: Token,
    pub base_class: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassInterfaceClauseNode {
    pub implements_keyword: Token,
    pub interface_list: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassMembersNode {
    pub open_brace: Token,
    pub members: Vec<Child>,
    pub close_brace: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceDeclarationNode {
    pub interface_keyword: Token,
    pub name: Token,
    pub base_clause: Option<NodeIndex>,
    pub members: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceBaseClauseNode {
    pub extends_keyword: Token,
    pub interface_list: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraitDeclarationNode {
    pub trait_keyword: Token,
    pub name: Token,
    pub members: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct MethodDeclarationNode {
    pub modifiers: Vec<Token>,
    pub function_keyword: Token,
    pub by_ref: Option<Token>,
    pub name: Token,
    pub open_paren: Token,
    pub parameters: Option<NodeIndex>,
    pub close_paren: Token,
    pub colon: Option<Token>,
    pub return_type: Option<Child>,
    /// Absent for abstract method declarations, which end in a semicolon.
    pub compound_statement: Option<NodeIndex>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyDeclarationNode {
    pub modifiers: Vec<Token>,
    pub property_elements: Option<NodeIndex>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassConstDeclarationNode {
    pub modifiers: Vec<Token>,
    pub const_keyword: Token,
    pub const_elements: Option<NodeIndex>,
    pub semicolon: Token,
}

/// Modifier run that never became a member. Recovery shape, not grammar.
#[derive(Clone, Debug, Serialize)]
pub struct MissingMemberDeclarationNode {
    pub modifiers: Vec<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraitUseClauseNode {
    pub use_keyword: Token,
    pub trait_names: Option<NodeIndex>,
    pub open_brace: Option<Token>,
    pub select_or_alias_clauses: Option<NodeIndex>,
    pub close_brace: Option<Token>,
    pub semicolon: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraitSelectOrAliasClauseNode {
    pub name: Child,
    /// `insteadof` or `as`.
    pub operation: Token,
    pub modifiers: Vec<Token>,
    pub target_name: Option<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterNode {
    pub type_declaration: Option<Child>,
    pub by_ref: Option<Token>,
    pub dot_dot_dot: Option<Token>,
    pub variable_name: Token,
    pub equals: Option<Token>,
    pub default: Option<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceDefinitionNode {
    pub namespace_keyword: Token,
    pub name: Option<NodeIndex>,
    /// A compound statement or a semicolon token.
    pub compound_statement_or_semicolon: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceUseDeclarationNode {
    pub use_keyword: Token,
    pub function_or_const: Option<Token>,
    pub use_clauses: Option<NodeIndex>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceUseClauseNode {
    pub name: Child,
    pub alias: Option<NodeIndex>,
    pub backslash: Option<Token>,
    pub open_brace: Option<Token>,
    pub group_clauses: Option<NodeIndex>,
    pub close_brace: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceUseGroupClauseNode {
    pub function_or_const: Option<Token>,
    pub name: Child,
    pub alias: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NamespaceAliasingClauseNode {
    pub as_keyword: Token,
    pub name: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct GlobalDeclarationNode {
    pub global_keyword: Token,
    pub variable_names: Option<NodeIndex>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstDeclarationNode {
    pub const_keyword: Token,
    pub const_elements: Option<NodeIndex>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConstElementNode {
    pub name: Token,
    pub equals: Token,
    pub assignment: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionStaticDeclarationNode {
    pub static_keyword: Token,
    pub static_variables: Option<NodeIndex>,
    pub semicolon: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct StaticVariableDeclarationNode {
    pub variable_name: Token,
    pub equals: Option<Token>,
    pub assignment: Option<Child>,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct UnaryOpExpressionNode {
    pub operator: Token,
    pub operand: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorControlExpressionNode {
    pub operator: Token,
    pub operand: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct PrefixUpdateExpressionNode {
    pub increment_or_decrement: Token,
    pub operand: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct PostfixUpdateExpressionNode {
    pub operand: Child,
    pub increment_or_decrement: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct CastExpressionNode {
    pub open_paren: Token,
    pub cast_type: Token,
    pub close_paren: Token,
    pub operand: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObjectCreationExpressionNode {
    pub new_keyword: Token,
    pub class_type_designator: Child,
    pub open_paren: Option<Token>,
    pub arguments: Option<NodeIndex>,
    pub close_paren: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CloneExpressionNode {
    pub clone_keyword: Token,
    pub operand: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct BinaryExpressionNode {
    pub left: Child,
    pub operator: Token,
    pub right: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct AssignmentExpressionNode {
    pub left: Child,
    pub operator: Token,
    pub by_ref: Option<Token>,
    pub right: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct TernaryExpressionNode {
    pub condition: Child,
    pub question: Token,
    pub if_expression: Option<Child>,
    pub colon: Token,
    pub else_expression: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableNode {
    /// A `VariableName` token or a bare `$`.
    pub name: Token,
}

/// Qualified name: parts are name tokens and backslash separators, with an
/// optional leading global `\` or relative `namespace\` prefix, all kept in
/// order.
#[derive(Clone, Debug, Serialize)]
pub struct QualifiedNameNode {
    pub parts: Vec<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReservedWordNode {
    pub token: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct NumericLiteralNode {
    pub token: Token,
}

/// String literal: either a single token, or a quote-delimited sequence of
/// parts (encapsed runs, variables, `${`/`{$` embedded expressions).
#[derive(Clone, Debug, Serialize)]
pub struct StringLiteralNode {
    pub start_quote: Option<Token>,
    pub children: Vec<Child>,
    pub end_quote: Option<Token>,
}

/// Interpolated string in template form: start token, then alternating
/// variables and middle runs, then the end token.
#[derive(Clone, Debug, Serialize)]
pub struct TemplateExpressionNode {
    pub children: Vec<Child>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubscriptExpressionNode {
    pub postfix_expression: Child,
    pub open_bracket_or_brace: Token,
    pub access_expression: Option<Child>,
    pub close_bracket_or_brace: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct MemberAccessExpressionNode {
    pub dereferencable_expression: Child,
    pub arrow: Token,
    pub member_name: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScopedPropertyAccessExpressionNode {
    pub scope_resolution_qualifier: Child,
    pub double_colon: Token,
    pub member_name: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct CallExpressionNode {
    pub callable_expression: Child,
    pub open_paren: Token,
    pub arguments: Option<NodeIndex>,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArgumentExpressionNode {
    pub dot_dot_dot: Option<Token>,
    pub expression: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParenthesizedExpressionNode {
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArrayCreationExpressionNode {
    pub array_keyword: Option<Token>,
    pub open_paren_or_bracket: Token,
    pub array_elements: Option<NodeIndex>,
    pub close_paren_or_bracket: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArrayElementNode {
    pub key: Option<Child>,
    pub arrow: Option<Token>,
    pub by_ref: Option<Token>,
    pub value: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct BracedExpressionNode {
    pub open_brace: Token,
    pub expression: Child,
    pub close_brace: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct EchoExpressionNode {
    pub echo_keyword: Token,
    pub expressions: Option<NodeIndex>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListIntrinsicExpressionNode {
    pub list_keyword: Token,
    pub open_paren: Token,
    pub list_elements: Option<NodeIndex>,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnsetIntrinsicExpressionNode {
    pub unset_keyword: Token,
    pub open_paren: Token,
    pub expressions: Option<NodeIndex>,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmptyIntrinsicExpressionNode {
    pub empty_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct EvalIntrinsicExpressionNode {
    pub eval_keyword: Token,
    pub open_paren: Token,
    pub expression: Child,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExitIntrinsicExpressionNode {
    pub exit_or_die_keyword: Token,
    pub open_paren: Option<Token>,
    pub expression: Option<Child>,
    pub close_paren: Option<Token>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IssetIntrinsicExpressionNode {
    pub isset_keyword: Token,
    pub open_paren: Token,
    pub expressions: Option<NodeIndex>,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct PrintIntrinsicExpressionNode {
    pub print_keyword: Token,
    pub expression: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScriptInclusionExpressionNode {
    pub require_or_include_keyword: Token,
    pub expression: Child,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnonymousFunctionCreationExpressionNode {
    pub static_modifier: Option<Token>,
    pub function_keyword: Token,
    pub by_ref: Option<Token>,
    /// A name on an anonymous function is flagged as skipped, not dropped.
    pub skipped_name: Option<Token>,
    pub open_paren: Token,
    pub parameters: Option<NodeIndex>,
    pub close_paren: Token,
    pub use_clause: Option<NodeIndex>,
    pub colon: Option<Token>,
    pub return_type: Option<Child>,
    pub compound_statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnonymousFunctionUseClauseNode {
    pub use_keyword: Token,
    pub open_paren: Token,
    pub use_variables: Option<NodeIndex>,
    pub close_paren: Token,
}

#[derive(Clone, Debug, Serialize)]
pub struct UseVariableNameNode {
    pub by_ref: Option<Token>,
    pub variable_name: Token,
}

/// Homogeneous delimited list: children alternate element, delimiter,
/// element, delimiter. One ordered sequence, so trailing delimiters keep
/// their place.
#[derive(Clone, Debug, Serialize)]
pub struct DelimitedListNode {
    pub children: Vec<Child>,
}

// =============================================================================
// NodeData / NodeKind
// =============================================================================

macro_rules! node_kinds {
    ($($variant:ident($node:ident)),+ $(,)?) => {
        /// Sum type over every node kind.
        #[derive(Clone, Debug, Serialize)]
        pub enum NodeData {
            $($variant($node),)+
        }

        /// Grammar production tag, derived from the `NodeData` discriminant.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        pub enum NodeKind {
            $($variant,)+
        }

        impl NodeData {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $(NodeData::$variant(_) => NodeKind::$variant,)+
                }
            }
        }
    };
}

node_kinds! {
    SourceFile(SourceFileNode),
    InlineHtml(InlineHtmlNode),
    CompoundStatement(CompoundStatementNode),
    NamedLabelStatement(NamedLabelStatementNode),
    ExpressionStatement(ExpressionStatementNode),
    EmptyStatement(EmptyStatementNode),
    IfStatement(IfStatementNode),
    ElseIfClause(ElseIfClauseNode),
    ElseClause(ElseClauseNode),
    SwitchStatement(SwitchStatementNode),
    CaseStatement(CaseStatementNode),
    WhileStatement(WhileStatementNode),
    DoStatement(DoStatementNode),
    ForStatement(ForStatementNode),
    ForeachStatement(ForeachStatementNode),
    ForeachKey(ForeachKeyNode),
    ForeachValue(ForeachValueNode),
    GotoStatement(GotoStatementNode),
    BreakOrContinueStatement(BreakOrContinueStatementNode),
    ReturnStatement(ReturnStatementNode),
    ThrowStatement(ThrowStatementNode),
    TryStatement(TryStatementNode),
    CatchClause(CatchClauseNode),
    FinallyClause(FinallyClauseNode),
    DeclareStatement(DeclareStatementNode),
    DeclareDirective(DeclareDirectiveNode),
    FunctionDeclaration(FunctionDeclarationNode),
    ClassDeclaration(ClassDeclarationNode),
    ClassBaseClause(ClassBaseClauseNode),
    ClassInterfaceClause(ClassInterfaceClauseNode),
    ClassMembers(ClassMembersNode),
    InterfaceDeclaration(InterfaceDeclarationNode),
    InterfaceBaseClause(InterfaceBaseClauseNode),
    TraitDeclaration(TraitDeclarationNode),
    MethodDeclaration(MethodDeclarationNode),
    PropertyDeclaration(PropertyDeclarationNode),
    ClassConstDeclaration(ClassConstDeclarationNode),
    MissingMemberDeclaration(MissingMemberDeclarationNode),
    TraitUseClause(TraitUseClauseNode),
    TraitSelectOrAliasClause(TraitSelectOrAliasClauseNode),
    Parameter(ParameterNode),
    NamespaceDefinition(NamespaceDefinitionNode),
    NamespaceUseDeclaration(NamespaceUseDeclarationNode),
    NamespaceUseClause(NamespaceUseClauseNode),
    NamespaceUseGroupClause(NamespaceUseGroupClauseNode),
    NamespaceAliasingClause(NamespaceAliasingClauseNode),
    GlobalDeclaration(GlobalDeclarationNode),
    ConstDeclaration(ConstDeclarationNode),
    ConstElement(ConstElementNode),
    FunctionStaticDeclaration(FunctionStaticDeclarationNode),
    StaticVariableDeclaration(StaticVariableDeclarationNode),
    UnaryOpExpression(UnaryOpExpressionNode),
    ErrorControlExpression(ErrorControlExpressionNode),
    PrefixUpdateExpression(PrefixUpdateExpressionNode),
    PostfixUpdateExpression(PostfixUpdateExpressionNode),
    CastExpression(CastExpressionNode),
    ObjectCreationExpression(ObjectCreationExpressionNode),
    CloneExpression(CloneExpressionNode),
    BinaryExpression(BinaryExpressionNode),
    AssignmentExpression(AssignmentExpressionNode),
    TernaryExpression(TernaryExpressionNode),
    Variable(VariableNode),
    QualifiedName(QualifiedNameNode),
    ReservedWord(ReservedWordNode),
    NumericLiteral(NumericLiteralNode),
    StringLiteral(StringLiteralNode),
    TemplateExpression(TemplateExpressionNode),
    SubscriptExpression(SubscriptExpressionNode),
    MemberAccessExpression(MemberAccessExpressionNode),
    ScopedPropertyAccessExpression(ScopedPropertyAccessExpressionNode),
    CallExpression(CallExpressionNode),
    ArgumentExpression(ArgumentExpressionNode),
    ParenthesizedExpression(ParenthesizedExpressionNode),
    ArrayCreationExpression(ArrayCreationExpressionNode),
    ArrayElement(ArrayElementNode),
    BracedExpression(BracedExpressionNode),
    EchoExpression(EchoExpressionNode),
    ListIntrinsicExpression(ListIntrinsicExpressionNode),
    UnsetIntrinsicExpression(UnsetIntrinsicExpressionNode),
    EmptyIntrinsicExpression(EmptyIntrinsicExpressionNode),
    EvalIntrinsicExpression(EvalIntrinsicExpressionNode),
    ExitIntrinsicExpression(ExitIntrinsicExpressionNode),
    IssetIntrinsicExpression(IssetIntrinsicExpressionNode),
    PrintIntrinsicExpression(PrintIntrinsicExpressionNode),
    ScriptInclusionExpression(ScriptInclusionExpressionNode),
    AnonymousFunctionCreationExpression(AnonymousFunctionCreationExpressionNode),
    AnonymousFunctionUseClause(AnonymousFunctionUseClauseNode),
    UseVariableName(UseVariableNameNode),
    DelimitedList(DelimitedListNode),
}

// Traversal helpers, named for brevity in the big match below.
#[inline]
fn tok<F: FnMut(Child)>(f: &mut F, t: &Token) {
    f(Child::Token(*t));
}

#[inline]
fn opt_tok<F: FnMut(Child)>(f: &mut F, t: &Option<Token>) {
    if let Some(t) = t {
        f(Child::Token(*t));
    }
}

#[inline]
fn node<F: FnMut(Child)>(f: &mut F, n: NodeIndex) {
    if n.is_some() {
        f(Child::Node(n));
    }
}

#[inline]
fn opt_node<F: FnMut(Child)>(f: &mut F, n: &Option<NodeIndex>) {
    if let Some(n) = n {
        node(f, *n);
    }
}

#[inline]
fn child<F: FnMut(Child)>(f: &mut F, c: &Child) {
    f(*c);
}

#[inline]
fn opt_child<F: FnMut(Child)>(f: &mut F, c: &Option<Child>) {
    if let Some(c) = c {
        f(*c);
    }
}

#[inline]
fn children<F: FnMut(Child)>(f: &mut F, v: &[Child]) {
    for c in v {
        f(*c);
    }
}

#[inline]
fn toks<F: FnMut(Child)>(f: &mut F, v: &[Token]) {
    for t in v {
        f(Child::Token(*t));
    }
}

impl NodeData {
    /// Visit every immediate child, tokens included, in source order.
    pub fn for_each_child<F: FnMut(Child)>(&self, f: &mut F) {
        use NodeData::*;
        match self {
            SourceFile(n) => {
                children(f, &n.statements);
                tok(f, &n.end_of_file);
            }
            InlineHtml(n) => {
                opt_tok(f, &n.script_section_end);
                opt_tok(f, &n.text);
                opt_tok(f, &n.script_section_start);
            }
            CompoundStatement(n) => {
                tok(f, &n.open_brace);
                children(f, &n.statements);
                tok(f, &n.close_brace);
            }
            NamedLabelStatement(n) => {
                tok(f, &n.name);
                tok(f, &n.colon);
                child(f, &n.statement);
            }
            ExpressionStatement(n) => {
                child(f, &n.expression);
                opt_tok(f, &n.skipped);
                opt_tok(f, &n.semicolon);
            }
            EmptyStatement(n) => tok(f, &n.semicolon),
            IfStatement(n) => {
                tok(f, &n.if_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
                children(f, &n.elseif_clauses);
                opt_node(f, &n.else_clause);
                opt_tok(f, &n.endif_keyword);
                opt_tok(f, &n.semicolon);
            }
            ElseIfClause(n) => {
                tok(f, &n.elseif_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
            }
            ElseClause(n) => {
                tok(f, &n.else_keyword);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
            }
            SwitchStatement(n) => {
                tok(f, &n.switch_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                opt_tok(f, &n.open_brace);
                children(f, &n.case_statements);
                opt_tok(f, &n.close_brace);
                opt_tok(f, &n.endswitch_keyword);
                opt_tok(f, &n.semicolon);
            }
            CaseStatement(n) => {
                tok(f, &n.case_keyword);
                opt_child(f, &n.expression);
                tok(f, &n.colon_or_semicolon);
                children(f, &n.statements);
            }
            WhileStatement(n) => {
                tok(f, &n.while_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
                opt_tok(f, &n.endwhile_keyword);
                opt_tok(f, &n.semicolon);
            }
            DoStatement(n) => {
                tok(f, &n.do_keyword);
                child(f, &n.statement);
                tok(f, &n.while_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
                tok(f, &n.semicolon);
            }
            ForStatement(n) => {
                tok(f, &n.for_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.initializer);
                tok(f, &n.first_semicolon);
                opt_node(f, &n.control);
                tok(f, &n.second_semicolon);
                opt_node(f, &n.increment);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
                opt_tok(f, &n.endfor_keyword);
                opt_tok(f, &n.semicolon);
            }
            ForeachStatement(n) => {
                tok(f, &n.foreach_keyword);
                tok(f, &n.open_paren);
                child(f, &n.collection);
                tok(f, &n.as_keyword);
                opt_node(f, &n.key);
                opt_node(f, &n.value);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
                opt_tok(f, &n.endforeach_keyword);
                opt_tok(f, &n.semicolon);
            }
            ForeachKey(n) => {
                child(f, &n.expression);
                tok(f, &n.arrow);
            }
            ForeachValue(n) => {
                opt_tok(f, &n.ampersand);
                child(f, &n.expression);
            }
            GotoStatement(n) => {
                tok(f, &n.goto_keyword);
                tok(f, &n.name);
                tok(f, &n.semicolon);
            }
            BreakOrContinueStatement(n) => {
                tok(f, &n.keyword);
                opt_child(f, &n.breakout_level);
                tok(f, &n.semicolon);
            }
            ReturnStatement(n) => {
                tok(f, &n.return_keyword);
                opt_child(f, &n.expression);
                tok(f, &n.semicolon);
            }
            ThrowStatement(n) => {
                tok(f, &n.throw_keyword);
                child(f, &n.expression);
                tok(f, &n.semicolon);
            }
            TryStatement(n) => {
                tok(f, &n.try_keyword);
                node(f, n.compound_statement);
                children(f, &n.catch_clauses);
                opt_node(f, &n.finally_clause);
            }
            CatchClause(n) => {
                tok(f, &n.catch_keyword);
                tok(f, &n.open_paren);
                child(f, &n.class_name);
                tok(f, &n.variable_name);
                tok(f, &n.close_paren);
                node(f, n.compound_statement);
            }
            FinallyClause(n) => {
                tok(f, &n.finally_keyword);
                node(f, n.compound_statement);
            }
            DeclareStatement(n) => {
                tok(f, &n.declare_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.directives);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                children(f, &n.statements);
                opt_tok(f, &n.enddeclare_keyword);
                opt_tok(f, &n.semicolon);
            }
            DeclareDirective(n) => {
                tok(f, &n.name);
                tok(f, &n.equals);
                tok(f, &n.literal);
            }
            FunctionDeclaration(n) => {
                tok(f, &n.function_keyword);
                opt_tok(f, &n.by_ref);
                tok(f, &n.name);
                tok(f, &n.open_paren);
                opt_node(f, &n.parameters);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                opt_child(f, &n.return_type);
                node(f, n.compound_statement);
            }
            ClassDeclaration(n) => {
                toks(f, &n.modifiers);
                tok(f, &n.class_keyword);
                tok(f, &n.name);
                opt_node(f, &n.base_clause);
                opt_node(f, &n.interface_clause);
                node(f, n.members);
            }
            ClassBaseClause(n) => {
                tok(f, &n.extends_keyword);
                child(f, &n.base_class);
            }
            ClassInterfaceClause(n) => {
                tok(f, &n.implements_keyword);
                opt_node(f, &n.interface_list);
            }
            ClassMembers(n) => {
                tok(f, &n.open_brace);
                children(f, &n.members);
                tok(f, &n.close_brace);
            }
            InterfaceDeclaration(n) => {
                tok(f, &n.interface_keyword);
                tok(f, &n.name);
                opt_node(f, &n.base_clause);
                node(f, n.members);
            }
            InterfaceBaseClause(n) => {
                tok(f, &n.extends_keyword);
                opt_node(f, &n.interface_list);
            }
            TraitDeclaration(n) => {
                tok(f, &n.trait_keyword);
                tok(f, &n.name);
                node(f, n.members);
            }
            MethodDeclaration(n) => {
                toks(f, &n.modifiers);
                tok(f, &n.function_keyword);
                opt_tok(f, &n.by_ref);
                tok(f, &n.name);
                tok(f, &n.open_paren);
                opt_node(f, &n.parameters);
                tok(f, &n.close_paren);
                opt_tok(f, &n.colon);
                opt_child(f, &n.return_type);
                opt_node(f, &n.compound_statement);
                opt_tok(f, &n.semicolon);
            }
            PropertyDeclaration(n) => {
                toks(f, &n.modifiers);
                opt_node(f, &n.property_elements);
                tok(f, &n.semicolon);
            }
            ClassConstDeclaration(n) => {
                toks(f, &n.modifiers);
                tok(f, &n.const_keyword);
                opt_node(f, &n.const_elements);
                tok(f, &n.semicolon);
            }
            MissingMemberDeclaration(n) => toks(f, &n.modifiers),
            TraitUseClause(n) => {
                tok(f, &n.use_keyword);
                opt_node(f, &n.trait_names);
                opt_tok(f, &n.open_brace);
                opt_node(f, &n.select_or_alias_clauses);
                opt_tok(f, &n.close_brace);
                opt_tok(f, &n.semicolon);
            }
            TraitSelectOrAliasClause(n) => {
                child(f, &n.name);
                tok(f, &n.operation);
                toks(f, &n.modifiers);
                opt_child(f, &n.target_name);
            }
            Parameter(n) => {
                opt_child(f, &n.type_declaration);
                opt_tok(f, &n.by_ref);
                opt_tok(f, &n.dot_dot_dot);
                tok(f, &n.variable_name);
                opt_tok(f, &n.equals);
                opt_child(f, &n.default);
            }
            NamespaceDefinition(n) => {
                tok(f, &n.namespace_keyword);
                opt_node(f, &n.name);
                child(f, &n.compound_statement_or_semicolon);
            }
            NamespaceUseDeclaration(n) => {
                tok(f, &n.use_keyword);
                opt_tok(f, &n.function_or_const);
                opt_node(f, &n.use_clauses);
                tok(f, &n.semicolon);
            }
            NamespaceUseClause(n) => {
                child(f, &n.name);
                opt_node(f, &n.alias);
                opt_tok(f, &n.backslash);
                opt_tok(f, &n.open_brace);
                opt_node(f, &n.group_clauses);
                opt_tok(f, &n.close_brace);
            }
            NamespaceUseGroupClause(n) => {
                opt_tok(f, &n.function_or_const);
                child(f, &n.name);
                opt_node(f, &n.alias);
            }
            NamespaceAliasingClause(n) => {
                tok(f, &n.as_keyword);
                tok(f, &n.name);
            }
            GlobalDeclaration(n) => {
                tok(f, &n.global_keyword);
                opt_node(f, &n.variable_names);
                tok(f, &n.semicolon);
            }
            ConstDeclaration(n) => {
                tok(f, &n.const_keyword);
                opt_node(f, &n.const_elements);
                tok(f, &n.semicolon);
            }
            ConstElement(n) => {
                tok(f, &n.name);
                tok(f, &n.equals);
                child(f, &n.assignment);
            }
            FunctionStaticDeclaration(n) => {
                tok(f, &n.static_keyword);
                opt_node(f, &n.static_variables);
                tok(f, &n.semicolon);
            }
            StaticVariableDeclaration(n) => {
                tok(f, &n.variable_name);
                opt_tok(f, &n.equals);
                opt_child(f, &n.assignment);
            }
            UnaryOpExpression(n) => {
                tok(f, &n.operator);
                child(f, &n.operand);
            }
            ErrorControlExpression(n) => {
                tok(f, &n.operator);
                child(f, &n.operand);
            }
            PrefixUpdateExpression(n) => {
                tok(f, &n.increment_or_decrement);
                child(f, &n.operand);
            }
            PostfixUpdateExpression(n) => {
                child(f, &n.operand);
                tok(f, &n.increment_or_decrement);
            }
            CastExpression(n) => {
                tok(f, &n.open_paren);
                tok(f, &n.cast_type);
                tok(f, &n.close_paren);
                child(f, &n.operand);
            }
            ObjectCreationExpression(n) => {
                tok(f, &n.new_keyword);
                child(f, &n.class_type_designator);
                opt_tok(f, &n.open_paren);
                opt_node(f, &n.arguments);
                opt_tok(f, &n.close_paren);
            }
            CloneExpression(n) => {
                tok(f, &n.clone_keyword);
                child(f, &n.operand);
            }
            BinaryExpression(n) => {
                child(f, &n.left);
                tok(f, &n.operator);
                child(f, &n.right);
            }
            AssignmentExpression(n) => {
                child(f, &n.left);
                tok(f, &n.operator);
                opt_tok(f, &n.by_ref);
                child(f, &n.right);
            }
            TernaryExpression(n) => {
                child(f, &n.condition);
                tok(f, &n.question);
                opt_child(f, &n.if_expression);
                tok(f, &n.colon);
                child(f, &n.else_expression);
            }
            Variable(n) => tok(f, &n.name),
            QualifiedName(n) => children(f, &n.parts),
            ReservedWord(n) => tok(f, &n.token),
            NumericLiteral(n) => tok(f, &n.token),
            StringLiteral(n) => {
                opt_tok(f, &n.start_quote);
                children(f, &n.children);
                opt_tok(f, &n.end_quote);
            }
            TemplateExpression(n) => children(f, &n.children),
            SubscriptExpression(n) => {
                child(f, &n.postfix_expression);
                tok(f, &n.open_bracket_or_brace);
                opt_child(f, &n.access_expression);
                tok(f, &n.close_bracket_or_brace);
            }
            MemberAccessExpression(n) => {
                child(f, &n.dereferencable_expression);
                tok(f, &n.arrow);
                child(f, &n.member_name);
            }
            ScopedPropertyAccessExpression(n) => {
                child(f, &n.scope_resolution_qualifier);
                tok(f, &n.double_colon);
                child(f, &n.member_name);
            }
            CallExpression(n) => {
                child(f, &n.callable_expression);
                tok(f, &n.open_paren);
                opt_node(f, &n.arguments);
                tok(f, &n.close_paren);
            }
            ArgumentExpression(n) => {
                opt_tok(f, &n.dot_dot_dot);
                child(f, &n.expression);
            }
            ParenthesizedExpression(n) => {
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
            }
            ArrayCreationExpression(n) => {
                opt_tok(f, &n.array_keyword);
                tok(f, &n.open_paren_or_bracket);
                opt_node(f, &n.array_elements);
                tok(f, &n.close_paren_or_bracket);
            }
            ArrayElement(n) => {
                opt_child(f, &n.key);
                opt_tok(f, &n.arrow);
                opt_tok(f, &n.by_ref);
                child(f, &n.value);
            }
            BracedExpression(n) => {
                tok(f, &n.open_brace);
                child(f, &n.expression);
                tok(f, &n.close_brace);
            }
            EchoExpression(n) => {
                tok(f, &n.echo_keyword);
                opt_node(f, &n.expressions);
            }
            ListIntrinsicExpression(n) => {
                tok(f, &n.list_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.list_elements);
                tok(f, &n.close_paren);
            }
            UnsetIntrinsicExpression(n) => {
                tok(f, &n.unset_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.expressions);
                tok(f, &n.close_paren);
            }
            EmptyIntrinsicExpression(n) => {
                tok(f, &n.empty_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
            }
            EvalIntrinsicExpression(n) => {
                tok(f, &n.eval_keyword);
                tok(f, &n.open_paren);
                child(f, &n.expression);
                tok(f, &n.close_paren);
            }
            ExitIntrinsicExpression(n) => {
                tok(f, &n.exit_or_die_keyword);
                opt_tok(f, &n.open_paren);
                opt_child(f, &n.expression);
                opt_tok(f, &n.close_paren);
            }
            IssetIntrinsicExpression(n) => {
                tok(f, &n.isset_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.expressions);
                tok(f, &n.close_paren);
            }
            PrintIntrinsicExpression(n) => {
                tok(f, &n.print_keyword);
                child(f, &n.expression);
            }
            ScriptInclusionExpression(n) => {
                tok(f, &n.require_or_include_keyword);
                child(f, &n.expression);
            }
            AnonymousFunctionCreationExpression(n) => {
                opt_tok(f, &n.static_modifier);
                tok(f, &n.function_keyword);
                opt_tok(f, &n.by_ref);
                opt_tok(f, &n.skipped_name);
                tok(f, &n.open_paren);
                opt_node(f, &n.parameters);
                tok(f, &n.close_paren);
                opt_node(f, &n.use_clause);
                opt_tok(f, &n.colon);
                opt_child(f, &n.return_type);
                node(f, n.compound_statement);
            }
            AnonymousFunctionUseClause(n) => {
                tok(f, &n.use_keyword);
                tok(f, &n.open_paren);
                opt_node(f, &n.use_variables);
                tok(f, &n.close_paren);
            }
            UseVariableName(n) => {
                opt_tok(f, &n.by_ref);
                tok(f, &n.variable_name);
            }
            DelimitedList(n) => children(f, &n.children),
        }
    }
}

// =============================================================================
// NodeArena
// =============================================================================

struct NodeEntry {
    parent: NodeIndex,
    data: NodeData,
}

/// Arena holding every node of one parse, keyed by `NodeIndex` handles.
/// Parent back-pointers are assigned when a node is added (children are
/// always created before their parent) and re-pointed by the postfix
/// re-parenting helpers.
pub struct NodeArena {
    source: Arc<str>,
    entries: Vec<NodeEntry>,
}

impl NodeArena {
    pub fn new(source: Arc<str>) -> NodeArena {
        NodeArena {
            source,
            entries: Vec::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: NodeIndex) -> &NodeData {
        &self.entries[index.0 as usize].data
    }

    pub fn kind(&self, index: NodeIndex) -> NodeKind {
        self.get(index).kind()
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.entries[index.0 as usize].parent
    }

    /// Add a node, re-pointing every node child's parent at the new entry.
    /// A child that was already owned elsewhere keeps its place in the tree
    /// only through its new parent (postfix wrapping relies on this).
    pub fn add(&mut self, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.entries.len() as u32);
        let mut child_nodes = Vec::new();
        data.for_each_child(&mut |c| {
            if let Child::Node(n) = c {
                child_nodes.push(n);
            }
        });
        self.entries.push(NodeEntry {
            parent: NodeIndex::NONE,
            data,
        });
        for child in child_nodes {
            self.entries[child.0 as usize].parent = index;
        }
        index
    }

    /// Re-point a child's parent after tree surgery (the exponentiation
    /// rewrite replaces a unary operand in place).
    pub fn reparent(&mut self, child: NodeIndex, new_parent: NodeIndex) {
        self.entries[child.0 as usize].parent = new_parent;
    }

    /// Mutable access for in-place slot surgery.
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut NodeData {
        &mut self.entries[index.0 as usize].data
    }
}
