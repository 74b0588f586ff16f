//! Statement and declaration shape tests, including both body forms of the
//! control-flow statements and the section-tag quirks.

use phz_parser::{Child, NodeArena, NodeData, NodeIndex, NodeKind, ParserState};
use phz_scanner::TokenKind;

fn parse(source: &str) -> (NodeArena, NodeIndex) {
    let mut parser = ParserState::new(source);
    let root = parser.parse_source_file();
    (parser.arena, root)
}

fn find_nodes(arena: &NodeArena, root: NodeIndex, kind: NodeKind) -> Vec<NodeIndex> {
    let mut found = Vec::new();
    let mut stack = vec![root];
    while let Some(index) = stack.pop() {
        if arena.kind(index) == kind {
            found.push(index);
        }
        let mut kids = Vec::new();
        arena.get(index).for_each_child(&mut |c| {
            if let Child::Node(n) = c {
                kids.push(n);
            }
        });
        for k in kids.into_iter().rev() {
            stack.push(k);
        }
    }
    found
}

fn find_one(arena: &NodeArena, root: NodeIndex, kind: NodeKind) -> NodeIndex {
    let found = find_nodes(arena, root, kind);
    assert_eq!(found.len(), 1, "expected exactly one {kind:?}");
    found[0]
}

#[test]
fn top_of_file_emits_a_leading_inline_html_island() {
    let (arena, root) = parse("<?php $x;");
    let NodeData::SourceFile(file) = arena.get(root) else {
        panic!("expected source file root");
    };
    let first = file.statements[0].as_node().unwrap();
    let NodeData::InlineHtml(island) = arena.get(first) else {
        panic!("expected a leading inline-HTML island");
    };
    assert!(island.script_section_end.is_none());
    assert!(island.text.is_none());
    assert!(island.script_section_start.is_some());
}

#[test]
fn pre_script_text_lands_in_the_leading_island() {
    let (arena, root) = parse("<html> <?php $x;");
    let island = find_nodes(&arena, root, NodeKind::InlineHtml)[0];
    let NodeData::InlineHtml(n) = arena.get(island) else {
        unreachable!();
    };
    assert!(n.text.is_some());
    assert!(n.script_section_start.is_some());
}

#[test]
fn close_tag_satisfies_an_expression_statement_semicolon() {
    let (arena, root) = parse("<?php $x = 1 ?> trailing");
    let statement = find_one(&arena, root, NodeKind::ExpressionStatement);
    let NodeData::ExpressionStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    // The tag is not eaten as a semicolon; it starts the next island.
    assert!(n.semicolon.is_none());
    let islands = find_nodes(&arena, root, NodeKind::InlineHtml);
    assert_eq!(islands.len(), 2);
    let NodeData::InlineHtml(tail) = arena.get(islands[1]) else {
        unreachable!();
    };
    assert!(tail.script_section_end.is_some());
    assert!(tail.text.is_some());
}

#[test]
fn labeled_statement_requires_one_token_lookahead() {
    let (arena, root) = parse("<?php again: $x = 1;");
    assert_eq!(find_nodes(&arena, root, NodeKind::NamedLabelStatement).len(), 1);

    // A bare name followed by `(` stays an expression.
    let (arena, root) = parse("<?php again();");
    assert!(find_nodes(&arena, root, NodeKind::NamedLabelStatement).is_empty());
}

#[test]
fn if_statement_single_body_form() {
    let (arena, root) = parse("<?php if ($a) $b; else $c;");
    let statement = find_one(&arena, root, NodeKind::IfStatement);
    let NodeData::IfStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.colon.is_none());
    assert_eq!(n.statements.len(), 1);
    assert!(n.else_clause.is_some());
    assert!(n.endif_keyword.is_none());
}

#[test]
fn if_statement_colon_form() {
    let (arena, root) =
        parse("<?php if ($a): echo 1; elseif ($b): echo 2; else: echo 3; endif;");
    let statement = find_one(&arena, root, NodeKind::IfStatement);
    let NodeData::IfStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.colon.is_some());
    assert_eq!(n.elseif_clauses.len(), 1);
    assert!(n.else_clause.is_some());
    assert!(n.endif_keyword.as_ref().is_some_and(|t| !t.is_missing()));
    assert!(n.semicolon.as_ref().is_some_and(|t| !t.is_missing()));
}

#[test]
fn else_if_split_keywords_nest_an_if_inside_else() {
    let (arena, root) = parse("<?php if ($a) $b; else if ($c) $d;");
    let ifs = find_nodes(&arena, root, NodeKind::IfStatement);
    assert_eq!(ifs.len(), 2);
    assert_eq!(find_nodes(&arena, root, NodeKind::ElseClause).len(), 1);
}

#[test]
fn while_colon_form_terminates_at_endwhile() {
    let (arena, root) = parse("<?php while ($a): echo 1; endwhile;");
    let statement = find_one(&arena, root, NodeKind::WhileStatement);
    let NodeData::WhileStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.colon.is_some());
    assert!(n.endwhile_keyword.as_ref().is_some_and(|t| !t.is_missing()));
}

#[test]
fn do_while_statement() {
    let (arena, root) = parse("<?php do { $i++; } while ($i < 3);");
    let statement = find_one(&arena, root, NodeKind::DoStatement);
    let NodeData::DoStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(!n.while_keyword.is_missing());
    assert!(!n.semicolon.is_missing());
}

#[test]
fn for_statement_with_all_clauses() {
    let (arena, root) = parse("<?php for ($i = 0; $i < 5; $i++) {}");
    let statement = find_one(&arena, root, NodeKind::ForStatement);
    let NodeData::ForStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.initializer.is_some());
    assert!(n.control.is_some());
    assert!(n.increment.is_some());
}

#[test]
fn for_statement_with_empty_clauses() {
    let (arena, root) = parse("<?php for (;;) {}");
    let statement = find_one(&arena, root, NodeKind::ForStatement);
    let NodeData::ForStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.initializer.is_none());
    assert!(n.control.is_none());
    assert!(n.increment.is_none());
}

#[test]
fn foreach_with_key_and_by_ref_value() {
    let (arena, root) = parse("<?php foreach ($items as $k => &$v) {}");
    let statement = find_one(&arena, root, NodeKind::ForeachStatement);
    let NodeData::ForeachStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.key.is_some());
    let NodeData::ForeachValue(value) = arena.get(n.value.unwrap()) else {
        panic!("expected a foreach value node");
    };
    assert!(value.ampersand.is_some());
}

#[test]
fn switch_brace_and_colon_forms() {
    let (arena, root) = parse("<?php switch ($a) { case 1: break; default: break; }");
    let statement = find_one(&arena, root, NodeKind::SwitchStatement);
    let NodeData::SwitchStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.open_brace.is_some());
    assert_eq!(n.case_statements.len(), 2);

    let (arena, root) = parse("<?php switch ($a): case 1: break; endswitch;");
    let statement = find_one(&arena, root, NodeKind::SwitchStatement);
    let NodeData::SwitchStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.colon.is_some());
    assert!(n.endswitch_keyword.is_some());
}

#[test]
fn case_bodies_run_until_the_next_label() {
    let (arena, root) = parse("<?php switch ($a) { case 1: $x; $y; case 2: $z; }");
    let cases = find_nodes(&arena, root, NodeKind::CaseStatement);
    assert_eq!(cases.len(), 2);
    let NodeData::CaseStatement(first) = arena.get(cases[0]) else {
        unreachable!();
    };
    assert_eq!(first.statements.len(), 2);
}

#[test]
fn break_and_continue_accept_an_integer_level() {
    let (arena, root) = parse("<?php while ($a) { break 2; continue; }");
    let jumps = find_nodes(&arena, root, NodeKind::BreakOrContinueStatement);
    assert_eq!(jumps.len(), 2);
    let NodeData::BreakOrContinueStatement(b) = arena.get(jumps[0]) else {
        unreachable!();
    };
    assert!(b.breakout_level.is_some());
    let NodeData::BreakOrContinueStatement(c) = arena.get(jumps[1]) else {
        unreachable!();
    };
    assert!(c.breakout_level.is_none());
}

#[test]
fn try_catch_finally() {
    let (arena, root) =
        parse("<?php try { f(); } catch (\\Exception $e) { g(); } finally { h(); }");
    let statement = find_one(&arena, root, NodeKind::TryStatement);
    let NodeData::TryStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert_eq!(n.catch_clauses.len(), 1);
    assert!(n.finally_clause.is_some());
}

#[test]
fn declare_statement_forms() {
    let (arena, root) = parse("<?php declare(strict_types=1);");
    let statement = find_one(&arena, root, NodeKind::DeclareStatement);
    let NodeData::DeclareStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.semicolon.is_some());
    assert!(n.statements.is_empty());

    // The parenthesized group is a comma-delimited directive list.
    let (arena, root) = parse("<?php declare(strict_types=1, ticks=1);");
    let statement = find_one(&arena, root, NodeKind::DeclareStatement);
    let NodeData::DeclareStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(!n.close_paren.is_missing());
    assert!(n.directives.is_some());
    assert_eq!(find_nodes(&arena, root, NodeKind::DeclareDirective).len(), 2);

    let (arena, root) = parse("<?php declare(ticks=1): echo 1; enddeclare;");
    let statement = find_one(&arena, root, NodeKind::DeclareStatement);
    let NodeData::DeclareStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.colon.is_some());
    assert!(n.enddeclare_keyword.is_some());
}

#[test]
fn goto_and_label() {
    let (arena, root) = parse("<?php start: $i++; goto start;");
    assert_eq!(find_nodes(&arena, root, NodeKind::GotoStatement).len(), 1);
    assert_eq!(find_nodes(&arena, root, NodeKind::NamedLabelStatement).len(), 1);
}

#[test]
fn function_declaration_with_reference_and_return_type() {
    let (arena, root) = parse("<?php function &make(int $n, ...$rest): \\Foo\\Bar {}");
    let decl = find_one(&arena, root, NodeKind::FunctionDeclaration);
    let NodeData::FunctionDeclaration(f) = arena.get(decl) else {
        unreachable!();
    };
    assert!(f.by_ref.is_some());
    assert!(f.colon.is_some());
    assert!(f.return_type.is_some());
    let parameters = find_nodes(&arena, root, NodeKind::Parameter);
    assert_eq!(parameters.len(), 2);
    let NodeData::Parameter(rest) = arena.get(parameters[1]) else {
        unreachable!();
    };
    assert!(rest.dot_dot_dot.is_some());
}

#[test]
fn parameter_defaults_and_types() {
    let (arena, root) = parse("<?php function f(array $a, Foo $b = null, &$c) {}");
    let parameters = find_nodes(&arena, root, NodeKind::Parameter);
    assert_eq!(parameters.len(), 3);
    let NodeData::Parameter(second) = arena.get(parameters[1]) else {
        unreachable!();
    };
    assert!(second.default.is_some());
    let NodeData::Parameter(third) = arena.get(parameters[2]) else {
        unreachable!();
    };
    assert!(third.by_ref.is_some());
    assert!(third.type_declaration.is_none());
}

#[test]
fn class_declaration_with_heritage() {
    let (arena, root) =
        parse("<?php final class A extends B implements C, D { public $x = 1; }");
    let decl = find_one(&arena, root, NodeKind::ClassDeclaration);
    let NodeData::ClassDeclaration(c) = arena.get(decl) else {
        unreachable!();
    };
    assert_eq!(c.modifiers.len(), 1);
    assert!(c.base_clause.is_some());
    assert!(c.interface_clause.is_some());
    assert_eq!(find_nodes(&arena, root, NodeKind::PropertyDeclaration).len(), 1);
}

#[test]
fn class_members_dispatch_on_the_token_after_modifiers() {
    let (arena, root) = parse(
        "<?php class A { const X = 1; public static function f() {} private $p, $q = 2; }",
    );
    assert_eq!(
        find_nodes(&arena, root, NodeKind::ClassConstDeclaration).len(),
        1
    );
    assert_eq!(find_nodes(&arena, root, NodeKind::MethodDeclaration).len(), 1);
    let property = find_one(&arena, root, NodeKind::PropertyDeclaration);
    let NodeData::PropertyDeclaration(p) = arena.get(property) else {
        unreachable!();
    };
    assert_eq!(p.modifiers.len(), 1);
    assert!(p.property_elements.is_some());
}

#[test]
fn abstract_method_ends_with_a_semicolon() {
    let (arena, root) = parse("<?php abstract class A { abstract public function f(); }");
    let method = find_one(&arena, root, NodeKind::MethodDeclaration);
    let NodeData::MethodDeclaration(m) = arena.get(method) else {
        unreachable!();
    };
    assert!(m.compound_statement.is_none());
    assert!(m.semicolon.is_some());
    assert_eq!(m.modifiers.len(), 2);
}

#[test]
fn interface_declaration_with_extends_list() {
    let (arena, root) = parse("<?php interface I extends A, B { const X = 1; public function f(); }");
    let decl = find_one(&arena, root, NodeKind::InterfaceDeclaration);
    let NodeData::InterfaceDeclaration(i) = arena.get(decl) else {
        unreachable!();
    };
    assert!(i.base_clause.is_some());
    assert_eq!(find_nodes(&arena, root, NodeKind::MethodDeclaration).len(), 1);
}

#[test]
fn trait_declaration_with_use_and_aliasing() {
    let (arena, root) = parse(
        "<?php trait T { use A, B { A::big insteadof B; B::small as protected tiny; } }",
    );
    assert_eq!(find_nodes(&arena, root, NodeKind::TraitDeclaration).len(), 1);
    let use_clause = find_one(&arena, root, NodeKind::TraitUseClause);
    let NodeData::TraitUseClause(u) = arena.get(use_clause) else {
        unreachable!();
    };
    assert!(u.open_brace.is_some());
    let clauses = find_nodes(&arena, root, NodeKind::TraitSelectOrAliasClause);
    assert_eq!(clauses.len(), 2);
    let NodeData::TraitSelectOrAliasClause(alias) = arena.get(clauses[1]) else {
        unreachable!();
    };
    assert_eq!(alias.operation.kind, TokenKind::AsKeyword);
    assert_eq!(alias.modifiers.len(), 1);
}

#[test]
fn namespace_definition_and_relative_name() {
    let (arena, root) = parse("<?php namespace App\\Core;");
    let def = find_one(&arena, root, NodeKind::NamespaceDefinition);
    let NodeData::NamespaceDefinition(n) = arena.get(def) else {
        unreachable!();
    };
    assert!(n.name.is_some());

    // `namespace\` is a relative qualified name, not a definition.
    let (arena, root) = parse("<?php namespace\\f();");
    assert!(find_nodes(&arena, root, NodeKind::NamespaceDefinition).is_empty());
    assert_eq!(find_nodes(&arena, root, NodeKind::CallExpression).len(), 1);
}

#[test]
fn namespace_use_with_alias_and_group() {
    let (arena, root) = parse("<?php use A\\B as C, D\\{E, function f as g, const H};");
    let decl = find_one(&arena, root, NodeKind::NamespaceUseDeclaration);
    let NodeData::NamespaceUseDeclaration(u) = arena.get(decl) else {
        unreachable!();
    };
    assert!(u.use_clauses.is_some());
    assert_eq!(find_nodes(&arena, root, NodeKind::NamespaceUseClause).len(), 2);
    assert_eq!(
        find_nodes(&arena, root, NodeKind::NamespaceUseGroupClause).len(),
        3
    );
    assert_eq!(
        find_nodes(&arena, root, NodeKind::NamespaceAliasingClause).len(),
        2
    );
}

#[test]
fn global_const_and_function_static_declarations() {
    let (arena, root) = parse("<?php global $a, $b; const X = 1; function f() { static $n = 0; }");
    assert_eq!(find_nodes(&arena, root, NodeKind::GlobalDeclaration).len(), 1);
    assert_eq!(find_nodes(&arena, root, NodeKind::ConstDeclaration).len(), 1);
    assert_eq!(
        find_nodes(&arena, root, NodeKind::FunctionStaticDeclaration).len(),
        1
    );
    assert_eq!(
        find_nodes(&arena, root, NodeKind::StaticVariableDeclaration).len(),
        1
    );
}

#[test]
fn empty_statement_is_a_node() {
    let (arena, root) = parse("<?php ;;");
    assert_eq!(find_nodes(&arena, root, NodeKind::EmptyStatement).len(), 2);
}
