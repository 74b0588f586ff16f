//! Error recovery: missing tokens, skipped tokens, enclosing-context
//! deferral, and forward-progress guarantees on garbage input.

use phz_parser::{Child, NodeArena, NodeData, NodeIndex, NodeKind, ParserState};
use phz_scanner::TokenKind;

fn parse(source: &str) -> (NodeArena, NodeIndex) {
    let mut parser = ParserState::new(source);
    let root = parser.parse_source_file();
    (parser.arena, root)
}

fn reconstruct(arena: &NodeArena, root: NodeIndex) -> String {
    fn walk(arena: &NodeArena, index: NodeIndex, out: &mut String) {
        let mut kids = Vec::new();
        arena.get(index).for_each_child(&mut |c| kids.push(c));
        for child in kids {
            match child {
                Child::Token(t) => out.push_str(t.full_text(arena.source_text())),
                Child::Node(n) => walk(arena, n, out),
            }
        }
    }
    let mut out = String::new();
    walk(arena, root, &mut out);
    out
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

#[test]
fn missing_close_brace_does_not_eat_the_next_method() {
    let (arena, root) =
        parse("<?php class A { function foo() { return; public function bar() {} }");
    let methods = find_nodes(&arena, root, NodeKind::MethodDeclaration);
    assert_eq!(methods.len(), 2, "both methods must be members of the class");

    // foo's body closes via a missing brace when `public` defers to the
    // enclosing member list.
    let NodeData::MethodDeclaration(foo) = arena.get(methods[0]) else {
        unreachable!();
    };
    let NodeData::CompoundStatement(foo_body) = arena.get(foo.compound_statement.unwrap()) else {
        panic!("expected a compound body for foo");
    };
    assert!(foo_body.close_brace.is_missing());

    let NodeData::MethodDeclaration(bar) = arena.get(methods[1]) else {
        unreachable!();
    };
    let NodeData::CompoundStatement(bar_body) = arena.get(bar.compound_statement.unwrap()) else {
        panic!("expected a compound body for bar");
    };
    assert!(!bar_body.close_brace.is_missing());
}

#[test]
fn class_close_brace_is_missing_at_end_of_file() {
    let (arena, root) = parse("<?php class A { function foo() { return; public function bar() {}");
    let members = find_nodes(&arena, root, NodeKind::ClassMembers)[0];
    let NodeData::ClassMembers(m) = arena.get(members) else {
        unreachable!();
    };
    assert!(m.close_brace.is_missing());
    assert_eq!(find_nodes(&arena, root, NodeKind::MethodDeclaration).len(), 2);
}

#[test]
fn garbage_between_statements_becomes_a_skipped_sibling() {
    let source = "<?php $x = 1; & $y = 2;";
    let (arena, root) = parse(source);
    let NodeData::SourceFile(file) = arena.get(root) else {
        panic!("expected source file root");
    };
    let skipped: Vec<_> = file
        .statements
        .iter()
        .filter_map(|c| c.as_token())
        .filter(|t| t.is_skipped())
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].kind, TokenKind::Ampersand);
    assert_eq!(find_nodes(&arena, root, NodeKind::ExpressionStatement).len(), 2);
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn modifiers_without_a_member_yield_a_missing_member_declaration() {
    let (arena, root) = parse("<?php class A { public ) function ok() {} }");
    let missing = find_nodes(&arena, root, NodeKind::MissingMemberDeclaration);
    assert_eq!(missing.len(), 1);
    let NodeData::MissingMemberDeclaration(m) = arena.get(missing[0]) else {
        unreachable!();
    };
    assert_eq!(m.modifiers.len(), 1);
    // The stray paren is skipped inside the member list and the class still
    // parses the following method.
    let members = find_nodes(&arena, root, NodeKind::ClassMembers)[0];
    let NodeData::ClassMembers(list) = arena.get(members) else {
        unreachable!();
    };
    assert!(list
        .members
        .iter()
        .any(|c| c.as_token().is_some_and(|t| t.is_skipped())));
    assert_eq!(find_nodes(&arena, root, NodeKind::MethodDeclaration).len(), 1);
}

#[test]
fn member_list_defers_tokens_the_outer_list_accepts() {
    // `42` can start a statement, so the member list terminates early and
    // the enclosing source-elements list takes over.
    let (arena, root) = parse("<?php class A { public 42; }");
    let members = find_nodes(&arena, root, NodeKind::ClassMembers)[0];
    let NodeData::ClassMembers(list) = arena.get(members) else {
        unreachable!();
    };
    assert!(list.close_brace.is_missing());
    assert_eq!(find_nodes(&arena, root, NodeKind::MissingMemberDeclaration).len(), 1);
    assert_eq!(find_nodes(&arena, root, NodeKind::ExpressionStatement).len(), 1);
}

#[test]
fn statement_level_abstract_without_class_is_skipped() {
    let source = "<?php abstract $x = 1;";
    let (arena, root) = parse(source);
    let NodeData::SourceFile(file) = arena.get(root) else {
        panic!("expected source file root");
    };
    let skipped: Vec<_> = file
        .statements
        .iter()
        .filter_map(|c| c.as_token())
        .filter(|t| t.is_skipped())
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].kind, TokenKind::AbstractKeyword);
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn expected_tokens_synthesize_zero_width_missing_tokens() {
    let (arena, root) = parse("<?php if ($a { $b; }");
    let statement = find_nodes(&arena, root, NodeKind::IfStatement)[0];
    let NodeData::IfStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.close_paren.is_missing());
    assert_eq!(n.close_paren.length, 0);
}

#[test]
fn missing_expression_in_forced_position_skips_one_token() {
    let source = "<?php if ($a) @;";
    // `@` starts an error-control expression whose operand is missing; the
    // parser must still terminate with every byte covered.
    let (arena, root) = parse(source);
    assert_eq!(reconstruct(&arena, root), source);

    let source = "<?php do ] while ($a);";
    let (arena, root) = parse(source);
    let statements = find_nodes(&arena, root, NodeKind::ExpressionStatement);
    let NodeData::ExpressionStatement(n) = arena.get(statements[0]) else {
        unreachable!();
    };
    let Child::Token(missing) = n.expression else {
        panic!("expected a missing-expression token");
    };
    assert!(missing.is_missing());
    assert_eq!(missing.kind, TokenKind::Expression);
    assert!(n.skipped.is_some_and(|t| t.is_skipped()));
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn assignment_with_missing_right_operand() {
    let source = "<?php $x = ;";
    let (arena, root) = parse(source);
    let assignments = find_nodes(&arena, root, NodeKind::AssignmentExpression);
    let NodeData::AssignmentExpression(a) = arena.get(assignments[0]) else {
        unreachable!();
    };
    let Child::Token(missing) = a.right else {
        panic!("expected a missing token on the right");
    };
    assert!(missing.is_missing());
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn unterminated_if_at_end_of_file() {
    let source = "<?php if ($a";
    let (arena, root) = parse(source);
    let statement = find_nodes(&arena, root, NodeKind::IfStatement)[0];
    let NodeData::IfStatement(n) = arena.get(statement) else {
        unreachable!();
    };
    assert!(n.close_paren.is_missing());
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn stray_close_tokens_at_top_level_are_skipped() {
    let source = "<?php ) ] } ; $ok = 1;";
    let (arena, root) = parse(source);
    assert_eq!(reconstruct(&arena, root), source);
    assert_eq!(find_nodes(&arena, root, NodeKind::AssignmentExpression).len(), 1);
}

#[test]
fn endwhile_inside_if_colon_body_defers_to_the_while_list() {
    let source = "<?php while ($a): if ($b): $c; endwhile;";
    let (arena, root) = parse(source);
    let whiles = find_nodes(&arena, root, NodeKind::WhileStatement);
    let NodeData::WhileStatement(w) = arena.get(whiles[0]) else {
        unreachable!();
    };
    // The inner if never saw its endif, but the endwhile still closes the
    // while statement.
    assert!(w.endwhile_keyword.as_ref().is_some_and(|t| !t.is_missing()));
    let ifs = find_nodes(&arena, root, NodeKind::IfStatement);
    let NodeData::IfStatement(i) = arena.get(ifs[0]) else {
        unreachable!();
    };
    assert!(i.endif_keyword.as_ref().is_some_and(|t| t.is_missing()));
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn every_leaf_stays_in_order_on_heavily_broken_input() {
    let sources = [
        "<?php class { function () { if ( { ",
        "<?php foreach as => ) : endforeach",
        "<?php use as ; trait { use { insteadof ; } }",
        "<?php \"unterminated $x",
        "<?php $a -> :: -> $b",
        "<?php switch { case case default : }",
        "no php at all",
        "",
        "<?php",
    ];
    for source in sources {
        let (arena, root) = parse(source);
        assert_eq!(reconstruct(&arena, root), source, "round-trip failed");
    }
}
