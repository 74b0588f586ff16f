//! Interpolated-string parsing: the template flow with lexer rescans and the
//! quote-delimited flow with embedded expressions.

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

fn token_kinds(arena: &NodeArena, index: NodeIndex) -> Vec<TokenKind> {
    let mut kinds = Vec::new();
    arena.get(index).for_each_child(&mut |c| {
        if let Child::Token(t) = c {
            kinds.push(t.kind);
        }
    });
    kinds
}

#[test]
fn template_string_with_one_variable() {
    let source = "<?php $s = \"hello $name world\";";
    let (arena, root) = parse(source);
    let templates = find_nodes(&arena, root, NodeKind::TemplateExpression);
    assert_eq!(templates.len(), 1);
    assert_eq!(
        token_kinds(&arena, templates[0]),
        vec![
            TokenKind::TemplateStringStart,
            TokenKind::VariableName,
            TokenKind::TemplateStringEnd,
        ]
    );
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn template_string_with_two_variables_has_a_middle() {
    let source = "<?php $s = \"a $b c $d e\";";
    let (arena, root) = parse(source);
    let template = find_nodes(&arena, root, NodeKind::TemplateExpression)[0];
    assert_eq!(
        token_kinds(&arena, template),
        vec![
            TokenKind::TemplateStringStart,
            TokenKind::VariableName,
            TokenKind::TemplateStringMiddle,
            TokenKind::VariableName,
            TokenKind::TemplateStringEnd,
        ]
    );
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn template_is_the_right_hand_side_of_the_assignment() {
    let (arena, root) = parse("<?php $s = \"hi $n\";");
    let assignment = find_nodes(&arena, root, NodeKind::AssignmentExpression)[0];
    let NodeData::AssignmentExpression(a) = arena.get(assignment) else {
        unreachable!();
    };
    assert_eq!(
        arena.kind(a.right.as_node().unwrap()),
        NodeKind::TemplateExpression
    );
}

#[test]
fn plain_strings_stay_single_token_literals() {
    let source = "<?php $a = 'one'; $b = \"two\";";
    let (arena, root) = parse(source);
    let literals = find_nodes(&arena, root, NodeKind::StringLiteral);
    assert_eq!(literals.len(), 2);
    for literal in literals {
        let NodeData::StringLiteral(s) = arena.get(literal) else {
            unreachable!();
        };
        assert!(s.start_quote.is_none());
        assert_eq!(s.children.len(), 1);
    }
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn brace_dollar_interpolation_embeds_an_expression() {
    let source = "<?php $s = \"x {$a->b} y\";";
    let (arena, root) = parse(source);
    let literal = find_nodes(&arena, root, NodeKind::StringLiteral)[0];
    let NodeData::StringLiteral(s) = arena.get(literal) else {
        unreachable!();
    };
    assert!(s.start_quote.is_some());
    assert!(s.end_quote.as_ref().is_some_and(|t| !t.is_missing()));
    // One of the children is the embedded member-access expression.
    assert!(s
        .children
        .iter()
        .filter_map(|c| c.as_node())
        .any(|n| arena.kind(n) == NodeKind::MemberAccessExpression));
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn dollar_brace_interpolation_must_close_with_a_brace() {
    let source = "<?php $s = \"v: ${name}\";";
    let (arena, root) = parse(source);
    let literal = find_nodes(&arena, root, NodeKind::StringLiteral)[0];
    let NodeData::StringLiteral(s) = arena.get(literal) else {
        unreachable!();
    };
    let kinds: Vec<TokenKind> = s
        .children
        .iter()
        .filter_map(|c| c.as_token())
        .map(|t| t.kind)
        .collect();
    assert!(kinds.contains(&TokenKind::DollarOpenBrace));
    assert!(kinds.contains(&TokenKind::CloseBrace));
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn heredoc_parses_as_a_quote_delimited_literal() {
    let source = "<?php $s = <<<EOT\nline $x\nEOT;\n";
    let (arena, root) = parse(source);
    let literal = find_nodes(&arena, root, NodeKind::StringLiteral)[0];
    let NodeData::StringLiteral(s) = arena.get(literal) else {
        unreachable!();
    };
    assert_eq!(s.start_quote.unwrap().kind, TokenKind::HeredocStart);
    assert_eq!(s.end_quote.unwrap().kind, TokenKind::HeredocEnd);
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn backtick_string_is_quote_delimited() {
    let source = "<?php $out = `ls $dir`;";
    let (arena, root) = parse(source);
    let literal = find_nodes(&arena, root, NodeKind::StringLiteral)[0];
    let NodeData::StringLiteral(s) = arena.get(literal) else {
        unreachable!();
    };
    assert_eq!(s.start_quote.unwrap().kind, TokenKind::Backtick);
    assert_eq!(s.end_quote.unwrap().kind, TokenKind::Backtick);
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn unterminated_template_reaches_end_of_file() {
    let source = "<?php $s = \"abc $x";
    let (arena, root) = parse(source);
    let template = find_nodes(&arena, root, NodeKind::TemplateExpression)[0];
    let kinds = token_kinds(&arena, template);
    assert_eq!(*kinds.last().unwrap(), TokenKind::TemplateStringEnd);
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn unterminated_quote_delimited_string_synthesizes_the_close() {
    let source = "<?php $s = \"x {$a} y";
    let (arena, root) = parse(source);
    let literal = find_nodes(&arena, root, NodeKind::StringLiteral)[0];
    let NodeData::StringLiteral(s) = arena.get(literal) else {
        unreachable!();
    };
    assert!(s.end_quote.as_ref().is_some_and(|t| t.is_missing()));
    assert_eq!(reconstruct(&arena, root), source);
}

#[test]
fn strings_interpolate_inside_function_arguments() {
    let source = "<?php log(\"user $id logged in\", \"at {$t->h}\");";
    let (arena, root) = parse(source);
    assert_eq!(find_nodes(&arena, root, NodeKind::TemplateExpression).len(), 1);
    assert_eq!(find_nodes(&arena, root, NodeKind::StringLiteral).len(), 1);
    assert_eq!(reconstruct(&arena, root), source);
}
