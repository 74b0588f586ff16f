//! Universal tree invariants, checked across a corpus of well-formed and
//! broken sources: full coverage, parent consistency, termination, token
//! preservation, and forced-expression progress.

use std::collections::HashSet;

use phz::{parse_source_file, Child, NodeData, NodeIndex, NodeKind, ParseTree};

const CORPUS: &[&str] = &[
    "",
    "no php here at all",
    "<?php",
    "<?php $a + $b * $c;",
    "<?php echo \"hello $name world\";",
    "<?php $x = 1; & $y = 2;",
    "<?php if ($a): echo 1; elseif ($b): echo 2; else: echo 3; endif;",
    "<?php class A { function foo() { return; public function bar() {} }",
    "<?php function f(array $a, Foo $b = null, &...$c) { return $a ?: $b; }",
    "<?php namespace App; use A\\B as C, D\\{E, function f}; class X extends Y implements Z {}",
    "<?php trait T { use A, B { A::x insteadof B; } } interface I extends J {}",
    "<?php foreach ($xs as $k => &$v): $v *= 2; endforeach;",
    "<?php for ($i = 0; $i < 10; $i++) { while (true) do $i--; while ($i); }",
    "<?php switch ($x) { case 1: case 2: break 2; default: continue; }",
    "<?php try { f(); } catch (\\E $e) {} finally {}",
    "<?php declare(strict_types=1, ticks=1); goto end; end: exit(1);",
    "<?php f()(); (g())();",
    "<?php $s = <<<EOT\nline $x and {$y->z}\nEOT;\n",
    "<?php $s = \"a $b c ${d} e {$f[0]}\";",
    "<?php $f = static function (&$x) use ($y) { return $x <=> $y; };",
    "<?php echo 2 ** -3 ** 2, 1 <=> 2, $a ?? $b ?? $c;",
    "<?php html <?php ?> mid ?> tail",
    "<?php ) ] } garbage ;; @ $x++;",
    "<?php class { public ) function () { if ( { ",
    "<?php \"unterminated $x",
    "<?php $a < $b < $c;",
    "<?php abstract ; final class F {}",
    "<?php list(, $a, 2 => $b) = $c; [$d, [1, 2][0]];",
    "<?php static $cnt = 0; static::boot(); static function_like();",
    "<?php print isset($a[1]{2}) ? clone $x : new \\Y\\Z(...$args);",
];

fn parents_are_consistent(tree: &ParseTree) {
    assert!(tree.arena.parent(tree.root).is_none(), "root has a parent");
    let mut seen: HashSet<u32> = HashSet::new();
    let mut stack = vec![tree.root];
    while let Some(index) = stack.pop() {
        assert!(
            seen.insert(index.0),
            "node {index:?} reachable through two parents"
        );
        let mut kids: Vec<NodeIndex> = Vec::new();
        tree.arena.get(index).for_each_child(&mut |c| {
            if let Child::Node(n) = c {
                kids.push(n);
            }
        });
        for kid in kids {
            assert_eq!(
                tree.arena.parent(kid),
                index,
                "child {kid:?} does not point back at its parent"
            );
            stack.push(kid);
        }
    }
}

#[test]
fn round_trip_reproduces_every_source_exactly() {
    for source in CORPUS {
        let tree = parse_source_file(source);
        assert_eq!(
            tree.reconstructed_text(),
            *source,
            "round trip failed for {source:?}"
        );
    }
}

#[test]
fn every_node_points_back_at_its_parent() {
    for source in CORPUS {
        let tree = parse_source_file(source);
        parents_are_consistent(&tree);
    }
}

#[test]
fn real_tokens_tile_the_input_without_loss_or_overlap() {
    for source in CORPUS {
        let tree = parse_source_file(source);
        let mut offset = 0u32;
        for token in tree.tokens() {
            if token.is_missing() {
                assert_eq!(token.length, 0, "missing token with width in {source:?}");
                continue;
            }
            assert_eq!(
                token.full_start, offset,
                "gap or overlap before {:?} in {source:?}",
                token.kind
            );
            offset = token.end();
        }
        assert_eq!(offset as usize, source.len(), "uncovered tail in {source:?}");
    }
}

#[test]
fn node_count_is_linear_in_token_count() {
    for source in CORPUS {
        let tree = parse_source_file(source);
        let token_count = tree.tokens().len();
        assert!(
            tree.arena.len() <= 4 * token_count + 8,
            "node count {} not linear in token count {} for {source:?}",
            tree.arena.len(),
            token_count
        );
    }
}

#[test]
fn forced_expression_parsing_always_advances() {
    // `do ]` puts the statement parser at a token no expression can start;
    // the forced parse wraps it as skipped and moves on instead of spinning.
    let tree = parse_source_file("<?php do ] while ($a); do ) while ($b);");
    let mut forced = 0;
    for index in 0..tree.arena.len() {
        if let NodeData::ExpressionStatement(n) = tree.arena.get(NodeIndex(index as u32)) {
            if n.skipped.is_some_and(|t| t.is_skipped()) {
                forced += 1;
            }
        }
    }
    assert_eq!(forced, 2);
    assert_eq!(
        tree.reconstructed_text(),
        "<?php do ] while ($a); do ) while ($b);"
    );
}

#[test]
fn missing_tokens_never_shift_downstream_offsets() {
    let source = "<?php if ($a { $b; }";
    let tree = parse_source_file(source);
    // Every real token's extent must be untouched by the synthesized ones.
    let real: Vec<_> = tree.tokens().into_iter().filter(|t| !t.is_missing()).collect();
    let mut offset = 0u32;
    for token in real {
        assert_eq!(token.full_start, offset);
        offset = token.end();
    }
    assert_eq!(offset as usize, source.len());
}

#[test]
fn deep_nesting_terminates() {
    let mut source = String::from("<?php ");
    for _ in 0..200 {
        source.push_str("if ($x) { ");
    }
    let tree = parse_source_file(&source);
    assert_eq!(tree.reconstructed_text(), source);
    parents_are_consistent(&tree);
}

#[test]
fn root_is_always_a_source_file_with_an_eof_token() {
    for source in CORPUS {
        let tree = parse_source_file(source);
        assert_eq!(tree.arena.kind(tree.root), NodeKind::SourceFile);
        let NodeData::SourceFile(file) = tree.root_node() else {
            unreachable!();
        };
        assert_eq!(file.end_of_file.kind, phz::TokenKind::EndOfFile);
        assert_eq!(file.end_of_file.end() as usize, source.len());
    }
}
