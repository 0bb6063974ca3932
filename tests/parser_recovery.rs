//! Parser behavior on malformed input
//!
//! Whatever the input, parsing terminates with a `Program` root.

use minipy_analyzer::parser::MAX_NESTING_DEPTH;
use minipy_analyzer::{AstNode, NodeKind, parse, tokenize};
use rstest::rstest;

fn parse_source(source: &str) -> minipy_analyzer::SyntaxReport {
    parse(&tokenize(source).tokens)
}

#[rstest]
#[case("def")]
#[case("def f")]
#[case("def f(")]
#[case("def f(a,")]
#[case("def f(a b):")]
#[case("if")]
#[case("if x")]
#[case("if x:\nelse")]
#[case("return (")]
#[case("x = = 1")]
#[case("))))")]
#[case("(((((")]
#[case("print(1,,2)")]
#[case("else: else: else:")]
#[case(": : :")]
#[case("x = 1 2 3 +")]
fn test_malformed_input_terminates(#[case] source: &str) {
    let report = parse_source(source);
    assert!(!report.valid, "{source:?} should be invalid");
    assert!(!report.errors.is_empty());
    assert_eq!(report.ast.kind, NodeKind::Program);
}

#[test]
fn test_statements_after_error_are_kept() {
    let report = parse_source("x = )\ny = 2\n");
    assert!(!report.valid);
    let names: Vec<&str> = report
        .ast
        .children_of_kind(NodeKind::Assignment)
        .map(|node| node.value.as_str())
        .collect();
    assert_eq!(names, vec!["y"]);
}

#[test]
fn test_failed_body_statement_ends_the_body() {
    let report = parse_source("def f():\n  x = 1\n  y = )\n  z = 3\n");
    assert!(!report.valid);
    let def = &report.ast.children[0];
    assert_eq!(def.kind, NodeKind::FunctionDef);
    assert_eq!(def.children.len(), 1);
    // The statements after the failure are picked up at the top level
    assert!(
        report
            .ast
            .children_of_kind(NodeKind::Assignment)
            .any(|node| node.value == "z")
    );
}

#[test]
fn test_deeply_nested_input_is_rejected_without_overflow() {
    let depth = MAX_NESTING_DEPTH * 4;
    let source = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
    let report = parse_source(&source);
    assert!(!report.valid);
    assert!(
        report
            .errors
            .iter()
            .any(|error| error.starts_with("expression nesting too deep"))
    );
}

#[test]
fn test_nested_if_inside_function() {
    let source = "\
def f(n):
  if n > 0:
    if n > 1:
      return 2
    return 1
  else:
    return 0
";
    let report = parse_source(source);
    assert!(report.valid, "{:?}", report.errors);
    let def = &report.ast.children[0];
    let outer = def.children_of_kind(NodeKind::IfStatement).next().unwrap();
    let inner = outer.children_of_kind(NodeKind::IfStatement).next().unwrap();
    // Indentation is not significant: the innermost open `if` takes the `else`
    assert_eq!(outer.children.len(), 2);
    assert_eq!(inner.children.len(), 4);
}

#[test]
fn test_every_node_has_a_line() {
    let report = parse_source("a = 1\nb = a * (2 + 3)\nprint(b)\n");
    assert!(report.valid);
    assert!(report.ast.descendants().all(|node: &AstNode| node.line >= 1));
}
