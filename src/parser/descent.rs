// Copyright 2024 MiniPy Analyzer Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recursive descent parser for MiniPy statements
//!
//! Precedence, lowest first:
//! 1. Comparison: `== != < > <= >=` (non-associative, at most one)
//! 2. Arithmetic: `+ -` (left-associative)
//! 3. Term: `* / %` (left-associative)
//! 4. Factor: number, string, name, call, parenthesized expression
//!
//! Errors never stop the parser. A failing construct records a diagnostic and
//! yields `None`; the enclosing construct drops it. The top level always makes
//! progress, so every input produces a `Program` root.

use serde::{Deserialize, Serialize};

use super::error::ParseDiagnostic;
use super::structure::run_structural_checks;
use super::tokenizer::{Token, TokenKind};
use crate::ast::{AstNode, NodeKind};

/// Deepest tree the parser builds
///
/// Nested statements and sub-expressions each take one level for as long as
/// they are being parsed. An operator chain counts its own height on top of
/// the level it starts at.
pub const MAX_NESTING_DEPTH: usize = 256;

const COMPARISON_OPERATORS: &[&str] = &["==", "!=", "<", ">", "<=", ">="];
const ARITHMETIC_OPERATORS: &[&str] = &["+", "-"];
const TERM_OPERATORS: &[&str] = &["*", "/", "%"];

/// Output of the syntactic stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxReport {
    /// True iff no diagnostics were recorded
    pub valid: bool,
    /// Rendered diagnostics in the order they were found
    pub errors: Vec<String>,
    /// Program root, present even for invalid input
    pub ast: AstNode,
}

/// Parser over the significant tokens of a snippet
pub struct Parser<'t> {
    tokens: Vec<&'t Token>,
    pos: usize,
    depth: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<'t> Parser<'t> {
    /// Create a parser; newline and comment tokens are dropped here
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens: tokens.iter().filter(|token| !token.is_trivia()).collect(),
            pos: 0,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Run the pre-checks and parse the whole stream
    pub fn parse_program(mut self) -> (AstNode, Vec<ParseDiagnostic>) {
        if self.tokens.is_empty() {
            return (AstNode::program(Vec::new()), vec![ParseDiagnostic::NoTokens]);
        }

        self.diagnostics = run_structural_checks(&self.tokens);

        let mut statements = Vec::new();
        while self.pos < self.tokens.len() {
            let start = self.pos;
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            if self.pos == start {
                // Nothing consumed: skip the offending token
                self.pos += 1;
            }
        }

        (AstNode::program(statements), self.diagnostics)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        self.peek().is_some_and(|token| token.is_symbol(symbol))
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|token| token.is_keyword(keyword))
    }

    /// Consume the current token if it is one of `operators`
    fn eat_operator(&mut self, operators: &[&str]) -> Option<&'t Token> {
        let token = self.peek()?;
        if token.kind == TokenKind::Operator && operators.contains(&token.text.as_str()) {
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn current_line(&self) -> u32 {
        self.peek()
            .or_else(|| self.tokens.last().copied())
            .map_or(1, |token| token.line)
    }

    fn report(&mut self, diagnostic: ParseDiagnostic) {
        log::trace!("parse diagnostic: {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Require a token matching `accept`; does not advance on mismatch
    fn expect(&mut self, accept: impl Fn(&Token) -> bool, expected: &str) -> Option<&'t Token> {
        match self.peek() {
            Some(token) if accept(token) => {
                self.pos += 1;
                Some(token)
            }
            Some(token) => {
                self.report(ParseDiagnostic::ExpectedToken {
                    expected: expected.to_string(),
                    line: token.line,
                    found: token.text.clone(),
                });
                None
            }
            None => {
                self.report(ParseDiagnostic::ExpectedAtEnd {
                    expected: expected.to_string(),
                });
                None
            }
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Option<&'t Token> {
        self.expect(|token| token.is_symbol(symbol), &format!("'{symbol}'"))
    }

    fn expect_identifier(&mut self, what: &str) -> Option<&'t Token> {
        self.expect(|token| token.kind == TokenKind::Identifier, what)
    }

    /// Enter one nesting level; the caller restores `depth` when done
    fn charge(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            let line = self.current_line();
            self.report(ParseDiagnostic::NestingTooDeep { line });
            false
        } else {
            self.depth += 1;
            true
        }
    }

    fn parse_statement(&mut self) -> Option<AstNode> {
        let saved = self.depth;
        let statement = if self.charge() {
            self.parse_statement_inner()
        } else {
            None
        };
        self.depth = saved;
        statement
    }

    fn parse_statement_inner(&mut self) -> Option<AstNode> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Keyword if token.text == "def" => self.parse_function_def(),
            TokenKind::Keyword if token.text == "if" => self.parse_if(),
            TokenKind::Keyword if token.text == "return" => self.parse_return(),
            TokenKind::Identifier
                if self
                    .peek_at(1)
                    .is_some_and(|next| next.is(TokenKind::Operator, "=")) =>
            {
                self.parse_assignment()
            }
            _ => self.parse_expression(),
        }
    }

    /// Parse statements into `body` until `stop` matches, the input ends, or a
    /// statement fails
    fn parse_block(&mut self, body: &mut Vec<AstNode>, stop: impl Fn(&Token) -> bool) {
        while let Some(token) = self.peek() {
            if stop(token) {
                break;
            }
            let start = self.pos;
            match self.parse_statement() {
                Some(statement) => {
                    debug_assert!(self.pos > start, "statement parsed without consuming input");
                    body.push(statement);
                }
                None => break,
            }
        }
    }

    fn parse_function_def(&mut self) -> Option<AstNode> {
        self.advance()?;
        let name = self.expect_identifier("function name")?;
        self.expect_symbol("(")?;

        let mut children = Vec::new();
        if self.peek().is_some() && !self.at_symbol(")") {
            if let Some(param) = self.expect_identifier("parameter name") {
                children.push(AstNode::new(NodeKind::Parameter, &param.text, param.line));
            }
            while self.at_symbol(",") {
                self.advance();
                if let Some(param) = self.expect_identifier("parameter name") {
                    children.push(AstNode::new(NodeKind::Parameter, &param.text, param.line));
                }
            }
        }

        self.expect_symbol(")")?;
        self.expect_symbol(":")?;
        self.parse_block(&mut children, |token| token.is_keyword("def"));

        Some(AstNode::new(NodeKind::FunctionDef, &name.text, name.line).with_children(children))
    }

    fn parse_if(&mut self) -> Option<AstNode> {
        let keyword = self.advance()?;
        let condition = self.parse_expression()?;
        self.expect_symbol(":")?;

        let mut children = vec![condition];
        self.parse_block(&mut children, |token| {
            token.is_keyword("else") || token.is_keyword("def")
        });

        if self.at_keyword("else") {
            self.advance();
            self.expect_symbol(":")?;
            self.parse_block(&mut children, |token| token.is_keyword("def"));
        }

        Some(AstNode::new(NodeKind::IfStatement, "", keyword.line).with_children(children))
    }

    fn parse_return(&mut self) -> Option<AstNode> {
        let keyword = self.advance()?;
        let mut node = AstNode::new(NodeKind::ReturnStatement, "", keyword.line);
        if self
            .peek()
            .is_some_and(|token| token.kind != TokenKind::Keyword)
        {
            node.children.push(self.parse_expression()?);
        }
        Some(node)
    }

    fn parse_assignment(&mut self) -> Option<AstNode> {
        let name = self.advance()?;
        self.advance()?;
        let value = self.parse_expression()?;
        Some(AstNode::new(NodeKind::Assignment, &name.text, name.line).with_children(vec![value]))
    }

    fn parse_expression(&mut self) -> Option<AstNode> {
        let saved = self.depth;
        let expression = if self.charge() {
            self.parse_comparison()
        } else {
            None
        };
        self.depth = saved;
        expression
    }

    fn parse_comparison(&mut self) -> Option<AstNode> {
        let left = self.parse_arithmetic()?;
        match self.eat_operator(COMPARISON_OPERATORS) {
            Some(operator) => {
                let right = self.parse_arithmetic()?;
                Some(AstNode::binary(&operator.text, operator.line, left, right))
            }
            None => Some(left),
        }
    }

    fn parse_arithmetic(&mut self) -> Option<AstNode> {
        self.parse_left_assoc(ARITHMETIC_OPERATORS, Self::parse_term)
    }

    fn parse_term(&mut self) -> Option<AstNode> {
        self.parse_left_assoc(TERM_OPERATORS, Self::parse_factor)
    }

    fn parse_left_assoc(
        &mut self,
        operators: &[&str],
        operand: fn(&mut Self) -> Option<AstNode>,
    ) -> Option<AstNode> {
        let mut left = operand(self)?;
        let mut height = None;
        while let Some(operator) = self.eat_operator(operators) {
            let right = operand(self)?;
            let below = height.unwrap_or_else(|| left.height()).max(right.height());
            if self.depth + below + 1 > MAX_NESTING_DEPTH {
                self.report(ParseDiagnostic::NestingTooDeep {
                    line: operator.line,
                });
                return None;
            }
            height = Some(below + 1);
            left = AstNode::binary(&operator.text, operator.line, left, right);
        }
        Some(left)
    }

    fn parse_factor(&mut self) -> Option<AstNode> {
        let Some(token) = self.peek() else {
            self.report(ParseDiagnostic::ExpectedAtEnd {
                expected: "expression".to_string(),
            });
            return None;
        };

        match token.kind {
            TokenKind::Number => {
                self.advance();
                Some(AstNode::new(NodeKind::Number, &token.text, token.line))
            }
            TokenKind::String => {
                self.advance();
                Some(AstNode::new(NodeKind::String, &token.text, token.line))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.at_symbol("(") {
                    self.parse_call(token)
                } else {
                    Some(AstNode::new(NodeKind::Identifier, &token.text, token.line))
                }
            }
            // `print` is reserved but still callable
            TokenKind::Keyword
                if token.text == "print"
                    && self.peek_at(1).is_some_and(|next| next.is_symbol("(")) =>
            {
                self.advance();
                self.parse_call(token)
            }
            TokenKind::Symbol if token.text == "(" => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_symbol(")")?;
                Some(inner)
            }
            _ => {
                self.report(ParseDiagnostic::UnexpectedToken {
                    found: token.text.clone(),
                    line: token.line,
                });
                None
            }
        }
    }

    /// Arguments of a call whose callee has been consumed; positioned at `(`
    fn parse_call(&mut self, callee: &'t Token) -> Option<AstNode> {
        self.advance()?;
        let mut arguments = Vec::new();
        if self.peek().is_some() && !self.at_symbol(")") {
            arguments.push(self.parse_expression()?);
            while self.at_symbol(",") {
                self.advance();
                arguments.push(self.parse_expression()?);
            }
        }
        self.expect_symbol(")")?;
        let call = AstNode::new(NodeKind::FunctionCall, &callee.text, callee.line);
        Some(call.with_children(arguments))
    }
}

/// Parse a token stream into a syntax report
pub fn parse(tokens: &[Token]) -> SyntaxReport {
    let (ast, diagnostics) = Parser::new(tokens).parse_program();
    let errors: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    log::debug!(
        "parsed {} top-level statements with {} diagnostics",
        ast.children.len(),
        errors.len()
    );
    SyntaxReport {
        valid: errors.is_empty(),
        errors,
        ast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::tokenize;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse_source(source: &str) -> SyntaxReport {
        parse(&tokenize(source).tokens)
    }

    fn ident(name: &str, line: u32) -> AstNode {
        AstNode::new(NodeKind::Identifier, name, line)
    }

    fn number(text: &str, line: u32) -> AstNode {
        AstNode::new(NodeKind::Number, text, line)
    }

    #[test]
    fn test_assignment() {
        let report = parse_source("x = 1");
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(
            report.ast,
            AstNode::program(vec![
                AstNode::new(NodeKind::Assignment, "x", 1).with_children(vec![number("1", 1)])
            ])
        );
    }

    #[test]
    fn test_term_binds_tighter_than_arithmetic() {
        let report = parse_source("a + b * c");
        assert!(report.valid);
        let expected = AstNode::binary(
            "+",
            1,
            ident("a", 1),
            AstNode::binary("*", 1, ident("b", 1), ident("c", 1)),
        );
        assert_eq!(report.ast.children, vec![expected]);
    }

    #[test]
    fn test_arithmetic_is_left_associative() {
        let report = parse_source("a - b - c");
        let expected = AstNode::binary(
            "-",
            1,
            AstNode::binary("-", 1, ident("a", 1), ident("b", 1)),
            ident("c", 1),
        );
        assert_eq!(report.ast.children, vec![expected]);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let report = parse_source("(a + b) * c");
        let expected = AstNode::binary(
            "*",
            1,
            AstNode::binary("+", 1, ident("a", 1), ident("b", 1)),
            ident("c", 1),
        );
        assert_eq!(report.ast.children, vec![expected]);
    }

    #[rstest]
    #[case("==")]
    #[case("!=")]
    #[case("<")]
    #[case(">")]
    #[case("<=")]
    #[case(">=")]
    fn test_comparison_operators(#[case] operator: &str) {
        let report = parse_source(&format!("a {operator} b + 1"));
        assert!(report.valid);
        let root = &report.ast.children[0];
        assert_eq!(root.kind, NodeKind::BinaryOp);
        assert_eq!(root.value, operator);
        assert_eq!(root.children[1].value, "+");
    }

    #[test]
    fn test_function_definition() {
        let report = parse_source("def add(a, b):\n    return a + b\n");
        assert!(report.valid, "{:?}", report.errors);
        let def = &report.ast.children[0];
        assert_eq!(def.kind, NodeKind::FunctionDef);
        assert_eq!(def.value, "add");
        assert_eq!(def.parameter_names(), vec!["a", "b"]);
        let ret = &def.children[2];
        assert_eq!(ret.kind, NodeKind::ReturnStatement);
        assert_eq!(ret.line, 2);
        assert_eq!(ret.children[0].value, "+");
    }

    #[test]
    fn test_function_without_parameters() {
        let report = parse_source("def f():\n    return 1");
        assert!(report.valid);
        assert!(report.ast.children[0].parameter_names().is_empty());
    }

    #[test]
    fn test_function_body_ends_at_next_def() {
        let report = parse_source("def f():\n  x = 1\ndef g():\n  y = 2\n");
        assert!(report.valid);
        assert_eq!(report.ast.children.len(), 2);
        assert_eq!(report.ast.children[0].children.len(), 1);
        assert_eq!(report.ast.children[1].value, "g");
    }

    #[test]
    fn test_if_else() {
        let report = parse_source("if n <= 1:\n  return 1\nelse:\n  return n * 2\n");
        assert!(report.valid, "{:?}", report.errors);
        let node = &report.ast.children[0];
        assert_eq!(node.kind, NodeKind::IfStatement);
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.children[0].value, "<=");
        assert!(node.children[1].is(NodeKind::ReturnStatement));
        assert!(node.children[2].is(NodeKind::ReturnStatement));
    }

    #[test]
    fn test_bare_return() {
        let report = parse_source("def f():\n  return\n");
        assert!(report.valid);
        let ret = &report.ast.children[0].children[0];
        assert!(ret.children.is_empty());
    }

    #[test]
    fn test_calls() {
        let report = parse_source("print(f(1, x), 'hi')\ng()");
        assert!(report.valid, "{:?}", report.errors);
        let print = &report.ast.children[0];
        assert_eq!(print.kind, NodeKind::FunctionCall);
        assert_eq!(print.value, "print");
        assert_eq!(print.children.len(), 2);
        assert_eq!(print.children[0].children.len(), 2);
        assert_eq!(print.children[1].kind, NodeKind::String);
        assert!(report.ast.children[1].children.is_empty());
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let report = parse_source("# header\n\nx = 1 # trailing\n\n");
        assert!(report.valid);
        assert_eq!(report.ast.children.len(), 1);
        assert_eq!(report.ast.children[0].line, 3);
    }

    #[test]
    fn test_empty_input() {
        let report = parse_source("  \n# only a comment\n");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["no tokens to analyze"]);
        assert_eq!(report.ast, AstNode::program(Vec::new()));
    }

    #[test]
    fn test_missing_operand_at_end() {
        let report = parse_source("x = 1 +");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["expected expression, found end of input"]);
        assert!(report.ast.children.is_empty());
    }

    #[test]
    fn test_unexpected_token_is_skipped() {
        let report = parse_source(") x = 1");
        assert!(!report.valid);
        assert!(
            report
                .errors
                .contains(&"unexpected token ')' at line 1".to_string())
        );
        assert_eq!(report.ast.children.len(), 1);
        assert_eq!(report.ast.children[0].kind, NodeKind::Assignment);
    }

    #[test]
    fn test_truncated_definition_still_yields_program() {
        let report = parse_source("def f(:");
        assert!(!report.valid);
        assert_eq!(report.ast.kind, NodeKind::Program);
        assert!(
            report
                .errors
                .contains(&"expected parameter name at line 1, found ':'".to_string())
        );
    }

    #[test]
    fn test_deep_parentheses_are_bounded() {
        let depth = MAX_NESTING_DEPTH + 10;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let report = parse_source(&source);
        assert!(!report.valid);
        assert!(
            report
                .errors
                .iter()
                .any(|error| error == "expression nesting too deep at line 1")
        );
    }

    #[test]
    fn test_long_operator_chain_is_bounded() {
        let source = vec!["1"; MAX_NESTING_DEPTH + 5].join(" + ");
        let report = parse_source(&source);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|error| error.contains("too deep")));
    }

    #[test]
    fn test_moderate_chain_is_accepted() {
        let source = vec!["1"; 50].join(" * ");
        assert!(parse_source(&source).valid);
    }

    #[test]
    fn test_wide_calls_are_not_deep() {
        let nested = format!("print({})", vec!["f(1)"; 130].join(", "));
        let report = parse_source(&nested);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.ast.children[0].children.len(), 130);

        let flat = format!("print({})", vec!["1"; 300].join(", "));
        assert!(parse_source(&flat).valid);
    }

    #[test]
    fn test_chains_in_sibling_arguments_do_not_add_up() {
        let chain = vec!["1"; 200].join(" + ");
        let report = parse_source(&format!("f({chain}, {chain})"));
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_parenthesized_chain_counts_toward_outer_chain() {
        let inner = vec!["1"; 200].join(" + ");
        let outer = vec!["1"; 100].join(" + ");
        let report = parse_source(&format!("({inner}) + {outer}"));
        assert!(!report.valid);
        assert!(report.errors.iter().any(|error| error.contains("too deep")));
    }

    #[test]
    fn test_garbage_terminates() {
        let report = parse_source("@ $ ? : , ] ] else else def");
        assert!(!report.valid);
        assert_eq!(report.ast.kind, NodeKind::Program);
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = parse_source("x = 1");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["errors"], serde_json::json!([]));
        assert_eq!(value["ast"]["type"], "Program");
        assert_eq!(value["ast"]["children"][0]["type"], "Assignment");
    }
}
