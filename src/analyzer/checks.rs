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

//! The semantic check battery
//!
//! Checks run in a fixed order over the raw token stream and the symbol table.
//! Token neighbours are looked up by index, skipping newlines and comments.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::AnalyzerConfig;
use super::symbol_table::{SymbolKind, SymbolTable, is_builtin};
use crate::parser::tokenizer::{Token, TokenKind};

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// What was verified
    pub description: String,
    /// Whether it held
    pub passed: bool,
    /// Line the check refers to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl CheckRecord {
    /// Create a record without a line
    pub fn new(description: impl Into<String>, passed: bool) -> Self {
        Self {
            description: description.into(),
            passed,
            line: None,
        }
    }

    /// Attach a line when one is known
    pub fn at_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }
}

/// Index-based queries over the raw token stream
#[derive(Debug, Clone, Copy)]
pub struct TokenView<'a> {
    tokens: &'a [Token],
}

impl<'a> TokenView<'a> {
    /// Wrap a token stream
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    /// Nearest non-trivia token before `index`
    pub fn previous(&self, index: usize) -> Option<&'a Token> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|token| !token.is_trivia())
    }

    /// Position of the nearest non-trivia token after `index`
    pub fn next_index(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&next| !self.tokens[next].is_trivia())
    }

    /// Nearest non-trivia token after `index`
    pub fn next(&self, index: usize) -> Option<&'a Token> {
        self.next_index(index).map(|next| &self.tokens[next])
    }

    /// Identifier tokens spelled `name`, with their positions
    pub fn identifiers(&self, name: &'a str) -> impl Iterator<Item = (usize, &'a Token)> + 'a {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(_, token)| token.kind == TokenKind::Identifier && token.text == name)
    }

    /// Whether the token at `index` is the name in a `def`
    pub fn follows_def(&self, index: usize) -> bool {
        self.previous(index).is_some_and(|token| token.is_keyword("def"))
    }

    /// Whether the token at `index` is followed by `(`
    pub fn opens_call(&self, index: usize) -> bool {
        self.next(index).is_some_and(|token| token.is_symbol("("))
    }

    /// Whether the token at `index` is an assignment target
    pub fn is_assigned(&self, index: usize) -> bool {
        self.next(index)
            .is_some_and(|token| token.is(TokenKind::Operator, "="))
    }

    /// Positions of identifiers inside `def NAME ( ... )` parameter lists
    pub fn parameter_positions(&self) -> FxHashSet<usize> {
        let mut positions = FxHashSet::default();
        for (index, token) in self.tokens.iter().enumerate() {
            if !token.is_keyword("def") {
                continue;
            }
            let Some(name) = self.next_index(index) else {
                continue;
            };
            let Some(open) = self.next_index(name).filter(|&open| self.tokens[open].is_symbol("("))
            else {
                continue;
            };
            for (offset, inner) in self.tokens[open + 1..].iter().enumerate() {
                if inner.is_symbol(")") || inner.is_symbol(":") {
                    break;
                }
                if inner.kind == TokenKind::Identifier {
                    positions.insert(open + 1 + offset);
                }
            }
        }
        positions
    }

    /// Every token with its position
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Token)> + 'a {
        self.tokens.iter().enumerate()
    }
}

/// Inputs shared by every check
pub struct CheckContext<'a> {
    /// Raw token stream
    pub tokens: TokenView<'a>,
    /// Symbol table built from the AST
    pub table: &'a SymbolTable,
    /// Distinguished names
    pub config: &'a AnalyzerConfig,
}

/// Accumulated results of the battery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutput {
    /// One record per check, in battery order
    pub checks: Vec<CheckRecord>,
    /// Informational findings
    pub warnings: Vec<String>,
    /// Findings that make the analysis invalid
    pub errors: Vec<String>,
}

/// One check of the battery
pub trait SemanticCheck {
    /// Short identifier for logging
    fn name(&self) -> &'static str;

    /// Run the check, appending to `output`
    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput);
}

/// The distinguished function is defined before any use
///
/// The only check that can append a hard error.
pub struct DefinedBeforeUse;

impl SemanticCheck for DefinedBeforeUse {
    fn name(&self) -> &'static str {
        "defined-before-use"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let name = ctx.config.target_function.as_str();
        let definition = ctx.table.lookup_kind(name, SymbolKind::Function);
        let uses: Vec<u32> = ctx
            .tokens
            .identifiers(name)
            .filter(|(index, _)| !ctx.tokens.follows_def(*index))
            .map(|(_, token)| token.line)
            .collect();

        let error = match (uses.first(), definition) {
            (None, _) => None,
            (Some(_), None) => Some(format!("function '{name}' used without definition")),
            (Some(_), Some(symbol)) => uses.iter().find(|&&line| line <= symbol.line).map(|line| {
                format!(
                    "function '{name}' used at line {line} before its definition at line {}",
                    symbol.line
                )
            }),
        };

        output.checks.push(
            CheckRecord::new(format!("function '{name}' is defined before use"), error.is_none())
                .at_line(definition.map(|symbol| symbol.line)),
        );
        output.errors.extend(error);
    }
}

/// Names read earlier in the token stream than their first assignment
pub struct UsageOrder;

impl SemanticCheck for UsageOrder {
    fn name(&self) -> &'static str {
        "usage-order"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let mut first_assignment: FxHashMap<&str, (usize, u32)> = FxHashMap::default();
        for (index, token) in ctx.tokens.iter() {
            if token.kind == TokenKind::Identifier && ctx.tokens.is_assigned(index) {
                first_assignment
                    .entry(token.text.as_str())
                    .or_insert((index, token.line));
            }
        }

        for (index, token) in ctx.tokens.iter() {
            if token.kind != TokenKind::Identifier || ctx.tokens.is_assigned(index) {
                continue;
            }
            let exempt = is_builtin(&token.text)
                || ctx.table.lookup(&token.text).is_some_and(|symbol| {
                    matches!(symbol.kind, SymbolKind::Parameter | SymbolKind::Function)
                });
            if exempt {
                continue;
            }
            if let Some(&(assigned_at, assigned_line)) = first_assignment.get(token.text.as_str()) {
                if assigned_at > index {
                    output.warnings.push(format!(
                        "variable '{}' used at line {} before its assignment at line {}",
                        token.text, token.line, assigned_line
                    ));
                }
            }
        }
    }
}

/// The tracked parameter, when declared, is read somewhere
pub struct ParameterUsage;

impl SemanticCheck for ParameterUsage {
    fn name(&self) -> &'static str {
        "parameter-usage"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let name = ctx.config.tracked_parameter.as_str();
        let parameter = ctx.table.lookup_kind(name, SymbolKind::Parameter);
        let declarations = ctx.tokens.parameter_positions();
        let used = ctx
            .tokens
            .identifiers(name)
            .any(|(index, _)| !declarations.contains(&index));

        output.checks.push(
            CheckRecord::new(
                format!("parameter '{name}' is used correctly"),
                parameter.is_none() || used,
            )
            .at_line(parameter.map(|symbol| symbol.line)),
        );
    }
}

/// Every call of the builtin passes at least one argument
pub struct CallArguments;

impl SemanticCheck for CallArguments {
    fn name(&self) -> &'static str {
        "call-arguments"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let builtin = ctx.config.call_builtin.as_str();
        let mut invocations = 0;
        let mut first_empty = None;

        for (index, token) in ctx.tokens.iter() {
            let callee = matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword)
                && token.text == builtin;
            if !callee {
                continue;
            }
            let Some(open) = ctx.tokens.next_index(index) else {
                continue;
            };
            if !ctx.tokens.opens_call(index) {
                continue;
            }
            invocations += 1;
            let has_arguments = ctx.tokens.next(open).is_some_and(|token| !token.is_symbol(")"));
            if !has_arguments && first_empty.is_none() {
                first_empty = Some(token.line);
            }
        }

        output.checks.push(
            CheckRecord::new(
                format!("'{builtin}' receives arguments"),
                invocations > 0 && first_empty.is_none(),
            )
            .at_line(first_empty),
        );
    }
}

/// The distinguished function is called somewhere
pub struct RecursiveCall;

impl SemanticCheck for RecursiveCall {
    fn name(&self) -> &'static str {
        "recursive-call"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let name = ctx.config.target_function.as_str();
        let call = ctx
            .tokens
            .identifiers(name)
            .find(|(index, _)| !ctx.tokens.follows_def(*index) && ctx.tokens.opens_call(*index));

        output.checks.push(
            CheckRecord::new(format!("recursive call to '{name}' detected"), call.is_some())
                .at_line(call.map(|(_, token)| token.line)),
        );
    }
}

/// No name is declared twice in one scope path
///
/// Repeated assignments to a variable count as one declaration; each
/// parameter counts on its own.
pub struct ScopeCollision;

impl SemanticCheck for ScopeCollision {
    fn name(&self) -> &'static str {
        "scope-collision"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        #[derive(Default)]
        struct Declarations {
            parameters: usize,
            assigned: bool,
        }

        let mut groups: IndexMap<(&str, &str), Declarations> = IndexMap::new();
        for symbol in ctx.table.definitions() {
            let entry = groups
                .entry((symbol.name.as_str(), symbol.scope.as_str()))
                .or_default();
            match symbol.kind {
                SymbolKind::Parameter => entry.parameters += 1,
                SymbolKind::Variable => entry.assigned = true,
                SymbolKind::Function => {}
            }
        }

        let mut reported: FxHashSet<&str> = FxHashSet::default();
        let mut collisions = Vec::new();
        for (&(name, scope), declarations) in &groups {
            let count = declarations.parameters + usize::from(declarations.assigned);
            if count > 1 && reported.insert(name) {
                collisions.push(format!(
                    "variable '{name}' defined multiple times in scope '{scope}'"
                ));
            }
        }

        output.checks.push(CheckRecord::new(
            "variables have correct scope (no collisions)",
            collisions.is_empty(),
        ));
        output.warnings.extend(collisions);
    }
}

/// The two paired names, when both defined, live in different scopes
pub struct ScopeSeparation;

impl SemanticCheck for ScopeSeparation {
    fn name(&self) -> &'static str {
        "scope-separation"
    }

    fn run(&self, ctx: &CheckContext<'_>, output: &mut CheckOutput) {
        let (first, second) = (&ctx.config.scope_pair.0, &ctx.config.scope_pair.1);
        let shared = match (ctx.table.lookup(first), ctx.table.lookup(second)) {
            (Some(a), Some(b)) => a.scope == b.scope,
            _ => false,
        };

        output.checks.push(CheckRecord::new(
            format!("variables '{first}' and '{second}' do not collide (separate scopes)"),
            !shared,
        ));
    }
}

/// Ordered collection of checks
pub struct CheckBattery {
    checks: Vec<Box<dyn SemanticCheck + Send + Sync>>,
}

impl Default for CheckBattery {
    fn default() -> Self {
        Self::standard()
    }
}

impl CheckBattery {
    /// Empty battery
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// The fixed battery, in reporting order
    pub fn standard() -> Self {
        let mut battery = Self::empty();
        battery.register(Box::new(DefinedBeforeUse));
        // Warnings only; runs before the parameter check it accompanies
        battery.register(Box::new(UsageOrder));
        battery.register(Box::new(ParameterUsage));
        battery.register(Box::new(CallArguments));
        battery.register(Box::new(RecursiveCall));
        battery.register(Box::new(ScopeCollision));
        battery.register(Box::new(ScopeSeparation));
        battery
    }

    /// Append a check
    pub fn register(&mut self, check: Box<dyn SemanticCheck + Send + Sync>) {
        self.checks.push(check);
    }

    /// Number of registered checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no checks are registered
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check in order
    pub fn run_all(&self, ctx: &CheckContext<'_>) -> CheckOutput {
        let mut output = CheckOutput::default();
        for check in &self.checks {
            check.run(ctx, &mut output);
            log::trace!("check '{}' done", check.name());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::symbol_table::{Symbol, SymbolCollector};
    use crate::parser::{parse, tokenize};
    use pretty_assertions::assert_eq;

    struct Fixture {
        tokens: Vec<Token>,
        table: SymbolTable,
    }

    impl Fixture {
        fn new(source: &str) -> Self {
            let tokens = tokenize(source).tokens;
            let (table, _) = SymbolCollector::collect(&parse(&tokens).ast);
            Self { tokens, table }
        }

        fn run(&self, check: &dyn SemanticCheck, config: &AnalyzerConfig) -> CheckOutput {
            let ctx = CheckContext {
                tokens: TokenView::new(&self.tokens),
                table: &self.table,
                config,
            };
            let mut output = CheckOutput::default();
            check.run(&ctx, &mut output);
            output
        }
    }

    fn config_for(function: &str) -> AnalyzerConfig {
        AnalyzerConfig {
            target_function: function.to_string(),
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_token_view_skips_trivia() {
        let tokens = tokenize("def # name follows\n  f(n)").tokens;
        let view = TokenView::new(&tokens);
        let (index, _) = view.identifiers("f").next().unwrap();
        assert!(view.follows_def(index));
        assert!(view.opens_call(index));
        assert_eq!(view.previous(0), None);
        assert_eq!(view.next(tokens.len() - 1), None);
    }

    #[test]
    fn test_parameter_positions() {
        let tokens = tokenize("def f(a, b):\n  return a(b)").tokens;
        let view = TokenView::new(&tokens);
        let positions = view.parameter_positions();
        assert_eq!(positions.len(), 2);
        for (index, token) in view.iter() {
            if positions.contains(&index) {
                assert_eq!(token.line, 1);
            }
        }
    }

    #[test]
    fn test_defined_before_use_passes() {
        let fixture = Fixture::new("def foo(n):\n  return n\nfoo(5)\n");
        let output = fixture.run(&DefinedBeforeUse, &config_for("foo"));
        assert_eq!(
            output.checks,
            vec![CheckRecord::new("function 'foo' is defined before use", true).at_line(Some(1))]
        );
        assert!(output.errors.is_empty());
    }

    #[test]
    fn test_use_before_definition_is_a_hard_error() {
        let fixture = Fixture::new("foo(5)\ndef foo(n):\n  return n\n");
        let output = fixture.run(&DefinedBeforeUse, &config_for("foo"));
        assert!(!output.checks[0].passed);
        assert_eq!(
            output.errors,
            vec!["function 'foo' used at line 1 before its definition at line 2"]
        );
    }

    #[test]
    fn test_use_without_definition() {
        let fixture = Fixture::new("x = foo(1)\n");
        let output = fixture.run(&DefinedBeforeUse, &config_for("foo"));
        assert!(!output.checks[0].passed);
        assert_eq!(output.checks[0].line, None);
        assert_eq!(output.errors, vec!["function 'foo' used without definition"]);
    }

    #[test]
    fn test_unused_and_undefined_passes() {
        let fixture = Fixture::new("x = 1\n");
        let output = fixture.run(&DefinedBeforeUse, &AnalyzerConfig::default());
        assert!(output.checks[0].passed);
        assert!(output.errors.is_empty());
    }

    #[test]
    fn test_parameter_usage() {
        let config = AnalyzerConfig::default();
        let used = Fixture::new("def f(n):\n  return n\n").run(&ParameterUsage, &config);
        assert!(used.checks[0].passed);
        assert_eq!(used.checks[0].description, "parameter 'n' is used correctly");

        let unused = Fixture::new("def f(n):\n  return 1\n").run(&ParameterUsage, &config);
        assert!(!unused.checks[0].passed);

        let absent = Fixture::new("x = 1\n").run(&ParameterUsage, &config);
        assert!(absent.checks[0].passed);
    }

    #[test]
    fn test_usage_order_warning() {
        let fixture = Fixture::new("print(total)\ntotal = 3\n");
        let output = fixture.run(&UsageOrder, &AnalyzerConfig::default());
        assert_eq!(
            output.warnings,
            vec!["variable 'total' used at line 1 before its assignment at line 2"]
        );
        assert!(output.checks.is_empty());
    }

    #[test]
    fn test_usage_order_exempts_parameters() {
        let fixture = Fixture::new("def f(n):\n  return n\nn2 = f(1)\n");
        let output = fixture.run(&UsageOrder, &AnalyzerConfig::default());
        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
    }

    #[test]
    fn test_call_arguments() {
        let config = AnalyzerConfig::default();
        let with_args = Fixture::new("print(1)\nprint('a', 2)\n").run(&CallArguments, &config);
        assert!(with_args.checks[0].passed);
        assert_eq!(with_args.checks[0].description, "'print' receives arguments");

        let empty = Fixture::new("print(1)\nprint()\n").run(&CallArguments, &config);
        assert!(!empty.checks[0].passed);
        assert_eq!(empty.checks[0].line, Some(2));

        let never = Fixture::new("x = 1\n").run(&CallArguments, &config);
        assert!(!never.checks[0].passed);
    }

    #[test]
    fn test_recursive_call() {
        let source = "def fact(n):\n if n == 0:\n  return 1\n return n * fact(n - 1)\n";
        let output = Fixture::new(source).run(&RecursiveCall, &config_for("fact"));
        assert_eq!(
            output.checks,
            vec![CheckRecord::new("recursive call to 'fact' detected", true).at_line(Some(4))]
        );

        let missing =
            Fixture::new("def fact(n):\n  return n\n").run(&RecursiveCall, &config_for("fact"));
        assert!(!missing.checks[0].passed);
    }

    #[test]
    fn test_duplicate_parameters_collide() {
        let output = Fixture::new("def f(a, a):\n  return a\n")
            .run(&ScopeCollision, &AnalyzerConfig::default());
        assert!(!output.checks[0].passed);
        assert_eq!(
            output.warnings,
            vec!["variable 'a' defined multiple times in scope 'global.f'"]
        );
    }

    #[test]
    fn test_reassignment_is_not_a_collision() {
        let output = Fixture::new("x = 1\nx = x + 1\ndef f(x):\n  return x\n")
            .run(&ScopeCollision, &AnalyzerConfig::default());
        assert!(output.checks[0].passed);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_collision_reported_once_per_name() {
        let mut table = SymbolTable::new();
        for line in 1..=3 {
            table.define(Symbol::new("p", SymbolKind::Parameter, "global.g", line));
        }
        let config = AnalyzerConfig::default();
        let ctx = CheckContext {
            tokens: TokenView::new(&[]),
            table: &table,
            config: &config,
        };
        let mut output = CheckOutput::default();
        ScopeCollision.run(&ctx, &mut output);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_scope_separation() {
        let config = AnalyzerConfig::default();
        let separate =
            Fixture::new("x = 1\ndef f(n):\n  return n\n").run(&ScopeSeparation, &config);
        assert_eq!(
            separate.checks,
            vec![CheckRecord::new(
                "variables 'x' and 'n' do not collide (separate scopes)",
                true
            )]
        );

        let shared = Fixture::new("x = 1\nn = 2\n").run(&ScopeSeparation, &config);
        assert!(!shared.checks[0].passed);
    }

    #[test]
    fn test_standard_battery_order() {
        let fixture = Fixture::new("x = 1\n");
        let config = AnalyzerConfig::default();
        let ctx = CheckContext {
            tokens: TokenView::new(&fixture.tokens),
            table: &fixture.table,
            config: &config,
        };
        let output = CheckBattery::standard().run_all(&ctx);
        let descriptions: Vec<&str> = output
            .checks
            .iter()
            .map(|check| check.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "function 'factorial' is defined before use",
                "parameter 'n' is used correctly",
                "'print' receives arguments",
                "recursive call to 'factorial' detected",
                "variables have correct scope (no collisions)",
                "variables 'x' and 'n' do not collide (separate scopes)",
            ]
        );
    }
}
