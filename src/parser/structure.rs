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

//! Structural pre-checks over the token stream
//!
//! Both checks run independently of the grammar and only append diagnostics.
//! They never move the parser.

use super::error::ParseDiagnostic;
use super::tokenizer::{Token, TokenKind};

fn opener_for(closer: &str) -> Option<&'static str> {
    match closer {
        ")" => Some("("),
        "]" => Some("["),
        "}" => Some("{"),
        _ => None,
    }
}

/// Stack-based bracket balance over `( ) [ ] { }`
///
/// Stops at the first closer without a matching opener. Openers still on the
/// stack at the end are reported together in one diagnostic.
pub fn check_bracket_balance<'a>(
    tokens: impl IntoIterator<Item = &'a Token>,
) -> Vec<ParseDiagnostic> {
    let mut stack: Vec<&'a Token> = Vec::new();

    for token in tokens {
        if token.kind != TokenKind::Symbol {
            continue;
        }
        match token.text.as_str() {
            "(" | "[" | "{" => stack.push(token),
            closer @ (")" | "]" | "}") => match stack.pop() {
                None => {
                    return vec![ParseDiagnostic::UnmatchedCloser {
                        bracket: closer.to_string(),
                        line: token.line,
                    }];
                }
                Some(open) if Some(open.text.as_str()) != opener_for(closer) => {
                    return vec![ParseDiagnostic::MismatchedBracket {
                        closer: closer.to_string(),
                        line: token.line,
                        opener: open.text.clone(),
                        opener_line: open.line,
                    }];
                }
                Some(_) => {}
            },
            _ => {}
        }
    }

    match stack.first() {
        None => Vec::new(),
        Some(outermost) => {
            let openers = stack
                .iter()
                .map(|open| format!("'{}' at line {}", open.text, open.line))
                .collect::<Vec<_>>()
                .join(", ");
            vec![ParseDiagnostic::UnclosedBrackets {
                openers,
                line: outermost.line,
            }]
        }
    }
}

/// Shape of every `def`: a name, then `(`, then a `:` somewhere before the
/// next `def` or the end of the stream
pub fn check_function_shapes<'a>(
    tokens: impl IntoIterator<Item = &'a Token>,
) -> Vec<ParseDiagnostic> {
    let tokens: Vec<&Token> = tokens.into_iter().collect();
    let mut diagnostics = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if !token.is_keyword("def") {
            continue;
        }
        let line = token.line;

        if !tokens
            .get(index + 1)
            .is_some_and(|name| name.kind == TokenKind::Identifier)
        {
            diagnostics.push(ParseDiagnostic::MissingFunctionName { line });
            continue;
        }

        if !tokens.get(index + 2).is_some_and(|open| open.is_symbol("(")) {
            diagnostics.push(ParseDiagnostic::MissingParameterList { line });
            continue;
        }

        let has_colon = tokens[index + 2..]
            .iter()
            .take_while(|later| !later.is_keyword("def"))
            .any(|later| later.is_symbol(":"));
        if !has_colon {
            diagnostics.push(ParseDiagnostic::MissingFunctionColon { line });
        }
    }

    diagnostics
}

/// Run both pre-checks in order: brackets, then function shapes
pub fn run_structural_checks(tokens: &[&Token]) -> Vec<ParseDiagnostic> {
    let mut diagnostics = check_bracket_balance(tokens.iter().copied());
    diagnostics.extend(check_function_shapes(tokens.iter().copied()));
    diagnostics
}
