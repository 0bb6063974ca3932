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

//! Parser diagnostic types
//!
//! Diagnostics are typed while the parser runs and rendered to plain strings
//! for the syntax report. None of them interrupts parsing.

use thiserror::Error;

/// A syntactic problem found by the parser or its structural pre-checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDiagnostic {
    /// A specific token was required but another one was found
    #[error("expected {expected} at line {line}, found '{found}'")]
    ExpectedToken {
        /// Description of what was required
        expected: String,
        /// Line of the token actually found
        line: u32,
        /// Text of the token actually found
        found: String,
    },

    /// A specific token was required but the input ended
    #[error("expected {expected}, found end of input")]
    ExpectedAtEnd {
        /// Description of what was required
        expected: String,
    },

    /// A token that cannot start an expression
    #[error("unexpected token '{found}' at line {line}")]
    UnexpectedToken {
        /// Text of the offending token
        found: String,
        /// Line of the offending token
        line: u32,
    },

    /// Closing bracket with no opener on the stack
    #[error("closing '{bracket}' at line {line} has no matching opener")]
    UnmatchedCloser {
        /// The closing bracket
        bracket: String,
        /// Line of the closing bracket
        line: u32,
    },

    /// Closing bracket of the wrong type for the innermost opener
    #[error("closing '{closer}' at line {line} does not match '{opener}' opened at line {opener_line}")]
    MismatchedBracket {
        /// The closing bracket
        closer: String,
        /// Line of the closing bracket
        line: u32,
        /// Innermost open bracket
        opener: String,
        /// Line of the innermost open bracket
        opener_line: u32,
    },

    /// Openers left on the stack at the end of input
    #[error("unclosed brackets: {openers}")]
    UnclosedBrackets {
        /// Rendered list of the open brackets and their lines
        openers: String,
        /// Line of the outermost unclosed bracket
        line: u32,
    },

    /// `def` not followed by a name
    #[error("expected function name after 'def' at line {line}")]
    MissingFunctionName {
        /// Line of the `def` keyword
        line: u32,
    },

    /// Function name not followed by `(`
    #[error("expected '(' after function name at line {line}")]
    MissingParameterList {
        /// Line of the `def` keyword
        line: u32,
    },

    /// No `:` between the signature and the next `def` or end of input
    #[error("expected ':' after function signature at line {line}")]
    MissingFunctionColon {
        /// Line of the `def` keyword
        line: u32,
    },

    /// Statement or expression nested past the parser's depth bound
    #[error("expression nesting too deep at line {line}")]
    NestingTooDeep {
        /// Line where the bound was exceeded
        line: u32,
    },

    /// Nothing left to parse after removing newlines and comments
    #[error("no tokens to analyze")]
    NoTokens,
}

impl ParseDiagnostic {
    /// Source line the diagnostic refers to, when it has one
    pub fn line(&self) -> Option<u32> {
        match self {
            ParseDiagnostic::ExpectedToken { line, .. }
            | ParseDiagnostic::UnexpectedToken { line, .. }
            | ParseDiagnostic::UnmatchedCloser { line, .. }
            | ParseDiagnostic::MismatchedBracket { line, .. }
            | ParseDiagnostic::UnclosedBrackets { line, .. }
            | ParseDiagnostic::MissingFunctionName { line }
            | ParseDiagnostic::MissingParameterList { line }
            | ParseDiagnostic::MissingFunctionColon { line }
            | ParseDiagnostic::NestingTooDeep { line } => Some(*line),
            ParseDiagnostic::ExpectedAtEnd { .. } | ParseDiagnostic::NoTokens => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_token_message() {
        let diagnostic = ParseDiagnostic::ExpectedToken {
            expected: "')'".to_string(),
            line: 3,
            found: ":".to_string(),
        };
        assert_eq!(diagnostic.to_string(), "expected ')' at line 3, found ':'");
        assert_eq!(diagnostic.line(), Some(3));
    }

    #[test]
    fn test_end_of_input_message() {
        let diagnostic = ParseDiagnostic::ExpectedAtEnd {
            expected: "expression".to_string(),
        };
        assert_eq!(diagnostic.to_string(), "expected expression, found end of input");
        assert_eq!(diagnostic.line(), None);
    }

    #[test]
    fn test_structural_messages_carry_lines() {
        let diagnostic = ParseDiagnostic::UnmatchedCloser {
            bracket: ")".to_string(),
            line: 7,
        };
        assert!(diagnostic.to_string().contains("line 7"));
    }
}
