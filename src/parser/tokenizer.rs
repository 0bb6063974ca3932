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

//! Character-level tokenizer for MiniPy snippets
//!
//! A single pass state machine with one and two character lookahead:
//! - Whitespace other than newline is skipped, newlines become `NEWLINE` tokens
//! - `#` comments run to the end of the line and become one `COMMENT` token
//! - Operators use greedy longest-match (`**=` before `**` before `*`)
//! - Unknown characters become single character `ERROR` tokens
//!
//! The tokenizer never fails. Every finite input produces a token sequence,
//! the empty input produces an empty one.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of token classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    /// Reserved word (`def`, `if`, `print`, ...)
    Keyword,
    /// Name that is not a reserved word
    Identifier,
    /// Integer or decimal literal
    Number,
    /// String literal content, without quotes
    String,
    /// Arithmetic, comparison, bitwise or assignment operator
    Operator,
    /// Punctuation: `( ) [ ] { } : ; , .`
    Symbol,
    /// `#` comment up to the end of the line
    Comment,
    /// Explicit line break
    Newline,
    /// Character the tokenizer does not recognise
    Error,
}

impl TokenKind {
    /// Every kind, in report order
    pub const ALL: [TokenKind; 9] = [
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Operator,
        TokenKind::Symbol,
        TokenKind::Comment,
        TokenKind::Newline,
        TokenKind::Error,
    ];

    /// Wire name of the kind
    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Comment => "COMMENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified lexeme with its 1-based starting position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Exact lexeme; for strings the raw content between the quotes
    #[serde(rename = "value")]
    pub text: String,
    /// Line of the first character
    pub line: u32,
    /// Column of the first character
    #[serde(rename = "col")]
    pub column: u32,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Check both kind and text
    #[inline]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Check for a specific reserved word
    #[inline]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenKind::Keyword, keyword)
    }

    /// Check for a specific punctuation symbol
    #[inline]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.is(TokenKind::Symbol, symbol)
    }

    /// Newlines and comments carry no syntax
    #[inline]
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Comment)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) at {}:{}",
            self.kind, self.text, self.line, self.column
        )
    }
}

/// Reserved words, classified as `KEYWORD`
static KEYWORD_TABLE: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        // Definitions and control flow
        "def", "if", "else", "elif", "return", "for", "while", "in", "pass", "break",
        "continue", "class", "try", "except", "finally", "with",
        // Boolean operators and literals
        "and", "or", "not", "True", "False", "None",
        // Modules
        "import", "from", "as",
        // Reserved even though it is called like a function
        "print",
    ]
    .into_iter()
    .collect()
});

/// Check whether a word is reserved
#[inline]
pub fn is_keyword(word: &str) -> bool {
    KEYWORD_TABLE.contains(word)
}

/// Output of the lexical stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalReport {
    /// Tokens in source order
    pub tokens: Vec<Token>,
    /// Number of tokens per kind; kinds that never occur are absent
    pub stats: BTreeMap<TokenKind, usize>,
}

impl LexicalReport {
    /// Build the report, counting tokens per kind
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut stats = BTreeMap::new();
        for token in &tokens {
            *stats.entry(token.kind).or_insert(0) += 1;
        }
        Self { tokens, stats }
    }

    /// Count for one kind, zero when absent
    pub fn count(&self, kind: TokenKind) -> usize {
        self.stats.get(&kind).copied().unwrap_or(0)
    }
}

/// Tokenizer state: byte offset into the input plus line/column bookkeeping
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer positioned at line 1, column 1
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline(always)]
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Consume one character, keeping line and column in step
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume the next character only if it is `expected`
    #[inline]
    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' || !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn scan_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'input str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Digits with at most one decimal point; no sign, no exponent
    fn scan_number(&mut self) -> &'input str {
        let mut seen_dot = false;
        self.scan_while(|ch| {
            if ch.is_ascii_digit() {
                true
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                false
            }
        })
    }

    /// String content up to the matching unescaped quote. A backslash skips
    /// the next character without interpreting it. Unterminated strings run
    /// to the end of the input.
    fn scan_string(&mut self, quote: char) -> &'input str {
        self.advance(); // opening quote
        let start = self.pos;

        while let Some(ch) = self.peek() {
            if ch == quote {
                break;
            }
            self.advance();
            if ch == '\\' {
                self.advance();
            }
        }

        let content = &self.input[start..self.pos];
        self.advance_if(quote);
        content
    }

    /// Operator with an optional trailing `=` (`+`/`+=`, `=`/`==`, ...)
    fn scan_assign_operator(&mut self) {
        self.advance();
        self.advance_if('=');
    }

    /// Doubled operator with optional `=` (`*`, `*=`, `**`, `**=`)
    fn scan_doubling_operator(&mut self, ch: char) {
        self.advance();
        self.advance_if(ch);
        self.advance_if('=');
    }

    /// Comparison or shift (`<`, `<=`, `<<`)
    fn scan_comparison_operator(&mut self, ch: char) {
        self.advance();
        if !self.advance_if('=') {
            self.advance_if(ch);
        }
    }

    /// Scan the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let ch = self.peek()?;
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        let kind = match ch {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            '#' => {
                self.scan_while(|c| c != '\n');
                TokenKind::Comment
            }
            c if c.is_alphabetic() || c == '_' => {
                let word = self.scan_while(|c| c.is_alphanumeric() || c == '_');
                if is_keyword(word) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                }
            }
            c if c.is_ascii_digit() => {
                self.scan_number();
                TokenKind::Number
            }
            '"' | '\'' => {
                let content = self.scan_string(ch);
                return Some(Token::new(TokenKind::String, content, line, column));
            }
            '(' | ')' | '[' | ']' | '{' | '}' | ':' | ';' | ',' | '.' => {
                self.advance();
                TokenKind::Symbol
            }
            '+' | '-' | '%' | '=' => {
                self.scan_assign_operator();
                TokenKind::Operator
            }
            '*' | '/' => {
                self.scan_doubling_operator(ch);
                TokenKind::Operator
            }
            '<' | '>' => {
                self.scan_comparison_operator(ch);
                TokenKind::Operator
            }
            '!' if self.peek_next() == Some('=') => {
                self.advance();
                self.advance();
                TokenKind::Operator
            }
            '&' | '|' | '^' | '~' => {
                self.advance();
                TokenKind::Operator
            }
            _ => {
                self.advance();
                TokenKind::Error
            }
        };

        Some(Token::new(kind, &self.input[start..self.pos], line, column))
    }

    /// Tokenize the remaining input
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.input.len() / 3 + 1);
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a complete source text and count tokens per kind
pub fn tokenize(source: &str) -> LexicalReport {
    let tokens = Tokenizer::new(source).tokenize_all();
    log::debug!("tokenized {} bytes into {} tokens", source.len(), tokens.len());
    LexicalReport::from_tokens(tokens)
}
