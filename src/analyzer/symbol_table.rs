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

//! Symbol table with dotted scope paths
//!
//! The table is keyed by name only, so a later definition replaces an earlier
//! one regardless of scope. Every definition is also appended to a log, which
//! is what collision detection works from.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::{AstNode, NodeKind, Visitor, walk_children};

/// Scope path of top-level definitions
pub const GLOBAL_SCOPE: &str = "global";

/// Names treated as predefined
static BUILTINS: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| ["print", "len", "str", "int", "float"].into_iter().collect());

/// Check whether a name is a builtin
#[inline]
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}

/// Scope path of the body of function `name` declared in `parent`
pub fn child_scope(parent: &str, name: &str) -> String {
    format!("{parent}.{name}")
}

/// What a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Defined by `def`
    Function,
    /// Declared in a parameter list
    Parameter,
    /// Target of an assignment
    Variable,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SymbolKind::Function => "function",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
        })
    }
}

/// A recorded definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Defined name
    pub name: String,
    /// Kind of definition
    #[serde(rename = "type")]
    pub kind: SymbolKind,
    /// Dotted scope path, e.g. `global.factorial`
    pub scope: String,
    /// Line of the definition
    pub line: u32,
}

impl Symbol {
    /// Create a new symbol
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        scope: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            scope: scope.into(),
            line,
        }
    }
}

/// Name-keyed symbol table plus the full definition log
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
    definitions: Vec<Symbol>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition; replaces any symbol with the same name
    pub fn define(&mut self, symbol: Symbol) {
        self.definitions.push(symbol.clone());
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    /// Current symbol for a name
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Current symbol for a name, only if it has the given kind
    pub fn lookup_kind(&self, name: &str, kind: SymbolKind) -> Option<&Symbol> {
        self.lookup(name).filter(|symbol| symbol.kind == kind)
    }

    /// Whether a name has been defined
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no names are defined
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Current symbols, one per name, in first-definition order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Every definition in the order it was recorded
    pub fn definitions(&self) -> &[Symbol] {
        &self.definitions
    }

    /// Consume the table, keeping the current symbols
    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols.into_values().collect()
    }
}

/// Builds a [`SymbolTable`] from an AST and collects unresolved-name warnings
pub struct SymbolCollector {
    table: SymbolTable,
    scopes: Vec<String>,
    warnings: Vec<String>,
}

impl Default for SymbolCollector {
    fn default() -> Self {
        Self {
            table: SymbolTable::new(),
            scopes: vec![GLOBAL_SCOPE.to_string()],
            warnings: Vec::new(),
        }
    }
}

impl SymbolCollector {
    /// Walk `root` and return the table with the warnings in traversal order
    pub fn collect(root: &AstNode) -> (SymbolTable, Vec<String>) {
        let mut collector = Self::default();
        collector.visit_node(root);
        (collector.table, collector.warnings)
    }

    fn current_scope(&self) -> &str {
        self.scopes.last().map_or(GLOBAL_SCOPE, String::as_str)
    }
}

impl Visitor for SymbolCollector {
    fn visit_function_def(&mut self, node: &AstNode) {
        let scope = self.current_scope().to_string();
        self.table
            .define(Symbol::new(&node.value, SymbolKind::Function, &scope, node.line));

        let inner = child_scope(&scope, &node.value);
        self.scopes.push(inner.clone());
        for child in &node.children {
            if child.kind == NodeKind::Parameter {
                self.table
                    .define(Symbol::new(&child.value, SymbolKind::Parameter, &inner, child.line));
            } else {
                self.visit_node(child);
            }
        }
        self.scopes.pop();
    }

    fn visit_assignment(&mut self, node: &AstNode) {
        let scope = self.current_scope().to_string();
        self.table
            .define(Symbol::new(&node.value, SymbolKind::Variable, scope, node.line));
        walk_children(self, node);
    }

    fn visit_identifier(&mut self, node: &AstNode) {
        if !self.table.contains(&node.value) && !is_builtin(&node.value) {
            self.warnings.push(format!(
                "identifier '{}' used without definition at line {}",
                node.value, node.line
            ));
        }
    }
}
