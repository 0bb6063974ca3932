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

//! AST node types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::visitor::PreOrder;

/// Kind of an AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of every tree
    Program,
    /// `def name(params): body`; children are parameters then body statements
    FunctionDef,
    /// A name in a parameter list
    Parameter,
    /// `if cond: then [else: other]`; first child is the condition
    IfStatement,
    /// `return [expr]`
    ReturnStatement,
    /// `name = expr`
    Assignment,
    /// Binary operation; value is the operator, children are the operands
    BinaryOp,
    /// Call; value is the callee, children are the arguments
    FunctionCall,
    /// Name reference
    Identifier,
    /// Numeric literal
    Number,
    /// String literal
    String,
}

impl NodeKind {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::FunctionDef => "FunctionDef",
            NodeKind::Parameter => "Parameter",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::Assignment => "Assignment",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Identifier => "Identifier",
            NodeKind::Number => "Number",
            NodeKind::String => "String",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Name, literal text or operator; empty for structural nodes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Ordered children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
    /// Line the construct starts on
    pub line: u32,
}

impl AstNode {
    /// Create a childless node
    pub fn new(kind: NodeKind, value: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            value: value.into(),
            children: Vec::new(),
            line,
        }
    }

    /// Attach children, replacing any existing ones
    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    /// Root node wrapping top-level statements
    pub fn program(statements: Vec<AstNode>) -> Self {
        let line = statements.first().map_or(1, |first| first.line);
        Self::new(NodeKind::Program, "", line).with_children(statements)
    }

    /// Binary operation node
    pub fn binary(operator: impl Into<String>, line: u32, left: AstNode, right: AstNode) -> Self {
        Self::new(NodeKind::BinaryOp, operator, line).with_children(vec![left, right])
    }

    /// Check the kind
    #[inline]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Direct children of one kind
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &AstNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Parameter names of a function definition, in declaration order
    pub fn parameter_names(&self) -> Vec<&str> {
        if self.kind != NodeKind::FunctionDef {
            return Vec::new();
        }
        self.children_of_kind(NodeKind::Parameter)
            .map(|param| param.value.as_str())
            .collect()
    }

    /// This node and all descendants in pre-order
    pub fn descendants(&self) -> PreOrder<'_> {
        PreOrder::new(self)
    }

    /// Number of levels in the subtree; a leaf has height 1
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_function() -> AstNode {
        AstNode::new(NodeKind::FunctionDef, "add", 1).with_children(vec![
            AstNode::new(NodeKind::Parameter, "a", 1),
            AstNode::new(NodeKind::Parameter, "b", 1),
            AstNode::new(NodeKind::ReturnStatement, "", 2).with_children(vec![AstNode::binary(
                "+",
                2,
                AstNode::new(NodeKind::Identifier, "a", 2),
                AstNode::new(NodeKind::Identifier, "b", 2),
            )]),
        ])
    }

    #[test]
    fn test_parameter_names() {
        assert_eq!(sample_function().parameter_names(), vec!["a", "b"]);
        assert!(AstNode::new(NodeKind::Identifier, "a", 1).parameter_names().is_empty());
    }

    #[test]
    fn test_program_line_follows_first_statement() {
        assert_eq!(AstNode::program(Vec::new()).line, 1);
        assert_eq!(AstNode::program(vec![sample_function()]).line, 1);
        let late = AstNode::new(NodeKind::Identifier, "x", 4);
        assert_eq!(AstNode::program(vec![late]).line, 4);
    }

    #[test]
    fn test_height_counts_levels() {
        assert_eq!(sample_function().height(), 4);
        assert_eq!(AstNode::new(NodeKind::Number, "1", 1).height(), 1);
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let node = AstNode::new(NodeKind::ReturnStatement, "", 3);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "ReturnStatement", "line": 3})
        );

        let leaf = AstNode::new(NodeKind::Number, "42", 1);
        assert_eq!(
            serde_json::to_value(&leaf).unwrap(),
            json!({"type": "Number", "value": "42", "line": 1})
        );
    }
}
