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

//! Visitor pattern for AST traversal

use super::node::{AstNode, NodeKind};

/// Trait for visiting AST nodes
///
/// Every method defaults to walking the children, so implementors only
/// override the node kinds they care about.
pub trait Visitor: Sized {
    /// Visit any node, dispatching on its kind
    fn visit_node(&mut self, node: &AstNode) {
        match node.kind {
            NodeKind::FunctionDef => self.visit_function_def(node),
            NodeKind::Assignment => self.visit_assignment(node),
            NodeKind::Identifier => self.visit_identifier(node),
            NodeKind::FunctionCall => self.visit_function_call(node),
            _ => walk_children(self, node),
        }
    }

    /// Visit a function definition
    fn visit_function_def(&mut self, node: &AstNode) {
        walk_children(self, node)
    }

    /// Visit an assignment
    fn visit_assignment(&mut self, node: &AstNode) {
        walk_children(self, node)
    }

    /// Visit a name reference
    fn visit_identifier(&mut self, _node: &AstNode) {}

    /// Visit a call
    fn visit_function_call(&mut self, node: &AstNode) {
        walk_children(self, node)
    }
}

/// Visit every child of a node in order
pub fn walk_children<V: Visitor>(visitor: &mut V, node: &AstNode) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

/// Pre-order iterator over a subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> PreOrder<'a> {
    /// Start at `root`
    pub fn new(root: &'a AstNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
