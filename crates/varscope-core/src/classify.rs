//! Declaration classifier.
//!
//! Walks a subtree once and records, for each declaration-shaped node, the
//! variables it introduces. Variables are attached to the declaration's
//! *parent*: a declaration statement becomes visible to its siblings, not only
//! to its own subtree.
//!
//! | Shape                            | Scope kind                                  |
//! |----------------------------------|---------------------------------------------|
//! | `FieldDeclaration`               | `Class`, one per name fragment              |
//! | `SingleVariableDeclaration`      | `Method` under a method declaration, else `Local` |
//! | `VariableDeclarationStatement`   | `Local`, one per name fragment              |
//! | `VariableDeclarationExpression`  | `Local`, one per name fragment              |
//!
//! Classification is node-local, so traversal order does not affect the
//! result.

use std::collections::BTreeMap;

use tracing::trace;

use crate::bag::VariableBag;
use crate::model::{ScopeKind, Variable};
use crate::tree::{NodeId, NodeShape, SyntaxTree};

/// Variables born at each owning node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationMap {
    entries: BTreeMap<NodeId, VariableBag>,
}

impl DeclarationMap {
    /// Declarations owned by `node` (empty if none).
    pub fn get(&self, node: NodeId) -> Option<&VariableBag> {
        self.entries.get(&node)
    }

    /// Owning nodes with their declarations, in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &VariableBag)> + '_ {
        self.entries.iter().map(|(id, bag)| (*id, bag))
    }

    /// Every (owning node, variable) pair, duplicates repeated.
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, &Variable)> + '_ {
        self.entries
            .iter()
            .flat_map(|(id, bag)| bag.iter().map(move |variable| (*id, variable)))
    }

    /// Number of owning nodes.
    pub fn owner_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of declared variables.
    pub fn declaration_count(&self) -> usize {
        self.entries.values().map(VariableBag::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects declarations from a subtree.
///
/// # Example
///
/// ```
/// use varscope_core::classify::DeclarationCollector;
/// use varscope_core::tree::{NodeKind, NodeShape, Span, SyntaxTreeBuilder};
///
/// let mut b = SyntaxTreeBuilder::new();
/// let class_body = b.root(NodeKind::new(1, "class_body"), NodeShape::Other, "{ int x; }", Span::default()).unwrap();
/// b.child(
///     class_body,
///     NodeKind::new(2, "field_declaration"),
///     NodeShape::FieldDeclaration { declared_type: "int".into(), names: vec!["x".into()] },
///     "int x;",
///     Span::default(),
/// ).unwrap();
/// let tree = b.finish().unwrap();
///
/// let declarations = DeclarationCollector::collect(&tree, tree.root());
/// assert_eq!(declarations.declaration_count(), 1);
/// ```
pub struct DeclarationCollector<'t> {
    tree: &'t SyntaxTree,
    entries: BTreeMap<NodeId, VariableBag>,
}

impl<'t> DeclarationCollector<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            entries: BTreeMap::new(),
        }
    }

    /// Classify every node under (and including) `root`.
    pub fn collect(tree: &'t SyntaxTree, root: NodeId) -> DeclarationMap {
        let mut collector = DeclarationCollector::new(tree);
        for id in tree.preorder(root) {
            collector.visit(id);
        }
        collector.into_map()
    }

    /// Consume the collector, returning the finished map.
    pub fn into_map(self) -> DeclarationMap {
        DeclarationMap {
            entries: self.entries,
        }
    }

    /// Classify a single node.
    pub fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        // A declaration without a parent has nowhere to live.
        let Some(owner) = tree.parent(id) else {
            return;
        };
        match tree.shape(id) {
            NodeShape::FieldDeclaration {
                declared_type,
                names,
            } => {
                for name in names {
                    self.record(owner, Variable::new(name, declared_type, ScopeKind::Class));
                }
            }
            NodeShape::SingleVariableDeclaration {
                declared_type,
                name,
            } => {
                let scope = match tree.shape(owner) {
                    NodeShape::MethodDeclaration => ScopeKind::Method,
                    _ => ScopeKind::Local,
                };
                self.record(owner, Variable::new(name, declared_type, scope));
            }
            NodeShape::VariableDeclarationStatement {
                declared_type,
                names,
            }
            | NodeShape::VariableDeclarationExpression {
                declared_type,
                names,
            } => {
                for name in names {
                    self.record(owner, Variable::new(name, declared_type, ScopeKind::Local));
                }
            }
            NodeShape::MethodDeclaration | NodeShape::Other => {}
        }
    }

    fn record(&mut self, owner: NodeId, variable: Variable) {
        trace!(%owner, %variable, "declaration");
        self.entries.entry(owner).or_default().insert(variable);
    }
}

/// Return the declarations born at each node under `root`.
pub fn variable_scopes(tree: &SyntaxTree, root: NodeId) -> DeclarationMap {
    DeclarationCollector::collect(tree, root)
}

// ============================================================================
// Tests
// ============================================================================
