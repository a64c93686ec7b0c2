//! Arena-backed syntax tree consumed by scope extraction.
//!
//! Tree providers convert whatever concrete tree their parser produces into a
//! [`SyntaxTree`] through [`SyntaxTreeBuilder`]. The arena records, per node:
//!
//! - a [`NodeKind`] (numeric code plus name, both owned by the provider)
//! - the parent link and ordered children
//! - a canonical text rendering (must be a pure function of node content)
//! - a byte [`Span`] into the parsed source
//! - a [`NodeShape`]: the closed set of declaration shapes the classifier
//!   understands
//!
//! # Identity
//!
//! Node identity is arena position ([`NodeId`]), never value equality. Two
//! nodes with identical text and kind are still distinct nodes.
//!
//! # Validation
//!
//! The builder rejects malformed declaration shapes (empty type, no names,
//! empty names) with [`VarScopeError::ShapeMismatch`], so every finished tree
//! is well formed and classification over it is total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VarScopeError};

// ============================================================================
// Identifiers and Spans
// ============================================================================

/// Index of a node in its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Byte range `[start, end)` in the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// Kind tag of a node as reported by the tree provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKind {
    /// Stable numeric code (used in scope keys).
    pub code: i32,
    /// Grammar name of the kind.
    pub name: &'static str,
}

impl NodeKind {
    pub const fn new(code: i32, name: &'static str) -> Self {
        NodeKind { code, name }
    }
}

// ============================================================================
// Node Shapes
// ============================================================================

/// Declaration shape of a node.
///
/// This is the closed set of cases the declaration classifier dispatches on.
/// Providers map their grammar onto these shapes while building the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeShape {
    /// Field declaration: one declared type, one or more name fragments.
    FieldDeclaration {
        declared_type: String,
        names: Vec<String>,
    },
    /// A single named binding: formal parameter, catch parameter, for-each
    /// variable.
    SingleVariableDeclaration { declared_type: String, name: String },
    /// Local variable declaration used as a statement.
    VariableDeclarationStatement {
        declared_type: String,
        names: Vec<String>,
    },
    /// Local variable declaration used as an expression (for-init, resources).
    VariableDeclarationExpression {
        declared_type: String,
        names: Vec<String>,
    },
    /// Method or constructor declaration. Parameters directly below it are
    /// method-scoped.
    MethodDeclaration,
    /// Any other node.
    Other,
}

impl NodeShape {
    /// Returns true if this shape introduces variables.
    pub fn is_declaration(&self) -> bool {
        !matches!(self, NodeShape::MethodDeclaration | NodeShape::Other)
    }

    fn validate(&self, kind: NodeKind) -> Result<()> {
        let (declared_type, names): (&str, Vec<&str>) = match self {
            NodeShape::FieldDeclaration {
                declared_type,
                names,
            }
            | NodeShape::VariableDeclarationStatement {
                declared_type,
                names,
            }
            | NodeShape::VariableDeclarationExpression {
                declared_type,
                names,
            } => (
                declared_type.as_str(),
                names.iter().map(String::as_str).collect(),
            ),
            NodeShape::SingleVariableDeclaration {
                declared_type,
                name,
            } => (declared_type.as_str(), vec![name.as_str()]),
            NodeShape::MethodDeclaration | NodeShape::Other => return Ok(()),
        };
        if declared_type.trim().is_empty() {
            return Err(VarScopeError::shape_mismatch(
                kind.name,
                "declaration has no declared type",
            ));
        }
        if names.is_empty() {
            return Err(VarScopeError::shape_mismatch(
                kind.name,
                "declaration has no name fragments",
            ));
        }
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(VarScopeError::shape_mismatch(
                kind.name,
                "declaration has an empty name fragment",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Nodes and Tree
// ============================================================================

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    kind: NodeKind,
    shape: NodeShape,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
    span: Span,
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn shape(&self) -> &NodeShape {
        &self.shape
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Canonical textual rendering of the node.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// An immutable syntax tree stored as an arena of [`SyntaxNode`]s.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// The root node (always the first node added).
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a finished tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Get a node by id, or `None` if the id is out of range.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Kind code of the parent, or -1 for a parentless node.
    pub fn parent_kind_code(&self, id: NodeId) -> i32 {
        self.parent(id)
            .map(|parent| self.kind(parent).code)
            .unwrap_or(-1)
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    pub fn shape(&self, id: NodeId) -> &NodeShape {
        &self.node(id).shape
    }

    /// Iterate over `start` and all its descendants in preorder
    /// (parents before children, children left to right).
    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![start],
        }
    }

    /// Iterate over all node ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|index| NodeId(index as u32))
    }

    /// Find the first node (in preorder from the root) of the given kind name.
    pub fn find_kind(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root()).find(|id| self.kind(*id).name == name)
    }
}

/// Preorder iterator over a subtree.
pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incrementally builds a [`SyntaxTree`].
///
/// The first node added is the root; every later node names its parent, which
/// must already exist. Children keep insertion order.
#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root node.
    ///
    /// Returns a shape-mismatch error if a root already exists or the shape is
    /// malformed.
    pub fn root(
        &mut self,
        kind: NodeKind,
        shape: NodeShape,
        text: impl Into<String>,
        span: Span,
    ) -> Result<NodeId> {
        if !self.nodes.is_empty() {
            return Err(VarScopeError::shape_mismatch(
                kind.name,
                "tree already has a root",
            ));
        }
        self.push(None, kind, shape, text.into(), span)
    }

    /// Add a child of `parent`.
    pub fn child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        shape: NodeShape,
        text: impl Into<String>,
        span: Span,
    ) -> Result<NodeId> {
        if parent.index() >= self.nodes.len() {
            return Err(VarScopeError::shape_mismatch(
                kind.name,
                format!("parent {} does not exist", parent),
            ));
        }
        self.push(Some(parent), kind, shape, text.into(), span)
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        shape: NodeShape,
        text: String,
        span: Span,
    ) -> Result<NodeId> {
        shape.validate(kind)?;
        let index = u32::try_from(self.nodes.len()).map_err(|_| {
            VarScopeError::shape_mismatch(kind.name, "tree exceeds u32::MAX nodes")
        })?;
        let id = NodeId(index);
        self.nodes.push(SyntaxNode {
            kind,
            shape,
            parent,
            children: Vec::new(),
            text,
            span,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        Ok(id)
    }

    /// Finish building. Fails if no root was added.
    pub fn finish(self) -> Result<SyntaxTree> {
        if self.nodes.is_empty() {
            return Err(VarScopeError::shape_mismatch("tree", "tree has no root"));
        }
        Ok(SyntaxTree { nodes: self.nodes })
    }
}

// ============================================================================
// Tests
// ============================================================================
