//! Scope propagation.
//!
//! Turns per-node declarations into per-node cumulative visibility:
//!
//! ```text
//! visible(root) = declared(root)
//! visible(n)    = visible(parent(n)) + declared(n)     (multiset union)
//! ```
//!
//! Each node's own declarations are visible to itself and its whole subtree.
//! Shadowing is not modelled: an inner declaration of a name does not hide an
//! outer one, and redeclaring an identical triple increases its count.
//!
//! The fold walks the subtree with an explicit stack (no recursion) and shares
//! the parent's bag through an [`Arc`] whenever a node adds no declarations,
//! so bags are only copied where visibility actually grows.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bag::VariableBag;
use crate::classify::DeclarationMap;
use crate::tree::{NodeId, SyntaxTree};

/// Variables visible at each node of a subtree.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    entries: BTreeMap<NodeId, Arc<VariableBag>>,
}

impl VisibilityMap {
    /// Variables visible at `node`, or `None` if the node was not covered.
    pub fn get(&self, node: NodeId) -> Option<&VariableBag> {
        self.entries.get(&node).map(Arc::as_ref)
    }

    /// Covered nodes with their visible variables, in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &VariableBag)> + '_ {
        self.entries.iter().map(|(id, bag)| (*id, bag.as_ref()))
    }

    /// Number of covered nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct bags backing the map (nodes that added declarations,
    /// plus the root).
    pub fn distinct_bags(&self) -> usize {
        let mut seen: Vec<*const VariableBag> =
            self.entries.values().map(Arc::as_ptr).collect();
        seen.sort();
        seen.dedup();
        seen.len()
    }
}

/// Propagate `declarations` down the subtree rooted at `root`.
///
/// Ancestors of `root` contribute nothing: the root sees exactly its own
/// declarations.
pub fn propagate(tree: &SyntaxTree, root: NodeId, declarations: &DeclarationMap) -> VisibilityMap {
    let empty = Arc::new(VariableBag::new());
    let mut entries = BTreeMap::new();
    let mut stack: Vec<(NodeId, Arc<VariableBag>)> = vec![(root, empty)];

    while let Some((id, inherited)) = stack.pop() {
        let visible = match declarations.get(id) {
            Some(own) if !own.is_empty() => Arc::new(inherited.union(own)),
            _ => inherited,
        };
        for child in tree.children(id).iter().rev() {
            stack.push((*child, Arc::clone(&visible)));
        }
        entries.insert(id, visible);
    }

    VisibilityMap { entries }
}

// ============================================================================
// Tests
// ============================================================================
