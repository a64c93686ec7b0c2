//! Scope extraction entry points.
//!
//! Ties the pieces together:
//!
//! ```text
//! TreeProvider -> SyntaxTree -> DeclarationCollector -> DeclarationMap
//!                                                     -> propagate -> VisibilityMap
//!                                                     -> ScopeSnippets::build -> ScopeSnippets
//! ```
//!
//! [`ScopeExtractor`] is the front door for file and string inputs;
//! [`scope_snippets`] and [`defined_vars_per_node`] work on a tree the caller
//! already holds.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::bag::VariableBag;
use crate::classify::{variable_scopes, DeclarationMap};
use crate::error::Result;
use crate::propagate::{propagate, VisibilityMap};
use crate::provider::{ParseKind, TreeProvider};
use crate::snippets::{ScopeSnippets, SnippetGrouping};
use crate::tree::{NodeId, SyntaxTree};

/// Counters describing one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Nodes in the analyzed subtree.
    pub nodes: usize,
    /// Variables declared in the subtree (duplicates counted).
    pub declarations: usize,
    /// Sum of visible-bag sizes over all nodes.
    pub visible_entries: usize,
}

/// A parsed tree together with the scope maps computed over one of its
/// subtrees.
#[derive(Debug, Clone)]
pub struct ScopeAnalysis {
    tree: SyntaxTree,
    root: NodeId,
    declarations: DeclarationMap,
    visibility: VisibilityMap,
    stats: ExtractionStats,
}

impl ScopeAnalysis {
    /// Analyze the subtree of `tree` rooted at `root`.
    pub fn new(tree: SyntaxTree, root: NodeId) -> Self {
        let declarations = variable_scopes(&tree, root);
        let visibility = propagate(&tree, root, &declarations);
        let stats = ExtractionStats {
            nodes: visibility.len(),
            declarations: declarations.declaration_count(),
            visible_entries: visibility.iter().map(|(_, bag)| bag.len()).sum(),
        };
        debug!(
            %root,
            nodes = stats.nodes,
            declarations = stats.declarations,
            visible_entries = stats.visible_entries,
            "scope analysis"
        );
        ScopeAnalysis {
            tree,
            root,
            declarations,
            visibility,
            stats,
        }
    }

    /// Analyze a whole tree from its root.
    pub fn of_tree(tree: SyntaxTree) -> Self {
        let root = tree.root();
        Self::new(tree, root)
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn declarations(&self) -> &DeclarationMap {
        &self.declarations
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    /// Scope snippets for the analyzed subtree.
    pub fn snippets(&self, grouping: SnippetGrouping) -> ScopeSnippets {
        ScopeSnippets::build(&self.tree, &self.declarations, grouping)
    }

    /// Variables visible at `node`.
    pub fn visible_at(&self, node: NodeId) -> Option<&VariableBag> {
        self.visibility.get(node)
    }

    /// Variables born at `node`.
    pub fn declared_at(&self, node: NodeId) -> Option<&VariableBag> {
        self.declarations.get(node)
    }
}

/// Scope snippets for the subtree of `tree` rooted at `root`.
pub fn scope_snippets(tree: &SyntaxTree, root: NodeId, grouping: SnippetGrouping) -> ScopeSnippets {
    let declarations = variable_scopes(tree, root);
    ScopeSnippets::build(tree, &declarations, grouping)
}

/// Variables visible at every node of the subtree rooted at `root`.
pub fn defined_vars_per_node(tree: &SyntaxTree, root: NodeId) -> VisibilityMap {
    let declarations = variable_scopes(tree, root);
    propagate(tree, root, &declarations)
}

/// Extracts scope snippets from files, strings, or existing trees.
#[derive(Debug, Clone)]
pub struct ScopeExtractor<P> {
    provider: P,
    grouping: SnippetGrouping,
}

impl<P: TreeProvider> ScopeExtractor<P> {
    pub fn new(provider: P) -> Self {
        ScopeExtractor {
            provider,
            grouping: SnippetGrouping::default(),
        }
    }

    /// Use `grouping` for every snippet this extractor builds.
    pub fn with_grouping(mut self, grouping: SnippetGrouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn grouping(&self) -> SnippetGrouping {
        self.grouping
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Snippets for a subtree of a tree the caller already holds.
    pub fn from_node(&self, tree: &SyntaxTree, node: NodeId) -> ScopeSnippets {
        scope_snippets(tree, node, self.grouping)
    }

    /// Parse a file as a compilation unit and extract its snippets.
    pub fn from_file(&self, path: &Path) -> Result<ScopeSnippets> {
        Ok(self.analyze_file(path)?.snippets(self.grouping))
    }

    /// Parse a source string of the given kind and extract its snippets.
    pub fn from_str(&self, code: &str, kind: ParseKind) -> Result<ScopeSnippets> {
        Ok(self.analyze_str(code, kind)?.snippets(self.grouping))
    }

    /// Parse a file and keep the tree with both scope maps.
    pub fn analyze_file(&self, path: &Path) -> Result<ScopeAnalysis> {
        debug!(path = %path.display(), "extracting scopes from file");
        let tree = self.provider.parse_file(path)?;
        Ok(ScopeAnalysis::of_tree(tree))
    }

    /// Parse a string and keep the tree with both scope maps.
    pub fn analyze_str(&self, code: &str, kind: ParseKind) -> Result<ScopeAnalysis> {
        debug!(bytes = code.len(), %kind, "extracting scopes from string");
        let tree = self.provider.parse_str(code, kind)?;
        Ok(ScopeAnalysis::of_tree(tree))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VarScopeError;
    use crate::model::{ScopeKind, Variable};
    use crate::testing::ClassFixture;
    use std::io::Write;

    const SOURCE: &str = "class A { int x; void m(int y) { int z = 1; } void n() { } }";

    /// Recognizes exactly one program: the fixture class.
    struct FixtureProvider;

    impl TreeProvider for FixtureProvider {
        fn parse_str(&self, code: &str, _kind: ParseKind) -> Result<SyntaxTree> {
            if code.trim() == SOURCE {
                Ok(ClassFixture::build().tree)
            } else {
                Err(VarScopeError::parse(0, "not the fixture"))
            }
        }
    }

    fn extractor() -> ScopeExtractor<FixtureProvider> {
        ScopeExtractor::new(FixtureProvider)
    }

    mod analysis {
        use super::*;

        #[test]
        fn stats_count_nodes_declarations_and_visible_entries() {
            let analysis = extractor().analyze_str(SOURCE, ParseKind::CompilationUnit).unwrap();
            let stats = analysis.stats();
            assert_eq!(stats.nodes, analysis.tree().len());
            assert_eq!(stats.declarations, 3);
            // root 0, class body 1, field 1, method 2, param 2, body 3,
            // local 3, sibling 1, sibling body 1
            assert_eq!(stats.visible_entries, 14);
        }

        #[test]
        fn visible_and_declared_lookups() {
            let fx = ClassFixture::build();
            let analysis = ScopeAnalysis::of_tree(fx.tree);
            assert_eq!(analysis.root(), analysis.tree().root());
            assert_eq!(analysis.visible_at(fx.method_body).unwrap().len(), 3);
            assert!(analysis
                .declared_at(fx.method)
                .unwrap()
                .contains(&Variable::new("y", "int", ScopeKind::Method)));
            assert!(analysis.declared_at(fx.field).is_none());
            assert_eq!(analysis.declarations().owner_count(), 3);
            assert_eq!(analysis.visibility().len(), analysis.tree().len());
        }

        #[test]
        fn subtree_analysis_is_limited_to_the_subtree() {
            let fx = ClassFixture::build();
            let analysis = ScopeAnalysis::new(fx.tree, fx.sibling);
            assert_eq!(analysis.stats().nodes, 2);
            assert_eq!(analysis.stats().declarations, 0);
            assert!(analysis.visible_at(fx.method).is_none());
        }
    }

    mod entry_points {
        use super::*;

        #[test]
        fn from_node_matches_free_function() {
            let fx = ClassFixture::build();
            let from_extractor = extractor().from_node(&fx.tree, fx.tree.root());
            let free = scope_snippets(&fx.tree, fx.tree.root(), SnippetGrouping::Textual);
            assert_eq!(from_extractor, free);
            assert_eq!(free.len(), 3);
        }

        #[test]
        fn from_file_reads_through_provider() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "{}", SOURCE).unwrap();
            let snippets = extractor().from_file(file.path()).unwrap();
            assert_eq!(snippets.name_count(), 3);
        }

        #[test]
        fn from_str_is_deterministic() {
            let first = extractor().from_str(SOURCE, ParseKind::CompilationUnit).unwrap();
            let second = extractor().from_str(SOURCE, ParseKind::CompilationUnit).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn grouping_flows_into_keys() {
            let per_node = extractor().with_grouping(SnippetGrouping::PerNode);
            assert_eq!(per_node.grouping(), SnippetGrouping::PerNode);
            let snippets = per_node.from_str(SOURCE, ParseKind::CompilationUnit).unwrap();
            assert!(snippets.keys().all(|key| key.node.is_some()));
        }

        #[test]
        fn defined_vars_per_node_covers_subtree() {
            let fx = ClassFixture::build();
            let vis = defined_vars_per_node(&fx.tree, fx.method);
            assert_eq!(vis.len(), 4);
            assert_eq!(vis.get(fx.local).unwrap().len(), 2);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn parse_errors_propagate() {
            let err = extractor().from_str("class B {}", ParseKind::CompilationUnit).unwrap_err();
            assert!(matches!(err, VarScopeError::Parse { .. }));
        }

        #[test]
        fn missing_file_is_input_read() {
            let dir = tempfile::tempdir().unwrap();
            let err = extractor()
                .from_file(&dir.path().join("Nope.java"))
                .unwrap_err();
            assert!(matches!(err, VarScopeError::InputRead { .. }));
        }
    }
}
