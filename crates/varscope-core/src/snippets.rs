//! Scope key builder.
//!
//! Projects a [`DeclarationMap`] into [`ScopeSnippets`]: for every (owning
//! node, variable) pair, the variable's name is filed under a [`ScopeKey`]
//! built from the owning node's canonical text, the variable's scope kind and
//! declared type, and the kind codes of the node and its parent.
//!
//! Keys and name sets are ordered, so iteration and serialization are
//! identical across runs and processes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::DeclarationMap;
use crate::model::ScopeKey;
use crate::tree::SyntaxTree;

/// How owning nodes are grouped into scope keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnippetGrouping {
    /// Nodes with equal text, scope kind, declared type and kind codes share a
    /// key; their name sets are merged.
    #[default]
    Textual,
    /// Every owning node gets its own key (node id as tie-breaker).
    PerNode,
}

impl SnippetGrouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetGrouping::Textual => "textual",
            SnippetGrouping::PerNode => "per-node",
        }
    }
}

impl fmt::Display for SnippetGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SnippetGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "textual" => Ok(SnippetGrouping::Textual),
            "per-node" => Ok(SnippetGrouping::PerNode),
            other => Err(format!(
                "unknown grouping '{}', expected 'textual' or 'per-node'",
                other
            )),
        }
    }
}

/// Variable names grouped by scope key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSnippets {
    entries: BTreeMap<ScopeKey, BTreeSet<String>>,
}

impl ScopeSnippets {
    /// Build snippets from declarations over `tree`.
    pub fn build(
        tree: &SyntaxTree,
        declarations: &DeclarationMap,
        grouping: SnippetGrouping,
    ) -> Self {
        let mut entries: BTreeMap<ScopeKey, BTreeSet<String>> = BTreeMap::new();
        for (owner, variable) in declarations.entries() {
            let key = ScopeKey {
                snippet: tree.text(owner).to_string(),
                scope: variable.scope,
                declared_type: variable.declared_type.clone(),
                node_kind: tree.kind(owner).code,
                parent_kind: tree.parent_kind_code(owner),
                node: match grouping {
                    SnippetGrouping::Textual => None,
                    SnippetGrouping::PerNode => Some(owner),
                },
            };
            entries.entry(key).or_default().insert(variable.name.clone());
        }
        ScopeSnippets { entries }
    }

    pub fn get(&self, key: &ScopeKey) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Keys with their names, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ScopeKey, &BTreeSet<String>)> + '_ {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ScopeKey> + '_ {
        self.entries.keys()
    }

    /// Number of scope keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (key, name) pairs.
    pub fn name_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }
}

/// One serialized scope record.
#[derive(Serialize)]
struct SnippetRecord<'a> {
    #[serde(flatten)]
    key: &'a ScopeKey,
    names: &'a BTreeSet<String>,
}

impl Serialize for ScopeSnippets {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(key, names)| SnippetRecord { key, names }),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
