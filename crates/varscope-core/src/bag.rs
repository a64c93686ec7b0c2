//! Counted, ordered multiset of [`Variable`]s.
//!
//! Declarations and visibility sets are bags, not sets: declaring the same
//! (name, type, scope kind) twice along a path yields a multiplicity of two
//! rather than one hidden occurrence. Shadowing is not modelled.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::model::Variable;

/// A multiset of variables, iterated in [`Variable`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableBag {
    counts: BTreeMap<Variable, usize>,
    total: usize,
}

impl VariableBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `variable`.
    pub fn insert(&mut self, variable: Variable) {
        *self.counts.entry(variable).or_insert(0) += 1;
        self.total += 1;
    }

    /// Add `count` occurrences of `variable`.
    pub fn insert_many(&mut self, variable: Variable, count: usize) {
        if count == 0 {
            return;
        }
        *self.counts.entry(variable).or_insert(0) += count;
        self.total += count;
    }

    /// Multiset union: multiplicities of `other` are added to this bag.
    pub fn extend_from(&mut self, other: &VariableBag) {
        for (variable, count) in &other.counts {
            self.insert_many(variable.clone(), *count);
        }
    }

    /// Return a new bag holding the multiset union of both bags.
    pub fn union(&self, other: &VariableBag) -> VariableBag {
        let mut merged = self.clone();
        merged.extend_from(other);
        merged
    }

    /// Multiplicity of `variable` (0 when absent).
    pub fn count(&self, variable: &Variable) -> usize {
        self.counts.get(variable).copied().unwrap_or(0)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.counts.contains_key(variable)
    }

    /// Total number of occurrences, counting duplicates.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct variables.
    pub fn distinct_len(&self) -> usize {
        self.counts.len()
    }

    /// Distinct variables with their multiplicities.
    pub fn iter_counts(&self) -> impl Iterator<Item = (&Variable, usize)> + '_ {
        self.counts.iter().map(|(variable, count)| (variable, *count))
    }

    /// Every occurrence, duplicates repeated.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.counts
            .iter()
            .flat_map(|(variable, count)| std::iter::repeat_n(variable, *count))
    }

    /// Distinct variable names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        let mut last: Option<&str> = None;
        self.counts.keys().filter_map(move |variable| {
            let name = variable.name.as_str();
            if last == Some(name) {
                None
            } else {
                last = Some(name);
                Some(name)
            }
        })
    }

    /// True if every occurrence in `other` is also in `self`, with at least
    /// the same multiplicity.
    pub fn is_superset_of(&self, other: &VariableBag) -> bool {
        other
            .counts
            .iter()
            .all(|(variable, count)| self.count(variable) >= *count)
    }
}

impl FromIterator<Variable> for VariableBag {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut bag = VariableBag::new();
        for variable in iter {
            bag.insert(variable);
        }
        bag
    }
}

/// Entry used when serializing a bag: a variable plus its multiplicity.
#[derive(Serialize)]
struct CountedVariable<'a> {
    #[serde(flatten)]
    variable: &'a Variable,
    count: usize,
}

impl Serialize for VariableBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.iter_counts()
                .map(|(variable, count)| CountedVariable { variable, count }),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
