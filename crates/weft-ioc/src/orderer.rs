//! Contribution ordering
//!
//! Resolves `after:`/`before:` constraints between ordered contributions
//! into a final sequence. Constraints name other contribution ids, or `*`
//! to order against everything; unknown targets are ignored with a warning,
//! cycles are fatal. Ties keep insertion order.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{ContributionError, ContributionResult};

/// Parsed ordering constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderConstraint {
    /// Run after the named contribution (`after:*` means after all others)
    After(String),
    /// Run before the named contribution (`before:*` means before all others)
    Before(String),
}

impl OrderConstraint {
    /// Parse a textual constraint of the form `after:<id>` or `before:<id>`
    pub fn parse(raw: &str) -> ContributionResult<Self> {
        let Some((kind, target)) = raw.split_once(':') else {
            return Err(ContributionError::InvalidConstraint(raw.to_string()));
        };

        let target = target.trim();
        if target.is_empty() {
            return Err(ContributionError::InvalidConstraint(raw.to_string()));
        }

        match kind.trim().to_ascii_lowercase().as_str() {
            "after" => Ok(OrderConstraint::After(target.to_string())),
            "before" => Ok(OrderConstraint::Before(target.to_string())),
            _ => Err(ContributionError::InvalidConstraint(raw.to_string())),
        }
    }

    fn is_after_all(&self) -> bool {
        matches!(self, OrderConstraint::After(t) if t == "*")
    }

    fn is_before_all(&self) -> bool {
        matches!(self, OrderConstraint::Before(t) if t == "*")
    }
}

/// Topologically orders values by their contribution constraints
pub struct Orderer<T> {
    entries: Vec<(String, T, Vec<OrderConstraint>)>,
}

impl<T> Default for Orderer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Orderer<T> {
    /// Create an empty orderer
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry with its parsed constraints
    pub fn add(&mut self, id: impl Into<String>, value: T, constraints: Vec<OrderConstraint>) {
        let id = id.into();
        if self.entries.iter().any(|(existing, _, _)| *existing == id) {
            log::warn!("duplicate ordered contribution id {id}; both entries are kept");
        }
        self.entries.push((id, value, constraints));
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the orderer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve constraints into the final sequence
    pub fn into_ordered(self) -> ContributionResult<Vec<T>> {
        let n = self.entries.len();

        let index_of: FxHashMap<&str, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, (id, _, _))| (id.as_str(), index))
            .collect();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];
        let mut seen_edges: FxHashSet<(usize, usize)> = FxHashSet::default();

        let mut add_edge = |from: usize, to: usize,
                            successors: &mut Vec<Vec<usize>>,
                            indegree: &mut Vec<usize>| {
            if from != to && seen_edges.insert((from, to)) {
                successors[from].push(to);
                indegree[to] += 1;
            }
        };

        for (index, (id, _, constraints)) in self.entries.iter().enumerate() {
            for constraint in constraints {
                match constraint {
                    OrderConstraint::After(target) if target == "*" => {
                        for (other, (_, _, other_constraints)) in self.entries.iter().enumerate() {
                            let also_last = other_constraints.iter().any(|c| c.is_after_all());
                            if other != index && !also_last {
                                add_edge(other, index, &mut successors, &mut indegree);
                            }
                        }
                    }
                    OrderConstraint::Before(target) if target == "*" => {
                        for (other, (_, _, other_constraints)) in self.entries.iter().enumerate() {
                            let also_first = other_constraints.iter().any(|c| c.is_before_all());
                            if other != index && !also_first {
                                add_edge(index, other, &mut successors, &mut indegree);
                            }
                        }
                    }
                    OrderConstraint::After(target) => match index_of.get(target.as_str()) {
                        Some(&other) => add_edge(other, index, &mut successors, &mut indegree),
                        None => log::warn!(
                            "ordering constraint after:{target} of contribution {id} names an unknown contribution; ignored"
                        ),
                    },
                    OrderConstraint::Before(target) => match index_of.get(target.as_str()) {
                        Some(&other) => add_edge(index, other, &mut successors, &mut indegree),
                        None => log::warn!(
                            "ordering constraint before:{target} of contribution {id} names an unknown contribution; ignored"
                        ),
                    },
                }
            }
        }

        // Stable Kahn: always pick the lowest insertion index among ready
        // entries, so unconstrained contributions keep insertion order.
        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);
        loop {
            let next = (0..n).find(|&i| !placed[i] && indegree[i] == 0);
            let Some(i) = next else {
                break;
            };
            placed[i] = true;
            order.push(i);
            for &successor in &successors[i] {
                indegree[successor] -= 1;
            }
        }

        if order.len() < n {
            let stuck: Vec<&str> = (0..n)
                .filter(|&i| !placed[i])
                .map(|i| self.entries[i].0.as_str())
                .collect();
            return Err(ContributionError::OrderingCycle(stuck.join(", ")));
        }

        let mut slots: Vec<Option<T>> = self
            .entries
            .into_iter()
            .map(|(_, value, _)| Some(value))
            .collect();

        // `order` is a permutation of the entry indices.
        Ok(order
            .into_iter()
            .map(|i| slots[i].take().unwrap())
            .collect())
    }
}
