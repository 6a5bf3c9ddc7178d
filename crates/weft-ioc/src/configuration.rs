//! Configuration sinks
//!
//! A service configuration point takes one of three shapes: a plain
//! collection, an ordered collection with textual constraints, or a keyed
//! mapping. The adapter is a pure producer into these sinks; consumption
//! (including constraint resolution) happens on the registry side.

use rustc_hash::FxHashMap;

use crate::contribution::DeferredContribution;
use crate::orderer::{OrderConstraint, Orderer};
use crate::ContributionResult;

/// Unordered configuration point
pub trait Configuration {
    /// Add a contribution
    fn add(&mut self, value: DeferredContribution);
}

/// Ordered configuration point with textual constraints
pub trait OrderedConfiguration {
    /// Add a contribution under `id` with its ordering constraints
    fn add(&mut self, id: &str, value: DeferredContribution, constraints: &[String]);
}

/// Keyed configuration point
pub trait MappedConfiguration {
    /// Add a contribution under `key`
    fn add(&mut self, key: &str, value: DeferredContribution);
}

/// Collects unordered contributions
#[derive(Debug, Default)]
pub struct UnorderedCollector {
    values: Vec<DeferredContribution>,
}

impl UnorderedCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected contributions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been contributed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the collector, yielding contributions in arrival order
    pub fn into_values(self) -> Vec<DeferredContribution> {
        self.values
    }
}

impl Configuration for UnorderedCollector {
    fn add(&mut self, value: DeferredContribution) {
        self.values.push(value);
    }
}

/// One ordered contribution: id, deferred unit, raw constraints
#[derive(Debug)]
pub struct OrderedEntry {
    /// Contribution id
    pub id: String,
    /// The deferred unit
    pub value: DeferredContribution,
    /// Raw textual constraints (`after:X`, `before:Y`)
    pub constraints: Vec<String>,
}

/// Collects ordered contributions and resolves their constraints
#[derive(Debug, Default)]
pub struct OrderedCollector {
    entries: Vec<OrderedEntry>,
}

impl OrderedCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected entries in arrival order, constraints unresolved
    pub fn entries(&self) -> &[OrderedEntry] {
        &self.entries
    }

    /// Number of collected contributions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been contributed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve constraints into the final sequence of deferred units
    pub fn into_ordered(self) -> ContributionResult<Vec<DeferredContribution>> {
        let mut orderer = Orderer::new();
        for entry in self.entries {
            let mut constraints = Vec::with_capacity(entry.constraints.len());
            for raw in &entry.constraints {
                constraints.push(OrderConstraint::parse(raw)?);
            }
            orderer.add(entry.id, entry.value, constraints);
        }
        orderer.into_ordered()
    }
}

impl OrderedConfiguration for OrderedCollector {
    fn add(&mut self, id: &str, value: DeferredContribution, constraints: &[String]) {
        self.entries.push(OrderedEntry {
            id: id.to_string(),
            value,
            constraints: constraints.to_vec(),
        });
    }
}

/// Collects keyed contributions; the first contribution wins a key
#[derive(Debug, Default)]
pub struct MappedCollector {
    entries: FxHashMap<String, DeferredContribution>,
}

impl MappedCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a contribution by key
    pub fn get(&self, key: &str) -> Option<&DeferredContribution> {
        self.entries.get(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been contributed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the collector, yielding the key/unit mapping
    pub fn into_map(self) -> FxHashMap<String, DeferredContribution> {
        self.entries
    }
}

impl MappedConfiguration for MappedCollector {
    fn add(&mut self, key: &str, value: DeferredContribution) {
        if self.entries.contains_key(key) {
            log::warn!(
                "mapped contribution key {key} already taken; contribution from {} is dropped",
                value.method_id()
            );
            return;
        }
        self.entries.insert(key.to_string(), value);
    }
}

/// A shape-tagged configuration point for a named service
#[derive(Debug)]
pub enum ConfigurationPoint {
    /// Plain collection
    Unordered(UnorderedCollector),
    /// Ordered collection with constraints
    Ordered(OrderedCollector),
    /// Key/value mapping
    Mapped(MappedCollector),
}

/// Registry-side table of configuration points by service id
#[derive(Debug, Default)]
pub struct ConfigurationPoints {
    points: FxHashMap<String, ConfigurationPoint>,
}

impl ConfigurationPoints {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a service's configuration point
    pub fn declare(&mut self, service_id: impl Into<String>, point: ConfigurationPoint) {
        self.points.insert(service_id.into(), point);
    }

    /// Declare an unordered point for `service_id`
    pub fn declare_unordered(&mut self, service_id: impl Into<String>) {
        self.declare(
            service_id,
            ConfigurationPoint::Unordered(UnorderedCollector::new()),
        );
    }

    /// Declare an ordered point for `service_id`
    pub fn declare_ordered(&mut self, service_id: impl Into<String>) {
        self.declare(
            service_id,
            ConfigurationPoint::Ordered(OrderedCollector::new()),
        );
    }

    /// Declare a mapped point for `service_id`
    pub fn declare_mapped(&mut self, service_id: impl Into<String>) {
        self.declare(service_id, ConfigurationPoint::Mapped(MappedCollector::new()));
    }

    /// Whether a point exists for `service_id`
    pub fn contains(&self, service_id: &str) -> bool {
        self.points.contains_key(service_id)
    }

    /// Mutable access to a service's point
    pub fn get_mut(&mut self, service_id: &str) -> Option<&mut ConfigurationPoint> {
        self.points.get_mut(service_id)
    }

    /// Remove and return a service's point for consumption
    pub fn take(&mut self, service_id: &str) -> Option<ConfigurationPoint> {
        self.points.remove(service_id)
    }
}
