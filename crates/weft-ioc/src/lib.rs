//! Weft IoC contribution collection
//!
//! Adapts contributor methods into deferred units of configuration work:
//! - Typed injection resources for build-time parameter resolution
//! - Module builder sources for instance (non-static) contributors
//! - The three configuration sink shapes (unordered, ordered, mapped)
//! - Constraint-driven ordering of ordered contributions
//!
//! Service creation, proxying, and lifecycles live in the surrounding
//! registry; this crate only covers how contributions are collected.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod configuration;
pub mod contribution;
pub mod module;
pub mod orderer;
pub mod resources;

pub use configuration::{
    Configuration, ConfigurationPoint, ConfigurationPoints, MappedCollector, MappedConfiguration,
    OrderedCollector, OrderedConfiguration, OrderedEntry, UnorderedCollector,
};
pub use contribution::{ContributorBody, ContributorMethod, DeferredContribution};
pub use module::{LazyModuleSource, ModuleBuilderSource};
pub use orderer::{OrderConstraint, Orderer};
pub use resources::{Resource, ResourceMap, ResourceRequest, ServiceLogger};

/// Boxed error produced by a contributor method body
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building, ordering, or invoking contributions
#[derive(Debug, thiserror::Error)]
pub enum ContributionError {
    /// A required contributor parameter could not be resolved at build time
    #[error("Cannot resolve parameter {parameter} of contributor method {method}: no resource of that type is available")]
    UnresolvedParameter {
        /// Requested parameter type name
        parameter: String,
        /// Identifier of the contributor method
        method: String,
    },

    /// The target service has no configuration point
    #[error("Service {service_id} has no configuration point to contribute to (required by {method})")]
    NoSuchConfigurationPoint {
        /// The target service id
        service_id: String,
        /// Identifier of the contributor method
        method: String,
    },

    /// A contributor method failed while being invoked
    #[error("Contribution of method {method} to service {service_id} failed: {source}")]
    ContributionFailed {
        /// Identifier of the contributor method
        method: String,
        /// The target service id
        service_id: String,
        /// The underlying failure
        #[source]
        source: BoxError,
    },

    /// A constraint string could not be parsed
    #[error("Invalid ordering constraint \"{0}\": expected after:<id> or before:<id>")]
    InvalidConstraint(String),

    /// Ordering constraints form a cycle
    #[error("Contribution ordering cycle involving: {0}")]
    OrderingCycle(String),
}

/// Contribution result
pub type ContributionResult<T> = Result<T, ContributionError>;
