//! Contributor methods and deferred contributions
//!
//! A contributor method targets a named service's configuration point. The
//! adapter resolves its call target and parameters up front, producing a
//! deferred zero-argument unit that the registry invokes at most once during
//! assembly. Failures carry the contributor method and service identity.

use std::fmt;
use std::sync::Arc;

use crate::configuration::{
    Configuration, ConfigurationPoint, ConfigurationPoints, MappedConfiguration,
    OrderedConfiguration,
};
use crate::module::ModuleBuilderSource;
use crate::resources::{Resource, ResourceMap, ResourceRequest, ServiceLogger};
use crate::{BoxError, ContributionError, ContributionResult};

/// Callable body of a contributor method.
///
/// The target is the module builder instance for instance methods and `None`
/// for static ones; the arguments are the parameters resolved at build time,
/// in declaration order.
pub type ContributorBody =
    Arc<dyn Fn(Option<&Resource>, &[Resource]) -> Result<(), BoxError> + Send + Sync>;

/// A discovered contributor method targeting a named service configuration
pub struct ContributorMethod {
    declaring_module: String,
    name: String,
    service_id: String,
    optional: bool,
    id: Option<String>,
    constraints: Vec<String>,
    markers: Vec<String>,
    is_static: bool,
    parameters: Vec<ResourceRequest>,
    body: ContributorBody,
}

impl ContributorMethod {
    /// An instance contributor method with no parameters or constraints
    pub fn new(
        declaring_module: impl Into<String>,
        name: impl Into<String>,
        service_id: impl Into<String>,
        body: ContributorBody,
    ) -> Self {
        Self {
            declaring_module: declaring_module.into(),
            name: name.into(),
            service_id: service_id.into(),
            optional: false,
            id: None,
            constraints: Vec::new(),
            markers: Vec::new(),
            is_static: false,
            parameters: Vec::new(),
            body,
        }
    }

    /// Mark the contribution optional: a missing configuration point is
    /// silently skipped instead of failing
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set an explicit contribution id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the ordering constraints supplied to ordered points
    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the ownership markers
    pub fn with_markers(mut self, markers: Vec<String>) -> Self {
        self.markers = markers;
        self
    }

    /// Mark the method static: no module builder instance is resolved
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Declare the method's formal parameters, in declaration order
    pub fn with_parameters(mut self, parameters: Vec<ResourceRequest>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The target service id
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Whether a missing configuration point is tolerated
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Ownership markers
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Raw ordering constraints
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    /// `Module.method` identifier used in diagnostics
    pub fn method_id(&self) -> String {
        format!("{}.{}", self.declaring_module, self.name)
    }

    /// Contribution id: the explicit id when present and non-empty, else
    /// `Module.method`
    pub fn contribution_id(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.method_id(),
        }
    }

    /// Build the deferred unit: resolve the call target and every parameter
    /// now, so configuration mistakes surface at build time rather than when
    /// the unit eventually runs.
    ///
    /// The lookup chain is the caller's resources plus the resource pool
    /// itself and a [`ServiceLogger`] tagged with the target service.
    pub fn build(
        &self,
        source: &dyn ModuleBuilderSource,
        resources: &ResourceMap,
    ) -> ContributionResult<DeferredContribution> {
        let mut seeded = resources.clone();
        seeded.provide(resources.clone());
        seeded.provide(ServiceLogger::new(&self.service_id));

        let target = if self.is_static {
            None
        } else {
            Some(source.module_builder())
        };

        let mut arguments = Vec::with_capacity(self.parameters.len());
        for request in &self.parameters {
            match seeded.find_raw(request) {
                Some(value) => arguments.push(value),
                None => {
                    return Err(ContributionError::UnresolvedParameter {
                        parameter: request.type_name().to_string(),
                        method: self.method_id(),
                    });
                }
            }
        }

        log::trace!(
            "built contribution {} for service {}",
            self.method_id(),
            self.service_id
        );

        Ok(DeferredContribution {
            method_id: self.method_id(),
            service_id: self.service_id.clone(),
            target,
            arguments,
            body: self.body.clone(),
        })
    }

    /// Register into an unordered point
    pub fn contribute_unordered(
        &self,
        source: &dyn ModuleBuilderSource,
        resources: &ResourceMap,
        configuration: &mut dyn Configuration,
    ) -> ContributionResult<()> {
        configuration.add(self.build(source, resources)?);
        Ok(())
    }

    /// Register into an ordered point: contribution id, unit, constraints
    pub fn contribute_ordered(
        &self,
        source: &dyn ModuleBuilderSource,
        resources: &ResourceMap,
        configuration: &mut dyn OrderedConfiguration,
    ) -> ContributionResult<()> {
        configuration.add(
            &self.contribution_id(),
            self.build(source, resources)?,
            &self.constraints,
        );
        Ok(())
    }

    /// Register into a mapped point, keyed by the contribution id
    pub fn contribute_mapped(
        &self,
        source: &dyn ModuleBuilderSource,
        resources: &ResourceMap,
        configuration: &mut dyn MappedConfiguration,
    ) -> ContributionResult<()> {
        configuration.add(&self.contribution_id(), self.build(source, resources)?);
        Ok(())
    }

    /// Registry-facing entry: find the target service's configuration point
    /// and contribute by its shape.
    ///
    /// A missing point is a silent skip for optional contributions and a
    /// fatal error otherwise.
    pub fn contribute_to(
        &self,
        points: &mut ConfigurationPoints,
        source: &dyn ModuleBuilderSource,
        resources: &ResourceMap,
    ) -> ContributionResult<()> {
        match points.get_mut(&self.service_id) {
            None if self.optional => {
                log::debug!(
                    "skipping optional contribution {}: service {} has no configuration point",
                    self.method_id(),
                    self.service_id
                );
                Ok(())
            }
            None => Err(ContributionError::NoSuchConfigurationPoint {
                service_id: self.service_id.clone(),
                method: self.method_id(),
            }),
            Some(ConfigurationPoint::Unordered(point)) => {
                self.contribute_unordered(source, resources, point)
            }
            Some(ConfigurationPoint::Ordered(point)) => {
                self.contribute_ordered(source, resources, point)
            }
            Some(ConfigurationPoint::Mapped(point)) => {
                self.contribute_mapped(source, resources, point)
            }
        }
    }
}

impl fmt::Debug for ContributorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributorMethod")
            .field("method", &self.method_id())
            .field("service_id", &self.service_id)
            .field("optional", &self.optional)
            .field("is_static", &self.is_static)
            .field("parameters", &self.parameters.len())
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// A resolved, ready-to-invoke unit of contribution work.
///
/// Invoked at most once by the registry during assembly; invoking consumes
/// the unit.
pub struct DeferredContribution {
    method_id: String,
    service_id: String,
    target: Option<Resource>,
    arguments: Vec<Resource>,
    body: ContributorBody,
}

impl DeferredContribution {
    /// Identifier of the contributor method behind this unit
    pub fn method_id(&self) -> &str {
        &self.method_id
    }

    /// The service this unit contributes to
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Invoke the contributor method with its resolved target and arguments.
    ///
    /// Any failure is re-wrapped with the contributor method and service
    /// identity, never swallowed.
    pub fn invoke(self) -> ContributionResult<()> {
        (self.body)(self.target.as_ref(), &self.arguments).map_err(|source| {
            ContributionError::ContributionFailed {
                method: self.method_id,
                service_id: self.service_id,
                source,
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(method_id: &str, service_id: &str) -> Self {
        Self {
            method_id: method_id.to_string(),
            service_id: service_id.to_string(),
            target: None,
            arguments: Vec::new(),
            body: Arc::new(|_, _| Ok(())),
        }
    }
}

impl fmt::Debug for DeferredContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredContribution")
            .field("method_id", &self.method_id)
            .field("service_id", &self.service_id)
            .field("has_target", &self.target.is_some())
            .field("arguments", &self.arguments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::LazyModuleSource;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn noop_body() -> ContributorBody {
        Arc::new(|_, _| Ok(()))
    }

    fn source() -> LazyModuleSource {
        LazyModuleSource::new(|| Arc::new("module".to_string()))
    }

    #[test]
    fn test_contribution_id_defaults_to_module_and_method() {
        let method = ContributorMethod::new("AppModule", "contribute_startup", "Startup", noop_body());
        assert_eq!(method.contribution_id(), "AppModule.contribute_startup");
    }

    #[test]
    fn test_explicit_contribution_id_wins() {
        let method = ContributorMethod::new("AppModule", "contribute_startup", "Startup", noop_body())
            .with_id("custom");
        assert_eq!(method.contribution_id(), "custom");
    }

    #[test]
    fn test_empty_explicit_id_falls_back() {
        let method = ContributorMethod::new("AppModule", "contribute_startup", "Startup", noop_body())
            .with_id("");
        assert_eq!(method.contribution_id(), "AppModule.contribute_startup");
    }

    #[test]
    fn test_static_method_has_no_target() {
        let saw_target = Arc::new(AtomicBool::new(false));
        let observer = saw_target.clone();
        let body: ContributorBody = Arc::new(move |target, _| {
            observer.store(target.is_some(), Ordering::SeqCst);
            Ok(())
        });

        let method =
            ContributorMethod::new("AppModule", "contribute", "Startup", body).as_static();
        let unit = method.build(&source(), &ResourceMap::new()).unwrap();
        unit.invoke().unwrap();

        assert!(!saw_target.load(Ordering::SeqCst));
    }

    #[test]
    fn test_instance_method_receives_module_builder() {
        let body: ContributorBody = Arc::new(|target, _| {
            let target = target.ok_or("expected a module builder target")?;
            let module = target
                .clone()
                .downcast::<String>()
                .map_err(|_| "wrong module type")?;
            assert_eq!(*module, "module");
            Ok(())
        });

        let method = ContributorMethod::new("AppModule", "contribute", "Startup", body);
        let unit = method.build(&source(), &ResourceMap::new()).unwrap();
        unit.invoke().unwrap();
    }

    #[test]
    fn test_parameters_resolve_at_build_time() {
        let body: ContributorBody = Arc::new(|_, arguments| {
            let value = arguments[0]
                .clone()
                .downcast::<u32>()
                .map_err(|_| "wrong parameter type")?;
            assert_eq!(*value, 7);
            Ok(())
        });

        let mut resources = ResourceMap::new();
        resources.provide(7u32);

        let method = ContributorMethod::new("AppModule", "contribute", "Startup", body)
            .with_parameters(vec![ResourceRequest::of::<u32>()]);
        method.build(&source(), &resources).unwrap().invoke().unwrap();
    }

    #[test]
    fn test_unresolved_parameter_fails_at_build_time() {
        let method = ContributorMethod::new("AppModule", "contribute", "Startup", noop_body())
            .with_parameters(vec![ResourceRequest::of::<u64>()]);

        let err = method.build(&source(), &ResourceMap::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("u64"));
        assert!(message.contains("AppModule.contribute"));
    }

    #[test]
    fn test_seeded_logger_and_resource_pool_resolve() {
        let body: ContributorBody = Arc::new(|_, arguments| {
            let logger = arguments[0]
                .clone()
                .downcast::<ServiceLogger>()
                .map_err(|_| "expected a logger")?;
            assert_eq!(logger.service_id(), "Startup");
            arguments[1]
                .clone()
                .downcast::<ResourceMap>()
                .map_err(|_| "expected the resource pool")?;
            Ok(())
        });

        let method = ContributorMethod::new("AppModule", "contribute", "Startup", body)
            .with_parameters(vec![
                ResourceRequest::of::<ServiceLogger>(),
                ResourceRequest::of::<ResourceMap>(),
            ]);
        method
            .build(&source(), &ResourceMap::new())
            .unwrap()
            .invoke()
            .unwrap();
    }

    #[test]
    fn test_invocation_failure_is_wrapped_with_identity() {
        let body: ContributorBody = Arc::new(|_, _| Err("database unreachable".into()));
        let method = ContributorMethod::new("AppModule", "contribute_startup", "Startup", body);

        let err = method
            .build(&source(), &ResourceMap::new())
            .unwrap()
            .invoke()
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("AppModule.contribute_startup"));
        assert!(message.contains("Startup"));
        assert!(std::error::Error::source(&err)
            .expect("source chained")
            .to_string()
            .contains("database unreachable"));
    }

    #[test]
    fn test_optional_contribution_skips_missing_point() {
        let method = ContributorMethod::new("AppModule", "contribute", "Missing", noop_body())
            .optional();

        let mut points = ConfigurationPoints::new();
        method
            .contribute_to(&mut points, &source(), &ResourceMap::new())
            .unwrap();
    }

    #[test]
    fn test_required_contribution_fails_on_missing_point() {
        let method = ContributorMethod::new("AppModule", "contribute", "Missing", noop_body());

        let mut points = ConfigurationPoints::new();
        let err = method
            .contribute_to(&mut points, &source(), &ResourceMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }
}
