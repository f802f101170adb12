//! The stack context owning declared resources and their outputs.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::debug;

use crate::execution_input::{DATAJOB_EXECUTION_INPUT, ExecutionInputRegistry, JobArgument};
use crate::naming::UniqueNameGenerator;
use crate::resource::{RegisteredResource, ResourceInfo, ResourceKind};
use crate::{Error, Result};

/// Environment variable supplying the deployment stage when the builder does
/// not set one.
pub const STAGE_ENV_VAR: &str = "DATAJOB_STAGE";

/// Environment variable opting into the default admin role (`1` or `true`).
pub const DEFAULT_ADMIN_ROLE_ENV_VAR: &str = "DATAJOB_ALLOW_DEFAULT_ADMIN_ROLE";

/// The owning container for one set of declared pipeline resources.
///
/// Created once per deployment; resources register into it at construction
/// time and are owned exclusively by it. The execution-input registry and the
/// name generator live here, so two stacks assembled in one process are fully
/// independent.
#[derive(Debug)]
pub struct DataJobStack {
    name: String,
    stage: Option<String>,
    unique_stack_name: String,
    project_root: Option<PathBuf>,
    allow_default_admin_role: bool,
    resources: Vec<RegisteredResource>,
    outputs: IndexMap<String, String>,
    execution_input: ExecutionInputRegistry,
    naming: UniqueNameGenerator,
}

impl DataJobStack {
    /// A stack with defaults: stage and the admin-role opt-in read from the
    /// environment, naming timestamp captured now.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> DataJobStackBuilder {
        DataJobStackBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// The stack-level name prefix: `{name}-{stage}`, or `{name}` when no
    /// stage is set.
    pub fn unique_stack_name(&self) -> &str {
        &self.unique_stack_name
    }

    pub fn project_root(&self) -> Option<&std::path::Path> {
        self.project_root.as_deref()
    }

    pub fn allow_default_admin_role(&self) -> bool {
        self.allow_default_admin_role
    }

    /// Resources registered so far, in declaration order.
    pub fn resources(&self) -> &[RegisteredResource] {
        &self.resources
    }

    /// The externally visible output set.
    pub fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    /// The stack-wide name generator; its timestamp was captured when the
    /// stack was built.
    pub fn naming(&self) -> &UniqueNameGenerator {
        &self.naming
    }

    pub fn execution_input(&self) -> &ExecutionInputRegistry {
        &self.execution_input
    }

    /// Register a resource and hand back the base data it embeds.
    ///
    /// The unique name is derived as `{unique_stack_name}-{name}`. The
    /// construct tree requires unique ids per scope, so a duplicate resource
    /// name is rejected.
    pub fn register(&mut self, kind: ResourceKind, name: &str) -> Result<ResourceInfo> {
        if self.resources.iter().any(|resource| resource.name == name) {
            return Err(Error::Configuration(format!(
                "resource '{}' is already registered on stack '{}'",
                name, self.unique_stack_name
            )));
        }
        let unique_name = format!("{}-{}", self.unique_stack_name, name);
        debug!(resource = %name, unique_name = %unique_name, kind = %kind, "registering resource");
        self.resources.push(RegisteredResource {
            kind,
            name: name.to_string(),
            unique_name: unique_name.clone(),
        });
        Ok(ResourceInfo::new(
            kind,
            name.to_string(),
            unique_name,
            self.stage.clone(),
            self.project_root.clone(),
        ))
    }

    /// Insert or overwrite an externally visible output.
    pub fn set_output(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.outputs.insert(key.into(), value.into());
    }

    /// Resolve a step argument against the execution-input registry and, when
    /// a placeholder was registered, publish the refreshed key list under the
    /// [`DATAJOB_EXECUTION_INPUT`] output.
    pub fn resolve_execution_input(
        &mut self,
        logical_name: &str,
        argument: Option<String>,
    ) -> Result<JobArgument> {
        let resolved = self.execution_input.resolve(logical_name, argument)?;
        if resolved.is_placeholder() {
            let keys = self.execution_input.schema_keys_json()?;
            self.set_output(DATAJOB_EXECUTION_INPUT, keys);
        }
        Ok(resolved)
    }
}

/// Builder for [`DataJobStack`].
pub struct DataJobStackBuilder {
    name: String,
    stage: Option<String>,
    project_root: Option<PathBuf>,
    allow_default_admin_role: Option<bool>,
    timestamp: Option<DateTime<Utc>>,
}

impl DataJobStackBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: None,
            project_root: None,
            allow_default_admin_role: None,
            timestamp: None,
        }
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(project_root.into());
        self
    }

    /// Opt into synthesizing a broad-privilege default role for resources
    /// declared without one.
    pub fn allow_default_admin_role(mut self, allow: bool) -> Self {
        self.allow_default_admin_role = Some(allow);
        self
    }

    /// Fix the naming timestamp instead of capturing the current time.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> DataJobStack {
        let stage = self
            .stage
            .or_else(|| std::env::var(STAGE_ENV_VAR).ok().filter(|s| !s.is_empty()));
        let allow_default_admin_role = self.allow_default_admin_role.unwrap_or_else(|| {
            std::env::var(DEFAULT_ADMIN_ROLE_ENV_VAR)
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        });
        let unique_stack_name = match &stage {
            Some(stage) => format!("{}-{}", self.name, stage),
            None => self.name.clone(),
        };
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        debug!(stack = %unique_stack_name, "creating stack context");

        DataJobStack {
            name: self.name,
            stage,
            unique_stack_name,
            project_root: self.project_root,
            allow_default_admin_role,
            resources: Vec::new(),
            outputs: IndexMap::new(),
            execution_input: ExecutionInputRegistry::new(),
            naming: UniqueNameGenerator::new(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stack() -> DataJobStack {
        DataJobStack::builder("data-pipeline").stage("dev").build()
    }

    #[test]
    fn test_unique_stack_name_includes_stage() {
        assert_eq!(stack().unique_stack_name(), "data-pipeline-dev");
    }

    #[test]
    fn test_unique_stack_name_without_stage() {
        let stack = DataJobStack::builder("data-pipeline").build();
        assert_eq!(stack.unique_stack_name(), "data-pipeline");
    }

    #[test]
    fn test_register_derives_unique_name() {
        let mut stack = stack();
        let info = stack.register(ResourceKind::GlueJob, "ingest").unwrap();
        assert_eq!(info.name(), "ingest");
        assert_eq!(info.unique_name(), "data-pipeline-dev-ingest");
        assert_eq!(info.stage(), Some("dev"));
        assert_eq!(stack.resources().len(), 1);
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut stack = stack();
        stack.register(ResourceKind::GlueJob, "ingest").unwrap();
        let err = stack
            .register(ResourceKind::SagemakerTask, "ingest")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_outputs_insert_and_overwrite() {
        let mut stack = stack();
        stack.set_output("Key", "first");
        stack.set_output("Key", "second");
        assert_eq!(stack.output("Key"), Some("second"));
        assert_eq!(stack.outputs().len(), 1);
    }

    #[test]
    fn test_resolve_execution_input_publishes_output() {
        let mut stack = stack();
        stack.resolve_execution_input("task-a", None).unwrap();
        assert_eq!(stack.output(DATAJOB_EXECUTION_INPUT), Some(r#"["task-a"]"#));

        stack.resolve_execution_input("task-b", None).unwrap();
        assert_eq!(
            stack.output(DATAJOB_EXECUTION_INPUT),
            Some(r#"["task-a","task-b"]"#)
        );
    }

    #[test]
    fn test_resolve_execution_input_literal_leaves_outputs_untouched() {
        let mut stack = stack();
        let resolved = stack
            .resolve_execution_input("task-a", Some("explicit".to_string()))
            .unwrap();
        assert_eq!(resolved, JobArgument::Literal("explicit".to_string()));
        assert_eq!(stack.output(DATAJOB_EXECUTION_INPUT), None);
    }

    #[test]
    fn test_stacks_keep_independent_registries() {
        let mut first = stack();
        let mut second = DataJobStack::builder("other-pipeline").stage("dev").build();
        first.resolve_execution_input("task-a", None).unwrap();
        // The same logical name registers cleanly on an unrelated stack.
        second.resolve_execution_input("task-a", None).unwrap();
        assert_eq!(first.execution_input().len(), 1);
        assert_eq!(second.execution_input().len(), 1);
    }

    #[test]
    fn test_naming_timestamp_is_fixed_per_stack() {
        let stack = DataJobStack::builder("data-pipeline")
            .timestamp(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
            .build();
        assert_eq!(
            stack.naming().generate("my-job-name"),
            "my-job-name-20230101T000000"
        );
    }
}
