//! Run-time execution-input placeholders.
//!
//! Pipeline steps sometimes need values that only exist once a state machine
//! run starts (a training job name, for instance). Instead of a concrete
//! value, such a step receives a placeholder keyed by its unique name; the
//! accumulated schema of placeholders is published as a single stack output
//! so the caller starting an execution knows which inputs to supply.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Fixed key of the stack output listing the registered placeholder names.
pub const DATAJOB_EXECUTION_INPUT: &str = "DatajobExecutionInput";

/// Value type of a placeholder. Only strings are supported today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    String,
}

/// Accessor into the shared execution-input bundle, keyed by logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInputRef {
    key: String,
}

impl ExecutionInputRef {
    fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The logical name this accessor resolves at run time.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The Step Functions runtime path for this placeholder.
    pub fn path(&self) -> String {
        format!("$$.Execution.Input['{}']", self.key)
    }
}

impl std::fmt::Display for ExecutionInputRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// The shared placeholder bundle, rebuilt from the full schema on every
/// insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInput {
    schema: IndexMap<String, PlaceholderKind>,
}

impl ExecutionInput {
    /// Build a bundle from a schema snapshot.
    pub fn new(schema: IndexMap<String, PlaceholderKind>) -> Self {
        Self { schema }
    }

    /// Accessor for a registered logical name, if present.
    pub fn get(&self, key: &str) -> Option<ExecutionInputRef> {
        self.schema.get(key).map(|_| ExecutionInputRef::new(key))
    }

    /// Registered logical names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }
}

/// An argument handed to a pipeline step: either supplied at declaration time
/// or deferred to execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobArgument {
    /// A concrete value supplied by the caller.
    Literal(String),
    /// A value resolved from the execution input at run time.
    Placeholder(ExecutionInputRef),
}

impl JobArgument {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, JobArgument::Placeholder(_))
    }

    /// The textual form a state machine definition would embed: the literal
    /// itself, or the runtime path of the placeholder.
    pub fn render(&self) -> String {
        match self {
            JobArgument::Literal(value) => value.clone(),
            JobArgument::Placeholder(reference) => reference.path(),
        }
    }
}

impl std::fmt::Display for JobArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Registry of deferred execution inputs for one stack assembly.
///
/// A logical name may be registered at most once; the first writer wins and a
/// second deferred registration is an error. Explicit arguments pass through
/// without touching the registry.
#[derive(Debug, Clone, Default)]
pub struct ExecutionInputRegistry {
    schema: IndexMap<String, PlaceholderKind>,
    bundle: Option<ExecutionInput>,
}

impl ExecutionInputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an argument: pass an explicit value through unchanged, or
    /// register `logical_name` as a deferred placeholder and return an
    /// accessor for it.
    pub fn resolve(&mut self, logical_name: &str, argument: Option<String>) -> Result<JobArgument> {
        if let Some(value) = argument {
            debug!(logical_name, value = %value, "argument provided, passing it through");
            return Ok(JobArgument::Literal(value));
        }

        if self.schema.contains_key(logical_name) {
            return Err(Error::DuplicateExecutionInput(logical_name.to_string()));
        }

        debug!(logical_name, "no argument provided, deferring to an execution input");
        self.schema
            .insert(logical_name.to_string(), PlaceholderKind::String);
        let bundle = ExecutionInput::new(self.schema.clone());
        let reference = bundle
            .get(logical_name)
            .ok_or_else(|| Error::Configuration(format!("missing entry '{logical_name}'")))?;
        self.bundle = Some(bundle);

        Ok(JobArgument::Placeholder(reference))
    }

    /// The bundle rebuilt at the last deferred registration, if any.
    pub fn bundle(&self) -> Option<&ExecutionInput> {
        self.bundle.as_ref()
    }

    /// Registered logical names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.keys().map(String::as_str)
    }

    /// The registered names serialized as a JSON array, in insertion order.
    pub fn schema_keys_json(&self) -> Result<String> {
        let keys: Vec<&str> = self.keys().collect();
        Ok(serde_json::to_string(&keys)?)
    }

    pub fn len(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_argument_passes_through() {
        let mut registry = ExecutionInputRegistry::new();
        let resolved = registry
            .resolve("stack-task", Some("run-42".to_string()))
            .unwrap();
        assert_eq!(resolved, JobArgument::Literal("run-42".to_string()));
        assert!(registry.is_empty());
        assert!(registry.bundle().is_none());
    }

    #[test]
    fn test_missing_argument_becomes_placeholder() {
        let mut registry = ExecutionInputRegistry::new();
        let resolved = registry.resolve("stack-task", None).unwrap();
        match resolved {
            JobArgument::Placeholder(reference) => {
                assert_eq!(reference.key(), "stack-task");
                assert_eq!(reference.path(), "$$.Execution.Input['stack-task']");
            }
            other => panic!("expected a placeholder, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_deferred_registration_fails() {
        let mut registry = ExecutionInputRegistry::new();
        registry.resolve("stack-task", None).unwrap();
        let err = registry.resolve("stack-task", None).unwrap_err();
        assert!(matches!(err, Error::DuplicateExecutionInput(name) if name == "stack-task"));
    }

    #[test]
    fn test_explicit_argument_never_conflicts() {
        let mut registry = ExecutionInputRegistry::new();
        registry.resolve("stack-task", None).unwrap();
        let resolved = registry
            .resolve("stack-task", Some("explicit".to_string()))
            .unwrap();
        assert_eq!(resolved, JobArgument::Literal("explicit".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bundle_grows_with_schema() {
        let mut registry = ExecutionInputRegistry::new();
        registry.resolve("first", None).unwrap();
        registry.resolve("second", None).unwrap();

        let bundle = registry.bundle().unwrap();
        assert_eq!(bundle.len(), 2);
        assert!(bundle.get("first").is_some());
        assert!(bundle.get("second").is_some());
        assert!(bundle.get("third").is_none());
    }

    #[test]
    fn test_schema_keys_json_preserves_order() {
        let mut registry = ExecutionInputRegistry::new();
        registry.resolve("b-task", None).unwrap();
        registry.resolve("a-task", None).unwrap();
        registry.resolve("c-task", None).unwrap();
        assert_eq!(
            registry.schema_keys_json().unwrap(),
            r#"["b-task","a-task","c-task"]"#
        );
    }

    #[test]
    fn test_job_argument_render() {
        let literal = JobArgument::Literal("my-job".to_string());
        assert_eq!(literal.render(), "my-job");
        assert!(!literal.is_placeholder());

        let mut registry = ExecutionInputRegistry::new();
        let placeholder = registry.resolve("task", None).unwrap();
        assert_eq!(placeholder.render(), "$$.Execution.Input['task']");
        assert!(placeholder.is_placeholder());
    }
}
