//! Resource registration primitives.
//!
//! Every buildable unit (a glue job, a sagemaker task, a workflow) registers
//! with its owning stack at construction time and embeds the base data handed
//! back. Resources are never mutated after construction.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The kind of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    GlueJob,
    SagemakerTask,
    Workflow,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::GlueJob => write!(f, "glue_job"),
            ResourceKind::SagemakerTask => write!(f, "sagemaker_task"),
            ResourceKind::Workflow => write!(f, "workflow"),
        }
    }
}

/// Base data every declared resource embeds.
///
/// Only obtainable through [`crate::DataJobStack::register`], which derives
/// the unique name from the stack prefix; there is no way to set it
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    kind: ResourceKind,
    name: String,
    unique_name: String,
    stage: Option<String>,
    project_root: Option<PathBuf>,
}

impl ResourceInfo {
    pub(crate) fn new(
        kind: ResourceKind,
        name: String,
        unique_name: String,
        stage: Option<String>,
        project_root: Option<PathBuf>,
    ) -> Self {
        Self {
            kind,
            name,
            unique_name,
            stage,
            project_root,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stack-prefixed name, `{unique_stack_name}-{name}`.
    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}

/// Registration record kept by the stack for each declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredResource {
    pub kind: ResourceKind,
    pub name: String,
    pub unique_name: String,
}

/// Any buildable unit attached to a stack.
pub trait DataJobResource {
    /// The base data handed back by the stack at registration.
    fn info(&self) -> &ResourceInfo;

    fn name(&self) -> &str {
        self.info().name()
    }

    fn unique_name(&self) -> &str {
        self.info().unique_name()
    }

    fn kind(&self) -> ResourceKind {
        self.info().kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::GlueJob.to_string(), "glue_job");
        assert_eq!(ResourceKind::SagemakerTask.to_string(), "sagemaker_task");
        assert_eq!(ResourceKind::Workflow.to_string(), "workflow");
    }
}
