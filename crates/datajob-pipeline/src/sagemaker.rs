//! SageMaker task declarations.
//!
//! Run-time job names are deferred to execution-input placeholders unless the
//! caller supplies one explicitly: SageMaker requires job names to be unique
//! per run, so they are usually only known when an execution starts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use datajob_core::execution_input::JobArgument;
use datajob_core::iam::{self, Role};
use datajob_core::resource::{DataJobResource, ResourceInfo, ResourceKind};
use datajob_core::{DataJobStack, Result};

/// Service principal SageMaker tasks run under.
pub const SAGEMAKER_SERVICE_PRINCIPAL: &str = "sagemaker.amazonaws.com";

/// Synthesize the stack-wide default SageMaker role, named
/// `{unique_stack_name}-sagemaker` unless a name is given. Subject to the
/// stack's default-admin-role opt-in.
pub fn default_sagemaker_role(stack: &DataJobStack, name: Option<&str>) -> Result<Role> {
    let name = match name {
        Some(name) => name.to_string(),
        None => format!("{}-sagemaker", stack.unique_stack_name()),
    };
    iam::get_role(stack, None, &name, SAGEMAKER_SERVICE_PRINCIPAL)
}

/// A declared SageMaker training task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStep {
    info: ResourceInfo,
    role: Role,
    job_name: JobArgument,
    instance_type: String,
    instance_count: u32,
}

impl TrainingStep {
    pub fn builder(name: impl Into<String>) -> SagemakerStepBuilder<TrainingStep> {
        SagemakerStepBuilder::new(name, "ml.m5.xlarge")
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The job name handed to SageMaker: a literal, or a placeholder resolved
    /// from the execution input at run time.
    pub fn job_name(&self) -> &JobArgument {
        &self.job_name
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

impl DataJobResource for TrainingStep {
    fn info(&self) -> &ResourceInfo {
        &self.info
    }
}

/// A declared SageMaker processing task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStep {
    info: ResourceInfo,
    role: Role,
    job_name: JobArgument,
    instance_type: String,
    instance_count: u32,
}

impl ProcessingStep {
    pub fn builder(name: impl Into<String>) -> SagemakerStepBuilder<ProcessingStep> {
        SagemakerStepBuilder::new(name, "ml.t3.medium")
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The job name handed to SageMaker: a literal, or a placeholder resolved
    /// from the execution input at run time.
    pub fn job_name(&self) -> &JobArgument {
        &self.job_name
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

impl DataJobResource for ProcessingStep {
    fn info(&self) -> &ResourceInfo {
        &self.info
    }
}

/// Builder shared by the SageMaker task declarations.
pub struct SagemakerStepBuilder<T> {
    name: String,
    role: Option<Role>,
    job_name: Option<String>,
    instance_type: String,
    instance_count: u32,
    _marker: std::marker::PhantomData<T>,
}

impl<T> SagemakerStepBuilder<T> {
    fn new(name: impl Into<String>, default_instance_type: &str) -> Self {
        Self {
            name: name.into(),
            role: None,
            job_name: None,
            instance_type: default_instance_type.to_string(),
            instance_count: 1,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Supply the job name at declaration time instead of deferring it to the
    /// execution input.
    pub fn job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = Some(job_name.into());
        self
    }

    pub fn instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    pub fn instance_count(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }

    fn register(self, stack: &mut DataJobStack) -> Result<(ResourceInfo, Role, JobArgument, String, u32)> {
        let info = stack.register(ResourceKind::SagemakerTask, &self.name)?;
        let role = iam::get_role(
            stack,
            self.role,
            info.unique_name(),
            SAGEMAKER_SERVICE_PRINCIPAL,
        )?;
        let job_name = stack.resolve_execution_input(info.unique_name(), self.job_name)?;
        debug!(task = %info.unique_name(), "declared sagemaker task");
        Ok((info, role, job_name, self.instance_type, self.instance_count))
    }
}

impl SagemakerStepBuilder<TrainingStep> {
    /// Register the task on the stack and resolve its role and job name.
    pub fn build(self, stack: &mut DataJobStack) -> Result<TrainingStep> {
        let (info, role, job_name, instance_type, instance_count) = self.register(stack)?;
        Ok(TrainingStep {
            info,
            role,
            job_name,
            instance_type,
            instance_count,
        })
    }
}

impl SagemakerStepBuilder<ProcessingStep> {
    /// Register the task on the stack and resolve its role and job name.
    pub fn build(self, stack: &mut DataJobStack) -> Result<ProcessingStep> {
        let (info, role, job_name, instance_type, instance_count) = self.register(stack)?;
        Ok(ProcessingStep {
            info,
            role,
            job_name,
            instance_type,
            instance_count,
        })
    }
}
