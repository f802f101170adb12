//! Step Functions workflow declarations.
//!
//! A workflow chains previously declared tasks into ordered stages; a stage
//! runs one task or a set of tasks in parallel. Execution belongs to the
//! external orchestrator, so the declaration only carries the ordering and
//! the uniquified state machine name.

use serde::{Deserialize, Serialize};
use tracing::debug;

use datajob_core::resource::{DataJobResource, ResourceInfo, ResourceKind};
use datajob_core::{DataJobStack, Result};

/// One stage of a workflow, referencing tasks by their unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Task(String),
    Parallel(Vec<String>),
}

/// A declared Step Functions workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepfunctionsWorkflow {
    info: ResourceInfo,
    state_machine_name: String,
    stages: Vec<WorkflowStage>,
}

impl StepfunctionsWorkflow {
    pub fn builder(name: impl Into<String>) -> StepfunctionsWorkflowBuilder {
        StepfunctionsWorkflowBuilder::new(name)
    }

    /// The timestamp-suffixed state machine name.
    pub fn state_machine_name(&self) -> &str {
        &self.state_machine_name
    }

    pub fn stages(&self) -> &[WorkflowStage] {
        &self.stages
    }

    /// Serialize the ordered stages for the external orchestrator.
    pub fn definition(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.stages)?)
    }
}

impl DataJobResource for StepfunctionsWorkflow {
    fn info(&self) -> &ResourceInfo {
        &self.info
    }
}

/// Builder for [`StepfunctionsWorkflow`].
pub struct StepfunctionsWorkflowBuilder {
    name: String,
    stages: Vec<WorkflowStage>,
}

impl StepfunctionsWorkflowBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage running a single task.
    pub fn task(mut self, task: &dyn DataJobResource) -> Self {
        self.stages
            .push(WorkflowStage::Task(task.unique_name().to_string()));
        self
    }

    /// Append a stage running several tasks in parallel.
    pub fn parallel(mut self, tasks: &[&dyn DataJobResource]) -> Self {
        self.stages.push(WorkflowStage::Parallel(
            tasks
                .iter()
                .map(|task| task.unique_name().to_string())
                .collect(),
        ));
        self
    }

    /// Register the workflow on the stack and uniquify its state machine
    /// name with the stack-wide naming timestamp.
    pub fn build(self, stack: &mut DataJobStack) -> Result<StepfunctionsWorkflow> {
        let info = stack.register(ResourceKind::Workflow, &self.name)?;
        let state_machine_name = stack.naming().generate(info.unique_name());
        debug!(
            workflow = %info.unique_name(),
            state_machine = %state_machine_name,
            stages = self.stages.len(),
            "declared workflow"
        );
        Ok(StepfunctionsWorkflow {
            info,
            state_machine_name,
            stages: self.stages,
        })
    }
}
