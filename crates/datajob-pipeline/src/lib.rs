//! Pipeline-step declarations built on `datajob-core`.
//!
//! This crate contains:
//! - Glue job declarations
//! - SageMaker task declarations with run-time job names
//! - Step Functions workflow declarations chaining tasks into stages

pub mod glue;
pub mod sagemaker;
pub mod workflow;

pub use glue::{GlueJob, GlueJobType};
pub use sagemaker::{ProcessingStep, TrainingStep};
pub use workflow::StepfunctionsWorkflow;
