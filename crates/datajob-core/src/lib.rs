//! Core domain types for declaring AWS data pipelines.
//!
//! This crate contains:
//! - The stack context that declared resources register into
//! - Unique, length-bounded resource naming
//! - Run-time execution-input placeholders
//! - Declaration-level IAM roles and default-role resolution
//!
//! The cloud resource graph itself, IAM policy semantics, and state machine
//! execution are external collaborators; everything here is declaration-time
//! data assembled once, synchronously, by a single caller.

pub mod error;
pub mod execution_input;
pub mod iam;
pub mod naming;
pub mod resource;
pub mod stack;

pub use error::{Error, Result};
pub use stack::DataJobStack;
