//! Glue job declarations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use datajob_core::iam::{self, Role};
use datajob_core::resource::{DataJobResource, ResourceInfo, ResourceKind};
use datajob_core::{DataJobStack, Result};

/// Service principal Glue jobs run under.
pub const GLUE_SERVICE_PRINCIPAL: &str = "glue.amazonaws.com";

/// The flavor of a Glue job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlueJobType {
    PythonShell,
    GlueEtl,
}

impl GlueJobType {
    /// The glue version each flavor defaults to.
    fn default_glue_version(self) -> &'static str {
        match self {
            GlueJobType::PythonShell => "1.0",
            GlueJobType::GlueEtl => "2.0",
        }
    }
}

impl std::fmt::Display for GlueJobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlueJobType::PythonShell => write!(f, "pythonshell"),
            GlueJobType::GlueEtl => write!(f, "glueetl"),
        }
    }
}

/// A declared Glue job: a script under the project root plus its runtime
/// settings. Declaration data only; nothing here talks to AWS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlueJob {
    info: ResourceInfo,
    role: Role,
    job_type: GlueJobType,
    job_path: PathBuf,
    python_version: String,
    glue_version: String,
    max_capacity: Option<f64>,
    arguments: HashMap<String, String>,
}

impl GlueJob {
    /// Start declaring a Glue job running the script at `job_path`, relative
    /// to the stack's project root.
    pub fn builder(name: impl Into<String>, job_path: impl Into<PathBuf>) -> GlueJobBuilder {
        GlueJobBuilder::new(name, job_path)
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn job_type(&self) -> GlueJobType {
        self.job_type
    }

    pub fn job_path(&self) -> &std::path::Path {
        &self.job_path
    }

    pub fn python_version(&self) -> &str {
        &self.python_version
    }

    pub fn glue_version(&self) -> &str {
        &self.glue_version
    }

    pub fn max_capacity(&self) -> Option<f64> {
        self.max_capacity
    }

    pub fn arguments(&self) -> &HashMap<String, String> {
        &self.arguments
    }
}

impl DataJobResource for GlueJob {
    fn info(&self) -> &ResourceInfo {
        &self.info
    }
}

/// Builder for [`GlueJob`].
pub struct GlueJobBuilder {
    name: String,
    job_path: PathBuf,
    role: Option<Role>,
    job_type: GlueJobType,
    python_version: String,
    glue_version: Option<String>,
    max_capacity: Option<f64>,
    arguments: HashMap<String, String>,
}

impl GlueJobBuilder {
    fn new(name: impl Into<String>, job_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            job_path: job_path.into(),
            role: None,
            job_type: GlueJobType::PythonShell,
            python_version: "3".to_string(),
            glue_version: None,
            max_capacity: None,
            arguments: HashMap::new(),
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn job_type(mut self, job_type: GlueJobType) -> Self {
        self.job_type = job_type;
        self
    }

    pub fn python_version(mut self, version: impl Into<String>) -> Self {
        self.python_version = version.into();
        self
    }

    pub fn glue_version(mut self, version: impl Into<String>) -> Self {
        self.glue_version = Some(version.into());
        self
    }

    pub fn max_capacity(mut self, capacity: f64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    pub fn argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Register the job on the stack and resolve its role.
    pub fn build(self, stack: &mut DataJobStack) -> Result<GlueJob> {
        let info = stack.register(ResourceKind::GlueJob, &self.name)?;
        let role = iam::get_role(stack, self.role, info.unique_name(), GLUE_SERVICE_PRINCIPAL)?;
        let glue_version = self
            .glue_version
            .unwrap_or_else(|| self.job_type.default_glue_version().to_string());
        debug!(job = %info.unique_name(), job_type = %self.job_type, "declared glue job");

        Ok(GlueJob {
            info,
            role,
            job_type: self.job_type,
            job_path: self.job_path,
            python_version: self.python_version,
            glue_version,
            max_capacity: self.max_capacity,
            arguments: self.arguments,
        })
    }
}
