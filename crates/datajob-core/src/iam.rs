//! Declaration-level IAM roles and default-role resolution.
//!
//! Roles are declaration data only; policy semantics and provisioning belong
//! to the surrounding infrastructure framework.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::stack::DataJobStack;
use crate::{Error, Result};

/// The AWS managed policy granting administrator-level access.
pub const ADMINISTRATOR_ACCESS: &str = "AdministratorAccess";

/// A service principal that may assume a role, e.g. `glue.amazonaws.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct ServicePrincipal(String);

impl ServicePrincipal {
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An AWS managed policy referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct ManagedPolicy(String);

impl ManagedPolicy {
    pub fn from_aws_managed_policy_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An access-control role declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    assumed_by: ServicePrincipal,
    managed_policies: Vec<ManagedPolicy>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        assumed_by: ServicePrincipal,
        managed_policies: Vec<ManagedPolicy>,
    ) -> Self {
        Self {
            name: name.into(),
            assumed_by,
            managed_policies,
        }
    }

    /// The broad-privilege default: a role carrying `AdministratorAccess`.
    pub fn admin(name: impl Into<String>, assumed_by: ServicePrincipal) -> Self {
        Self::new(
            name,
            assumed_by,
            vec![ManagedPolicy::from_aws_managed_policy_name(
                ADMINISTRATOR_ACCESS,
            )],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assumed_by(&self) -> &ServicePrincipal {
        &self.assumed_by
    }

    pub fn managed_policies(&self) -> &[ManagedPolicy] {
        &self.managed_policies
    }

    pub fn is_admin(&self) -> bool {
        self.managed_policies
            .iter()
            .any(|policy| policy.as_str() == ADMINISTRATOR_ACCESS)
    }
}

/// Synthesize the default admin role for a resource.
pub fn default_admin_role(unique_name: &str, service_principal: &str) -> Role {
    let role_name = format!("{unique_name}-default-role");
    debug!(role = %role_name, "creating role");
    Role::admin(role_name, ServicePrincipal::new(service_principal))
}

/// Resolve the role for a resource: a caller-supplied role is returned
/// unchanged; otherwise the default admin role is synthesized, provided the
/// stack has opted into it.
pub fn get_role(
    stack: &DataJobStack,
    role: Option<Role>,
    unique_name: &str,
    service_principal: &str,
) -> Result<Role> {
    if let Some(role) = role {
        return Ok(role);
    }
    if !stack.allow_default_admin_role() {
        return Err(Error::RoleRequired(unique_name.to_string()));
    }
    warn!(
        resource = %unique_name,
        "no role provided, taking the default role with AdministratorAccess"
    );
    Ok(default_admin_role(unique_name, service_principal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_role_is_returned_unchanged() {
        let stack = DataJobStack::builder("data-pipeline")
            .allow_default_admin_role(false)
            .build();
        let role = Role::new(
            "my-role",
            ServicePrincipal::new("glue.amazonaws.com"),
            vec![ManagedPolicy::from_aws_managed_policy_name(
                "AWSGlueServiceRole",
            )],
        );
        let resolved = get_role(
            &stack,
            Some(role.clone()),
            "data-pipeline-my-job",
            "glue.amazonaws.com",
        )
        .unwrap();
        assert_eq!(resolved, role);
        assert!(!resolved.is_admin());
    }

    #[test]
    fn test_default_role_requires_opt_in() {
        let stack = DataJobStack::builder("data-pipeline")
            .allow_default_admin_role(false)
            .build();
        let err = get_role(&stack, None, "data-pipeline-my-job", "glue.amazonaws.com").unwrap_err();
        assert!(matches!(err, Error::RoleRequired(name) if name == "data-pipeline-my-job"));
    }

    #[test]
    fn test_default_role_is_admin_when_opted_in() {
        let stack = DataJobStack::builder("data-pipeline")
            .allow_default_admin_role(true)
            .build();
        let role = get_role(&stack, None, "data-pipeline-my-job", "glue.amazonaws.com").unwrap();
        assert_eq!(role.name(), "data-pipeline-my-job-default-role");
        assert_eq!(role.assumed_by().as_str(), "glue.amazonaws.com");
        assert!(role.is_admin());
    }
}
