//! Permission configuration for generated modules
//!
//! Permission names follow `{prefix}.{resource}.{action}`. Roles are given
//! either as a plain list (every role gets every permission) or as a map
//! from role to the actions it is granted.

use blueprint_core::{EngineError, EngineResult, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Actions granted when a config leaves `actions` out
pub const DEFAULT_ACTIONS: &[&str] = &["viewAny", "view", "create", "update", "delete"];

fn default_actions() -> Vec<String> {
    DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect()
}

// ============================================================================
// Role grants
// ============================================================================

/// Roles that receive permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleGrants {
    /// Every listed role is granted every action
    All(Vec<String>),
    /// Role → granted actions
    PerRole(BTreeMap<String, Vec<String>>),
}

impl Default for RoleGrants {
    fn default() -> Self {
        RoleGrants::All(Vec::new())
    }
}

impl RoleGrants {
    /// Role names in a stable order
    pub fn roles(&self) -> Vec<&str> {
        match self {
            RoleGrants::All(roles) => roles.iter().map(String::as_str).collect(),
            RoleGrants::PerRole(map) => map.keys().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RoleGrants::All(roles) => roles.is_empty(),
            RoleGrants::PerRole(map) => map.is_empty(),
        }
    }
}

// ============================================================================
// PermissionConfig
// ============================================================================

/// Permission block of a blueprint config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Permission name prefix, usually the snake_case module name
    #[serde(default)]
    pub prefix: String,

    /// Resource names (snake_case plural table names by default)
    #[serde(default)]
    pub resources: Vec<String>,

    /// Actions per resource
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,

    /// Role grants
    #[serde(default, skip_serializing_if = "RoleGrants::is_empty")]
    pub roles: RoleGrants,
}

impl PermissionConfig {
    /// Create a permission config with the default actions and no roles
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            resources: Vec::new(),
            actions: default_actions(),
            roles: RoleGrants::default(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn with_roles(mut self, roles: RoleGrants) -> Self {
        self.roles = roles;
        self
    }

    /// Full permission name
    pub fn permission_name(&self, resource: &str, action: &str) -> String {
        format!("{}.{}.{}", self.prefix, resource, action)
    }

    /// Every permission, resource-major
    pub fn permission_names(&self) -> Vec<String> {
        self.resources
            .iter()
            .flat_map(|r| self.actions.iter().map(move |a| self.permission_name(r, a)))
            .collect()
    }

    /// Permissions for one resource
    pub fn resource_permissions(&self, resource: &str) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| self.permission_name(resource, a))
            .collect()
    }

    /// `(role, permissions)` pairs
    pub fn role_permissions(&self) -> Vec<(String, Vec<String>)> {
        match &self.roles {
            RoleGrants::All(roles) => roles
                .iter()
                .map(|role| (role.clone(), self.permission_names()))
                .collect(),
            RoleGrants::PerRole(map) => map
                .iter()
                .map(|(role, actions)| {
                    let perms = self
                        .resources
                        .iter()
                        .flat_map(|r| actions.iter().map(move |a| self.permission_name(r, a)))
                        .collect();
                    (role.clone(), perms)
                })
                .collect(),
        }
    }

    /// Whether `role` is granted `action` on resources
    pub fn role_has_action(&self, role: &str, action: &str) -> bool {
        match &self.roles {
            RoleGrants::All(roles) => {
                roles.iter().any(|r| r == role) && self.actions.iter().any(|a| a == action)
            }
            RoleGrants::PerRole(map) => map
                .get(role)
                .map(|actions| actions.iter().any(|a| a == action))
                .unwrap_or(false),
        }
    }
}

impl Validatable for PermissionConfig {
    fn validate(&self) -> EngineResult<()> {
        if self.prefix.trim().is_empty() {
            return Err(EngineError::validation("Permission prefix cannot be empty"));
        }
        if self.actions.is_empty() {
            return Err(EngineError::validation(
                "Permission config must list at least one action",
            ));
        }
        if let RoleGrants::PerRole(map) = &self.roles {
            for (role, actions) in map {
                if let Some(unknown) = actions.iter().find(|a| !self.actions.contains(a)) {
                    return Err(EngineError::validation(format!(
                        "Role '{}' is granted unknown action '{}'",
                        role, unknown
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inventory() -> PermissionConfig {
        PermissionConfig::new("inventory")
            .with_resource("warehouses")
            .with_resource("locations")
    }

    #[test]
    fn test_permission_names() {
        let config = inventory();
        let names = config.permission_names();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "inventory.warehouses.viewAny");
        assert_eq!(names[9], "inventory.locations.delete");
    }

    #[test]
    fn test_role_list_grants_everything() {
        let config = inventory().with_roles(RoleGrants::All(vec!["admin".into()]));
        let grants = config.role_permissions();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].0, "admin");
        assert_eq!(grants[0].1.len(), 10);
        assert!(config.role_has_action("admin", "delete"));
        assert!(!config.role_has_action("viewer", "view"));
    }

    #[test]
    fn test_role_map_grants_selected_actions() {
        let config: PermissionConfig = serde_json::from_str(
            r#"{
                "prefix": "sales",
                "resources": ["customers"],
                "roles": {"clerk": ["viewAny", "view"], "manager": ["viewAny", "view", "create", "update", "delete"]}
            }"#,
        )
        .unwrap();
        assert_eq!(config.actions.len(), 5);
        let grants = config.role_permissions();
        assert_eq!(
            grants[0],
            (
                "clerk".to_string(),
                vec![
                    "sales.customers.viewAny".to_string(),
                    "sales.customers.view".to_string()
                ]
            )
        );
        assert!(config.role_has_action("clerk", "view"));
        assert!(!config.role_has_action("clerk", "delete"));
        assert!(config.is_valid());
    }

    #[test]
    fn test_roles_as_list_from_json() {
        let config: PermissionConfig =
            serde_json::from_str(r#"{"prefix": "inventory", "roles": ["admin", "manager"]}"#)
                .unwrap();
        assert_eq!(config.roles.roles(), vec!["admin", "manager"]);
    }

    #[test]
    fn test_unknown_role_action_rejected() {
        let mut map = BTreeMap::new();
        map.insert("clerk".to_string(), vec!["export".to_string()]);
        let config = inventory().with_roles(RoleGrants::PerRole(map));
        assert!(!config.is_valid());
        assert!(!PermissionConfig::new("").is_valid());
    }
}
