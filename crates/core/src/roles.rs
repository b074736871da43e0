//! Well-known roles and the static role → permission table.
//!
//! Role names must match the seed data in `20260301000002_create_users.sql`.
//! Permissions are not stored in the database; a role grants a fixed set
//! defined by [`permissions_for`].

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SALES_REP: &str = "sales_rep";
pub const ROLE_INSTALLER: &str = "installer";

/// All valid role names, in seed order.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_SALES_REP, ROLE_INSTALLER];

/// A capability checked by handlers before touching tenant data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "leads.view")]
    LeadsView,
    #[serde(rename = "leads.edit")]
    LeadsEdit,
    #[serde(rename = "leads.import")]
    LeadsImport,
    #[serde(rename = "projects.view")]
    ProjectsView,
    #[serde(rename = "projects.edit")]
    ProjectsEdit,
    #[serde(rename = "project_requests.review")]
    ProjectRequestsReview,
    #[serde(rename = "tickets.create")]
    TicketsCreate,
    #[serde(rename = "tickets.manage")]
    TicketsManage,
    #[serde(rename = "users.manage")]
    UsersManage,
    #[serde(rename = "billing.manage")]
    BillingManage,
    #[serde(rename = "monitoring.view")]
    MonitoringView,
}

impl Permission {
    /// Every permission, in display order.
    pub const ALL: &'static [Permission] = &[
        Self::LeadsView,
        Self::LeadsEdit,
        Self::LeadsImport,
        Self::ProjectsView,
        Self::ProjectsEdit,
        Self::ProjectRequestsReview,
        Self::TicketsCreate,
        Self::TicketsManage,
        Self::UsersManage,
        Self::BillingManage,
        Self::MonitoringView,
    ];

    /// Dotted permission name as exposed to API clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadsView => "leads.view",
            Self::LeadsEdit => "leads.edit",
            Self::LeadsImport => "leads.import",
            Self::ProjectsView => "projects.view",
            Self::ProjectsEdit => "projects.edit",
            Self::ProjectRequestsReview => "project_requests.review",
            Self::TicketsCreate => "tickets.create",
            Self::TicketsManage => "tickets.manage",
            Self::UsersManage => "users.manage",
            Self::BillingManage => "billing.manage",
            Self::MonitoringView => "monitoring.view",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::LeadsView,
    Permission::LeadsEdit,
    Permission::LeadsImport,
    Permission::ProjectsView,
    Permission::ProjectsEdit,
    Permission::ProjectRequestsReview,
    Permission::TicketsCreate,
    Permission::TicketsManage,
    Permission::MonitoringView,
];

const SALES_REP_PERMISSIONS: &[Permission] = &[
    Permission::LeadsView,
    Permission::LeadsEdit,
    Permission::LeadsImport,
    Permission::ProjectsView,
    Permission::TicketsCreate,
];

const INSTALLER_PERMISSIONS: &[Permission] = &[
    Permission::ProjectsView,
    Permission::ProjectsEdit,
    Permission::TicketsCreate,
    Permission::MonitoringView,
];

/// Permissions granted to a role. Unknown roles get nothing.
pub fn permissions_for(role: &str) -> &'static [Permission] {
    match role {
        ROLE_ADMIN => Permission::ALL,
        ROLE_MANAGER => MANAGER_PERMISSIONS,
        ROLE_SALES_REP => SALES_REP_PERMISSIONS,
        ROLE_INSTALLER => INSTALLER_PERMISSIONS,
        _ => &[],
    }
}

/// Whether `role` grants `permission`.
pub fn has_permission(role: &str, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// Whether `role` can see every lead in the tenant, not just assigned ones.
pub fn sees_all_leads(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MANAGER
}

/// Validate that a role name is one of the known roles.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_permission() {
        for p in Permission::ALL {
            assert!(has_permission(ROLE_ADMIN, *p), "admin should have {p}");
        }
    }

    #[test]
    fn only_admin_manages_users_and_billing() {
        for role in [ROLE_MANAGER, ROLE_SALES_REP, ROLE_INSTALLER] {
            assert!(!has_permission(role, Permission::UsersManage));
            assert!(!has_permission(role, Permission::BillingManage));
        }
    }

    #[test]
    fn sales_rep_cannot_edit_projects() {
        assert!(has_permission(ROLE_SALES_REP, Permission::LeadsImport));
        assert!(!has_permission(ROLE_SALES_REP, Permission::ProjectsEdit));
    }

    #[test]
    fn installer_cannot_see_leads() {
        assert!(!has_permission(ROLE_INSTALLER, Permission::LeadsView));
        assert!(has_permission(ROLE_INSTALLER, Permission::MonitoringView));
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        assert!(permissions_for("guest").is_empty());
        assert!(!is_valid_role("guest"));
    }

    #[test]
    fn permission_serializes_to_dotted_name() {
        let json = serde_json::to_string(&Permission::ProjectRequestsReview).unwrap();
        assert_eq!(json, "\"project_requests.review\"");
    }
}
