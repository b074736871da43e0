//! Role-based navigation menu.
//!
//! The frontend renders whatever [`visible_navigation`] returns, so a page
//! the caller's role cannot use never appears in its menu.

use serde::Serialize;

use crate::roles::{has_permission, Permission};

/// A single entry in the application's navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Stable key used by the frontend router.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Frontend path.
    pub path: &'static str,
    /// Permission required to see the page. `None` means any signed-in user.
    #[serde(skip)]
    pub required: Option<Permission>,
}

/// Every page in display order.
pub const NAVIGATION: &[NavItem] = &[
    NavItem {
        key: "dashboard",
        label: "Dashboard",
        path: "/dashboard",
        required: None,
    },
    NavItem {
        key: "leads",
        label: "Leads",
        path: "/crm/leads",
        required: Some(Permission::LeadsView),
    },
    NavItem {
        key: "lead_import",
        label: "Import Leads",
        path: "/crm/leads/import",
        required: Some(Permission::LeadsImport),
    },
    NavItem {
        key: "projects",
        label: "Projects",
        path: "/projects",
        required: Some(Permission::ProjectsView),
    },
    NavItem {
        key: "project_requests",
        label: "Project Requests",
        path: "/projects/requests",
        required: Some(Permission::ProjectRequestsReview),
    },
    NavItem {
        key: "support",
        label: "Support",
        path: "/support",
        required: Some(Permission::TicketsCreate),
    },
    NavItem {
        key: "users",
        label: "Users",
        path: "/admin/users",
        required: Some(Permission::UsersManage),
    },
    NavItem {
        key: "billing",
        label: "Billing",
        path: "/billing",
        required: Some(Permission::BillingManage),
    },
];

/// Navigation entries visible to `role`, preserving menu order.
pub fn visible_navigation(role: &str) -> Vec<NavItem> {
    NAVIGATION
        .iter()
        .filter(|item| item.required.map_or(true, |p| has_permission(role, p)))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_INSTALLER, ROLE_MANAGER, ROLE_SALES_REP};

    fn keys(role: &str) -> Vec<&'static str> {
        visible_navigation(role).iter().map(|i| i.key).collect()
    }

    #[test]
    fn admin_sees_every_page() {
        assert_eq!(keys(ROLE_ADMIN).len(), NAVIGATION.len());
    }

    #[test]
    fn non_admins_do_not_see_users_or_billing() {
        for role in [ROLE_MANAGER, ROLE_SALES_REP, ROLE_INSTALLER] {
            let visible = keys(role);
            assert!(!visible.contains(&"users"), "{role} should not see users");
            assert!(!visible.contains(&"billing"), "{role} should not see billing");
        }
    }

    #[test]
    fn installer_menu_is_project_focused() {
        assert_eq!(keys(ROLE_INSTALLER), vec!["dashboard", "projects", "support"]);
    }

    #[test]
    fn unknown_role_sees_only_dashboard() {
        assert_eq!(keys("nobody"), vec!["dashboard"]);
    }
}
