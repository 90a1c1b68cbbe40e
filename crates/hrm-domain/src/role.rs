//! Roles and the permissions they grant.
//!
//! | Role | Grants |
//! |------|--------|
//! | `admin` | every action on every resource |
//! | `hr_manager` | view / create / update on every resource, never delete |
//! | `employee` | nothing beyond authenticated reads such as the dashboard |

wire_enum! {
    /// Named role attached to an account.
    RoleName as "role" {
        Admin => "admin",
        HrManager => "hr_manager",
        Employee => "employee",
    }
}

impl RoleName {
    /// Role given to every account provisioned without an explicit role.
    pub const DEFAULT: RoleName = RoleName::Employee;

    pub fn grants(self, permission: Permission) -> bool {
        match self {
            Self::Admin => true,
            Self::HrManager => permission.action != Action::Delete,
            Self::Employee => false,
        }
    }
}

wire_enum! {
    Action as "action" {
        View => "view",
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
}

wire_enum! {
    Resource as "resource" {
        Department => "department",
        Employee => "employee",
        Attendance => "attendance",
        Leave => "leave",
    }
}

/// An action on a resource, e.g. `create employee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub resource: Resource,
}

impl Permission {
    pub const fn new(action: Action, resource: Resource) -> Self {
        Self { action, resource }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action, self.resource)
    }
}

/// Returns `true` if any of `roles` grants `permission`.
pub fn any_grants(roles: &[RoleName], permission: Permission) -> bool {
    roles.iter().any(|r| r.grants(permission))
}
