use crate::types::db::Role;

/// The named set of boolean permissions derived from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    pub create_projects: bool,
    pub edit_projects: bool,
    pub delete_projects: bool,
    pub view_users: bool,
    pub create_users: bool,
    pub edit_users: bool,
    pub delete_users: bool,
    pub view_stats: bool,
    pub assign_users: bool,
}

impl CapabilitySet {
    pub const fn all() -> Self {
        Self {
            create_projects: true,
            edit_projects: true,
            delete_projects: true,
            view_users: true,
            create_users: true,
            edit_users: true,
            delete_users: true,
            view_stats: true,
            assign_users: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            create_projects: false,
            edit_projects: false,
            delete_projects: false,
            view_users: false,
            create_users: false,
            edit_users: false,
            delete_users: false,
            view_stats: false,
            assign_users: false,
        }
    }
}

/// Pure policy function mapping a role to its capabilities. Exhaustive over
/// the closed role enumeration; role strings outside it never produce a
/// session in the first place, so they hold no capabilities.
pub fn capabilities_for(role: Role) -> CapabilitySet {
    match role {
        Role::Admin => CapabilitySet::all(),
        Role::Manager => CapabilitySet {
            view_stats: true,
            ..CapabilitySet::none()
        },
        Role::Developer | Role::Designer => CapabilitySet::none(),
    }
}
