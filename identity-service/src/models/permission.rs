//! Permission catalog - the closed set of capability identifiers.
//!
//! Roles persist permission grants as free-form strings; those strings are
//! mapped onto this catalog at resolution time. A string the catalog no
//! longer recognizes (a grant left over from an older catalog version) maps
//! to `None` and is dropped by the resolver, never treated as an error.

use serde::{Deserialize, Serialize};

/// An atomic capability a role can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewReportsOrganization,
    ViewReportsPersonal,
    ViewInventory,
    EditInventory,
    ViewSchedule,
    EditSchedule,
    ManageCustomers,
    ManageEvents,
    ManageRoles,
    InviteUsers,
}

impl Permission {
    /// Every permission in the catalog.
    pub const ALL: [Permission; 10] = [
        Permission::ViewReportsOrganization,
        Permission::ViewReportsPersonal,
        Permission::ViewInventory,
        Permission::EditInventory,
        Permission::ViewSchedule,
        Permission::EditSchedule,
        Permission::ManageCustomers,
        Permission::ManageEvents,
        Permission::ManageRoles,
        Permission::InviteUsers,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Permission::ViewReportsOrganization => "VIEW_REPORTS_ORGANIZATION",
            Permission::ViewReportsPersonal => "VIEW_REPORTS_PERSONAL",
            Permission::ViewInventory => "VIEW_INVENTORY",
            Permission::EditInventory => "EDIT_INVENTORY",
            Permission::ViewSchedule => "VIEW_SCHEDULE",
            Permission::EditSchedule => "EDIT_SCHEDULE",
            Permission::ManageCustomers => "MANAGE_CUSTOMERS",
            Permission::ManageEvents => "MANAGE_EVENTS",
            Permission::ManageRoles => "MANAGE_ROLES",
            Permission::InviteUsers => "INVITE_USERS",
        }
    }

    /// Map a stored permission string onto the catalog.
    ///
    /// Returns `None` for unknown or stale keys.
    pub fn from_key(key: &str) -> Option<Permission> {
        Permission::ALL.iter().copied().find(|p| p.as_key() == key)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_round_trips_catalog() {
        for perm in Permission::ALL {
            assert_eq!(Permission::from_key(perm.as_key()), Some(perm));
        }
    }

    #[test]
    fn test_from_key_unknown_is_none() {
        assert_eq!(Permission::from_key("DELETE_EVERYTHING"), None);
        assert_eq!(Permission::from_key(""), None);
        assert_eq!(Permission::from_key("view_inventory"), None);
    }
}
