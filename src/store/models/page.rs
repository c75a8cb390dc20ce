use serde::{Deserialize, Serialize};

use crate::types::{AccessLevel, Role};

/// Per-role access levels for one page. Roles missing from the stored
/// document default to hidden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagePermissions {
    #[serde(rename = "super-admin", default)]
    pub super_admin: AccessLevel,
    #[serde(default)]
    pub admin: AccessLevel,
    #[serde(default)]
    pub hr: AccessLevel,
    #[serde(default)]
    pub employee: AccessLevel,
}

impl PagePermissions {
    pub fn level(&self, role: Role) -> AccessLevel {
        match role {
            Role::SuperAdmin => self.super_admin,
            Role::Admin => self.admin,
            Role::Hr => self.hr,
            Role::Employee => self.employee,
        }
    }

    pub fn set(&mut self, role: Role, level: AccessLevel) {
        match role {
            Role::SuperAdmin => self.super_admin = level,
            Role::Admin => self.admin = level,
            Role::Hr => self.hr = level,
            Role::Employee => self.employee = level,
        }
    }
}

/// One page of the application with its permission matrix row.
/// `page_id` is the unique route identifier ("dashboard", "salary-slips", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_id: String,
    pub name: String,
    pub permissions: PagePermissions,
}

/// Projection of one page for a single role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAccess {
    pub page_id: String,
    pub name: String,
    pub level: AccessLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_roles_deserialize_as_hidden() {
        let perms: PagePermissions = serde_json::from_str(r#"{"hr": "edit"}"#).unwrap();
        assert_eq!(perms.level(Role::Hr), AccessLevel::Edit);
        assert_eq!(perms.level(Role::Admin), AccessLevel::Hidden);
        assert_eq!(perms.level(Role::SuperAdmin), AccessLevel::Hidden);
        assert_eq!(perms.level(Role::Employee), AccessLevel::Hidden);
    }

    #[test]
    fn super_admin_serializes_kebab_case() {
        let mut perms = PagePermissions::default();
        perms.set(Role::SuperAdmin, AccessLevel::Edit);
        let json = serde_json::to_value(&perms).unwrap();
        assert_eq!(json["super-admin"], "edit");
    }
}
