//! Shared types used across the codebase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four roles known to the permission system.
///
/// Role strings on the wire use the kebab-case names the frontend sends
/// ("super-admin", "admin", "hr", "employee").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Hr, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "hr" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-page access level. Unconfigured roles fall back to `Hidden` (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Hidden,
    View,
    Edit,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Hidden => "hidden",
            AccessLevel::View => "view",
            AccessLevel::Edit => "edit",
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid permission level: {0}")]
pub struct InvalidAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = InvalidAccessLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hidden" => Ok(AccessLevel::Hidden),
            "view" => Ok(AccessLevel::View),
            "edit" => Ok(AccessLevel::Edit),
            other => Err(InvalidAccessLevel(other.to_string())),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("manager".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!("readonly".parse::<AccessLevel>().is_err());
        assert_eq!("view".parse::<AccessLevel>().unwrap(), AccessLevel::View);
    }

    #[test]
    fn default_level_is_hidden() {
        assert_eq!(AccessLevel::default(), AccessLevel::Hidden);
    }
}
