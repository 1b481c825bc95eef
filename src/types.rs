/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global and per-workspace roles. Closed set: role comparisons happen
/// against these variants, never against raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superuser,
    WorkspaceOwner,
    Coordinator,
    TeamLead,
    Member,
}

impl Role {
    /// Roles that bypass every policy predicate (platform operators and HR).
    /// Adding a privileged role is a one-line change here.
    pub const PRIVILEGED: [Role; 2] = [Role::Superuser, Role::Coordinator];

    pub fn is_privileged(self) -> bool {
        Self::PRIVILEGED.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superuser => "superuser",
            Role::WorkspaceOwner => "workspace_owner",
            Role::Coordinator => "coordinator",
            Role::TeamLead => "team_lead",
            Role::Member => "member",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superuser" => Ok(Role::Superuser),
            "workspace_owner" => Ok(Role::WorkspaceOwner),
            "coordinator" => Ok(Role::Coordinator),
            "team_lead" => Ok(Role::TeamLead),
            "member" => Ok(Role::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workspace service level. Ordering matters: `Community < Standard`, so
/// tier gates can compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceTier {
    Community,
    Standard,
}

impl WorkspaceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkspaceTier::Community => "COMMUNITY",
            WorkspaceTier::Standard => "STANDARD",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown workspace tier '{0}'")]
pub struct UnknownTier(pub String);

impl FromStr for WorkspaceTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMUNITY" => Ok(WorkspaceTier::Community),
            "STANDARD" => Ok(WorkspaceTier::Standard),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

impl fmt::Display for WorkspaceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources a workspace quota can cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedResource {
    Users,
    Tasks,
    Teams,
}

impl LimitedResource {
    pub fn as_str(self) -> &'static str {
        match self {
            LimitedResource::Users => "users",
            LimitedResource::Tasks => "tasks",
            LimitedResource::Teams => "teams",
        }
    }

    /// Rejection code surfaced when this resource's limit is hit.
    pub fn limit_code(self) -> &'static str {
        match self {
            LimitedResource::Users => "USER_LIMIT_REACHED",
            LimitedResource::Tasks => "TASK_LIMIT_REACHED",
            LimitedResource::Teams => "TEAM_LIMIT_REACHED",
        }
    }
}

impl fmt::Display for LimitedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [
            Role::Superuser,
            Role::WorkspaceOwner,
            Role::Coordinator,
            Role::TeamLead,
            Role::Member,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn privileged_set_covers_operators_and_hr() {
        assert!(Role::Superuser.is_privileged());
        assert!(Role::Coordinator.is_privileged());
        assert!(!Role::WorkspaceOwner.is_privileged());
        assert!(!Role::TeamLead.is_privileged());
        assert!(!Role::Member.is_privileged());
    }

    #[test]
    fn tier_ordering_puts_standard_on_top() {
        assert!(WorkspaceTier::Standard > WorkspaceTier::Community);
        assert!(WorkspaceTier::Standard >= WorkspaceTier::Standard);
        assert_eq!("COMMUNITY".parse::<WorkspaceTier>().unwrap(), WorkspaceTier::Community);
        assert!("PREMIUM".parse::<WorkspaceTier>().is_err());
    }

    #[test]
    fn limit_codes_are_resource_specific() {
        assert_eq!(LimitedResource::Users.limit_code(), "USER_LIMIT_REACHED");
        assert_eq!(LimitedResource::Tasks.limit_code(), "TASK_LIMIT_REACHED");
        assert_eq!(LimitedResource::Teams.limit_code(), "TEAM_LIMIT_REACHED");
    }
}
