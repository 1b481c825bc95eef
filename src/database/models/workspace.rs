use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::{LimitedResource, WorkspaceTier};

/// Named feature flags a workspace record can carry. Unknown names are
/// allowed in the map; these are the ones the platform itself gates on.
pub mod features {
    pub const BULK_IMPORT: &str = "bulk_import";
    pub const AUDIT_LOGS: &str = "audit_logs";
    pub const ADVANCED_AUTOMATION: &str = "advanced_automation";
    pub const EMAIL_CAMPAIGNS: &str = "email_campaigns";
    pub const TIME_OFF: &str = "time_off";
    pub const TASK_BOARDS: &str = "task_boards";

    pub const ALL: [&str; 6] = [
        BULK_IMPORT,
        AUDIT_LOGS,
        ADVANCED_AUTOMATION,
        EMAIL_CAMPAIGNS,
        TIME_OFF,
        TASK_BOARDS,
    ];
}

/// Per-workspace resource caps. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkspaceLimits {
    pub max_users: Option<i64>,
    pub max_tasks: Option<i64>,
    pub max_teams: Option<i64>,
}

impl WorkspaceLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn for_resource(&self, resource: LimitedResource) -> Option<i64> {
        match resource {
            LimitedResource::Users => self.max_users,
            LimitedResource::Tasks => self.max_tasks,
            LimitedResource::Teams => self.max_teams,
        }
    }
}

/// Usage counters maintained by downstream collaborators; read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkspaceUsage {
    pub user_count: i64,
    pub task_count: i64,
    pub team_count: i64,
}

impl WorkspaceUsage {
    pub fn for_resource(&self, resource: LimitedResource) -> i64 {
        match resource {
            LimitedResource::Users => self.user_count,
            LimitedResource::Tasks => self.task_count,
            LimitedResource::Teams => self.team_count,
        }
    }
}

/// Workspace (tenant) registry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub tier: WorkspaceTier,
    pub is_active: bool,
    pub features: HashMap<String, bool>,
    pub limits: WorkspaceLimits,
    pub usage: WorkspaceUsage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// A missing key reads as disabled; never panics on unknown names.
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}

impl WorkspaceTier {
    /// Limits applied when a workspace of this tier is created.
    pub fn default_limits(self) -> WorkspaceLimits {
        match self {
            WorkspaceTier::Standard => WorkspaceLimits::unlimited(),
            WorkspaceTier::Community => WorkspaceLimits {
                max_users: Some(10),
                max_tasks: Some(200),
                max_teams: Some(3),
            },
        }
    }

    /// Feature flags applied when a workspace of this tier is created.
    pub fn default_features(self) -> HashMap<String, bool> {
        match self {
            WorkspaceTier::Standard => features::ALL
                .iter()
                .map(|name| (name.to_string(), true))
                .collect(),
            WorkspaceTier::Community => {
                let mut map = HashMap::new();
                map.insert(features::TIME_OFF.to_string(), true);
                map.insert(features::TASK_BOARDS.to_string(), true);
                map
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_with_features(features: HashMap<String, bool>) -> Workspace {
        Workspace {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            tier: WorkspaceTier::Community,
            is_active: true,
            features,
            limits: WorkspaceTier::Community.default_limits(),
            usage: WorkspaceUsage::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_feature_key_reads_as_disabled() {
        let ws = workspace_with_features(HashMap::new());
        assert!(!ws.feature_enabled(features::AUDIT_LOGS));
    }

    #[test]
    fn explicit_false_and_true_flags_are_honored() {
        let mut flags = HashMap::new();
        flags.insert(features::BULK_IMPORT.to_string(), true);
        flags.insert(features::AUDIT_LOGS.to_string(), false);
        let ws = workspace_with_features(flags);
        assert!(ws.feature_enabled(features::BULK_IMPORT));
        assert!(!ws.feature_enabled(features::AUDIT_LOGS));
    }

    #[test]
    fn standard_tier_defaults_are_unlimited_with_all_features() {
        let limits = WorkspaceTier::Standard.default_limits();
        assert_eq!(limits.max_users, None);
        assert_eq!(limits.max_tasks, None);
        assert_eq!(limits.max_teams, None);

        let flags = WorkspaceTier::Standard.default_features();
        for name in features::ALL {
            assert_eq!(flags.get(name), Some(&true), "missing {name}");
        }
    }

    #[test]
    fn community_tier_defaults_are_capped_and_restricted() {
        let limits = WorkspaceTier::Community.default_limits();
        assert_eq!(limits.for_resource(LimitedResource::Users), Some(10));
        assert_eq!(limits.for_resource(LimitedResource::Tasks), Some(200));
        assert_eq!(limits.for_resource(LimitedResource::Teams), Some(3));

        let flags = WorkspaceTier::Community.default_features();
        assert_eq!(flags.get(features::TIME_OFF), Some(&true));
        assert!(!flags.contains_key(features::BULK_IMPORT));
    }
}
