//! Test support: in-memory store doubles and record fixtures.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Workspace;
use crate::database::store::{StoreError, WorkspaceStore};

/// In-memory workspace registry for resolver and guard tests. The failure
/// toggle exercises the infrastructure-error path without a database.
#[derive(Default)]
pub struct MemoryWorkspaceStore {
    workspaces: HashMap<Uuid, Workspace>,
    fail: bool,
}

impl MemoryWorkspaceStore {
    pub fn with_workspaces(workspaces: impl IntoIterator<Item = Workspace>) -> Self {
        Self {
            workspaces: workspaces.into_iter().map(|ws| (ws.id, ws)).collect(),
            fail: false,
        }
    }

    /// A store whose every lookup fails, as if the database were unreachable.
    pub fn failing() -> Self {
        Self {
            workspaces: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl WorkspaceStore for MemoryWorkspaceStore {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        if self.fail {
            return Err(StoreError::Decode("simulated store outage".to_string()));
        }
        Ok(self.workspaces.get(&id).cloned())
    }
}

pub mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::database::models::{Membership, Principal, Workspace, WorkspaceUsage};
    use crate::types::{Role, WorkspaceTier};

    pub fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            role,
            legacy_workspace_id: None,
            current_workspace_id: None,
            memberships: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn membership(workspace_id: Uuid, role: Role, is_active: bool) -> Membership {
        Membership {
            workspace_id,
            role,
            is_active,
            joined_at: Utc::now(),
        }
    }

    pub fn workspace(tier: WorkspaceTier, is_active: bool) -> Workspace {
        let id = Uuid::new_v4();
        Workspace {
            id,
            name: format!("ws-{}", id.simple()),
            tier,
            is_active,
            features: tier.default_features(),
            limits: tier.default_limits(),
            usage: WorkspaceUsage::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
