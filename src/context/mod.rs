pub mod resolver;

pub use resolver::{Resolution, ResolutionError, WorkspaceResolver};

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Principal, Workspace};
use crate::types::{Role, WorkspaceTier};

/// Immutable, per-request outcome of workspace resolution. Downstream code
/// trusts this value and never re-derives tenancy facts.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// `None` only for a superuser operating without a workspace.
    pub workspace_id: Option<Uuid>,
    pub tier: Option<WorkspaceTier>,
    /// Frozen registry snapshot read at resolution time.
    pub workspace: Option<Workspace>,
    pub is_superuser: bool,
    /// Role held inside the resolved workspace (global role for tenant-less
    /// superusers and legacy-schema principals).
    pub role: Role,
    /// Every active workspace the principal belongs to, for cross-workspace
    /// aggregate views.
    pub workspace_ids: Vec<Uuid>,
}

impl RequestContext {
    /// Tenant-less superuser context: no workspace, globally authorized.
    pub fn superuser(principal: &Principal) -> Self {
        Self {
            workspace_id: None,
            tier: None,
            workspace: None,
            is_superuser: true,
            role: principal.role,
            workspace_ids: Vec::new(),
        }
    }

    /// Context scoped to a resolved workspace.
    pub fn scoped(principal: &Principal, workspace: Workspace, role: Role) -> Self {
        Self {
            workspace_id: Some(workspace.id),
            tier: Some(workspace.tier),
            is_superuser: principal.is_superuser(),
            role,
            workspace_ids: principal.active_workspace_ids(),
            workspace: Some(workspace),
        }
    }

    /// The universal bypass rule: superusers and the privileged global roles
    /// short-circuit every policy predicate. Consulted in exactly one place
    /// per predicate so the rule cannot drift.
    pub fn bypasses_policy(&self) -> bool {
        self.is_superuser || self.role.is_privileged()
    }

    /// Feature check against the frozen workspace snapshot; a missing key or
    /// a missing workspace reads as disabled.
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.workspace
            .as_ref()
            .map(|ws| ws.feature_enabled(name))
            .unwrap_or(false)
    }
}
