use thiserror::Error;
use uuid::Uuid;

use super::RequestContext;
use crate::database::models::Principal;
use crate::database::store::{StoreError, WorkspaceStore};

/// Terminal resolution rejections. All except `Store` are policy decisions:
/// user-visible, never retried. `Store` is infrastructure failure and the
/// only category worth surfacing as a 5xx.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("principal is not a member of any workspace")]
    NoWorkspace,

    #[error("principal does not have access to workspace {0}")]
    AccessDenied(Uuid),

    #[error("workspace {0} does not exist")]
    UnknownWorkspace(Uuid),

    #[error("workspace {0} has been deactivated")]
    Inactive(Uuid),

    #[error("workspace lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl ResolutionError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::NoWorkspace => "NO_WORKSPACE",
            ResolutionError::AccessDenied(_) => "WORKSPACE_ACCESS_DENIED",
            ResolutionError::UnknownWorkspace(_) => "INVALID_WORKSPACE",
            ResolutionError::Inactive(_) => "WORKSPACE_INACTIVE",
            ResolutionError::Store(_) => "UNEXPECTED_RESOLUTION_FAILURE",
        }
    }
}

/// Successful resolution: the context, plus the pending membership adoption
/// the caller must persist. Returning the write instead of performing it
/// keeps `resolve` read-only and makes the side effect part of the contract.
#[derive(Debug)]
pub struct Resolution {
    pub context: RequestContext,
    /// Set when the principal had no workspace pointer and the first active
    /// membership was adopted as `current_workspace_id`.
    pub adopted_workspace: Option<Uuid>,
}

/// Resolves which workspace an authenticated principal is operating in.
/// Performs at most one registry read; never mutates workspace records.
pub struct WorkspaceResolver<'a> {
    workspaces: &'a dyn WorkspaceStore,
}

impl<'a> WorkspaceResolver<'a> {
    pub fn new(workspaces: &'a dyn WorkspaceStore) -> Self {
        Self { workspaces }
    }

    /// Candidate precedence: override header, then the persisted current
    /// pointer. Without either, a principal adopts its first active
    /// membership (the multi-workspace schema outranks the legacy pointer),
    /// falls back to the legacy pointer, or — for superusers only — resolves
    /// tenant-lessly. Principals with nothing are rejected outright.
    pub async fn resolve(
        &self,
        principal: &Principal,
        override_workspace: Option<Uuid>,
    ) -> Result<Resolution, ResolutionError> {
        let mut adopted_workspace = None;

        let candidate = match override_workspace.or(principal.current_workspace_id) {
            Some(id) => id,
            None => {
                // Superusers never adopt a membership implicitly; a legacy
                // pointer still scopes them, nothing at all means global.
                if principal.is_superuser() {
                    match principal.legacy_workspace_id {
                        Some(legacy) => legacy,
                        None => {
                            tracing::debug!(principal = %principal.id, "resolved tenant-less superuser context");
                            return Ok(Resolution {
                                context: RequestContext::superuser(principal),
                                adopted_workspace: None,
                            });
                        }
                    }
                } else if let Some(membership) = principal.first_active_membership() {
                    adopted_workspace = Some(membership.workspace_id);
                    membership.workspace_id
                } else if let Some(legacy) = principal.legacy_workspace_id {
                    legacy
                } else {
                    return Err(ResolutionError::NoWorkspace);
                }
            }
        };

        // An override names an exact workspace: non-superusers must hold an
        // active membership there. Superusers may override to any workspace.
        if let Some(requested) = override_workspace {
            if !principal.is_superuser() && principal.active_membership(requested).is_none() {
                tracing::warn!(
                    principal = %principal.id,
                    workspace = %requested,
                    "workspace override denied: no active membership"
                );
                return Err(ResolutionError::AccessDenied(requested));
            }
        }

        let workspace = self
            .workspaces
            .find_workspace(candidate)
            .await?
            .ok_or(ResolutionError::UnknownWorkspace(candidate))?;

        // Deactivation applies to everyone, superusers included: stale
        // sessions for a deactivated workspace must never silently continue.
        if !workspace.is_active {
            tracing::warn!(
                principal = %principal.id,
                workspace = %candidate,
                "resolution rejected: workspace deactivated"
            );
            return Err(ResolutionError::Inactive(candidate));
        }

        let role = principal
            .role_in_workspace(candidate)
            .unwrap_or(principal.role);

        tracing::debug!(
            principal = %principal.id,
            workspace = %candidate,
            role = %role,
            "workspace resolved"
        );

        Ok(Resolution {
            context: RequestContext::scoped(principal, workspace, role),
            adopted_workspace,
        })
    }
}
