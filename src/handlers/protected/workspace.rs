// handlers/protected/workspace.rs - explicit workspace switching
use axum::{extract::Path, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::ResolutionError;
use crate::database::manager::DatabaseManager;
use crate::database::store::{PgPrincipalStore, PgWorkspaceStore, PrincipalStore, WorkspaceStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthPrincipal};

/// POST /api/auth/workspace/:id/switch - persistently move the caller into
/// another of their workspaces.
///
/// Unlike the per-request override header, this rewrites
/// `current_workspace_id`, so subsequent requests resolve to the chosen
/// workspace without any extra signal.
pub async fn switch_workspace(
    Path(workspace_id): Path<Uuid>,
    Extension(auth): Extension<AuthPrincipal>,
) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let principals = PgPrincipalStore::new(pool.clone());
    let registry = PgWorkspaceStore::new(pool);

    let principal = principals
        .find_principal(auth.principal_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Principal no longer exists"))?;

    // Single source of truth for membership matching.
    if !principal.belongs_to_workspace(workspace_id) {
        tracing::warn!(
            principal = %principal.id,
            workspace = %workspace_id,
            "workspace switch denied: no access"
        );
        return Err(ResolutionError::AccessDenied(workspace_id).into());
    }

    let workspace = registry
        .find_workspace(workspace_id)
        .await?
        .ok_or(ResolutionError::UnknownWorkspace(workspace_id))?;

    if !workspace.is_active {
        return Err(ResolutionError::Inactive(workspace_id).into());
    }

    principals
        .adopt_current_workspace(principal.id, workspace_id)
        .await?;

    tracing::debug!(principal = %principal.id, workspace = %workspace_id, "workspace switched");

    Ok(ApiResponse::success(json!({
        "workspace_id": workspace.id,
        "name": workspace.name,
        "tier": workspace.tier,
        "role": principal.role_in_workspace(workspace_id),
    })))
}
