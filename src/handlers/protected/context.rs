// handlers/protected/context.rs - resolved-context endpoints
use axum::Extension;
use serde_json::{json, Value};

use crate::context::RequestContext;
use crate::database::manager::DatabaseManager;
use crate::database::store::{PgWorkspaceStore, WorkspaceStore};
use crate::middleware::{ApiResponse, ApiResult, AuthPrincipal};

/// GET /api/auth/whoami - the resolved request context for the caller.
///
/// Returns exactly what downstream authorization sees: the resolved
/// workspace, the role held inside it, the superuser flag, and every active
/// workspace the principal belongs to.
pub async fn whoami(
    Extension(auth): Extension<AuthPrincipal>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "principal_id": auth.principal_id,
        "email": auth.email,
        "workspace_id": ctx.workspace_id,
        "tier": ctx.tier,
        "role": ctx.role,
        "is_superuser": ctx.is_superuser,
        "workspace_ids": ctx.workspace_ids,
        "workspace": ctx.workspace.as_ref().map(|ws| json!({
            "id": ws.id,
            "name": ws.name,
            "tier": ws.tier,
            "is_active": ws.is_active,
        })),
    })))
}

/// GET /api/auth/workspaces - every active workspace the caller belongs to.
///
/// Backs cross-workspace aggregate views; the id list comes straight from
/// the resolved context, the registry is only consulted for display data.
pub async fn workspaces(Extension(ctx): Extension<RequestContext>) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let registry = PgWorkspaceStore::new(pool);

    let mut entries = Vec::with_capacity(ctx.workspace_ids.len());
    for workspace_id in &ctx.workspace_ids {
        // Stale membership rows may reference deleted workspaces; skip them.
        if let Some(ws) = registry.find_workspace(*workspace_id).await? {
            entries.push(json!({
                "id": ws.id,
                "name": ws.name,
                "tier": ws.tier,
                "is_active": ws.is_active,
            }));
        }
    }

    Ok(ApiResponse::success(json!({
        "current_workspace_id": ctx.workspace_id,
        "workspaces": entries,
    })))
}
