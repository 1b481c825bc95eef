// handlers/elevated/workspace.rs - /api/root/workspace administration
//
// Workspace lifecycle is a superuser surface: creation applies
// tier-appropriate default features and limits, deactivation locks every
// member out at the next resolution.
use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::database::models::Workspace;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::WorkspaceService;
use crate::types::WorkspaceTier;

fn require_superuser(ctx: &RequestContext) -> Result<(), ApiError> {
    if ctx.is_superuser {
        Ok(())
    } else {
        Err(ApiError::forbidden("Superuser access required"))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    /// New workspaces default to the capped tier; upgrades are explicit.
    #[serde(default)]
    pub tier: Option<WorkspaceTier>,
}

/// POST /api/root/workspace - create a workspace with tier defaults
pub async fn workspace_create(
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> ApiResult<Workspace> {
    require_superuser(&ctx)?;

    let tier = payload.tier.unwrap_or(WorkspaceTier::Community);
    let service = WorkspaceService::new().await?;
    let workspace = service.create_workspace(&payload.name, tier).await?;

    Ok(ApiResponse::created(workspace))
}

/// GET /api/root/workspace - list all workspaces
pub async fn workspace_list(Extension(ctx): Extension<RequestContext>) -> ApiResult<Vec<Workspace>> {
    require_superuser(&ctx)?;

    let service = WorkspaceService::new().await?;
    let workspaces = service.list_workspaces().await?;

    Ok(ApiResponse::success(workspaces))
}

/// GET /api/root/workspace/:id - show one workspace
pub async fn workspace_show(
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Workspace> {
    require_superuser(&ctx)?;

    let service = WorkspaceService::new().await?;
    let workspace = service
        .get_workspace(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Workspace {} not found", id)))?;

    Ok(ApiResponse::success(workspace))
}

/// PUT /api/root/workspace/:id/activate - reactivate a workspace
pub async fn workspace_activate(
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Workspace> {
    require_superuser(&ctx)?;

    let service = WorkspaceService::new().await?;
    let workspace = service.set_active(id, true).await?;

    Ok(ApiResponse::success(workspace))
}

/// PUT /api/root/workspace/:id/deactivate - deactivate a workspace
///
/// Members with stale sessions are rejected with WORKSPACE_INACTIVE on their
/// next request; they must not silently continue.
pub async fn workspace_deactivate(
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Workspace> {
    require_superuser(&ctx)?;

    let service = WorkspaceService::new().await?;
    let workspace = service.set_active(id, false).await?;

    Ok(ApiResponse::success(workspace))
}
