use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use uuid::Uuid;

use super::auth::AuthPrincipal;
use crate::config;
use crate::context::WorkspaceResolver;
use crate::database::manager::DatabaseManager;
use crate::database::store::{PgPrincipalStore, PgWorkspaceStore, PrincipalStore};
use crate::error::ApiError;

/// Middleware that resolves which workspace the authenticated principal is
/// operating in and attaches the resulting `RequestContext` to the request.
/// Runs after JWT authentication; guards and handlers downstream trust the
/// context and never re-derive tenancy.
pub async fn resolve_workspace_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // No authenticated principal: public endpoint, pass through untouched.
    let Some(auth) = request.extensions().get::<AuthPrincipal>().cloned() else {
        return Ok(next.run(request).await);
    };

    let override_workspace = parse_override_header(request.headers())?;

    let pool = DatabaseManager::main_pool().await?;
    let principals = PgPrincipalStore::new(pool.clone());
    let workspaces = PgWorkspaceStore::new(pool);

    let principal = principals
        .find_principal(auth.principal_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(principal = %auth.principal_id, "token references a deleted principal");
            ApiError::unauthorized("Principal no longer exists")
        })?;

    let resolution = WorkspaceResolver::new(&workspaces)
        .resolve(&principal, override_workspace)
        .await?;

    // The one side effect resolution is allowed to request: pin the adopted
    // workspace on the principal record. Best-effort and idempotent; a lost
    // write only means the next request adopts the same workspace again.
    if let Some(workspace_id) = resolution.adopted_workspace {
        if let Err(e) = principals
            .adopt_current_workspace(principal.id, workspace_id)
            .await
        {
            tracing::warn!(
                principal = %principal.id,
                workspace = %workspace_id,
                "failed to persist adopted workspace: {}", e
            );
        }
    }

    request.extensions_mut().insert(resolution.context);

    Ok(next.run(request).await)
}

/// Read and parse the workspace override header, if present.
fn parse_override_header(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let header_name = &config::config().api.workspace_header;

    let Some(value) = headers.get(header_name.as_str()) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} header", header_name)))?;

    let workspace_id = Uuid::parse_str(value.trim()).map_err(|_| {
        ApiError::bad_request(format!("Invalid workspace id in {} header", header_name))
    })?;

    Ok(Some(workspace_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_override_header_means_no_override() {
        let headers = HeaderMap::new();
        assert_eq!(parse_override_header(&headers).unwrap(), None);
    }

    #[test]
    fn valid_override_header_parses_to_a_workspace_id() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("X-Workspace-Id", id.to_string().parse().unwrap());
        assert_eq!(parse_override_header(&headers).unwrap(), Some(id));
    }

    #[test]
    fn malformed_override_header_is_a_bad_request_before_resolution() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Workspace-Id", "not-a-uuid".parse().unwrap());
        let err = parse_override_header(&headers).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
