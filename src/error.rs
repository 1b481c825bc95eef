// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::context::ResolutionError;
use crate::database::manager::DatabaseError;
use crate::database::store::StoreError;
use crate::policy::PolicyError;
use crate::services::WorkspaceServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden (generic)
    Forbidden(String),

    // 403 Forbidden with a domain rejection code and structured details
    Denied {
        message: String,
        code: &'static str,
        details: Value,
    },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 500 from the resolution/guard pipeline: infrastructure failure, not a
    // policy decision. The only category an external resilience layer may
    // retry.
    ResolutionFailure(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::Denied { .. } => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ResolutionFailure(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::Denied { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ResolutionFailure(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Denied { code, .. } => code,
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ResolutionFailure(_) => "UNEXPECTED_RESOLUTION_FAILURE",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::Denied { details, .. } = self {
            if let (Some(body), Some(extra)) = (response.as_object_mut(), details.as_object()) {
                for (key, value) in extra {
                    body.insert(key.clone(), value.clone());
                }
            }
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn denied(message: impl Into<String>, code: &'static str, details: Value) -> Self {
        ApiError::Denied {
            message: message.into(),
            code,
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        match &err {
            ResolutionError::Store(store_err) => {
                // Infrastructure failure: log the real cause, return a
                // generic message so retries target the right category.
                tracing::error!("workspace resolution failed: {}", store_err);
                ApiError::ResolutionFailure("Failed to resolve workspace".to_string())
            }
            ResolutionError::Inactive(workspace_id) => {
                // The workspace id rides along so the caller can force a
                // logout instead of silently continuing a stale session.
                ApiError::denied(
                    err.to_string(),
                    err.code(),
                    json!({"workspace_id": workspace_id}),
                )
            }
            ResolutionError::AccessDenied(workspace_id)
            | ResolutionError::UnknownWorkspace(workspace_id) => ApiError::denied(
                err.to_string(),
                err.code(),
                json!({"workspace_id": workspace_id}),
            ),
            ResolutionError::NoWorkspace => ApiError::denied(err.to_string(), err.code(), json!({})),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        let details = match &err {
            PolicyError::LimitReached { limit, current, .. } => {
                json!({"limit": limit, "current": current})
            }
            PolicyError::FeatureNotAvailable { feature } => json!({"feature": feature}),
            PolicyError::TierRestricted { required } => json!({"required_tier": required}),
        };
        ApiError::denied(err.to_string(), err.code(), details)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("store error: {}", err);
        ApiError::ResolutionFailure("Failed to read backing store".to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("database misconfiguration: {}", err);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<WorkspaceServiceError> for ApiError {
    fn from(err: WorkspaceServiceError) -> Self {
        match err {
            WorkspaceServiceError::AlreadyExists(name) => {
                ApiError::conflict(format!("Workspace '{}' already exists", name))
            }
            WorkspaceServiceError::InvalidName(msg) => ApiError::bad_request(msg),
            WorkspaceServiceError::NotFound(id) => {
                ApiError::not_found(format!("Workspace {} not found", id))
            }
            WorkspaceServiceError::Database(e) => {
                tracing::error!("workspace service database error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            WorkspaceServiceError::Manager(e) => e.into(),
            WorkspaceServiceError::Decode(msg) => {
                tracing::error!("workspace service decode error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LimitedResource;
    use uuid::Uuid;

    #[test]
    fn resolution_rejections_keep_their_domain_codes() {
        let err: ApiError = ResolutionError::NoWorkspace.into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NO_WORKSPACE");

        let id = Uuid::new_v4();
        let err: ApiError = ResolutionError::Inactive(id).into();
        assert_eq!(err.error_code(), "WORKSPACE_INACTIVE");
        let body = err.to_json();
        assert_eq!(body["workspace_id"], json!(id));
        assert_eq!(body["error"], json!(true));
    }

    #[test]
    fn limit_rejection_echoes_limit_and_current() {
        let err: ApiError = PolicyError::LimitReached {
            resource: LimitedResource::Users,
            limit: 10,
            current: 10,
        }
        .into();

        assert_eq!(err.error_code(), "USER_LIMIT_REACHED");
        let body = err.to_json();
        assert_eq!(body["limit"], json!(10));
        assert_eq!(body["current"], json!(10));
    }

    #[test]
    fn infrastructure_failures_map_to_500_with_their_own_code() {
        let err: ApiError = ResolutionError::Store(StoreError::Decode("boom".to_string())).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "UNEXPECTED_RESOLUTION_FAILURE");
        // The raw cause stays in the logs, not the body.
        assert!(!err.message().contains("boom"));
    }
}
