pub mod auth;
pub mod resolve_workspace;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthPrincipal};
pub use resolve_workspace::resolve_workspace_middleware;
pub use response::{ApiResponse, ApiResult};
