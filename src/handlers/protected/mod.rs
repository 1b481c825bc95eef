// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/* (e.g., /api/auth/*)
// Middleware: JWT validation + workspace resolution

pub mod context;
pub mod workspace;

// Re-export handler functions for use in routing
pub use context::{whoami, workspaces};
pub use workspace::switch_workspace;
