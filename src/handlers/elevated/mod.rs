// handlers/elevated/mod.rs - Elevated handlers (superuser required)
//
// Administrative endpoints that span workspaces. The resolver has already
// run by the time these execute; each handler additionally demands the
// superuser flag on the resolved context.
//
// Security Level: Superuser
// Route Prefix: /api/root/* (e.g., /api/root/workspace/*)

pub mod workspace;

// Re-export handler functions for use in routing
pub use workspace::{
    workspace_activate, workspace_create, workspace_deactivate, workspace_list, workspace_show,
};
