pub mod principal;
pub mod workspace;

pub use principal::{Membership, Principal};
pub use workspace::{Workspace, WorkspaceLimits, WorkspaceUsage};
