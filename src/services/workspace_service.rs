use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Workspace;
use crate::database::store::{decode_workspace_row, StoreError};
use crate::types::WorkspaceTier;

#[derive(Debug, Error)]
pub enum WorkspaceServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    Manager(#[from] DatabaseError),

    #[error("Workspace already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid workspace name: {0}")]
    InvalidName(String),

    #[error("Workspace not found: {0}")]
    NotFound(Uuid),

    #[error("Corrupt workspace record: {0}")]
    Decode(String),
}

impl From<StoreError> for WorkspaceServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Sqlx(e) => WorkspaceServiceError::Database(e),
            StoreError::Database(e) => WorkspaceServiceError::Manager(e),
            StoreError::Decode(msg) => WorkspaceServiceError::Decode(msg),
        }
    }
}

const WORKSPACE_COLUMNS: &str = "id, name, tier, is_active, features, limits, \
                                 user_count, task_count, team_count, created_at, updated_at";

/// Administrative operations on the workspace registry. Creation and
/// activation toggles are superuser actions; the request-path resolver only
/// ever reads.
pub struct WorkspaceService {
    pool: PgPool,
}

impl WorkspaceService {
    pub async fn new() -> Result<Self, WorkspaceServiceError> {
        let pool = DatabaseManager::main_pool().await?;
        Ok(Self { pool })
    }

    /// Create a new workspace with tier-appropriate default features and
    /// limits. Usage counters start at zero.
    pub async fn create_workspace(
        &self,
        name: &str,
        tier: WorkspaceTier,
    ) -> Result<Workspace, WorkspaceServiceError> {
        self.validate_workspace_name(name)?;

        if self.workspace_exists(name).await? {
            return Err(WorkspaceServiceError::AlreadyExists(name.to_string()));
        }

        let features = serde_json::to_value(tier.default_features())
            .map_err(|e| WorkspaceServiceError::Decode(e.to_string()))?;
        let limits = serde_json::to_value(tier.default_limits())
            .map_err(|e| WorkspaceServiceError::Decode(e.to_string()))?;

        let query = format!(
            r#"
            INSERT INTO workspaces (id, name, tier, is_active, features, limits)
            VALUES ($1, $2, $3, true, $4, $5)
            RETURNING {WORKSPACE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(tier.as_str())
            .bind(features)
            .bind(limits)
            .fetch_one(&self.pool)
            .await?;

        let workspace = decode_workspace_row(&row)?;
        tracing::info!(workspace = %workspace.id, name, tier = %tier, "created workspace");
        Ok(workspace)
    }

    /// Validate workspace name follows rules
    fn validate_workspace_name(&self, name: &str) -> Result<(), WorkspaceServiceError> {
        if name.len() < 2 {
            return Err(WorkspaceServiceError::InvalidName(
                "Workspace name must be at least 2 characters".to_string(),
            ));
        }

        if name.len() > 100 {
            return Err(WorkspaceServiceError::InvalidName(
                "Workspace name must be less than 100 characters".to_string(),
            ));
        }

        // Only allow alphanumeric, hyphens, and underscores
        if !name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return Err(WorkspaceServiceError::InvalidName(
                "Workspace name can only contain letters, numbers, hyphens, and underscores"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Check if a workspace name is already registered
    async fn workspace_exists(&self, name: &str) -> Result<bool, WorkspaceServiceError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workspaces WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }

    /// Get workspace by id
    pub async fn get_workspace(
        &self,
        id: Uuid,
    ) -> Result<Option<Workspace>, WorkspaceServiceError> {
        let query = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1");

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref()
            .map(decode_workspace_row)
            .transpose()
            .map_err(Into::into)
    }

    /// List all workspaces, newest first
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, WorkspaceServiceError> {
        let query =
            format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces ORDER BY created_at DESC");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| decode_workspace_row(row).map_err(Into::into))
            .collect()
    }

    /// Toggle the activation flag. Deactivation makes every subsequent
    /// resolution for the workspace's members fail with WORKSPACE_INACTIVE;
    /// reactivation restores them.
    pub async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<Workspace, WorkspaceServiceError> {
        let query = format!(
            r#"
            UPDATE workspaces
            SET is_active = $2, updated_at = now()
            WHERE id = $1
            RETURNING {WORKSPACE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WorkspaceServiceError::NotFound(id))?;

        let workspace = decode_workspace_row(&row)?;
        tracing::info!(workspace = %id, is_active, "workspace activation changed");
        Ok(workspace)
    }
}
