use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Membership, Principal, Workspace, WorkspaceLimits, WorkspaceUsage};
use crate::types::{Role, WorkspaceTier};

/// Errors from the backing stores. Everything here is an infrastructure
/// failure, not a policy decision; callers surface it as such.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Decode(String),
}

/// Read interface over the workspace registry. The resolver performs at most
/// one lookup per request through this seam.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError>;
}

/// Read/adopt interface over the principal store. `adopt_current_workspace`
/// is the single optimistic write resolution is allowed to cause.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, StoreError>;

    /// Persist the workspace a principal is currently inside. Idempotent;
    /// last write wins under concurrent first-time adoption.
    async fn adopt_current_workspace(
        &self,
        principal_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<(), StoreError>;
}

fn decode_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(format!("{what}: {e}")))
}

/// Decode a full workspace row; shared with the administrative service.
pub(crate) fn decode_workspace_row(row: &sqlx::postgres::PgRow) -> Result<Workspace, StoreError> {
    let tier: String = row.get("tier");
    Ok(Workspace {
        id: row.get("id"),
        name: row.get("name"),
        tier: WorkspaceTier::from_str(&tier).map_err(|e| StoreError::Decode(e.to_string()))?,
        is_active: row.get("is_active"),
        features: decode_json(row.get("features"), "workspace.features")?,
        limits: decode_json::<WorkspaceLimits>(row.get("limits"), "workspace.limits")?,
        usage: WorkspaceUsage {
            user_count: row.get("user_count"),
            task_count: row.get("task_count"),
            team_count: row.get("team_count"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Postgres-backed workspace registry reads.
#[derive(Clone)]
pub struct PgWorkspaceStore {
    pool: PgPool,
}

impl PgWorkspaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for PgWorkspaceStore {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, tier, is_active, features, limits,
                   user_count, task_count, team_count,
                   created_at, updated_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_workspace_row).transpose()
    }
}

/// Postgres-backed principal reads plus the adoption write.
#[derive(Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_principal(&self, id: Uuid) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, legacy_workspace_id, current_workspace_id,
                   created_at, updated_at
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.get("role");
        let mut principal = Principal {
            id: row.get("id"),
            email: row.get("email"),
            role: Role::from_str(&role).map_err(|e| StoreError::Decode(e.to_string()))?,
            legacy_workspace_id: row.get("legacy_workspace_id"),
            current_workspace_id: row.get("current_workspace_id"),
            memberships: Vec::new(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        };

        // Stable order: join time, then workspace id. Adoption depends on it.
        let membership_rows = sqlx::query(
            r#"
            SELECT workspace_id, role, is_active, joined_at
            FROM workspace_memberships
            WHERE principal_id = $1
            ORDER BY joined_at ASC, workspace_id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        for row in membership_rows {
            let role: String = row.get("role");
            principal.memberships.push(Membership {
                workspace_id: row.get("workspace_id"),
                role: Role::from_str(&role).map_err(|e| StoreError::Decode(e.to_string()))?,
                is_active: row.get("is_active"),
                joined_at: row.get("joined_at"),
            });
        }

        Ok(Some(principal))
    }

    async fn adopt_current_workspace(
        &self,
        principal_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE principals
            SET current_workspace_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(principal_id)
        .bind(workspace_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
