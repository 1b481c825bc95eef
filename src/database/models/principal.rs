use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// A principal's relationship to one workspace. `is_active = false` is a
/// soft revocation, not a deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub workspace_id: Uuid,
    pub role: Role,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

/// Authenticated actor record. Carries both the legacy single-workspace
/// pointer and the multi-workspace membership list; every piece of code
/// that needs to match a principal against a workspace goes through the
/// helpers below rather than re-deriving the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub legacy_workspace_id: Option<Uuid>,
    pub current_workspace_id: Option<Uuid>,
    /// Ordered by join time; stable order drives first-membership adoption.
    pub memberships: Vec<Membership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    pub fn is_superuser(&self) -> bool {
        self.role == Role::Superuser
    }

    /// Active membership for the given workspace, if any.
    pub fn active_membership(&self, workspace_id: Uuid) -> Option<&Membership> {
        self.memberships
            .iter()
            .find(|m| m.workspace_id == workspace_id && m.is_active)
    }

    /// First active membership in list order; the deterministic adoption
    /// target when a principal has no workspace pointer yet.
    pub fn first_active_membership(&self) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.is_active)
    }

    /// Whether this principal may act inside the given workspace.
    /// Superusers always belong; otherwise the legacy pointer or an active
    /// membership must match.
    pub fn belongs_to_workspace(&self, workspace_id: Uuid) -> bool {
        if self.is_superuser() {
            return true;
        }
        if self.legacy_workspace_id == Some(workspace_id) {
            return true;
        }
        self.active_membership(workspace_id).is_some()
    }

    /// Role this principal holds inside the given workspace: the
    /// membership-specific role when one exists, else the global role for
    /// legacy-schema principals and superusers, else `None` when the
    /// principal has no relationship to the workspace at all.
    pub fn role_in_workspace(&self, workspace_id: Uuid) -> Option<Role> {
        if let Some(membership) = self.active_membership(workspace_id) {
            return Some(membership.role);
        }
        if self.is_superuser() || self.legacy_workspace_id == Some(workspace_id) {
            return Some(self.role);
        }
        None
    }

    /// Every workspace this principal is active in, for cross-workspace
    /// aggregate views. A non-empty membership list is authoritative (its
    /// active subset, in order); principals still on the legacy schema get
    /// their single workspace; principals with neither get nothing.
    pub fn active_workspace_ids(&self) -> Vec<Uuid> {
        if !self.memberships.is_empty() {
            return self
                .memberships
                .iter()
                .filter(|m| m.is_active)
                .map(|m| m.workspace_id)
                .collect();
        }
        self.legacy_workspace_id.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(workspace_id: Uuid, role: Role, is_active: bool) -> Membership {
        Membership {
            workspace_id,
            role,
            is_active,
            joined_at: Utc::now(),
        }
    }

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "pat@example.com".to_string(),
            role,
            legacy_workspace_id: None,
            current_workspace_id: None,
            memberships: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn superuser_belongs_everywhere() {
        let p = principal(Role::Superuser);
        assert!(p.belongs_to_workspace(Uuid::new_v4()));
        assert_eq!(p.role_in_workspace(Uuid::new_v4()), Some(Role::Superuser));
    }

    #[test]
    fn legacy_pointer_grants_access_with_global_role() {
        let ws = Uuid::new_v4();
        let mut p = principal(Role::TeamLead);
        p.legacy_workspace_id = Some(ws);

        assert!(p.belongs_to_workspace(ws));
        assert_eq!(p.role_in_workspace(ws), Some(Role::TeamLead));
        assert!(!p.belongs_to_workspace(Uuid::new_v4()));
    }

    #[test]
    fn active_membership_wins_over_global_role() {
        let ws = Uuid::new_v4();
        let mut p = principal(Role::TeamLead);
        p.memberships.push(membership(ws, Role::Member, true));

        assert!(p.belongs_to_workspace(ws));
        assert_eq!(p.role_in_workspace(ws), Some(Role::Member));
    }

    #[test]
    fn revoked_membership_neither_belongs_nor_has_role() {
        let ws = Uuid::new_v4();
        let mut p = principal(Role::Member);
        p.memberships.push(membership(ws, Role::Member, false));

        assert!(!p.belongs_to_workspace(ws));
        assert_eq!(p.role_in_workspace(ws), None);
    }

    #[test]
    fn unrelated_workspace_has_no_role() {
        let p = principal(Role::Member);
        assert_eq!(p.role_in_workspace(Uuid::new_v4()), None);
    }

    #[test]
    fn first_active_membership_skips_revoked_entries() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut p = principal(Role::Member);
        p.memberships.push(membership(a, Role::Member, false));
        p.memberships.push(membership(b, Role::Member, true));

        assert_eq!(p.first_active_membership().unwrap().workspace_id, b);
    }

    #[test]
    fn active_workspace_ids_prefers_membership_list_over_legacy() {
        let legacy = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut p = principal(Role::Member);
        p.legacy_workspace_id = Some(legacy);
        assert_eq!(p.active_workspace_ids(), vec![legacy]);

        p.memberships.push(membership(a, Role::Member, true));
        p.memberships.push(membership(b, Role::Member, false));
        // membership list is authoritative once present; only active entries count
        assert_eq!(p.active_workspace_ids(), vec![a]);
    }

    #[test]
    fn all_revoked_memberships_yield_empty_list_not_legacy_fallback() {
        let legacy = Uuid::new_v4();
        let mut p = principal(Role::Member);
        p.legacy_workspace_id = Some(legacy);
        p.memberships.push(membership(Uuid::new_v4(), Role::Member, false));

        assert!(p.active_workspace_ids().is_empty());
    }
}
