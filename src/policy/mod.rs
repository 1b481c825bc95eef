//! Entitlement guards evaluated after workspace resolution.
//!
//! Every predicate here is a pure decision function over an already-resolved
//! [`RequestContext`]: no I/O beyond what resolution cached, no re-derivation
//! of tenancy. Guards either pass or terminate the request with a typed
//! rejection; composition is sequential and the first failure wins.

use thiserror::Error;

use crate::context::RequestContext;
use crate::types::{LimitedResource, WorkspaceTier};

/// Guard-phase denials. All are expected, caller-recoverable outcomes.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("this operation requires the {required} tier")]
    TierRestricted { required: WorkspaceTier },

    #[error("feature '{feature}' is not available for this workspace")]
    FeatureNotAvailable { feature: String },

    #[error("{resource} limit reached ({current}/{limit})")]
    LimitReached {
        resource: LimitedResource,
        limit: i64,
        current: i64,
    },
}

impl PolicyError {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::TierRestricted { .. } => "TIER_RESTRICTED",
            PolicyError::FeatureNotAvailable { .. } => "FEATURE_NOT_AVAILABLE",
            PolicyError::LimitReached { resource, .. } => resource.limit_code(),
        }
    }
}

/// Tier gate for premium functionality (bulk import, audit logs, advanced
/// automation).
pub fn require_tier_at_least(
    ctx: &RequestContext,
    required: WorkspaceTier,
) -> Result<(), PolicyError> {
    if ctx.bypasses_policy() {
        return Ok(());
    }
    match ctx.tier {
        Some(tier) if tier >= required => Ok(()),
        _ => Err(PolicyError::TierRestricted { required }),
    }
}

/// Named feature-flag gate. A flag missing from the workspace record reads
/// as disabled.
pub fn require_feature(ctx: &RequestContext, feature: &str) -> Result<(), PolicyError> {
    if ctx.bypasses_policy() {
        return Ok(());
    }
    if ctx.feature_enabled(feature) {
        Ok(())
    } else {
        Err(PolicyError::FeatureNotAvailable {
            feature: feature.to_string(),
        })
    }
}

/// Quota gate over the usage snapshot frozen at resolution time. Advisory:
/// the eventual counter increment is not transactional with this check, so a
/// concurrent creation burst can overshoot a limit by a small margin.
pub fn require_under_limit(
    ctx: &RequestContext,
    resource: LimitedResource,
) -> Result<(), PolicyError> {
    if ctx.bypasses_policy() {
        return Ok(());
    }
    let Some(workspace) = ctx.workspace.as_ref() else {
        // Workspace-less contexts are superusers by invariant, already
        // handled by the bypass above.
        return Ok(());
    };
    if workspace.tier == WorkspaceTier::Standard {
        return Ok(());
    }
    match workspace.limits.for_resource(resource) {
        None => Ok(()),
        Some(limit) => {
            let current = workspace.usage.for_resource(resource);
            if current < limit {
                Ok(())
            } else {
                Err(PolicyError::LimitReached {
                    resource,
                    limit,
                    current,
                })
            }
        }
    }
}

type Predicate = Box<dyn Fn(&RequestContext) -> Result<(), PolicyError> + Send + Sync>;

/// Sequential composition of guard predicates. Evaluation stops at the first
/// failing predicate; there is no aggregated reporting.
#[derive(Default)]
pub struct Policy {
    predicates: Vec<Predicate>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier_at_least(mut self, tier: WorkspaceTier) -> Self {
        self.predicates
            .push(Box::new(move |ctx| require_tier_at_least(ctx, tier)));
        self
    }

    pub fn feature(mut self, name: &str) -> Self {
        let name = name.to_string();
        self.predicates
            .push(Box::new(move |ctx| require_feature(ctx, &name)));
        self
    }

    pub fn under_limit(mut self, resource: LimitedResource) -> Self {
        self.predicates
            .push(Box::new(move |ctx| require_under_limit(ctx, resource)));
        self
    }

    pub fn evaluate(&self, ctx: &RequestContext) -> Result<(), PolicyError> {
        for predicate in &self.predicates {
            predicate(ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::workspace::features;
    use crate::testing::fixtures;
    use crate::types::Role;

    fn scoped_ctx(tier: WorkspaceTier, role: Role) -> RequestContext {
        let ws = fixtures::workspace(tier, true);
        let mut principal = fixtures::principal(role);
        principal
            .memberships
            .push(fixtures::membership(ws.id, role, true));
        RequestContext::scoped(&principal, ws, role)
    }

    #[test]
    fn community_tier_is_blocked_from_premium_operations() {
        let ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        let err = require_tier_at_least(&ctx, WorkspaceTier::Standard).unwrap_err();
        assert_eq!(err.code(), "TIER_RESTRICTED");
    }

    #[test]
    fn standard_tier_passes_the_tier_gate() {
        let ctx = scoped_ctx(WorkspaceTier::Standard, Role::Member);
        assert!(require_tier_at_least(&ctx, WorkspaceTier::Standard).is_ok());
    }

    #[test]
    fn superuser_bypasses_every_predicate() {
        let principal = fixtures::principal(Role::Superuser);
        let ctx = RequestContext::superuser(&principal);

        assert!(require_tier_at_least(&ctx, WorkspaceTier::Standard).is_ok());
        assert!(require_feature(&ctx, features::AUDIT_LOGS).is_ok());
        assert!(require_under_limit(&ctx, LimitedResource::Users).is_ok());
    }

    #[test]
    fn coordinator_bypasses_like_a_platform_operator() {
        let ctx = scoped_ctx(WorkspaceTier::Community, Role::Coordinator);
        assert!(require_tier_at_least(&ctx, WorkspaceTier::Standard).is_ok());
        assert!(require_feature(&ctx, features::BULK_IMPORT).is_ok());
        assert!(require_under_limit(&ctx, LimitedResource::Teams).is_ok());
    }

    #[test]
    fn missing_feature_key_denies_without_panicking() {
        let ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        let err = require_feature(&ctx, features::AUDIT_LOGS).unwrap_err();
        assert_eq!(err.code(), "FEATURE_NOT_AVAILABLE");
    }

    #[test]
    fn enabled_feature_passes() {
        let mut ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        ctx.workspace
            .as_mut()
            .unwrap()
            .features
            .insert(features::TIME_OFF.to_string(), true);
        assert!(require_feature(&ctx, features::TIME_OFF).is_ok());
    }

    #[test]
    fn quota_boundary_denies_at_the_limit_and_passes_below_it() {
        let mut ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        {
            let ws = ctx.workspace.as_mut().unwrap();
            ws.limits.max_users = Some(10);
            ws.usage.user_count = 10;
        }
        match require_under_limit(&ctx, LimitedResource::Users).unwrap_err() {
            PolicyError::LimitReached {
                limit, current, ..
            } => {
                assert_eq!(limit, 10);
                assert_eq!(current, 10);
            }
            other => panic!("expected LimitReached, got {other:?}"),
        }

        ctx.workspace.as_mut().unwrap().usage.user_count = 9;
        assert!(require_under_limit(&ctx, LimitedResource::Users).is_ok());
    }

    #[test]
    fn standard_tier_ignores_limit_values_entirely() {
        let mut ctx = scoped_ctx(WorkspaceTier::Standard, Role::Member);
        {
            let ws = ctx.workspace.as_mut().unwrap();
            ws.limits.max_users = Some(1);
            ws.usage.user_count = 50;
        }
        assert!(require_under_limit(&ctx, LimitedResource::Users).is_ok());
    }

    #[test]
    fn unlimited_sentinel_never_denies() {
        let mut ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        {
            let ws = ctx.workspace.as_mut().unwrap();
            ws.limits.max_teams = None;
            ws.usage.team_count = 10_000;
        }
        assert!(require_under_limit(&ctx, LimitedResource::Teams).is_ok());
    }

    #[test]
    fn composite_policy_surfaces_the_first_failure_only() {
        let ctx = scoped_ctx(WorkspaceTier::Community, Role::Member);
        let policy = Policy::new()
            .tier_at_least(WorkspaceTier::Standard)
            .feature(features::BULK_IMPORT);

        // Both predicates would fail; the tier gate runs first and wins.
        let err = policy.evaluate(&ctx).unwrap_err();
        assert_eq!(err.code(), "TIER_RESTRICTED");
    }

    #[test]
    fn composite_policy_passes_when_every_predicate_passes() {
        let mut ctx = scoped_ctx(WorkspaceTier::Standard, Role::Member);
        ctx.workspace
            .as_mut()
            .unwrap()
            .features
            .insert(features::BULK_IMPORT.to_string(), true);

        let policy = Policy::new()
            .tier_at_least(WorkspaceTier::Standard)
            .feature(features::BULK_IMPORT)
            .under_limit(LimitedResource::Tasks);
        assert!(policy.evaluate(&ctx).is_ok());
    }
}
