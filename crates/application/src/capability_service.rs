use std::sync::Arc;

use presensi_core::{AppError, AppResult, EmployeeId};
use presensi_domain::{
    ApprovalDecision, ApprovalLevel, ApprovalOperation, ApprovalPolicy, ApprovalScope,
    CapabilitySet, Context, LandingSurface, LegacyRoleLevels, PositionAssignment,
    resolve_landing_surface, resolve_with_selected,
};
use tracing::{info, warn};

use crate::context_service::today;
use crate::{ActorSession, ApprovalForwardRequest, ApprovalGateway, ContextService};


/// Whether one operation/scope pair is permitted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPermission {
    /// Approval workflow.
    pub operation: ApprovalOperation,
    /// Claimed reach.
    pub scope: ApprovalScope,
    /// Gate result for the current context.
    pub permitted: bool,
}

/// Capability of the current context plus every gate it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityOverview {
    /// Authority of the current context; none when no positions are held.
    pub capability: CapabilitySet,
    /// Gate results for every operation and scope.
    pub permissions: Vec<OperationPermission>,
}

/// Landing decision taken at sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingResolution {
    /// Surface to route to.
    pub surface: LandingSurface,
    /// Max of role-based and position-based approval levels.
    pub approval_level: ApprovalLevel,
    /// Position data could not be loaded; only the role signal was used.
    pub capability_degraded: bool,
}

/// Input for a gated approval decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitApprovalInput {
    /// Workflow the record belongs to.
    pub operation: ApprovalOperation,
    /// Backend record identifier.
    pub record_id: i64,
    /// Approve or reject.
    pub decision: ApprovalDecision,
    /// Reach the approver acts with.
    pub scope: ApprovalScope,
    /// Optional reviewer note.
    pub note: Option<String>,
}

/// Application service deriving approval capability from the current context.
#[derive(Clone)]
pub struct CapabilityService {
    context_service: ContextService,
    approval_gateway: Arc<dyn ApprovalGateway>,
    policy: ApprovalPolicy,
    role_levels: LegacyRoleLevels,
}

impl CapabilityService {
    /// Creates a capability service.
    #[must_use]
    pub fn new(
        context_service: ContextService,
        approval_gateway: Arc<dyn ApprovalGateway>,
        policy: ApprovalPolicy,
        role_levels: LegacyRoleLevels,
    ) -> Self {
        Self {
            context_service,
            approval_gateway,
            policy,
            role_levels,
        }
    }

    /// Returns the capability of the session's current context.
    pub async fn current_capability(&self, session: &ActorSession) -> AppResult<CapabilitySet> {
        let availability = self.context_service.available_contexts(session).await?;
        Ok(CapabilitySet::from_contexts(availability.contexts()))
    }

    /// Returns the current capability and the gates it opens.
    pub async fn capability_overview(
        &self,
        session: &ActorSession,
    ) -> AppResult<CapabilityOverview> {
        let capability = self.current_capability(session).await?;
        let permissions = ApprovalOperation::all()
            .iter()
            .flat_map(|operation| {
                ApprovalScope::all().iter().map(|scope| OperationPermission {
                    operation: *operation,
                    scope: *scope,
                    permitted: capability.permits(&self.policy.requirement(*scope)),
                })
            })
            .collect();

        Ok(CapabilityOverview {
            capability,
            permissions,
        })
    }

    /// Ensures the current context may act on an operation in a scope.
    pub async fn require_approval(
        &self,
        session: &ActorSession,
        operation: ApprovalOperation,
        scope: ApprovalScope,
    ) -> AppResult<CapabilitySet> {
        let capability = self.current_capability(session).await?;
        self.ensure_permitted(session, capability, operation, scope)?;
        Ok(capability)
    }

    /// Gates a decision on the current context and forwards it to the backend.
    ///
    /// The gate and the forwarded acting assignment come from the same
    /// resolved current context.
    pub async fn submit_decision(
        &self,
        session: &ActorSession,
        input: SubmitApprovalInput,
    ) -> AppResult<()> {
        let availability = self.context_service.available_contexts(session).await?;
        let current = availability.current();
        let capability = current.map_or_else(CapabilitySet::none, CapabilitySet::from_context);
        self.ensure_permitted(session, capability, input.operation, input.scope)?;
        let acting_assignment_id = current.and_then(Context::assignment_id);

        self.approval_gateway
            .forward_decision(
                &session.access_token,
                ApprovalForwardRequest {
                    operation: input.operation,
                    record_id: input.record_id,
                    decision: input.decision,
                    scope: input.scope,
                    approver_id: session.employee_id(),
                    acting_assignment_id,
                    note: input.note,
                },
            )
            .await?;

        info!(
            employee_id = %session.employee_id(),
            operation = input.operation.as_str(),
            record_id = input.record_id,
            decision = input.decision.as_str(),
            scope = input.scope.as_str(),
            acting_assignment_id = ?acting_assignment_id.map(|id| id.as_i64()),
            "approval decision forwarded"
        );

        Ok(())
    }

    /// Chooses the landing surface for a freshly authenticated actor.
    ///
    /// An unreachable assignment source degrades to the role-based signal
    /// instead of failing sign-in and never raises the resulting level. Any
    /// other failure, a rejected token in particular, is returned.
    pub async fn resolve_landing(&self, session: &ActorSession) -> AppResult<LandingResolution> {
        let position_level = match self.context_service.load_assignments(session).await {
            Ok(assignments) => Some(combined_position_level(session, &assignments)),
            Err(AppError::UpstreamUnavailable(message)) => {
                warn!(
                    employee_id = %session.employee_id(),
                    error = %message,
                    "position capability unavailable, routing on role signal only"
                );
                None
            }
            Err(error) => return Err(error),
        };

        let surface =
            resolve_landing_surface(&session.identity, &self.role_levels, position_level);
        let approval_level = self
            .role_levels
            .role_level(&session.identity)
            .max(position_level.unwrap_or(ApprovalLevel::NONE));

        Ok(LandingResolution {
            surface,
            approval_level,
            capability_degraded: position_level.is_none(),
        })
    }

    /// Returns whether the actor belongs to the admin surface.
    #[must_use]
    pub fn is_admin(&self, session: &ActorSession) -> bool {
        self.role_levels.is_admin(&session.identity)
    }

    /// Lists an employee's active assignments; admins may read any employee.
    pub async fn list_assignments(
        &self,
        session: &ActorSession,
        employee_id: Option<EmployeeId>,
    ) -> AppResult<Vec<PositionAssignment>> {
        let employee_id = employee_id.unwrap_or_else(|| session.employee_id());
        if employee_id != session.employee_id() && !self.is_admin(session) {
            return Err(AppError::Forbidden(format!(
                "employee '{}' may not read assignments of employee '{employee_id}'",
                session.employee_id()
            )));
        }

        self.context_service
            .list_active_assignments(&session.access_token, employee_id)
            .await
    }

    fn ensure_permitted(
        &self,
        session: &ActorSession,
        capability: CapabilitySet,
        operation: ApprovalOperation,
        scope: ApprovalScope,
    ) -> AppResult<()> {
        let requirement = self.policy.requirement(scope);
        if capability.permits(&requirement) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "employee '{}' acting at approval level {} may not decide {} requests in {} scope (requires level {}{})",
            session.employee_id(),
            capability.approval_level(),
            operation.as_str(),
            scope.as_str(),
            requirement.min_level,
            if requirement.requires_org_wide {
                " with organization-wide authority"
            } else {
                ""
            }
        )))
    }
}

fn combined_position_level(
    session: &ActorSession,
    assignments: &[PositionAssignment],
) -> ApprovalLevel {
    let contexts = resolve_with_selected(assignments, session.employee_id(), None, today());
    CapabilitySet::from_contexts(&contexts).approval_level()
}
