// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose which workflow actions a caller may perform on a
//! case right now. They are advisory only and do not replace the checks
//! made when an action is applied.

use casetrack::ensure_closable;
use casetrack_domain::{
    Case, CaseStatus, CostPhase, FinalCostPhase, PermissionContext, Role, Stage, WorkflowState,
    can_approve, can_cancel, can_edit, can_edit_content,
};

use crate::auth::AuthenticatedActor;
use crate::request_response::{Capability, CaseCapabilities};

const STAGES: [Stage; 5] = [
    Stage::Assignment,
    Stage::Investigation,
    Stage::SolutionPlan,
    Stage::Execution,
    Stage::Closing,
];

fn can_edit_stage(stage: Stage, case: &Case, ctx: &PermissionContext) -> bool {
    can_edit_content(stage, case, ctx) && case.has_reached(stage)
}

/// Whether the content required to leave the current stage is in place.
fn advance_ready(case: &Case) -> bool {
    match case.workflow_state() {
        WorkflowState::Assignment => case.assigned_to.is_some(),
        WorkflowState::Investigation => case.investigation.report.is_some(),
        WorkflowState::Solution(phase) => {
            matches!(phase, CostPhase::NotRequired | CostPhase::Approved)
        }
        WorkflowState::Execution => true,
        WorkflowState::Closing(_) | WorkflowState::Closed { .. } | WorkflowState::Cancelled { .. } => {
            false
        }
    }
}

/// Customer service acting on the closing stage of an active case.
fn is_closing_cs(case: &Case, ctx: &PermissionContext) -> bool {
    ctx.role == Role::CustomerService
        && case.current_stage == Stage::Closing
        && can_edit_content(Stage::Closing, case, ctx)
}

/// Computes what the caller may do on a case.
///
/// Closed and cancelled cases allow nothing.
#[must_use]
pub fn compute_case_capabilities(case: &Case, actor: &AuthenticatedActor) -> CaseCapabilities {
    let ctx: PermissionContext = actor.permission_context();
    let state: WorkflowState = case.workflow_state();

    let can_edit_stage: [Capability; 5] =
        STAGES.map(|stage| Capability::from_bool(can_edit_stage(stage, case, &ctx)));

    let can_advance: bool =
        can_edit_content(case.current_stage, case, &ctx) && advance_ready(case);

    let can_save_cost: bool = ctx.role == Role::Technician
        && case.current_stage == Stage::SolutionPlan
        && can_edit_content(Stage::SolutionPlan, case, &ctx)
        && !case.solution.cost.is_approved();

    let can_review_cost: bool = can_approve(Stage::SolutionPlan, case, &ctx)
        && case.current_stage == Stage::SolutionPlan
        && case.status == CaseStatus::Pending;

    let can_save_final_cost: bool = is_closing_cs(case, &ctx)
        && case.show_final_cost_section()
        && !case.closing.final_cost.is_approved();

    let can_review_final_cost: bool = can_approve(Stage::Closing, case, &ctx)
        && state == WorkflowState::Closing(FinalCostPhase::AwaitingApproval);

    let can_close: bool = is_closing_cs(case, &ctx) && ensure_closable(case).is_ok();

    CaseCapabilities {
        case_id: case.case_id,
        can_edit_stage,
        can_advance: Capability::from_bool(can_advance),
        can_save_cost: Capability::from_bool(can_save_cost),
        can_review_cost: Capability::from_bool(can_review_cost),
        can_save_final_cost: Capability::from_bool(can_save_final_cost),
        can_review_final_cost: Capability::from_bool(can_review_final_cost),
        can_close: Capability::from_bool(can_close),
        can_redo: Capability::from_bool(is_closing_cs(case, &ctx)),
        can_cancel: Capability::from_bool(
            can_edit(Stage::SolutionPlan, case, &ctx) && can_cancel(case, &ctx),
        ),
    }
}
