// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The final-cost review on the closing stage.
//!
//! Applies only to cases whose estimated cost was required and approved.
//! A final cost equal to the estimate needs no review.

use crate::error::CoreError;
use crate::transition::ensure_at;
use casetrack_domain::{
    Case, DomainError, FinalCostPhase, PermissionContext, Role, Stage, WorkflowState, can_approve,
    can_edit_content,
};

fn ensure_applicable(case: &Case) -> Result<(), CoreError> {
    if !case.show_final_cost_section() {
        return Err(CoreError::Validation(DomainError::FinalCostNotApplicable));
    }
    Ok(())
}

/// Records the final cost.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but customer service, or
/// `Validation` away from the closing stage, when the final cost does not
/// apply, once it is approved, or for an invalid amount.
pub fn save_final_cost(case: &mut Case, amount: f64, ctx: &PermissionContext) -> Result<(), CoreError> {
    if ctx.role != Role::CustomerService || !can_edit_content(Stage::Closing, case, ctx) {
        return Err(CoreError::denied("save_final_cost", ctx.role, Stage::Closing));
    }
    ensure_at("save_final_cost", Stage::Closing, case)?;
    ensure_applicable(case)?;
    let estimate: Option<f64> = case.solution.cost.estimated_cost();
    case.closing.final_cost.record(amount, estimate)?;
    Ok(())
}

fn ensure_reviewable(action: &'static str, case: &Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    if !can_approve(Stage::Closing, case, ctx) {
        return Err(CoreError::denied(action, ctx.role, Stage::Closing));
    }
    ensure_at(action, Stage::Closing, case)?;
    ensure_applicable(case)
}

/// Approves the pending final cost on behalf of the calling leader.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but a leader, or `Validation`
/// unless a final cost is awaiting review.
pub fn approve_final_cost(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    ensure_reviewable("approve_final_cost", case, ctx)?;
    case.closing.final_cost.approve(ctx.current_user_id)?;
    Ok(())
}

/// Rejects the pending final cost. Customer service may then correct it.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but a leader, or `Validation`
/// unless a final cost is awaiting review.
pub fn reject_final_cost(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    ensure_reviewable("reject_final_cost", case, ctx)?;
    case.closing.final_cost.reject()?;
    Ok(())
}

/// Checks whether the final cost allows the case to close.
///
/// # Errors
///
/// Returns `FinalCostMissing` when no final cost was recorded, or
/// `FinalCostPending` when it differs from the estimate without approval.
pub fn ensure_closable(case: &Case) -> Result<(), CoreError> {
    let WorkflowState::Closing(phase) = case.workflow_state() else {
        return Ok(());
    };
    match phase {
        FinalCostPhase::NotApplicable
        | FinalCostPhase::MatchesEstimate
        | FinalCostPhase::Approved => Ok(()),
        FinalCostPhase::Missing => Err(CoreError::FinalCostMissing),
        FinalCostPhase::AwaitingApproval
        | FinalCostPhase::Rejected
        | FinalCostPhase::Unreviewed => Err(CoreError::FinalCostPending),
    }
}
