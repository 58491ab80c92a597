// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The estimated-cost review on the solution stage.

use crate::error::CoreError;
use crate::transition::ensure_at;
use casetrack_domain::{
    Case, CaseStatus, DomainError, PermissionContext, Role, Stage, can_approve, can_edit_content,
};

/// Saves the technician's cost decision.
///
/// A required cost is submitted for review and puts the case in `pending`.
/// Withdrawing the requirement clears the cost and lifts a `pending` or
/// `rejected` case back to `in_progress`.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but a technician, or `Validation`
/// away from the solution stage, once the cost is approved, or when a
/// required cost is missing or invalid.
pub fn save_cost(
    case: &mut Case,
    required: bool,
    estimated_cost: Option<f64>,
    description: Option<String>,
    ctx: &PermissionContext,
) -> Result<(), CoreError> {
    if ctx.role != Role::Technician || !can_edit_content(Stage::SolutionPlan, case, ctx) {
        return Err(CoreError::denied("save_cost", ctx.role, Stage::SolutionPlan));
    }
    ensure_at("save_cost", Stage::SolutionPlan, case)?;

    if required {
        let Some(amount) = estimated_cost else {
            return Err(CoreError::Validation(DomainError::MissingRequiredField {
                stage: Stage::SolutionPlan,
                field: "estimated_cost",
            }));
        };
        case.solution.cost.submit(amount, description)?;
        case.status = CaseStatus::Pending;
    } else {
        case.solution.cost.withdraw()?;
        if matches!(case.status, CaseStatus::Pending | CaseStatus::Rejected) {
            case.status = CaseStatus::InProgress;
        }
    }
    Ok(())
}

fn ensure_reviewable(action: &'static str, case: &Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    if !can_approve(Stage::SolutionPlan, case, ctx) {
        return Err(CoreError::denied(action, ctx.role, Stage::SolutionPlan));
    }
    ensure_at(action, Stage::SolutionPlan, case)?;
    if case.status != CaseStatus::Pending {
        return Err(CoreError::Validation(DomainError::NoPendingCost {
            state: format!("case status {}", case.status),
        }));
    }
    Ok(())
}

/// Approves the pending estimate. The case stays on the solution stage.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but a leader, or `Validation`
/// unless a required cost is awaiting review.
pub fn approve_cost(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    ensure_reviewable("approve_cost", case, ctx)?;
    case.solution.cost.approve()?;
    case.status = CaseStatus::InProgress;
    Ok(())
}

/// Rejects the pending estimate.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but a leader, or `Validation`
/// unless a required cost is awaiting review.
pub fn reject_cost(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    ensure_reviewable("reject_cost", case, ctx)?;
    case.solution.cost.reject()?;
    case.status = CaseStatus::Rejected;
    Ok(())
}
