// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stage progression: update, advance, close, redo, and cancel.
//!
//! Each function mutates a working copy of the case. Callers discard the
//! copy when an error is returned.

use crate::command::{
    AssignmentChanges, CaseChanges, ClosingChanges, ExecutionChanges, InvestigationChanges,
    SolutionChanges,
};
use crate::error::CoreError;
use crate::final_cost::ensure_closable;
use casetrack_domain::{
    Case, CaseStatus, CostEstimate, DomainError, PermissionContext, Rating, Role, Stage, can_cancel,
    can_edit_content,
};

fn parse_rating(raw: Option<u8>) -> Result<Option<Rating>, DomainError> {
    raw.map(Rating::new).transpose()
}

/// Checks that the caller may write content on `stage` and that the case
/// has reached it.
fn ensure_editable(
    action: &'static str,
    stage: Stage,
    case: &Case,
    ctx: &PermissionContext,
) -> Result<(), CoreError> {
    if !can_edit_content(stage, case, ctx) {
        return Err(CoreError::denied(action, ctx.role, stage));
    }
    if !case.has_reached(stage) {
        return Err(CoreError::Validation(DomainError::StageNotReached {
            stage,
            current: case.current_stage,
        }));
    }
    Ok(())
}

/// Requires the case to sit at `required`.
pub(crate) fn ensure_at(
    operation: &'static str,
    required: Stage,
    case: &Case,
) -> Result<(), DomainError> {
    if case.current_stage != required {
        return Err(DomainError::WrongStage {
            operation,
            required,
            current: case.current_stage,
        });
    }
    Ok(())
}

/// Merges grouped field changes into the case without moving it.
///
/// Every group is checked before any is applied.
///
/// # Errors
///
/// Returns `PermissionDenied` if the caller cannot edit one of the stages,
/// or `Validation` if a stage has not been reached or a rating is invalid.
pub fn update(case: &mut Case, changes: CaseChanges, ctx: &PermissionContext) -> Result<(), CoreError> {
    if changes.is_empty() {
        return Err(CoreError::Validation(DomainError::NoChanges));
    }
    for stage in changes.stages() {
        ensure_editable("update", stage, case, ctx)?;
    }

    let CaseChanges {
        assignment,
        investigation,
        solution,
        execution,
        closing,
    } = changes;

    // Validate every raw value before touching the case.
    let client_rating: Option<Rating> =
        parse_rating(execution.as_ref().and_then(|e| e.client_rating))?;
    let final_rating: Option<Rating> = parse_rating(closing.as_ref().and_then(|c| c.final_rating))?;

    if let Some(AssignmentChanges {
        client_id,
        site_id,
        contact_id,
        assigned_to,
        case_type,
        priority,
        description,
    }) = assignment
    {
        case.client_id = client_id;
        case.site_id = site_id;
        case.contact_id = contact_id;
        case.assigned_to = assigned_to;
        case.assignment.case_type = case_type;
        case.assignment.priority = priority;
        case.assignment.description = description;
    }
    if let Some(InvestigationChanges { report, checklist }) = investigation {
        case.investigation.report = report;
        case.investigation.checklist = checklist;
    }
    if let Some(SolutionChanges {
        root_cause,
        solution_description,
        checklist,
        planned_execution_date,
    }) = solution
    {
        case.solution.root_cause = root_cause;
        case.solution.solution_description = solution_description;
        case.solution.checklist = checklist;
        case.solution.planned_execution_date = planned_execution_date;
    }
    if let Some(ExecutionChanges {
        report,
        checklist,
        client_signature,
        client_feedback,
        ..
    }) = execution
    {
        case.execution.report = report;
        case.execution.checklist = checklist;
        case.execution.client_signature = client_signature;
        case.execution.client_feedback = client_feedback;
        case.execution.client_rating = client_rating;
    }
    if let Some(ClosingChanges {
        cs_notes,
        final_feedback,
        ..
    }) = closing
    {
        case.closing.cs_notes = cs_notes;
        case.closing.final_feedback = final_feedback;
        case.closing.final_rating = final_rating;
    }
    Ok(())
}

/// Completes the current stage and moves the case to the next one.
///
/// # Errors
///
/// Returns `StaleStage` if `from_stage` is not the current stage,
/// `PermissionDenied` if the caller does not own the current stage,
/// `CostApprovalPending` if a required cost is not approved, or
/// `Validation` if the stage is incomplete or has no successor.
pub fn advance(case: &mut Case, from_stage: Stage, ctx: &PermissionContext) -> Result<(), CoreError> {
    let current: Stage = case.current_stage;
    if from_stage != current {
        return Err(CoreError::StaleStage {
            expected: from_stage,
            current,
        });
    }
    if !can_edit_content(current, case, ctx) {
        return Err(CoreError::denied("advance", ctx.role, current));
    }

    match current {
        Stage::Assignment => {
            if case.assigned_to.is_none() {
                return Err(CoreError::Validation(DomainError::MissingRequiredField {
                    stage: current,
                    field: "assigned_to",
                }));
            }
        }
        Stage::Investigation => {
            if case.investigation.report.is_none() {
                return Err(CoreError::Validation(DomainError::MissingRequiredField {
                    stage: current,
                    field: "report",
                }));
            }
        }
        Stage::SolutionPlan => {
            let cost: &CostEstimate = &case.solution.cost;
            if cost.required() && !cost.is_approved() {
                return Err(CoreError::CostApprovalPending);
            }
        }
        Stage::Execution => {}
        Stage::Closing => return Err(CoreError::Validation(DomainError::NoNextStage)),
    }

    let Some(next) = current.next() else {
        return Err(CoreError::Validation(DomainError::NoNextStage));
    };
    case.current_stage = next;
    if !matches!(case.status, CaseStatus::Pending | CaseStatus::Rejected) {
        case.status = CaseStatus::InProgress;
    }
    Ok(())
}

/// Closes a case at the closing stage.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but customer service,
/// `Validation` away from the closing stage, or `FinalCostMissing` /
/// `FinalCostPending` while the final cost blocks closing.
pub fn close(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    if ctx.role != Role::CustomerService || !can_edit_content(Stage::Closing, case, ctx) {
        return Err(CoreError::denied("close", ctx.role, Stage::Closing));
    }
    ensure_at("close", Stage::Closing, case)?;
    ensure_closable(case)?;
    case.status = CaseStatus::Closed;
    Ok(())
}

/// Sends a case at the closing stage back to the solution stage.
///
/// Execution and closing content is discarded along with its attachments,
/// a leader decision on the estimate is cleared, and the attempt counter
/// increments.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but customer service or
/// `Validation` away from the closing stage.
pub fn redo(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    if ctx.role != Role::CustomerService || !can_edit_content(Stage::Closing, case, ctx) {
        return Err(CoreError::denied("redo", ctx.role, Stage::Closing));
    }
    ensure_at("redo", Stage::Closing, case)?;

    case.current_stage = Stage::SolutionPlan;
    case.clear_execution();
    case.clear_closing();
    case.solution.cost.reset_decision();
    case.attempt_number = case.attempt_number.saturating_add(1);
    case.status = CaseStatus::InProgress;
    Ok(())
}

/// Cancels a case whose estimated cost was rejected.
///
/// # Errors
///
/// Returns `PermissionDenied` for anyone but customer service, or
/// `Validation` unless the case sits at the solution stage with a rejected cost.
pub fn cancel(case: &mut Case, ctx: &PermissionContext) -> Result<(), CoreError> {
    if ctx.role != Role::CustomerService {
        return Err(CoreError::denied("cancel", ctx.role, Stage::SolutionPlan));
    }
    ensure_at("cancel", Stage::SolutionPlan, case)?;
    if !case.solution.cost.is_rejected() {
        return Err(CoreError::Validation(DomainError::CostNotRejected));
    }
    if !can_cancel(case, ctx) {
        return Err(CoreError::denied("cancel", ctx.role, Stage::SolutionPlan));
    }
    case.status = CaseStatus::Cancelled;
    Ok(())
}
