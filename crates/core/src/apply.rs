// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::TransitionResult;
use crate::{attachments, cost, final_cost, transition};
use casetrack_audit::{Action, Actor, AuditEvent, Cause};
use casetrack_domain::{
    Case, CaseNumber, NewCase, PermissionContext, Role, Stage, validate_new_case,
};

/// Applies a command to a case, producing a new case and an audit event.
///
/// The input case is never modified. Checks run in a fixed order: a
/// terminal case is rejected first, then a stale caller, then the caller's
/// permission, then the stage and cost preconditions.
///
/// # Arguments
///
/// * `case` - The current case (immutable)
/// * `command` - The command to apply
/// * `ctx` - The caller's role and user id
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns `CoreError::CaseClosed` for closed or cancelled cases and the
/// command-specific error otherwise.
pub fn apply(
    case: &Case,
    command: Command,
    ctx: &PermissionContext,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    if !case.is_active() {
        return Err(CoreError::CaseClosed {
            case_id: case.case_id,
        });
    }

    let action: Action = Action::new(command.name().to_string(), command.details());
    let mut new_case: Case = case.clone();

    match command {
        Command::UpdateCase { changes } => transition::update(&mut new_case, changes, ctx)?,
        Command::AdvanceStage { from_stage } => transition::advance(&mut new_case, from_stage, ctx)?,
        Command::SaveCost {
            required,
            estimated_cost,
            description,
        } => cost::save_cost(&mut new_case, required, estimated_cost, description, ctx)?,
        Command::ApproveCost => cost::approve_cost(&mut new_case, ctx)?,
        Command::RejectCost { .. } => cost::reject_cost(&mut new_case, ctx)?,
        Command::SaveFinalCost { amount } => {
            final_cost::save_final_cost(&mut new_case, amount, ctx)?;
        }
        Command::ApproveFinalCost => final_cost::approve_final_cost(&mut new_case, ctx)?,
        Command::RejectFinalCost { .. } => final_cost::reject_final_cost(&mut new_case, ctx)?,
        Command::CloseCase => transition::close(&mut new_case, ctx)?,
        Command::RedoCase => transition::redo(&mut new_case, ctx)?,
        Command::CancelCase => transition::cancel(&mut new_case, ctx)?,
        Command::UploadAttachments {
            stage,
            files,
            attachment_type,
        } => {
            attachments::upload(&mut new_case, stage, files, attachment_type, ctx)?;
        }
        Command::DeleteAttachment { attachment_id } => {
            attachments::delete(&mut new_case, attachment_id, ctx)?;
        }
    }

    new_case.validate_invariants()?;

    let audit_event: AuditEvent = AuditEvent::for_transition(case, &new_case, actor, cause, action);

    Ok(TransitionResult {
        new_case,
        audit_event,
    })
}

/// Registers a new case at the assignment stage.
///
/// Only customer service registers cases. The store allocates `case_id`
/// and `case_number` before calling this.
///
/// # Errors
///
/// Returns `PermissionDenied` for other roles or `Validation` for invalid
/// references.
pub fn open_case(
    case_id: i64,
    case_number: CaseNumber,
    new_case: NewCase,
    ctx: &PermissionContext,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    if ctx.role != Role::CustomerService {
        return Err(CoreError::denied("create_case", ctx.role, Stage::Assignment));
    }
    validate_new_case(&new_case)?;

    let case: Case = Case::open(case_id, case_number, new_case, ctx.current_user_id);
    let action: Action = Action::new(
        String::from("CreateCase"),
        Some(format!("Registered case {}", case.case_number)),
    );
    let audit_event: AuditEvent = AuditEvent::for_transition(&case, &case, actor, cause, action);

    Ok(TransitionResult {
        new_case: case,
        audit_event,
    })
}
