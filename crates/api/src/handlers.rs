// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers convert request DTOs into workflow input, call the store, and
//! shape the result into response DTOs. Malformed requests are rejected
//! here, before the store is touched.

use casetrack::CaseChanges;
use casetrack_audit::Cause;
use casetrack_domain::{Attachment, AttachmentType, Case, CaseStatus, NewAttachment, Stage};
use tracing::{debug, info};

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::request_response::{
    AdvanceStageRequest, AttachmentInfo, CaseCapabilities, CaseInfo, CaseResponse,
    CaseSummaryInfo, CreateCaseRequest, DeleteAttachmentResponse, ListCasesRequest,
    ListCasesResponse, RejectRequest, SaveCostRequest, SaveFinalCostRequest, UpdateCaseRequest,
    UploadAttachmentsRequest, UploadAttachmentsResponse, parse_stage,
};
use crate::store::CaseStore;

fn case_response(case: &Case, message: String) -> CaseResponse {
    CaseResponse {
        case: CaseInfo::from(case),
        message,
    }
}

/// Registers a new case.
///
/// Only customer service may register cases. The case starts at the
/// assignment stage with a generated case number.
///
/// # Errors
///
/// Returns an error if the caller is not customer service, the input is
/// invalid, or the case cannot be stored.
pub fn create_case<S: CaseStore>(
    store: &mut S,
    request: CreateCaseRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.create_case(request.into_new_case(), actor, cause)?;
    info!(
        case_id = case.case_id,
        case_number = %case.case_number,
        actor_id = %actor.id,
        "Registered case"
    );
    let message: String = format!("Registered case {}", case.case_number);
    Ok(case_response(&case, message))
}

/// Loads a case with all stage forms and attachments.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the case does not exist.
pub fn get_case<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.get_case(case_id, actor)?;
    debug!(case_id, actor_id = %actor.id, "Loaded case");
    let message: String = format!("Case {}", case.case_number);
    Ok(case_response(&case, message))
}

/// Lists cases, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the status filter is unknown or the cases cannot
/// be read.
pub fn list_cases<S: CaseStore>(
    store: &mut S,
    request: &ListCasesRequest,
    actor: &AuthenticatedActor,
) -> Result<ListCasesResponse, ApiError> {
    let status: Option<CaseStatus> = request.status_filter()?;
    let cases: Vec<Case> = store.list_cases(status, actor)?;
    debug!(count = cases.len(), actor_id = %actor.id, "Listed cases");
    Ok(ListCasesResponse {
        cases: cases.iter().map(CaseSummaryInfo::from).collect(),
    })
}

/// Replaces the submitted stage forms.
///
/// # Errors
///
/// Returns an error if a form is malformed, the caller may not edit one
/// of the submitted stages, or the case has not reached it.
pub fn update_case<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: UpdateCaseRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let changes: CaseChanges = request.into_changes()?;
    let case: Case = store.update_case(case_id, changes, actor, cause)?;
    Ok(case_response(&case, format!("Updated case {}", case.case_number)))
}

/// Moves a case to its next stage.
///
/// # Errors
///
/// Returns `StaleStage` if the case is no longer at `from_stage`, or the
/// workflow error that blocks the move.
pub fn advance_stage<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: AdvanceStageRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let from_stage: Stage = parse_stage(request.from_stage)?;
    let case: Case = store.advance_stage(case_id, from_stage, actor, cause)?;
    let message: String = format!(
        "Case {} moved to {}",
        case.case_number,
        case.current_stage.name()
    );
    Ok(case_response(&case, message))
}

/// Saves or withdraws the estimated cost.
///
/// # Errors
///
/// Returns an error if the caller is not a technician on the solution
/// stage, the cost is already approved, or the amount is invalid.
pub fn save_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: SaveCostRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.save_cost(
        case_id,
        request.required,
        request.estimated_cost,
        request.description,
        actor,
        cause,
    )?;
    let message: String = if request.required {
        String::from("Estimated cost submitted for approval")
    } else {
        String::from("Estimated cost marked as not required")
    };
    Ok(case_response(&case, message))
}

/// Approves the pending estimated cost.
///
/// # Errors
///
/// Returns an error if the caller is not a leader or no cost is pending.
pub fn approve_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.approve_cost(case_id, actor, cause)?;
    Ok(case_response(&case, String::from("Estimated cost approved")))
}

/// Rejects the pending estimated cost.
///
/// # Errors
///
/// Returns an error if the caller is not a leader or no cost is pending.
pub fn reject_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: RejectRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.reject_cost(case_id, request.reason, actor, cause)?;
    Ok(case_response(&case, String::from("Estimated cost rejected")))
}

/// Records the final cost.
///
/// # Errors
///
/// Returns an error if the caller is not customer service on the closing
/// stage, the final cost does not apply, or the amount is invalid.
pub fn save_final_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: SaveFinalCostRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.save_final_cost(case_id, request.amount, actor, cause)?;
    let message: String = if case.final_cost_matches_estimate() {
        String::from("Final cost matches the estimate")
    } else {
        String::from("Final cost submitted for approval")
    };
    Ok(case_response(&case, message))
}

/// Approves the pending final cost.
///
/// # Errors
///
/// Returns an error if the caller is not a leader or no final cost is
/// pending.
pub fn approve_final_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.approve_final_cost(case_id, actor, cause)?;
    Ok(case_response(&case, String::from("Final cost approved")))
}

/// Rejects the pending final cost.
///
/// # Errors
///
/// Returns an error if the caller is not a leader or no final cost is
/// pending.
pub fn reject_final_cost<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: RejectRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.reject_final_cost(case_id, request.reason, actor, cause)?;
    Ok(case_response(&case, String::from("Final cost rejected")))
}

/// Closes the case.
///
/// # Errors
///
/// Returns `FinalCostMissing` or `FinalCostPending` while the final cost
/// blocks closing, or a permission or stage error.
pub fn close_case<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.close_case(case_id, actor, cause)?;
    info!(case_id, actor_id = %actor.id, "Closed case");
    Ok(case_response(&case, format!("Case {} closed", case.case_number)))
}

/// Sends the case back to the solution stage.
///
/// # Errors
///
/// Returns an error if the caller is not customer service or the case is
/// not at the closing stage.
pub fn redo_case<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.redo_case(case_id, actor, cause)?;
    info!(
        case_id,
        attempt_number = case.attempt_number,
        actor_id = %actor.id,
        "Case sent back for another attempt"
    );
    let message: String = format!(
        "Case {} returned to the solution stage (attempt {})",
        case.case_number, case.attempt_number
    );
    Ok(case_response(&case, message))
}

/// Cancels the case after a rejected estimate.
///
/// # Errors
///
/// Returns an error unless customer service cancels a case whose
/// estimated cost was rejected.
pub fn cancel_case<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CaseResponse, ApiError> {
    let case: Case = store.cancel_case(case_id, actor, cause)?;
    info!(case_id, actor_id = %actor.id, "Cancelled case");
    Ok(case_response(&case, format!("Case {} cancelled", case.case_number)))
}

/// Attaches files to a stage.
///
/// # Errors
///
/// Returns an error if the request is malformed, the caller may not edit
/// the stage, or `cost` files target a stage other than the solution.
pub fn upload_attachments<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    request: UploadAttachmentsRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UploadAttachmentsResponse, ApiError> {
    let (stage, files, attachment_type): (Stage, Vec<NewAttachment>, AttachmentType) =
        request.into_parts()?;
    let stored: Vec<Attachment> =
        store.upload_attachments(stage, case_id, files, attachment_type, actor, cause)?;
    let message: String = format!("Attached {} file(s) to {}", stored.len(), stage.name());
    Ok(UploadAttachmentsResponse {
        case_id,
        attachments: stored.iter().map(AttachmentInfo::from).collect(),
        message,
    })
}

/// Deletes an attachment.
///
/// # Errors
///
/// Returns an error if the attachment does not exist or the caller may not
/// edit its stage.
pub fn delete_attachment<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    attachment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DeleteAttachmentResponse, ApiError> {
    store.delete_attachment(case_id, attachment_id, actor, cause)?;
    Ok(DeleteAttachmentResponse {
        case_id,
        attachment_id,
        message: format!("Deleted attachment {attachment_id}"),
    })
}

/// Computes what the caller may do on a case.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the case does not exist.
pub fn get_case_capabilities<S: CaseStore>(
    store: &mut S,
    case_id: i64,
    actor: &AuthenticatedActor,
) -> Result<CaseCapabilities, ApiError> {
    store.get_capabilities(case_id, actor)
}
