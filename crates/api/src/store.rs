// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The case store contract and its `SQLite` implementation.
//!
//! Every mutating action follows the same path: load the case, apply the
//! command, log the audit event, and save with the loaded version. The
//! caller is expected to hold exclusive access to the store for the
//! duration of one action.

use casetrack::{CaseChanges, Command, TransitionResult, apply, open_case};
use casetrack_audit::Cause;
use casetrack_domain::{
    Attachment, AttachmentType, Case, CaseNumber, CaseStatus, NewAttachment, NewCase, Stage,
};
use casetrack_persistence::Persistence;
use time::OffsetDateTime;
use tracing::info;

use crate::auth::AuthenticatedActor;
use crate::capabilities::compute_case_capabilities;
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::CaseCapabilities;

/// Logs the audit event of a successful transition.
fn log_audit_event(result: &TransitionResult) {
    let event = &result.audit_event;
    info!(
        case_id = event.case.case_id,
        case_number = %event.case.case_number,
        actor_id = %event.actor.id,
        actor_type = %event.actor.actor_type,
        cause_id = %event.cause.id,
        action = %event.action.name,
        details = event.action.details.as_deref().unwrap_or(""),
        stage_before = event.before.stage.number(),
        stage_after = event.after.stage.number(),
        status_before = %event.before.status,
        status_after = %event.after.status,
        "Audit event"
    );
}

/// Case storage as seen by the workflow.
///
/// Implementors supply loading, listing, registration, and
/// [`CaseStore::execute`]; every workflow action is provided on top of
/// `execute`.
pub trait CaseStore {
    /// Registers a new case at the assignment stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not customer service, the input is
    /// invalid, or the case cannot be stored.
    fn create_case(
        &mut self,
        new_case: NewCase,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError>;

    /// Loads a case.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the case does not exist.
    fn get_case(&mut self, case_id: i64, actor: &AuthenticatedActor) -> Result<Case, ApiError>;

    /// Lists cases, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the cases cannot be read.
    fn list_cases(
        &mut self,
        status: Option<CaseStatus>,
        actor: &AuthenticatedActor,
    ) -> Result<Vec<Case>, ApiError>;

    /// Applies a command to a stored case and saves the result.
    ///
    /// # Errors
    ///
    /// Returns the workflow error unchanged in meaning, or `StaleStage` if
    /// the case was saved by someone else in between.
    fn execute(
        &mut self,
        case_id: i64,
        command: Command,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError>;

    /// Replaces the submitted stage forms.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn update_case(
        &mut self,
        case_id: i64,
        changes: CaseChanges,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::UpdateCase { changes }, actor, cause)
    }

    /// Moves a case from `from_stage` to the next stage.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn advance_stage(
        &mut self,
        case_id: i64,
        from_stage: Stage,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::AdvanceStage { from_stage }, actor, cause)
    }

    /// Saves or withdraws the estimated cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn save_cost(
        &mut self,
        case_id: i64,
        required: bool,
        estimated_cost: Option<f64>,
        description: Option<String>,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        let command: Command = Command::SaveCost {
            required,
            estimated_cost,
            description,
        };
        self.execute(case_id, command, actor, cause)
    }

    /// Approves the pending estimated cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn approve_cost(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::ApproveCost, actor, cause)
    }

    /// Rejects the pending estimated cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn reject_cost(
        &mut self,
        case_id: i64,
        reason: Option<String>,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::RejectCost { reason }, actor, cause)
    }

    /// Records the final cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn save_final_cost(
        &mut self,
        case_id: i64,
        amount: f64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::SaveFinalCost { amount }, actor, cause)
    }

    /// Approves the pending final cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn approve_final_cost(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::ApproveFinalCost, actor, cause)
    }

    /// Rejects the pending final cost.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn reject_final_cost(
        &mut self,
        case_id: i64,
        reason: Option<String>,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::RejectFinalCost { reason }, actor, cause)
    }

    /// Closes the case.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn close_case(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::CloseCase, actor, cause)
    }

    /// Sends the case back to the solution stage for another attempt.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn redo_case(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::RedoCase, actor, cause)
    }

    /// Cancels the case after a rejected estimate.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn cancel_case(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        self.execute(case_id, Command::CancelCase, actor, cause)
    }

    /// Attaches files to a stage and returns the stored attachments.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn upload_attachments(
        &mut self,
        stage: Stage,
        case_id: i64,
        files: Vec<NewAttachment>,
        attachment_type: AttachmentType,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Vec<Attachment>, ApiError> {
        let before: Case = self.get_case(case_id, actor)?;
        let first_new_id: i64 = before.attachments.next_id();
        let command: Command = Command::UploadAttachments {
            stage,
            files,
            attachment_type,
        };
        let after: Case = self.execute(case_id, command, actor, cause)?;
        Ok(after
            .attachments
            .iter()
            .filter(|a| a.attachment_id >= first_new_id)
            .cloned()
            .collect())
    }

    /// Deletes an attachment.
    ///
    /// # Errors
    ///
    /// See [`CaseStore::execute`].
    fn delete_attachment(
        &mut self,
        case_id: i64,
        attachment_id: i64,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<(), ApiError> {
        self.execute(case_id, Command::DeleteAttachment { attachment_id }, actor, cause)
            .map(|_| ())
    }

    /// Computes what the caller may do on a case.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the case does not exist.
    fn get_capabilities(
        &mut self,
        case_id: i64,
        actor: &AuthenticatedActor,
    ) -> Result<CaseCapabilities, ApiError> {
        let case: Case = self.get_case(case_id, actor)?;
        Ok(compute_case_capabilities(&case, actor))
    }
}

impl CaseStore for Persistence {
    fn create_case(
        &mut self,
        new_case: NewCase,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        let case_id: i64 = self.next_case_id().map_err(translate_persistence_error)?;
        let year: i32 = OffsetDateTime::now_utc().year();
        let result: TransitionResult = open_case(
            case_id,
            CaseNumber::generate(year, case_id),
            new_case,
            &actor.permission_context(),
            actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_core_error)?;
        log_audit_event(&result);
        let stored: Case = Persistence::create_case(self, &result.new_case)
            .map_err(translate_persistence_error)?;
        Ok(stored)
    }

    fn get_case(&mut self, case_id: i64, _actor: &AuthenticatedActor) -> Result<Case, ApiError> {
        Persistence::get_case(self, case_id).map_err(translate_persistence_error)
    }

    fn list_cases(
        &mut self,
        status: Option<CaseStatus>,
        _actor: &AuthenticatedActor,
    ) -> Result<Vec<Case>, ApiError> {
        Persistence::list_cases(self, status).map_err(translate_persistence_error)
    }

    fn execute(
        &mut self,
        case_id: i64,
        command: Command,
        actor: &AuthenticatedActor,
        cause: Cause,
    ) -> Result<Case, ApiError> {
        let case: Case = Persistence::get_case(self, case_id).map_err(translate_persistence_error)?;
        let result: TransitionResult = apply(
            &case,
            command,
            &actor.permission_context(),
            actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_core_error)?;
        log_audit_event(&result);
        self.persist_transition(&result)
            .map_err(translate_persistence_error)
    }
}
