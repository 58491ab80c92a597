// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use casetrack_domain::{
    Attachment, AttachmentType, Case, DomainError, NewAttachment, PermissionContext, Stage,
    can_edit_content,
};

/// Attaches files to a stage the caller may edit.
///
/// # Errors
///
/// Returns `PermissionDenied` if the caller cannot edit the stage, or
/// `Validation` for an unreached stage, cost files outside the solution
/// stage, or an empty upload.
pub fn upload(
    case: &mut Case,
    stage: Stage,
    files: Vec<NewAttachment>,
    attachment_type: AttachmentType,
    ctx: &PermissionContext,
) -> Result<Vec<Attachment>, CoreError> {
    if !can_edit_content(stage, case, ctx) {
        return Err(CoreError::denied("upload_attachments", ctx.role, stage));
    }
    if !case.has_reached(stage) {
        return Err(CoreError::Validation(DomainError::StageNotReached {
            stage,
            current: case.current_stage,
        }));
    }
    if attachment_type == AttachmentType::Cost && stage != Stage::SolutionPlan {
        return Err(CoreError::Validation(
            DomainError::CostAttachmentOutsideSolution { stage },
        ));
    }
    if files.is_empty() {
        return Err(CoreError::Validation(DomainError::NoFilesProvided));
    }
    Ok(case
        .attachments
        .add(stage, files, attachment_type, Some(ctx.current_user_id)))
}

/// Removes an attachment from the case.
///
/// # Errors
///
/// Returns `Validation` if the attachment does not exist, or
/// `PermissionDenied` if the caller cannot edit the attachment's stage.
pub fn delete(case: &mut Case, attachment_id: i64, ctx: &PermissionContext) -> Result<Attachment, CoreError> {
    let Some(stage) = case.attachments.find(attachment_id).map(|a| a.stage) else {
        return Err(CoreError::Validation(DomainError::AttachmentNotFound {
            case_id: case.case_id,
            attachment_id,
        }));
    };
    if !can_edit_content(stage, case, ctx) {
        return Err(CoreError::denied("delete_attachment", ctx.role, stage));
    }
    case.attachments
        .remove(attachment_id)
        .ok_or(CoreError::Validation(DomainError::AttachmentNotFound {
            case_id: case.case_id,
            attachment_id,
        }))
}
