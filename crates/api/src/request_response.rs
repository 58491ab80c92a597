// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Stage forms are shared by requests and responses: a client reads a
//! form from [`CaseInfo`], edits it, and sends the whole form back.

use casetrack::{
    AssignmentChanges, CaseChanges, ClosingChanges, ExecutionChanges, InvestigationChanges,
    SolutionChanges,
};
use casetrack_domain::{
    AssignmentDetails, Attachment, AttachmentType, Case, CaseStatus, Checklist, CostEstimate,
    FinalCost, NewAttachment, NewCase, SignatureHistory, Stage, cost_status_label, parse_date,
};
use time::Date;

use crate::error::RequestError;

/// Builds a checklist from submitted items. An empty list means untouched.
fn checklist_from<const N: usize>(
    stage: &'static str,
    items: Vec<bool>,
) -> Result<Checklist<N>, RequestError> {
    if items.is_empty() {
        return Ok(Checklist::unchecked());
    }
    let actual: usize = items.len();
    Checklist::try_from(items).map_err(|_| RequestError::Checklist {
        stage,
        expected: N,
        actual,
    })
}

/// Parses a stage number from a request.
///
/// # Errors
///
/// Returns an error if the number is outside `1..=5`.
pub fn parse_stage(number: u8) -> Result<Stage, RequestError> {
    Stage::from_number(number).map_err(|_| RequestError::Stage(number))
}

/// Stage 1 form.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AssignmentForm {
    /// Customer reference.
    pub client_id: Option<i64>,
    /// Site reference.
    pub site_id: Option<i64>,
    /// Contact person reference.
    pub contact_id: Option<i64>,
    /// Assigned technician.
    pub assigned_to: Option<i64>,
    /// Warranty, paid repair, inspection, etc.
    pub case_type: Option<String>,
    /// Free-form priority label.
    pub priority: Option<String>,
    /// The customer's description of the problem.
    pub description: Option<String>,
}

/// Stage 2 form.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct InvestigationForm {
    /// The technician's findings.
    pub report: Option<String>,
    /// Investigation checklist, in item order.
    #[serde(default)]
    pub checklist: Vec<bool>,
}

/// Stage 3 form. The cost is saved separately.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SolutionForm {
    /// Root cause of the defect.
    pub root_cause: Option<String>,
    /// The planned repair.
    pub solution_description: Option<String>,
    /// Solution checklist, in item order.
    #[serde(default)]
    pub checklist: Vec<bool>,
    /// Planned execution date (`YYYY-MM-DD`).
    pub planned_execution_date: Option<String>,
}

/// Stage 4 form.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ExecutionForm {
    /// What was done on site.
    pub report: Option<String>,
    /// Execution checklist, in item order.
    #[serde(default)]
    pub checklist: Vec<bool>,
    /// Serialized signature image.
    pub client_signature: Option<String>,
    /// The client's comments.
    pub client_feedback: Option<String>,
    /// The client's rating (1-5).
    pub client_rating: Option<u8>,
    /// Signature pad state, replayed to produce `client_signature`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_pad: Option<SignaturePadForm>,
}

/// The strokes drawn on a signature pad, oldest first, and how many of the
/// latest were undone.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SignaturePadForm {
    /// One full snapshot per stroke.
    pub snapshots: Vec<String>,
    /// Trailing snapshots that were undone.
    #[serde(default)]
    pub undone: usize,
}

impl SignaturePadForm {
    /// Replays the pad and returns the signature it currently shows.
    ///
    /// # Errors
    ///
    /// Returns an error if more strokes were undone than the pad retains.
    pub fn committed_signature(self) -> Result<Option<String>, RequestError> {
        let mut history: SignatureHistory = SignatureHistory::new();
        for snapshot in self.snapshots {
            history.push(snapshot);
        }
        for _ in 0..self.undone {
            if !history.undo() {
                return Err(RequestError::Signature(format!(
                    "cannot undo {} of {} retained strokes",
                    self.undone,
                    history.len()
                )));
            }
        }
        Ok(history.commit())
    }
}

/// Stage 5 form. The final cost is saved separately.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ClosingForm {
    /// Customer service notes.
    pub cs_notes: Option<String>,
    /// Feedback gathered at closing.
    pub final_feedback: Option<String>,
    /// Rating gathered at closing (1-5).
    pub final_rating: Option<u8>,
}

impl AssignmentForm {
    fn into_changes(self) -> AssignmentChanges {
        AssignmentChanges {
            client_id: self.client_id,
            site_id: self.site_id,
            contact_id: self.contact_id,
            assigned_to: self.assigned_to,
            case_type: self.case_type,
            priority: self.priority,
            description: self.description,
        }
    }
}

impl InvestigationForm {
    fn into_changes(self) -> Result<InvestigationChanges, RequestError> {
        Ok(InvestigationChanges {
            report: self.report,
            checklist: checklist_from("investigation", self.checklist)?,
        })
    }
}

impl SolutionForm {
    fn into_changes(self) -> Result<SolutionChanges, RequestError> {
        let planned_execution_date: Option<Date> = self
            .planned_execution_date
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_date(&d).map_err(|_| RequestError::Date(d)))
            .transpose()?;
        Ok(SolutionChanges {
            root_cause: self.root_cause,
            solution_description: self.solution_description,
            checklist: checklist_from("solution", self.checklist)?,
            planned_execution_date,
        })
    }
}

impl ExecutionForm {
    fn into_changes(self) -> Result<ExecutionChanges, RequestError> {
        let client_signature: Option<String> = match (self.client_signature, self.signature_pad) {
            (Some(_), Some(_)) => {
                return Err(RequestError::Signature(String::from(
                    "send either client_signature or signature_pad, not both",
                )));
            }
            (signature, None) => signature,
            (None, Some(pad)) => pad.committed_signature()?,
        };
        Ok(ExecutionChanges {
            report: self.report,
            checklist: checklist_from("execution", self.checklist)?,
            client_signature,
            client_feedback: self.client_feedback,
            client_rating: self.client_rating,
        })
    }
}

impl ClosingForm {
    fn into_changes(self) -> ClosingChanges {
        ClosingChanges {
            cs_notes: self.cs_notes,
            final_feedback: self.final_feedback,
            final_rating: self.final_rating,
        }
    }
}

/// API request to register a case.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct CreateCaseRequest {
    /// The initial stage 1 form.
    #[serde(flatten)]
    pub assignment: AssignmentForm,
}

impl CreateCaseRequest {
    /// Converts the request into the domain's registration input.
    #[must_use]
    pub fn into_new_case(self) -> NewCase {
        let form: AssignmentForm = self.assignment;
        NewCase {
            client_id: form.client_id,
            site_id: form.site_id,
            contact_id: form.contact_id,
            assigned_to: form.assigned_to,
            assignment: AssignmentDetails {
                case_type: form.case_type,
                priority: form.priority,
                description: form.description,
            },
        }
    }
}

/// API request to update stage forms. Absent forms are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct UpdateCaseRequest {
    /// Stage 1 form.
    pub assignment: Option<AssignmentForm>,
    /// Stage 2 form.
    pub investigation: Option<InvestigationForm>,
    /// Stage 3 form.
    pub solution: Option<SolutionForm>,
    /// Stage 4 form.
    pub execution: Option<ExecutionForm>,
    /// Stage 5 form.
    pub closing: Option<ClosingForm>,
}

impl UpdateCaseRequest {
    /// Converts the submitted forms into workflow changes.
    ///
    /// # Errors
    ///
    /// Returns an error if a checklist has the wrong length or the planned
    /// date is malformed.
    pub fn into_changes(self) -> Result<CaseChanges, RequestError> {
        Ok(CaseChanges {
            assignment: self.assignment.map(AssignmentForm::into_changes),
            investigation: self
                .investigation
                .map(InvestigationForm::into_changes)
                .transpose()?,
            solution: self.solution.map(SolutionForm::into_changes).transpose()?,
            execution: self.execution.map(ExecutionForm::into_changes).transpose()?,
            closing: self.closing.map(ClosingForm::into_changes),
        })
    }
}

/// API request to move a case to its next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdvanceStageRequest {
    /// The stage the caller believes the case is at.
    pub from_stage: u8,
}

/// API request to save the estimated cost.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SaveCostRequest {
    /// Whether a cost estimate is required.
    pub required: bool,
    /// The estimate, required when `required` is set.
    pub estimated_cost: Option<f64>,
    /// What the estimate covers.
    pub description: Option<String>,
}

/// API request to reject a cost or final cost.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct RejectRequest {
    /// Why the cost was rejected.
    pub reason: Option<String>,
}

/// API request to record the final cost.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SaveFinalCostRequest {
    /// The actual cost.
    pub amount: f64,
}

/// A file to attach.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    /// Original file name.
    pub filename: String,
    /// Where the file content lives.
    pub url: String,
}

/// API request to attach files to a stage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadAttachmentsRequest {
    /// The target stage.
    pub stage: u8,
    /// The files.
    pub files: Vec<FileInfo>,
    /// `photo` (default) or `cost`.
    pub attachment_type: Option<String>,
}

impl UploadAttachmentsRequest {
    /// Validates the request and returns its stage, files, and type.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown stage or type, or a blank file entry.
    pub fn into_parts(self) -> Result<(Stage, Vec<NewAttachment>, AttachmentType), RequestError> {
        let stage: Stage = parse_stage(self.stage)?;
        let attachment_type: AttachmentType = match self.attachment_type.as_deref() {
            None => AttachmentType::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| RequestError::AttachmentType(raw.to_string()))?,
        };
        let files: Vec<NewAttachment> = self
            .files
            .iter()
            .map(|f| {
                NewAttachment::new(&f.filename, &f.url)
                    .map_err(|e| RequestError::File(e.to_string()))
            })
            .collect::<Result<_, _>>()?;
        Ok((stage, files, attachment_type))
    }
}

/// API request to list cases.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ListCasesRequest {
    /// Only return cases with this status.
    pub status: Option<String>,
}

impl ListCasesRequest {
    /// Parses the status filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not recognised.
    pub fn status_filter(&self) -> Result<Option<CaseStatus>, RequestError> {
        self.status
            .as_deref()
            .map(|raw| {
                raw.parse::<CaseStatus>()
                    .map_err(|_| RequestError::Status(raw.to_string()))
            })
            .transpose()
    }
}

/// A stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttachmentInfo {
    /// Case-local identifier.
    pub attachment_id: i64,
    /// Original file name.
    pub filename: String,
    /// Where the file content lives.
    pub url: String,
    /// The stage the file belongs to.
    pub stage: u8,
    /// `photo` or `cost`.
    pub attachment_type: String,
    /// The user who uploaded the file.
    pub uploaded_by: Option<i64>,
}

impl From<&Attachment> for AttachmentInfo {
    fn from(attachment: &Attachment) -> Self {
        Self {
            attachment_id: attachment.attachment_id,
            filename: attachment.filename.clone(),
            url: attachment.url.clone(),
            stage: attachment.stage.number(),
            attachment_type: attachment.attachment_type.as_str().to_string(),
            uploaded_by: attachment.uploaded_by,
        }
    }
}

/// The estimated cost as shown on stage 3.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CostInfo {
    /// Whether a cost estimate is required.
    pub required: bool,
    /// The estimate.
    pub estimated_cost: Option<f64>,
    /// What the estimate covers.
    pub description: Option<String>,
    /// `pending`, `approved`, `rejected`, or absent.
    pub status: Option<String>,
    /// Display label for the status.
    pub status_label: String,
}

/// The final cost as shown on stage 5.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalCostInfo {
    /// Whether the final-cost section applies to this case.
    pub shown: bool,
    /// The actual cost.
    pub amount: Option<f64>,
    /// `pending`, `approved`, `rejected`, or absent.
    pub status: Option<String>,
    /// The leader who approved it.
    pub approved_by: Option<i64>,
    /// Whether the amount equals the estimate, so no approval is needed.
    pub matches_estimate: bool,
}

/// Full view of a case.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaseInfo {
    /// Store identifier.
    pub case_id: i64,
    /// Human-facing reference.
    pub case_number: String,
    /// Optimistic concurrency token.
    pub version: u64,
    /// The stage the case is at.
    pub current_stage: u8,
    /// The stage's display name.
    pub current_stage_name: String,
    /// Overall status.
    pub status: String,
    /// Starts at 1 and increments on each redo.
    pub attempt_number: u32,
    /// The user who registered the case.
    pub created_by: Option<i64>,
    /// Stage 1.
    pub assignment: AssignmentForm,
    /// Stage 2.
    pub investigation: InvestigationForm,
    /// Stage 3.
    pub solution: SolutionForm,
    /// Stage 3 cost.
    pub cost: CostInfo,
    /// Stage 4.
    pub execution: ExecutionForm,
    /// Stage 5.
    pub closing: ClosingForm,
    /// Stage 5 final cost.
    pub final_cost: FinalCostInfo,
    /// Every attachment, stage by stage in upload order.
    pub attachments: Vec<AttachmentInfo>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last save timestamp.
    pub updated_at: Option<String>,
}

impl From<&Case> for CaseInfo {
    fn from(case: &Case) -> Self {
        let cost: &CostEstimate = &case.solution.cost;
        let final_cost: &FinalCost = &case.closing.final_cost;
        Self {
            case_id: case.case_id,
            case_number: case.case_number.value().to_string(),
            version: case.version,
            current_stage: case.current_stage.number(),
            current_stage_name: case.current_stage.name().to_string(),
            status: case.status.as_str().to_string(),
            attempt_number: case.attempt_number,
            created_by: case.created_by,
            assignment: AssignmentForm {
                client_id: case.client_id,
                site_id: case.site_id,
                contact_id: case.contact_id,
                assigned_to: case.assigned_to,
                case_type: case.assignment.case_type.clone(),
                priority: case.assignment.priority.clone(),
                description: case.assignment.description.clone(),
            },
            investigation: InvestigationForm {
                report: case.investigation.report.clone(),
                checklist: case.investigation.checklist.items().to_vec(),
            },
            solution: SolutionForm {
                root_cause: case.solution.root_cause.clone(),
                solution_description: case.solution.solution_description.clone(),
                checklist: case.solution.checklist.items().to_vec(),
                planned_execution_date: case
                    .solution
                    .planned_execution_date
                    .map(|d| d.to_string()),
            },
            cost: CostInfo {
                required: cost.required(),
                estimated_cost: cost.estimated_cost(),
                description: cost.description().map(str::to_string),
                status: cost.status().map(|s| s.as_str().to_string()),
                status_label: cost_status_label(cost.status()).to_string(),
            },
            execution: ExecutionForm {
                report: case.execution.report.clone(),
                checklist: case.execution.checklist.items().to_vec(),
                client_signature: case.execution.client_signature.clone(),
                client_feedback: case.execution.client_feedback.clone(),
                client_rating: case.execution.client_rating.map(|r| r.value()),
                signature_pad: None,
            },
            closing: ClosingForm {
                cs_notes: case.closing.cs_notes.clone(),
                final_feedback: case.closing.final_feedback.clone(),
                final_rating: case.closing.final_rating.map(|r| r.value()),
            },
            final_cost: FinalCostInfo {
                shown: case.show_final_cost_section(),
                amount: final_cost.amount(),
                status: final_cost.status().map(|s| s.as_str().to_string()),
                approved_by: final_cost.approved_by(),
                matches_estimate: case.final_cost_matches_estimate(),
            },
            attachments: case.attachments.iter().map(AttachmentInfo::from).collect(),
            created_at: case.created_at.clone(),
            updated_at: case.updated_at.clone(),
        }
    }
}

/// API response carrying a case after a read or write.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaseResponse {
    /// The case.
    pub case: CaseInfo,
    /// A success message.
    pub message: String,
}

/// One row of a case listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaseSummaryInfo {
    /// Store identifier.
    pub case_id: i64,
    /// Human-facing reference.
    pub case_number: String,
    /// The stage the case is at.
    pub current_stage: u8,
    /// Overall status.
    pub status: String,
    /// Attempt counter.
    pub attempt_number: u32,
    /// Assigned technician.
    pub assigned_to: Option<i64>,
    /// Display label for the estimated cost status.
    pub cost_status_label: String,
    /// Last save timestamp.
    pub updated_at: Option<String>,
}

impl From<&Case> for CaseSummaryInfo {
    fn from(case: &Case) -> Self {
        Self {
            case_id: case.case_id,
            case_number: case.case_number.value().to_string(),
            current_stage: case.current_stage.number(),
            status: case.status.as_str().to_string(),
            attempt_number: case.attempt_number,
            assigned_to: case.assigned_to,
            cost_status_label: cost_status_label(case.solution.cost.status()).to_string(),
            updated_at: case.updated_at.clone(),
        }
    }
}

/// API response for listing cases.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListCasesResponse {
    /// The matching cases in id order.
    pub cases: Vec<CaseSummaryInfo>,
}

/// API response for an upload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadAttachmentsResponse {
    /// The case the files were attached to.
    pub case_id: i64,
    /// The stored attachments.
    pub attachments: Vec<AttachmentInfo>,
    /// A success message.
    pub message: String,
}

/// API response for an attachment deletion.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteAttachmentResponse {
    /// The case the attachment belonged to.
    pub case_id: i64,
    /// The deleted attachment.
    pub attachment_id: i64,
    /// A success message.
    pub message: String,
}

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(matches!(self, Self::Allowed))
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// What the caller may do on a case right now.
///
/// Advisory only; every action is re-checked when it is performed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaseCapabilities {
    /// The case evaluated.
    pub case_id: i64,
    /// Whether each stage's form may be edited, indexed by stage 1..=5.
    pub can_edit_stage: [Capability; 5],
    /// Whether the case may move to its next stage.
    pub can_advance: Capability,
    /// Whether the estimated cost may be saved.
    pub can_save_cost: Capability,
    /// Whether the estimated cost may be approved or rejected.
    pub can_review_cost: Capability,
    /// Whether the final cost may be saved.
    pub can_save_final_cost: Capability,
    /// Whether the final cost may be approved or rejected.
    pub can_review_final_cost: Capability,
    /// Whether the case may be closed.
    pub can_close: Capability,
    /// Whether the case may be sent back to the solution stage.
    pub can_redo: Capability,
    /// Whether the case may be cancelled.
    pub can_cancel: Capability,
}
