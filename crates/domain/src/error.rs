// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::Stage;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Stage number outside `1..=5`.
    InvalidStage(u8),
    /// Case status string is not recognised.
    InvalidCaseStatus(String),
    /// Cost status string is not recognised.
    InvalidCostStatus(String),
    /// Role string is not recognised.
    InvalidRole(String),
    /// Attachment type string is not recognised.
    InvalidAttachmentType(String),
    /// Rating outside `1..=5`.
    InvalidRating(u8),
    /// Case number is empty or invalid.
    InvalidCaseNumber(String),
    /// A cost value is negative or not a finite number.
    InvalidCost {
        /// The cost field being validated.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A date string could not be parsed.
    InvalidDate {
        /// The offending input.
        value: String,
        /// The parser error message.
        error: String,
    },
    /// A field required for the requested transition has not been recorded.
    MissingRequiredField {
        /// The stage that owns the field.
        stage: Stage,
        /// The missing field.
        field: &'static str,
    },
    /// Content for a stage the case has not reached yet.
    StageNotReached {
        /// The stage whose content was submitted.
        stage: Stage,
        /// The case's current stage.
        current: Stage,
    },
    /// The operation is only valid at a specific stage.
    WrongStage {
        /// The attempted operation.
        operation: &'static str,
        /// The stage the operation requires.
        required: Stage,
        /// The case's current stage.
        current: Stage,
    },
    /// An update carried no stage content.
    NoChanges,
    /// The closing stage is left through `close`, never through `advance`.
    NoNextStage,
    /// The estimated cost has already been approved for this attempt.
    CostAlreadyApproved,
    /// Approve/reject requested without a cost awaiting review.
    NoPendingCost {
        /// Description of the current cost state.
        state: String,
    },
    /// Cancel requested while the estimated cost is not rejected.
    CostNotRejected,
    /// The final-cost step does not apply to this case.
    FinalCostNotApplicable,
    /// The final cost has already been approved.
    FinalCostAlreadyApproved,
    /// Approve/reject requested without a final cost awaiting review.
    NoPendingFinalCost {
        /// Description of the current final-cost state.
        state: String,
    },
    /// `cost` attachments outside the solution stage.
    CostAttachmentOutsideSolution {
        /// The stage the upload targeted.
        stage: Stage,
    },
    /// An upload carried no files.
    NoFilesProvided,
    /// An uploaded file is missing its name or location.
    InvalidAttachmentFile(String),
    /// The attachment does not exist on the case.
    AttachmentNotFound {
        /// The case searched.
        case_id: i64,
        /// The requested attachment.
        attachment_id: i64,
    },
    /// A loaded record breaks an aggregate invariant.
    InvariantViolation(String),
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStage(n) => write!(f, "Invalid stage {n}: must be between 1 and 5"),
            Self::InvalidCaseStatus(s) => write!(f, "Invalid case status: '{s}'"),
            Self::InvalidCostStatus(s) => write!(f, "Invalid cost status: '{s}'"),
            Self::InvalidRole(s) => write!(f, "Invalid role: '{s}'"),
            Self::InvalidAttachmentType(s) => write!(f, "Invalid attachment type: '{s}'"),
            Self::InvalidRating(n) => write!(f, "Invalid rating {n}: must be between 1 and 5"),
            Self::InvalidCaseNumber(msg) => write!(f, "Invalid case number: {msg}"),
            Self::InvalidCost { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidDate { value, error } => {
                write!(f, "Failed to parse date '{value}': {error}")
            }
            Self::MissingRequiredField { stage, field } => {
                write!(f, "{stage} requires '{field}' before it can be completed")
            }
            Self::StageNotReached { stage, current } => {
                write!(f, "Cannot edit {stage}: the case is still at {current}")
            }
            Self::WrongStage {
                operation,
                required,
                current,
            } => {
                write!(
                    f,
                    "'{operation}' is only allowed at {required}, but the case is at {current}"
                )
            }
            Self::NoChanges => write!(f, "No changes were provided"),
            Self::NoNextStage => {
                write!(f, "The closing stage has no next stage; close the case instead")
            }
            Self::CostAlreadyApproved => {
                write!(f, "The estimated cost has already been approved")
            }
            Self::NoPendingCost { state } => {
                write!(f, "No estimated cost is awaiting review (cost is {state})")
            }
            Self::CostNotRejected => {
                write!(f, "A case can only be cancelled after its estimated cost was rejected")
            }
            Self::FinalCostNotApplicable => {
                write!(f, "This case has no approved estimated cost; final cost does not apply")
            }
            Self::FinalCostAlreadyApproved => {
                write!(f, "The final cost has already been approved")
            }
            Self::NoPendingFinalCost { state } => {
                write!(f, "No final cost is awaiting review (final cost is {state})")
            }
            Self::CostAttachmentOutsideSolution { stage } => {
                write!(f, "Cost attachments are only allowed on the solution stage, not {stage}")
            }
            Self::NoFilesProvided => write!(f, "No files were provided"),
            Self::InvalidAttachmentFile(msg) => write!(f, "Invalid attachment: {msg}"),
            Self::AttachmentNotFound {
                case_id,
                attachment_id,
            } => {
                write!(f, "Attachment {attachment_id} not found on case {case_id}")
            }
            Self::InvariantViolation(msg) => write!(f, "Case invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
