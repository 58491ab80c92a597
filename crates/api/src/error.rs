// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use casetrack::CoreError;
use casetrack_domain::{DomainError, Stage};
use casetrack_persistence::PersistenceError;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Malformed request values, caught before anything reaches the workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// A stage number outside `1..=5`.
    #[error("stage must be between 1 and 5 (got {0})")]
    Stage(u8),
    /// An unrecognised attachment type.
    #[error("unknown attachment type '{0}'")]
    AttachmentType(String),
    /// An unrecognised case status filter.
    #[error("unknown case status '{0}'")]
    Status(String),
    /// A checklist with the wrong number of items.
    #[error("{stage} checklist must have {expected} items (got {actual})")]
    Checklist {
        /// Which checklist.
        stage: &'static str,
        /// The fixed item count.
        expected: usize,
        /// The submitted item count.
        actual: usize,
    },
    /// A date that is not `YYYY-MM-DD`.
    #[error("'{0}' is not a YYYY-MM-DD date")]
    Date(String),
    /// A file entry without a name or location.
    #[error("{0}")]
    File(String),
    /// A signature pad that cannot be replayed.
    #[error("{0}")]
    Signature(String),
}

impl RequestError {
    /// The request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Stage(_) => "stage",
            Self::AttachmentType(_) => "attachment_type",
            Self::Status(_) => "status",
            Self::Checklist { .. } => "checklist",
            Self::Date(_) => "planned_execution_date",
            Self::File(_) => "files",
            Self::Signature(_) => "client_signature",
        }
    }
}

/// API-level errors.
///
/// Each workflow error keeps its own variant; the remaining variants cover
/// authentication, malformed requests, lookups, and store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The case is closed or cancelled.
    CaseClosed {
        /// The case that was targeted.
        case_id: i64,
    },
    /// The caller may not perform the action.
    PermissionDenied {
        /// The attempted action.
        action: String,
        /// The caller's role.
        role: String,
        /// The stage the action targeted.
        stage: Stage,
    },
    /// The estimated cost is required but not approved yet.
    CostApprovalPending,
    /// The final cost differs from the estimate and is not approved yet.
    FinalCostPending,
    /// The final cost must be recorded before closing.
    FinalCostMissing,
    /// The caller acted on an outdated view of the case.
    StaleStage {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A workflow rule was violated.
    Validation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseClosed { case_id } => {
                write!(f, "Case {case_id} is closed or cancelled")
            }
            Self::PermissionDenied {
                action,
                role,
                stage,
            } => write!(f, "Permission denied: '{role}' may not {action} on {stage}"),
            Self::CostApprovalPending => {
                write!(f, "The estimated cost must be approved before continuing")
            }
            Self::FinalCostPending => {
                write!(f, "The final cost must be approved before closing")
            }
            Self::FinalCostMissing => write!(f, "A final cost must be recorded before closing"),
            Self::StaleStage { message } => write!(f, "Stale request: {message}"),
            Self::Validation { rule, message } => {
                write!(f, "Validation failed ({rule}): {message}")
            }
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::InvalidInput {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Names the rule a domain error violates.
const fn domain_rule(err: &DomainError) -> &'static str {
    match err {
        DomainError::InvalidStage(_) => "stage_range",
        DomainError::InvalidCaseStatus(_) => "case_status",
        DomainError::InvalidCostStatus(_) => "cost_status",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidAttachmentType(_) => "attachment_type",
        DomainError::InvalidRating(_) => "rating_range",
        DomainError::InvalidCaseNumber(_) => "case_number",
        DomainError::InvalidCost { .. } => "cost_value",
        DomainError::InvalidDate { .. } => "date_format",
        DomainError::MissingRequiredField { .. } => "required_field",
        DomainError::StageNotReached { .. } => "stage_not_reached",
        DomainError::WrongStage { .. } => "wrong_stage",
        DomainError::NoChanges => "no_changes",
        DomainError::NoNextStage => "no_next_stage",
        DomainError::CostAlreadyApproved => "cost_already_approved",
        DomainError::NoPendingCost { .. } => "no_pending_cost",
        DomainError::CostNotRejected => "cancel_requires_rejected_cost",
        DomainError::FinalCostNotApplicable => "final_cost_not_applicable",
        DomainError::FinalCostAlreadyApproved => "final_cost_already_approved",
        DomainError::NoPendingFinalCost { .. } => "no_pending_final_cost",
        DomainError::CostAttachmentOutsideSolution { .. } => "cost_attachment_stage",
        DomainError::NoFilesProvided => "files_required",
        DomainError::InvalidAttachmentFile(_) => "attachment_file",
        DomainError::AttachmentNotFound { .. } => "attachment_not_found",
        DomainError::InvariantViolation(_) => "case_invariant",
    }
}

/// Translates a domain error into an API error.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    ApiError::Validation {
        rule: domain_rule(&err).to_string(),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// Every core error has exactly one API counterpart of the same name.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::CaseClosed { case_id } => ApiError::CaseClosed { case_id },
        CoreError::PermissionDenied {
            action,
            role,
            stage,
        } => ApiError::PermissionDenied {
            action: action.to_string(),
            role: role.as_str().to_string(),
            stage,
        },
        CoreError::CostApprovalPending => ApiError::CostApprovalPending,
        CoreError::FinalCostPending => ApiError::FinalCostPending,
        CoreError::FinalCostMissing => ApiError::FinalCostMissing,
        CoreError::StaleStage { expected, current } => ApiError::StaleStage {
            message: format!("expected the case at {expected}, but it is at {current}"),
        },
        CoreError::Validation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// A version conflict means someone else saved first, which the caller
/// handles exactly like a stale stage.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::CaseNotFound(case_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Case"),
            message: format!("Case {case_id} does not exist"),
        },
        PersistenceError::VersionConflict { .. } => ApiError::StaleStage {
            message: err.to_string(),
        },
        _ => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
