// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use casetrack_domain::{DomainError, Role, Stage};

/// Errors that can occur during case transitions.
///
/// Every variant leaves the case untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The case is closed or cancelled.
    CaseClosed {
        /// The case that was targeted.
        case_id: i64,
    },
    /// The caller's role or assignment does not allow the action.
    PermissionDenied {
        /// The attempted action.
        action: &'static str,
        /// The caller's role.
        role: Role,
        /// The stage the action targets.
        stage: Stage,
    },
    /// The solution stage cannot be completed before its cost is approved.
    CostApprovalPending,
    /// The final cost differs from the estimate and is not approved.
    FinalCostPending,
    /// The final cost has not been recorded.
    FinalCostMissing,
    /// The caller acted on an outdated view of the case.
    StaleStage {
        /// The stage the caller believed the case was at.
        expected: Stage,
        /// The stage the case is actually at.
        current: Stage,
    },
    /// A domain rule was violated.
    Validation(DomainError),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseClosed { case_id } => {
                write!(f, "Case {case_id} is closed and can no longer be changed")
            }
            Self::PermissionDenied {
                action,
                role,
                stage,
            } => write!(f, "Role '{role}' may not perform '{action}' on {stage}"),
            Self::CostApprovalPending => {
                write!(f, "The estimated cost must be approved before continuing")
            }
            Self::FinalCostPending => {
                write!(f, "The final cost differs from the estimate and needs leader approval")
            }
            Self::FinalCostMissing => write!(f, "A final cost must be recorded before closing"),
            Self::StaleStage { expected, current } => write!(
                f,
                "The case is at {current}, not {expected}; reload it and try again"
            ),
            Self::Validation(err) => write!(f, "Validation failed: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err)
    }
}

impl CoreError {
    pub(crate) const fn denied(action: &'static str, role: Role, stage: Stage) -> Self {
        Self::PermissionDenied {
            action,
            role,
            stage,
        }
    }
}
