// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod attachments;
mod case;
mod checklist;
mod cost;
mod error;
mod permissions;
mod signature;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use attachments::{Attachment, NewAttachment, StageAttachments};
pub use case::{
    AssignmentDetails, Case, ClosingDetails, CostPhase, ExecutionDetails, FinalCostPhase,
    InvestigationDetails, NewCase, SolutionDetails, WorkflowState,
};
pub use checklist::{
    Checklist, ChecklistError, EXECUTION_ITEMS, ExecutionChecklist, INVESTIGATION_ITEMS,
    InvestigationChecklist, SOLUTION_ITEMS, SolutionChecklist,
};
pub use cost::{COST_TOLERANCE, CostEstimate, FinalCost, costs_equal, validate_cost};
pub use error::DomainError;
pub use permissions::{
    PermissionContext, StageCapability, can_approve, can_cancel, can_edit, can_edit_content,
    capability_for,
};
pub use signature::{SIGNATURE_HISTORY_LIMIT, SignatureHistory};
pub use types::{
    AttachmentType, CaseNumber, CaseStatus, CostStatus, Rating, Role, Stage, cost_status_label,
};
pub use validation::{format_date, parse_date, validate_new_case};
