// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use casetrack_domain::{
    AttachmentType, ExecutionChecklist, InvestigationChecklist, NewAttachment, SolutionChecklist,
    Stage,
};
use time::Date;

/// Stage 1 form content. Replaces every field it names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentChanges {
    /// Customer reference.
    pub client_id: Option<i64>,
    /// Site reference.
    pub site_id: Option<i64>,
    /// Contact person reference.
    pub contact_id: Option<i64>,
    /// The technician who will work the case.
    pub assigned_to: Option<i64>,
    /// Case type label.
    pub case_type: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Problem description.
    pub description: Option<String>,
}

/// Stage 2 form content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvestigationChanges {
    /// Investigation report.
    pub report: Option<String>,
    /// Investigation checklist.
    pub checklist: InvestigationChecklist,
}

/// Stage 3 form content. The cost is saved through [`Command::SaveCost`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SolutionChanges {
    /// Root cause.
    pub root_cause: Option<String>,
    /// Planned repair.
    pub solution_description: Option<String>,
    /// Solution checklist.
    pub checklist: SolutionChecklist,
    /// Planned execution date.
    pub planned_execution_date: Option<Date>,
}

/// Stage 4 form content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionChanges {
    /// Execution report.
    pub report: Option<String>,
    /// Execution checklist.
    pub checklist: ExecutionChecklist,
    /// The committed signature snapshot.
    pub client_signature: Option<String>,
    /// Client comments.
    pub client_feedback: Option<String>,
    /// Raw client rating, validated on apply.
    pub client_rating: Option<u8>,
}

/// Stage 5 form content. The final cost is saved through [`Command::SaveFinalCost`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClosingChanges {
    /// Customer service notes.
    pub cs_notes: Option<String>,
    /// Final feedback.
    pub final_feedback: Option<String>,
    /// Raw final rating, validated on apply.
    pub final_rating: Option<u8>,
}

/// Field changes grouped by the stage that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseChanges {
    /// Stage 1 content.
    pub assignment: Option<AssignmentChanges>,
    /// Stage 2 content.
    pub investigation: Option<InvestigationChanges>,
    /// Stage 3 content.
    pub solution: Option<SolutionChanges>,
    /// Stage 4 content.
    pub execution: Option<ExecutionChanges>,
    /// Stage 5 content.
    pub closing: Option<ClosingChanges>,
}

impl CaseChanges {
    /// The stages this change touches, in order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = Vec::new();
        if self.assignment.is_some() {
            stages.push(Stage::Assignment);
        }
        if self.investigation.is_some() {
            stages.push(Stage::Investigation);
        }
        if self.solution.is_some() {
            stages.push(Stage::SolutionPlan);
        }
        if self.execution.is_some() {
            stages.push(Stage::Execution);
        }
        if self.closing.is_some() {
            stages.push(Stage::Closing);
        }
        stages
    }

    /// Returns true if no stage content is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assignment.is_none()
            && self.investigation.is_none()
            && self.solution.is_none()
            && self.execution.is_none()
            && self.closing.is_none()
    }
}

/// A command represents caller intent against one case, as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Save form content without moving the case.
    UpdateCase {
        /// The grouped changes.
        changes: CaseChanges,
    },
    /// Complete the current stage and move to the next.
    AdvanceStage {
        /// The stage the caller is completing.
        from_stage: Stage,
    },
    /// Set or withdraw the estimated cost.
    SaveCost {
        /// Whether a cost is required at all.
        required: bool,
        /// The estimate; required when `required` is true.
        estimated_cost: Option<f64>,
        /// What the cost covers.
        description: Option<String>,
    },
    /// Approve the pending estimated cost.
    ApproveCost,
    /// Reject the pending estimated cost.
    RejectCost {
        /// Why it was rejected.
        reason: Option<String>,
    },
    /// Record the actual cost at closing.
    SaveFinalCost {
        /// The final amount.
        amount: f64,
    },
    /// Approve the pending final cost.
    ApproveFinalCost,
    /// Reject the pending final cost.
    RejectFinalCost {
        /// Why it was rejected.
        reason: Option<String>,
    },
    /// Close the case.
    CloseCase,
    /// Send the case back to the solution stage.
    RedoCase,
    /// Abandon the case after its cost was rejected.
    CancelCase,
    /// Attach files to a stage.
    UploadAttachments {
        /// The target stage.
        stage: Stage,
        /// The files.
        files: Vec<NewAttachment>,
        /// Photo or cost support.
        attachment_type: AttachmentType,
    },
    /// Remove an attachment.
    DeleteAttachment {
        /// The attachment to remove.
        attachment_id: i64,
    },
}

impl Command {
    /// The action name recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateCase { .. } => "UpdateCase",
            Self::AdvanceStage { .. } => "AdvanceStage",
            Self::SaveCost { .. } => "SaveCost",
            Self::ApproveCost => "ApproveCost",
            Self::RejectCost { .. } => "RejectCost",
            Self::SaveFinalCost { .. } => "SaveFinalCost",
            Self::ApproveFinalCost => "ApproveFinalCost",
            Self::RejectFinalCost { .. } => "RejectFinalCost",
            Self::CloseCase => "CloseCase",
            Self::RedoCase => "RedoCase",
            Self::CancelCase => "CancelCase",
            Self::UploadAttachments { .. } => "UploadAttachments",
            Self::DeleteAttachment { .. } => "DeleteAttachment",
        }
    }

    /// Human-readable details recorded in audit events.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::UpdateCase { changes } => {
                let stages: Vec<String> = changes
                    .stages()
                    .iter()
                    .map(|s| s.number().to_string())
                    .collect();
                Some(format!("stages [{}]", stages.join(",")))
            }
            Self::AdvanceStage { from_stage } => Some(format!("from {from_stage}")),
            Self::SaveCost {
                required,
                estimated_cost,
                ..
            } => Some(match (required, estimated_cost) {
                (true, Some(cost)) => format!("estimated cost {cost:.2}"),
                (true, None) => String::from("estimated cost missing"),
                (false, _) => String::from("no cost required"),
            }),
            Self::SaveFinalCost { amount } => Some(format!("final cost {amount:.2}")),
            Self::RejectCost { reason } | Self::RejectFinalCost { reason } => reason.clone(),
            Self::UploadAttachments {
                stage,
                files,
                attachment_type,
            } => Some(format!(
                "{} {} file(s) to {stage}",
                files.len(),
                attachment_type.as_str()
            )),
            Self::DeleteAttachment { attachment_id } => {
                Some(format!("attachment {attachment_id}"))
            }
            Self::ApproveCost
            | Self::ApproveFinalCost
            | Self::CloseCase
            | Self::RedoCase
            | Self::CancelCase => None,
        }
    }
}
