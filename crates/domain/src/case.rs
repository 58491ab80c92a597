// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The case aggregate and the workflow state derived from it.

use crate::attachments::StageAttachments;
use crate::checklist::{ExecutionChecklist, InvestigationChecklist, SolutionChecklist};
use crate::cost::{CostEstimate, FinalCost};
use crate::error::DomainError;
use crate::types::{AttachmentType, CaseNumber, CaseStatus, CostStatus, Rating, Stage};
use time::Date;

/// Stage 1 content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentDetails {
    /// Warranty, paid repair, inspection, etc.
    pub case_type: Option<String>,
    /// Free-form priority label.
    pub priority: Option<String>,
    /// The customer's description of the problem.
    pub description: Option<String>,
}

/// Stage 2 content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvestigationDetails {
    /// The technician's findings. `Some("")` counts as recorded.
    pub report: Option<String>,
    /// Investigation checklist.
    pub checklist: InvestigationChecklist,
}

/// Stage 3 content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolutionDetails {
    /// Root cause of the defect.
    pub root_cause: Option<String>,
    /// The planned repair.
    pub solution_description: Option<String>,
    /// Solution checklist.
    pub checklist: SolutionChecklist,
    /// When the repair is planned.
    pub planned_execution_date: Option<Date>,
    /// Optional estimated cost awaiting leader review.
    pub cost: CostEstimate,
}

/// Stage 4 content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionDetails {
    /// What was done on site.
    pub report: Option<String>,
    /// Execution checklist.
    pub checklist: ExecutionChecklist,
    /// Serialized signature image.
    pub client_signature: Option<String>,
    /// The client's comments.
    pub client_feedback: Option<String>,
    /// The client's rating.
    pub client_rating: Option<Rating>,
}

/// Stage 5 content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClosingDetails {
    /// Customer service notes.
    pub cs_notes: Option<String>,
    /// Feedback gathered at closing.
    pub final_feedback: Option<String>,
    /// Rating gathered at closing.
    pub final_rating: Option<Rating>,
    /// The actual cost, reviewed when it differs from the estimate.
    pub final_cost: FinalCost,
}

/// Input for registering a case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCase {
    /// Customer reference.
    pub client_id: Option<i64>,
    /// Site reference.
    pub site_id: Option<i64>,
    /// Contact person reference.
    pub contact_id: Option<i64>,
    /// Assigned technician, may be set later.
    pub assigned_to: Option<i64>,
    /// Stage 1 content.
    pub assignment: AssignmentDetails,
}

/// A warranty service case.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Store identifier.
    pub case_id: i64,
    /// Human-facing reference, immutable.
    pub case_number: CaseNumber,
    /// Optimistic concurrency token, bumped by the store on every save.
    pub version: u64,
    /// The stage the case is at.
    pub current_stage: Stage,
    /// Overall status.
    pub status: CaseStatus,
    /// Starts at 1 and increments on each redo.
    pub attempt_number: u32,
    /// Customer reference.
    pub client_id: Option<i64>,
    /// Site reference.
    pub site_id: Option<i64>,
    /// Contact person reference.
    pub contact_id: Option<i64>,
    /// Assigned technician.
    pub assigned_to: Option<i64>,
    /// The customer service user who registered the case.
    pub created_by: Option<i64>,
    /// Stage 1 content.
    pub assignment: AssignmentDetails,
    /// Stage 2 content.
    pub investigation: InvestigationDetails,
    /// Stage 3 content.
    pub solution: SolutionDetails,
    /// Stage 4 content.
    pub execution: ExecutionDetails,
    /// Stage 5 content.
    pub closing: ClosingDetails,
    /// Uploaded files by stage.
    pub attachments: StageAttachments,
    /// ISO-8601 creation timestamp, set by the store.
    pub created_at: Option<String>,
    /// ISO-8601 timestamp of the last save, set by the store.
    pub updated_at: Option<String>,
}

impl Case {
    /// Builds a freshly registered case at stage 1.
    #[must_use]
    pub fn open(case_id: i64, case_number: CaseNumber, new_case: NewCase, created_by: i64) -> Self {
        Self {
            case_id,
            case_number,
            version: 0,
            current_stage: Stage::Assignment,
            status: CaseStatus::Open,
            attempt_number: 1,
            client_id: new_case.client_id,
            site_id: new_case.site_id,
            contact_id: new_case.contact_id,
            assigned_to: new_case.assigned_to,
            created_by: Some(created_by),
            assignment: new_case.assignment,
            investigation: InvestigationDetails::default(),
            solution: SolutionDetails::default(),
            execution: ExecutionDetails::default(),
            closing: ClosingDetails::default(),
            attachments: StageAttachments::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns true unless the case is closed or cancelled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Returns true if the stage has been reached.
    #[must_use]
    pub fn has_reached(&self, stage: Stage) -> bool {
        stage <= self.current_stage
    }

    /// Returns true when the closing stage must record a final cost.
    #[must_use]
    pub const fn show_final_cost_section(&self) -> bool {
        self.solution.cost.required() && self.solution.cost.is_approved()
    }

    /// Returns true when the final cost equals the approved estimate.
    #[must_use]
    pub fn final_cost_matches_estimate(&self) -> bool {
        self.closing
            .final_cost
            .matches(self.solution.cost.estimated_cost())
    }

    /// Drops all stage 4 content and attachments.
    pub fn clear_execution(&mut self) {
        self.execution = ExecutionDetails::default();
        self.attachments.clear_stage(Stage::Execution);
    }

    /// Drops all stage 5 content, the final cost, and attachments.
    pub fn clear_closing(&mut self) {
        self.closing = ClosingDetails::default();
        self.attachments.clear_stage(Stage::Closing);
    }

    /// Returns the explicit workflow state for this case.
    #[must_use]
    pub fn workflow_state(&self) -> WorkflowState {
        WorkflowState::of(self)
    }

    /// Checks the invariants that typed fields cannot express.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvariantViolation` describing the first broken rule.
    pub fn validate_invariants(&self) -> Result<(), DomainError> {
        if self.attempt_number < 1 {
            return Err(DomainError::InvariantViolation(String::from(
                "attempt number must start at 1",
            )));
        }
        if let Some(stray) = self
            .attachments
            .iter()
            .find(|a| a.attachment_type == AttachmentType::Cost && a.stage != Stage::SolutionPlan)
        {
            return Err(DomainError::InvariantViolation(format!(
                "cost attachment {} is on {}",
                stray.attachment_id, stray.stage
            )));
        }
        if let Some(duplicate) = self
            .attachments
            .iter()
            .find(|a| a.attachment_id >= self.attachments.next_id())
        {
            return Err(DomainError::InvariantViolation(format!(
                "attachment {} was not allocated by this case",
                duplicate.attachment_id
            )));
        }
        let cost_status: Option<CostStatus> = self.solution.cost.status();
        match self.status {
            CaseStatus::Pending if cost_status != Some(CostStatus::Pending) => {
                Err(DomainError::InvariantViolation(String::from(
                    "case is pending without a cost awaiting review",
                )))
            }
            CaseStatus::Rejected if cost_status != Some(CostStatus::Rejected) => {
                Err(DomainError::InvariantViolation(String::from(
                    "case is rejected without a rejected cost",
                )))
            }
            _ => Ok(()),
        }
    }

    /// Short description used in audit snapshots.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "case={},stage={},status={},attempt={},{}",
            self.case_number,
            self.current_stage.number(),
            self.status,
            self.attempt_number,
            self.solution.cost.summary()
        )
    }
}

/// Where the estimated cost stands on the solution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostPhase {
    /// No cost is required.
    NotRequired,
    /// A cost is required but has not been submitted.
    Unsubmitted,
    /// Submitted and waiting for a leader.
    AwaitingApproval,
    /// Approved; the case may advance.
    Approved,
    /// Rejected; the technician may resubmit or customer service may cancel.
    Rejected,
}

/// Where the final cost stands on the closing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalCostPhase {
    /// The case had no approved estimate.
    NotApplicable,
    /// A final cost must be recorded before closing.
    Missing,
    /// Equal to the estimate, no review needed.
    MatchesEstimate,
    /// Waiting for a leader.
    AwaitingApproval,
    /// Approved by a leader.
    Approved,
    /// Rejected; customer service must correct it.
    Rejected,
    /// Recorded without review and differing from the estimate.
    Unreviewed,
}

/// The workflow position of a case, derived from its stage and statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Stage 1.
    Assignment,
    /// Stage 2.
    Investigation,
    /// Stage 3 and its cost review.
    Solution(CostPhase),
    /// Stage 4.
    Execution,
    /// Stage 5 and its final-cost review.
    Closing(FinalCostPhase),
    /// Finished at the given stage. Terminal.
    Closed {
        /// The stage the case was closed at.
        stage: Stage,
    },
    /// Cancelled at the given stage. Terminal.
    Cancelled {
        /// The stage the case was cancelled at.
        stage: Stage,
    },
}

impl WorkflowState {
    /// Derives the state of a case.
    #[must_use]
    pub fn of(case: &Case) -> Self {
        match case.status {
            CaseStatus::Closed => {
                return Self::Closed {
                    stage: case.current_stage,
                };
            }
            CaseStatus::Cancelled => {
                return Self::Cancelled {
                    stage: case.current_stage,
                };
            }
            _ => {}
        }
        match case.current_stage {
            Stage::Assignment => Self::Assignment,
            Stage::Investigation => Self::Investigation,
            Stage::SolutionPlan => Self::Solution(cost_phase(&case.solution.cost)),
            Stage::Execution => Self::Execution,
            Stage::Closing => Self::Closing(final_cost_phase(case)),
        }
    }

    /// Returns true for closed and cancelled cases.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. } | Self::Cancelled { .. })
    }
}

fn cost_phase(cost: &CostEstimate) -> CostPhase {
    if !cost.required() {
        return CostPhase::NotRequired;
    }
    match cost.status() {
        Some(CostStatus::Approved) => CostPhase::Approved,
        Some(CostStatus::Rejected) => CostPhase::Rejected,
        Some(CostStatus::Pending) => CostPhase::AwaitingApproval,
        None => CostPhase::Unsubmitted,
    }
}

fn final_cost_phase(case: &Case) -> FinalCostPhase {
    if !case.show_final_cost_section() {
        return FinalCostPhase::NotApplicable;
    }
    let final_cost: &FinalCost = &case.closing.final_cost;
    if final_cost.amount().is_none() {
        return FinalCostPhase::Missing;
    }
    if case.final_cost_matches_estimate() {
        return FinalCostPhase::MatchesEstimate;
    }
    match final_cost.status() {
        Some(CostStatus::Pending) => FinalCostPhase::AwaitingApproval,
        Some(CostStatus::Approved) => FinalCostPhase::Approved,
        Some(CostStatus::Rejected) => FinalCostPhase::Rejected,
        None => FinalCostPhase::Unreviewed,
    }
}
