// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types for the `cases` and `case_attachments` tables and their
//! conversions to and from the domain aggregate.

use casetrack_domain::{
    AssignmentDetails, Attachment, AttachmentType, Case, CaseNumber, CaseStatus, ClosingDetails,
    CostEstimate, CostStatus, DomainError, ExecutionChecklist, ExecutionDetails, FinalCost,
    InvestigationChecklist, InvestigationDetails, Rating, SolutionChecklist, SolutionDetails,
    Stage, StageAttachments, format_date, parse_date,
};
use diesel::prelude::*;
use num_traits::ToPrimitive;

use crate::diesel_schema::{case_attachments, cases};
use crate::error::PersistenceError;

/// One row of the `cases` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(primary_key(case_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CaseRecord {
    pub case_id: i64,
    #[diesel(skip_update)]
    pub case_number: String,
    pub version: i64,
    pub current_stage: i32,
    pub status: String,
    pub attempt_number: i32,
    pub client_id: Option<i64>,
    pub site_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub created_by: Option<i64>,
    pub case_type: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub investigation_report: Option<String>,
    pub investigation_checklist: String,
    pub root_cause: Option<String>,
    pub solution_description: Option<String>,
    pub solution_checklist: String,
    pub planned_execution_date: Option<String>,
    pub cost_required: bool,
    pub estimated_cost: Option<f64>,
    pub cost_description: Option<String>,
    pub cost_status: Option<String>,
    pub execution_report: Option<String>,
    pub execution_checklist: String,
    pub client_signature: Option<String>,
    pub client_feedback: Option<String>,
    pub client_rating: Option<i32>,
    pub cs_notes: Option<String>,
    pub final_feedback: Option<String>,
    pub final_rating: Option<i32>,
    pub final_cost: Option<f64>,
    pub final_cost_status: Option<String>,
    pub final_cost_approved_by: Option<i64>,
    pub next_attachment_id: i64,
    #[diesel(skip_update)]
    pub created_at: String,
    pub updated_at: String,
}

/// One row of the `case_attachments` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = case_attachments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttachmentRecord {
    pub case_id: i64,
    pub attachment_id: i64,
    pub filename: String,
    pub url: String,
    pub stage: i32,
    pub attachment_type: String,
    pub uploaded_by: Option<i64>,
}

fn rating_column(rating: Option<Rating>) -> Option<i32> {
    rating.map(|r| i32::from(r.value()))
}

fn stage_from_column(value: i32) -> Result<Stage, DomainError> {
    let number: u8 = value.to_u8().ok_or_else(|| {
        DomainError::InvariantViolation(format!("stage column holds {value}"))
    })?;
    Stage::from_number(number)
}

fn rating_from_column(value: Option<i32>) -> Result<Option<Rating>, DomainError> {
    value
        .map(|v| {
            v.to_u8()
                .ok_or_else(|| DomainError::InvariantViolation(format!("rating column holds {v}")))
                .and_then(Rating::new)
        })
        .transpose()
}

fn cost_status_from_column(value: Option<&str>) -> Result<Option<CostStatus>, DomainError> {
    value.map(str::parse).transpose()
}

impl CaseRecord {
    /// Flattens a case into a row, stamping the given version and times.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter does not fit its column or the planned
    /// date cannot be formatted.
    pub fn from_case(
        case: &Case,
        version: u64,
        created_at: String,
        updated_at: String,
    ) -> Result<Self, PersistenceError> {
        let version: i64 = version.to_i64().ok_or_else(|| {
            PersistenceError::SerializationError(format!("version {version} out of range"))
        })?;
        let attempt_number: i32 = case.attempt_number.to_i32().ok_or_else(|| {
            PersistenceError::SerializationError(format!(
                "attempt number {} out of range",
                case.attempt_number
            ))
        })?;
        let planned_execution_date: Option<String> = case
            .solution
            .planned_execution_date
            .map(format_date)
            .transpose()
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let cost: &CostEstimate = &case.solution.cost;
        let final_cost: &FinalCost = &case.closing.final_cost;

        Ok(Self {
            case_id: case.case_id,
            case_number: case.case_number.value().to_string(),
            version,
            current_stage: i32::from(case.current_stage.number()),
            status: case.status.as_str().to_string(),
            attempt_number,
            client_id: case.client_id,
            site_id: case.site_id,
            contact_id: case.contact_id,
            assigned_to: case.assigned_to,
            created_by: case.created_by,
            case_type: case.assignment.case_type.clone(),
            priority: case.assignment.priority.clone(),
            description: case.assignment.description.clone(),
            investigation_report: case.investigation.report.clone(),
            investigation_checklist: case.investigation.checklist.encode(),
            root_cause: case.solution.root_cause.clone(),
            solution_description: case.solution.solution_description.clone(),
            solution_checklist: case.solution.checklist.encode(),
            planned_execution_date,
            cost_required: cost.required(),
            estimated_cost: cost.estimated_cost(),
            cost_description: cost.description().map(str::to_string),
            cost_status: cost.status().map(|s| s.as_str().to_string()),
            execution_report: case.execution.report.clone(),
            execution_checklist: case.execution.checklist.encode(),
            client_signature: case.execution.client_signature.clone(),
            client_feedback: case.execution.client_feedback.clone(),
            client_rating: rating_column(case.execution.client_rating),
            cs_notes: case.closing.cs_notes.clone(),
            final_feedback: case.closing.final_feedback.clone(),
            final_rating: rating_column(case.closing.final_rating),
            final_cost: final_cost.amount(),
            final_cost_status: final_cost.status().map(|s| s.as_str().to_string()),
            final_cost_approved_by: final_cost.approved_by(),
            next_attachment_id: case.attachments.next_id(),
            created_at,
            updated_at,
        })
    }

    /// Rebuilds the aggregate from this row and its attachment rows.
    ///
    /// Checklists decode leniently; every other column must hold a value
    /// the domain accepts.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if a column is out of range
    /// or the rebuilt case breaks an invariant.
    pub fn into_case(self, attachments: Vec<AttachmentRecord>) -> Result<Case, PersistenceError> {
        let case_id: i64 = self.case_id;
        self.try_into_case(attachments)
            .map_err(|e| PersistenceError::corrupt(case_id, &e))
    }

    fn try_into_case(self, attachments: Vec<AttachmentRecord>) -> Result<Case, DomainError> {
        let version: u64 = self.version.to_u64().ok_or_else(|| {
            DomainError::InvariantViolation(format!("version column holds {}", self.version))
        })?;
        let attempt_number: u32 = self.attempt_number.to_u32().ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "attempt_number column holds {}",
                self.attempt_number
            ))
        })?;
        let attachments: Vec<Attachment> = attachments
            .into_iter()
            .map(AttachmentRecord::into_attachment)
            .collect::<Result<_, _>>()?;

        let case: Case = Case {
            case_id: self.case_id,
            case_number: CaseNumber::new(&self.case_number)?,
            version,
            current_stage: stage_from_column(self.current_stage)?,
            status: self.status.parse::<CaseStatus>()?,
            attempt_number,
            client_id: self.client_id,
            site_id: self.site_id,
            contact_id: self.contact_id,
            assigned_to: self.assigned_to,
            created_by: self.created_by,
            assignment: AssignmentDetails {
                case_type: self.case_type,
                priority: self.priority,
                description: self.description,
            },
            investigation: InvestigationDetails {
                report: self.investigation_report,
                checklist: InvestigationChecklist::decode(&self.investigation_checklist),
            },
            solution: SolutionDetails {
                root_cause: self.root_cause,
                solution_description: self.solution_description,
                checklist: SolutionChecklist::decode(&self.solution_checklist),
                planned_execution_date: self
                    .planned_execution_date
                    .as_deref()
                    .map(parse_date)
                    .transpose()?,
                cost: CostEstimate::from_parts(
                    self.cost_required,
                    self.estimated_cost,
                    self.cost_description,
                    cost_status_from_column(self.cost_status.as_deref())?,
                )?,
            },
            execution: ExecutionDetails {
                report: self.execution_report,
                checklist: ExecutionChecklist::decode(&self.execution_checklist),
                client_signature: self.client_signature,
                client_feedback: self.client_feedback,
                client_rating: rating_from_column(self.client_rating)?,
            },
            closing: ClosingDetails {
                cs_notes: self.cs_notes,
                final_feedback: self.final_feedback,
                final_rating: rating_from_column(self.final_rating)?,
                final_cost: FinalCost::from_parts(
                    self.final_cost,
                    cost_status_from_column(self.final_cost_status.as_deref())?,
                    self.final_cost_approved_by,
                )?,
            },
            attachments: StageAttachments::from_attachments(attachments, self.next_attachment_id),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        };
        case.validate_invariants()?;
        Ok(case)
    }
}

impl AttachmentRecord {
    /// Builds the row for one attachment of a case.
    #[must_use]
    pub fn from_attachment(case_id: i64, attachment: &Attachment) -> Self {
        Self {
            case_id,
            attachment_id: attachment.attachment_id,
            filename: attachment.filename.clone(),
            url: attachment.url.clone(),
            stage: i32::from(attachment.stage.number()),
            attachment_type: attachment.attachment_type.as_str().to_string(),
            uploaded_by: attachment.uploaded_by,
        }
    }

    /// Converts the row back into a domain attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage or type column is not recognised.
    pub fn into_attachment(self) -> Result<Attachment, DomainError> {
        Ok(Attachment {
            attachment_id: self.attachment_id,
            filename: self.filename,
            url: self.url,
            stage: stage_from_column(self.stage)?,
            attachment_type: self.attachment_type.parse::<AttachmentType>()?,
            uploaded_by: self.uploaded_by,
        })
    }
}
