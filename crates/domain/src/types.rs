// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the five ordered phases of a service case.
///
/// Stages are strictly ordered. A case moves forward one stage at a time
/// and only ever moves backwards through a redo, which lands on
/// `SolutionPlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    /// Stage 1: customer service registers and assigns the case.
    Assignment = 1,
    /// Stage 2: the technician investigates on site.
    Investigation = 2,
    /// Stage 3: root cause, solution, plan, and optional cost estimate.
    SolutionPlan = 3,
    /// Stage 4: the technician executes the repair and collects sign-off.
    Execution = 4,
    /// Stage 5: customer service closes the case.
    Closing = 5,
}

impl Stage {
    /// All stages in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Assignment,
        Self::Investigation,
        Self::SolutionPlan,
        Self::Execution,
        Self::Closing,
    ];

    /// Returns the 1-based stage number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Converts a 1-based stage number into a stage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStage` if `number` is outside `1..=5`.
    pub const fn from_number(number: u8) -> Result<Self, DomainError> {
        match number {
            1 => Ok(Self::Assignment),
            2 => Ok(Self::Investigation),
            3 => Ok(Self::SolutionPlan),
            4 => Ok(Self::Execution),
            5 => Ok(Self::Closing),
            _ => Err(DomainError::InvalidStage(number)),
        }
    }

    /// Returns the stage that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Assignment => Some(Self::Investigation),
            Self::Investigation => Some(Self::SolutionPlan),
            Self::SolutionPlan => Some(Self::Execution),
            Self::Execution => Some(Self::Closing),
            Self::Closing => None,
        }
    }

    /// Returns the human-readable stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Assignment => "Assignment",
            Self::Investigation => "Investigation",
            Self::SolutionPlan => "Solution & Plan",
            Self::Execution => "Execution",
            Self::Closing => "Closing",
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.name())
    }
}

/// Overall status of a case.
///
/// `Closed` and `Cancelled` are terminal. `Completed` is accepted from
/// stored records but never produced by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Newly registered, not yet assigned onwards.
    #[default]
    Open,
    /// Work is progressing normally.
    InProgress,
    /// Waiting for a leader to review the estimated cost.
    Pending,
    /// The estimated cost was rejected.
    Rejected,
    /// Legacy completion marker.
    Completed,
    /// Finished normally. Terminal.
    Closed,
    /// Aborted by customer service. Terminal.
    Cancelled,
}

impl CaseStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further mutation is permitted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

impl FromStr for CaseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidCaseStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review state of an estimated or final cost.
///
/// The absence of a review (`null` in storage) is modelled as `None` at the
/// use site, so this enum only carries the three reviewed states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStatus {
    /// Submitted and awaiting a leader.
    Pending,
    /// Approved by a leader.
    Approved,
    /// Rejected by a leader.
    Rejected,
}

impl CostStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true once a leader has made a decision.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl FromStr for CostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidCostStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for CostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Renders an optional cost status the way it is stored (`null` when unset).
#[must_use]
pub fn cost_status_label(status: Option<CostStatus>) -> &'static str {
    status.map_or("null", |s| s.as_str())
}

/// The role of the person acting on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Customer service: owns registration (stage 1) and closing (stage 5).
    CustomerService,
    /// Technician: owns investigation, solution, and execution.
    Technician,
    /// Leader: approves or rejects costs, never edits stage content.
    Leader,
}

impl Role {
    /// Returns the string representation used for the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerService => "cs",
            Self::Technician => "technician",
            Self::Leader => "leader",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cs" | "customer_service" => Ok(Self::CustomerService),
            "technician" | "tech" => Ok(Self::Technician),
            "leader" => Ok(Self::Leader),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    /// Photos and general documents.
    #[default]
    Photo,
    /// Supporting documents for the estimated cost (stage 3 only).
    Cost,
}

impl AttachmentType {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Cost => "cost",
        }
    }
}

impl FromStr for AttachmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" | "document" => Ok(Self::Photo),
            "cost" => Ok(Self::Cost),
            _ => Err(DomainError::InvalidAttachmentType(s.to_string())),
        }
    }
}

/// A client satisfaction rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Creates a rating.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRating` if `value` is outside `1..=5`.
    pub const fn new(value: u8) -> Result<Self, DomainError> {
        if value >= 1 && value <= 5 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating(value))
        }
    }

    /// Returns the rating value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// The human-facing case reference (e.g. `WC-2026-00042`).
///
/// Immutable once the case exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseNumber {
    value: String,
}

impl CaseNumber {
    /// Creates a case number, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCaseNumber` if the value is empty after trimming.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCaseNumber(String::from(
                "Case number cannot be empty",
            )));
        }
        Ok(Self {
            value: trimmed.to_string(),
        })
    }

    /// Builds the canonical case number for a case id in a given year.
    #[must_use]
    pub fn generate(year: i32, case_id: i64) -> Self {
        Self {
            value: format!("WC-{year}-{case_id:05}"),
        }
    }

    /// Returns the case number value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
