// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cost bundles for the solution estimate and the closing final cost.
//!
//! Both bundles guard their own review transitions: a cost moves from
//! unreviewed or pending to approved or rejected, and an approved cost only
//! changes again when a redo resets it.

use crate::error::DomainError;
use crate::types::{CostStatus, cost_status_label};

/// Two costs closer than this are considered equal.
pub const COST_TOLERANCE: f64 = 0.01;

/// Returns true if `a` and `b` differ by less than [`COST_TOLERANCE`].
#[must_use]
pub fn costs_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < COST_TOLERANCE
}

/// Validates that a cost is a finite, non-negative number.
///
/// # Errors
///
/// Returns `DomainError::InvalidCost` otherwise.
pub fn validate_cost(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::InvalidCost {
            field,
            reason: String::from("must be a finite number"),
        });
    }
    if value < 0.0 {
        return Err(DomainError::InvalidCost {
            field,
            reason: format!("must not be negative (got {value})"),
        });
    }
    Ok(value)
}

/// The stage 3 estimated cost.
///
/// When `required` is false every other field is `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostEstimate {
    required: bool,
    estimated_cost: Option<f64>,
    description: Option<String>,
    status: Option<CostStatus>,
}

impl CostEstimate {
    /// A case with no cost attached.
    #[must_use]
    pub const fn not_required() -> Self {
        Self {
            required: false,
            estimated_cost: None,
            description: None,
            status: None,
        }
    }

    /// Rebuilds an estimate from stored columns, enforcing the bundle invariant.
    ///
    /// # Errors
    ///
    /// Returns an error if the cost is invalid or if fields are set while
    /// no cost is required.
    pub fn from_parts(
        required: bool,
        estimated_cost: Option<f64>,
        description: Option<String>,
        status: Option<CostStatus>,
    ) -> Result<Self, DomainError> {
        if !required {
            if estimated_cost.is_some() || description.is_some() || status.is_some() {
                return Err(DomainError::InvariantViolation(String::from(
                    "cost fields are set while no cost is required",
                )));
            }
            return Ok(Self::not_required());
        }
        if let Some(cost) = estimated_cost {
            validate_cost("estimated_cost", cost)?;
        }
        Ok(Self {
            required,
            estimated_cost,
            description,
            status,
        })
    }

    /// Returns whether a cost estimate is required.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Returns the estimated cost.
    #[must_use]
    pub const fn estimated_cost(&self) -> Option<f64> {
        self.estimated_cost
    }

    /// Returns the cost description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> Option<CostStatus> {
        self.status
    }

    /// Returns true once a leader has approved the estimate.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self.status, Some(CostStatus::Approved))
    }

    /// Returns true if the estimate was rejected.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self.status, Some(CostStatus::Rejected))
    }

    /// Records a cost for review. Also used to resubmit after a rejection.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is already approved or the cost is invalid.
    pub fn submit(&mut self, estimated_cost: f64, description: Option<String>) -> Result<(), DomainError> {
        if self.is_approved() {
            return Err(DomainError::CostAlreadyApproved);
        }
        let cost: f64 = validate_cost("estimated_cost", estimated_cost)?;
        self.required = true;
        self.estimated_cost = Some(cost);
        self.description = description;
        self.status = Some(CostStatus::Pending);
        Ok(())
    }

    /// Drops the cost requirement and clears every cost field.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is already approved.
    pub fn withdraw(&mut self) -> Result<(), DomainError> {
        if self.is_approved() {
            return Err(DomainError::CostAlreadyApproved);
        }
        *self = Self::not_required();
        Ok(())
    }

    /// Ensures the estimate is awaiting review.
    fn ensure_reviewable(&self) -> Result<(), DomainError> {
        if !self.required || self.estimated_cost.is_none() {
            return Err(DomainError::NoPendingCost {
                state: String::from("not submitted"),
            });
        }
        match self.status {
            None | Some(CostStatus::Pending) => Ok(()),
            Some(decided) => Err(DomainError::NoPendingCost {
                state: decided.as_str().to_string(),
            }),
        }
    }

    /// Marks the estimate approved.
    ///
    /// # Errors
    ///
    /// Returns an error unless the estimate is awaiting review.
    pub fn approve(&mut self) -> Result<(), DomainError> {
        self.ensure_reviewable()?;
        self.status = Some(CostStatus::Approved);
        Ok(())
    }

    /// Marks the estimate rejected.
    ///
    /// # Errors
    ///
    /// Returns an error unless the estimate is awaiting review.
    pub fn reject(&mut self) -> Result<(), DomainError> {
        self.ensure_reviewable()?;
        self.status = Some(CostStatus::Rejected);
        Ok(())
    }

    /// Clears a leader decision so a redone cycle must be reviewed again.
    ///
    /// The amount and description stay so the technician can resubmit them.
    pub fn reset_decision(&mut self) {
        if self.status.is_some_and(|s| s.is_decided()) {
            self.status = None;
        }
    }

    /// Short form for audit snapshots.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.required {
            return String::from("cost=not_required");
        }
        format!(
            "cost={},cost_status={}",
            self.estimated_cost
                .map_or_else(|| String::from("null"), |c| format!("{c:.2}")),
            cost_status_label(self.status)
        )
    }
}

/// The stage 5 final cost.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinalCost {
    amount: Option<f64>,
    status: Option<CostStatus>,
    approved_by: Option<i64>,
}

impl FinalCost {
    /// Rebuilds a final cost from stored columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is invalid or a status exists without an amount.
    pub fn from_parts(
        amount: Option<f64>,
        status: Option<CostStatus>,
        approved_by: Option<i64>,
    ) -> Result<Self, DomainError> {
        if let Some(value) = amount {
            validate_cost("final_cost", value)?;
        } else if status.is_some() {
            return Err(DomainError::InvariantViolation(String::from(
                "final cost status is set without a final cost",
            )));
        }
        Ok(Self {
            amount,
            status,
            approved_by,
        })
    }

    /// Returns the final cost.
    #[must_use]
    pub const fn amount(&self) -> Option<f64> {
        self.amount
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> Option<CostStatus> {
        self.status
    }

    /// Returns the leader who approved the final cost.
    #[must_use]
    pub const fn approved_by(&self) -> Option<i64> {
        self.approved_by
    }

    /// Returns true once a leader has approved the final cost.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self.status, Some(CostStatus::Approved))
    }

    /// Returns true if the final cost equals `estimate` within tolerance.
    #[must_use]
    pub fn matches(&self, estimate: Option<f64>) -> bool {
        match (self.amount, estimate) {
            (Some(amount), Some(estimate)) => costs_equal(amount, estimate),
            _ => false,
        }
    }

    /// Records the final cost.
    ///
    /// An amount equal to `estimate` needs no review, so its status is
    /// cleared; any other amount awaits a leader.
    ///
    /// # Errors
    ///
    /// Returns an error if already approved or the amount is invalid.
    pub fn record(&mut self, amount: f64, estimate: Option<f64>) -> Result<(), DomainError> {
        if self.is_approved() {
            return Err(DomainError::FinalCostAlreadyApproved);
        }
        let value: f64 = validate_cost("final_cost", amount)?;
        self.amount = Some(value);
        self.approved_by = None;
        self.status = if self.matches(estimate) {
            None
        } else {
            Some(CostStatus::Pending)
        };
        Ok(())
    }

    fn ensure_reviewable(&self) -> Result<(), DomainError> {
        match (self.amount, self.status) {
            (Some(_), Some(CostStatus::Pending)) => Ok(()),
            (None, _) => Err(DomainError::NoPendingFinalCost {
                state: String::from("missing"),
            }),
            (Some(_), status) => Err(DomainError::NoPendingFinalCost {
                state: cost_status_label(status).to_string(),
            }),
        }
    }

    /// Marks the final cost approved by `leader_id`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the final cost is awaiting review.
    pub fn approve(&mut self, leader_id: i64) -> Result<(), DomainError> {
        self.ensure_reviewable()?;
        self.status = Some(CostStatus::Approved);
        self.approved_by = Some(leader_id);
        Ok(())
    }

    /// Marks the final cost rejected.
    ///
    /// # Errors
    ///
    /// Returns an error unless the final cost is awaiting review.
    pub fn reject(&mut self) -> Result<(), DomainError> {
        self.ensure_reviewable()?;
        self.status = Some(CostStatus::Rejected);
        Ok(())
    }

    /// Clears the final cost entirely.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
