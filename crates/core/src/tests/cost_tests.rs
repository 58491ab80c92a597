// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    apply_ok, create_case_at_solution, create_case_with_approved_cost, cs, leader, other_tech,
    save_cost, tech, try_apply,
};
use crate::{Command, CoreError};
use casetrack_domain::{Case, CaseStatus, CostStatus, DomainError, Stage};

fn withdraw_cost() -> Command {
    Command::SaveCost {
        required: false,
        estimated_cost: None,
        description: None,
    }
}

#[test]
fn test_advance_blocked_while_cost_unapproved() {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(500.0), &tech());
    let result = try_apply(
        &case,
        Command::AdvanceStage {
            from_stage: Stage::SolutionPlan,
        },
        &tech(),
    );
    assert_eq!(result, Err(CoreError::CostApprovalPending));

    let rejected: Case = apply_ok(&case, Command::RejectCost { reason: None }, &leader());
    let result = try_apply(
        &rejected,
        Command::AdvanceStage {
            from_stage: Stage::SolutionPlan,
        },
        &tech(),
    );
    assert_eq!(result, Err(CoreError::CostApprovalPending));
}

#[test]
fn test_advance_without_cost_requirement() {
    let case: Case = create_case_at_solution();
    let case: Case = apply_ok(
        &case,
        Command::AdvanceStage {
            from_stage: Stage::SolutionPlan,
        },
        &tech(),
    );
    assert_eq!(case.current_stage, Stage::Execution);
}

#[test]
fn test_any_technician_may_save_cost_on_solution() {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(120.5), &other_tech());
    assert_eq!(case.solution.cost.estimated_cost(), Some(120.5));
    assert_eq!(case.solution.cost.status(), Some(CostStatus::Pending));
    assert_eq!(case.status, CaseStatus::Pending);
}

#[test]
fn test_required_cost_needs_amount() {
    let result = try_apply(
        &create_case_at_solution(),
        Command::SaveCost {
            required: true,
            estimated_cost: None,
            description: None,
        },
        &tech(),
    );
    assert_eq!(
        result,
        Err(CoreError::Validation(DomainError::MissingRequiredField {
            stage: Stage::SolutionPlan,
            field: "estimated_cost",
        }))
    );
}

#[test]
fn test_negative_cost_is_rejected() {
    let result = try_apply(&create_case_at_solution(), save_cost(-5.0), &tech());
    assert!(matches!(
        result,
        Err(CoreError::Validation(DomainError::InvalidCost { .. }))
    ));
}

#[test]
fn test_cs_and_leader_cannot_save_cost() {
    let case: Case = create_case_at_solution();
    assert!(matches!(
        try_apply(&case, save_cost(10.0), &cs()),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        try_apply(&case, save_cost(10.0), &leader()),
        Err(CoreError::PermissionDenied { .. })
    ));
}

#[test]
fn test_withdrawing_cost_after_rejection_allows_advance() {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(500.0), &tech());
    let case: Case = apply_ok(&case, Command::RejectCost { reason: None }, &leader());
    let case: Case = apply_ok(&case, withdraw_cost(), &tech());

    assert_eq!(case.status, CaseStatus::InProgress);
    assert!(!case.solution.cost.required());
    assert_eq!(case.solution.cost.estimated_cost(), None);
    assert_eq!(case.solution.cost.status(), None);
    assert_eq!(case.attempt_number, 1);

    let case: Case = apply_ok(
        &case,
        Command::AdvanceStage {
            from_stage: Stage::SolutionPlan,
        },
        &tech(),
    );
    assert_eq!(case.current_stage, Stage::Execution);
}

#[test]
fn test_resubmission_after_rejection_returns_to_pending() {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(500.0), &tech());
    let case: Case = apply_ok(&case, Command::RejectCost { reason: None }, &leader());
    let case: Case = apply_ok(&case, save_cost(420.0), &tech());
    assert_eq!(case.status, CaseStatus::Pending);
    assert_eq!(case.solution.cost.status(), Some(CostStatus::Pending));
    let case: Case = apply_ok(&case, Command::ApproveCost, &leader());
    assert!(case.solution.cost.is_approved());
}

#[test]
fn test_approved_cost_cannot_be_changed() {
    let case: Case = create_case_with_approved_cost(500.0);
    assert_eq!(
        try_apply(&case, save_cost(600.0), &tech()),
        Err(CoreError::Validation(DomainError::CostAlreadyApproved))
    );
    assert_eq!(
        try_apply(&case, withdraw_cost(), &tech()),
        Err(CoreError::Validation(DomainError::CostAlreadyApproved))
    );
    assert!(matches!(
        try_apply(&case, Command::RejectCost { reason: None }, &leader()),
        Err(CoreError::Validation(DomainError::NoPendingCost { .. }))
    ));
}

#[test]
fn test_only_leader_reviews_cost() {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(500.0), &tech());
    assert!(matches!(
        try_apply(&case, Command::ApproveCost, &tech()),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        try_apply(&case, Command::ApproveCost, &cs()),
        Err(CoreError::PermissionDenied { .. })
    ));
}

#[test]
fn test_review_requires_pending_case() {
    let case: Case = create_case_at_solution();
    assert!(matches!(
        try_apply(&case, Command::ApproveCost, &leader()),
        Err(CoreError::Validation(DomainError::NoPendingCost { .. }))
    ));
}
