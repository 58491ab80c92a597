// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    LEADER_USER, apply_ok, create_case_at_closing, create_case_at_closing_without_cost, cs,
    leader, tech, try_apply,
};
use crate::{Command, CoreError, ensure_closable};
use casetrack_domain::{Case, CaseStatus, CostStatus, DomainError};

#[test]
fn test_close_fails_when_final_cost_missing() {
    let case: Case = create_case_at_closing(500.0);
    assert_eq!(
        try_apply(&case, Command::CloseCase, &cs()),
        Err(CoreError::FinalCostMissing)
    );
}

#[test]
fn test_close_without_final_cost_section() {
    let case: Case = create_case_at_closing_without_cost();
    assert!(ensure_closable(&case).is_ok());
    assert_eq!(
        try_apply(&case, Command::SaveFinalCost { amount: 10.0 }, &cs()),
        Err(CoreError::Validation(DomainError::FinalCostNotApplicable))
    );
}

#[test]
fn test_final_cost_within_tolerance_needs_no_approval() {
    let case: Case = create_case_at_closing(500.0);
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 500.004 }, &cs());
    assert_eq!(case.closing.final_cost.status(), None);
    assert!(matches!(
        try_apply(&case, Command::ApproveFinalCost, &leader()),
        Err(CoreError::Validation(DomainError::NoPendingFinalCost { .. }))
    ));
    let case: Case = apply_ok(&case, Command::CloseCase, &cs());
    assert_eq!(case.status, CaseStatus::Closed);
}

#[test]
fn test_matching_final_cost_closes_regardless_of_prior_status() {
    let case: Case = create_case_at_closing(500.0);
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 450.0 }, &cs());
    let case: Case = apply_ok(&case, Command::RejectFinalCost { reason: None }, &leader());
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 500.0 }, &cs());
    assert!(ensure_closable(&case).is_ok());
}

#[test]
fn test_rejected_final_cost_blocks_close_until_corrected() {
    let case: Case = create_case_at_closing(500.0);
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 450.0 }, &cs());
    let case: Case = apply_ok(
        &case,
        Command::RejectFinalCost {
            reason: Some(String::from("Invoice missing")),
        },
        &leader(),
    );
    assert_eq!(case.closing.final_cost.status(), Some(CostStatus::Rejected));
    assert_eq!(case.status, CaseStatus::InProgress);
    assert_eq!(
        try_apply(&case, Command::CloseCase, &cs()),
        Err(CoreError::FinalCostPending)
    );

    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 470.0 }, &cs());
    assert_eq!(case.closing.final_cost.status(), Some(CostStatus::Pending));
    let case: Case = apply_ok(&case, Command::ApproveFinalCost, &leader());
    assert_eq!(case.closing.final_cost.approved_by(), Some(LEADER_USER));
    let case: Case = apply_ok(&case, Command::CloseCase, &cs());
    assert_eq!(case.status, CaseStatus::Closed);
}

#[test]
fn test_approved_final_cost_is_immutable() {
    let case: Case = create_case_at_closing(500.0);
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 450.0 }, &cs());
    let case: Case = apply_ok(&case, Command::ApproveFinalCost, &leader());
    assert_eq!(
        try_apply(&case, Command::SaveFinalCost { amount: 400.0 }, &cs()),
        Err(CoreError::Validation(DomainError::FinalCostAlreadyApproved))
    );
}

#[test]
fn test_saving_final_cost_clears_previous_approver() {
    let case: Case = create_case_at_closing(500.0);
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 450.0 }, &cs());
    let case: Case = apply_ok(&case, Command::RejectFinalCost { reason: None }, &leader());
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 440.0 }, &cs());
    assert_eq!(case.closing.final_cost.approved_by(), None);
}

#[test]
fn test_final_cost_roles() {
    let case: Case = create_case_at_closing(500.0);
    assert!(matches!(
        try_apply(&case, Command::SaveFinalCost { amount: 450.0 }, &tech()),
        Err(CoreError::PermissionDenied { .. })
    ));
    let case: Case = apply_ok(&case, Command::SaveFinalCost { amount: 450.0 }, &cs());
    assert!(matches!(
        try_apply(&case, Command::ApproveFinalCost, &cs()),
        Err(CoreError::PermissionDenied { .. })
    ));
}

#[test]
fn test_negative_final_cost_is_rejected() {
    let case: Case = create_case_at_closing(500.0);
    assert!(matches!(
        try_apply(&case, Command::SaveFinalCost { amount: -1.0 }, &cs()),
        Err(CoreError::Validation(DomainError::InvalidCost { .. }))
    ));
}
