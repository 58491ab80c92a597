// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AttachmentType, CaseNumber, CaseStatus, CostStatus, DomainError, Rating, Role, Stage};
use std::str::FromStr;

#[test]
fn test_stage_numbers_round_trip() {
    for stage in Stage::ALL {
        assert_eq!(Stage::from_number(stage.number()), Ok(stage));
    }
    assert_eq!(Stage::from_number(0), Err(DomainError::InvalidStage(0)));
    assert_eq!(Stage::from_number(6), Err(DomainError::InvalidStage(6)));
}

#[test]
fn test_stage_ordering_and_next() {
    assert!(Stage::Assignment < Stage::Closing);
    assert_eq!(Stage::SolutionPlan.next(), Some(Stage::Execution));
    assert_eq!(Stage::Closing.next(), None);
}

#[test]
fn test_stage_display() {
    assert_eq!(Stage::SolutionPlan.to_string(), "stage 3 (Solution & Plan)");
}

#[test]
fn test_stage_serializes_as_number() {
    let json: String = serde_json::to_string(&Stage::Execution).unwrap();
    assert_eq!(json, "4");
    let stage: Stage = serde_json::from_str("2").unwrap();
    assert_eq!(stage, Stage::Investigation);
    assert!(serde_json::from_str::<Stage>("9").is_err());
}

#[test]
fn test_case_status_parsing() {
    assert_eq!(CaseStatus::from_str("in_progress"), Ok(CaseStatus::InProgress));
    assert_eq!(CaseStatus::from_str("cancelled"), Ok(CaseStatus::Cancelled));
    assert!(CaseStatus::from_str("done").is_err());
}

#[test]
fn test_only_closed_and_cancelled_are_terminal() {
    assert!(CaseStatus::Closed.is_terminal());
    assert!(CaseStatus::Cancelled.is_terminal());
    assert!(!CaseStatus::Completed.is_terminal());
    assert!(!CaseStatus::Rejected.is_terminal());
    assert!(!CaseStatus::Pending.is_terminal());
}

#[test]
fn test_cost_status_decided() {
    assert!(!CostStatus::Pending.is_decided());
    assert!(CostStatus::Approved.is_decided());
    assert!(CostStatus::Rejected.is_decided());
    assert_eq!(crate::cost_status_label(None), "null");
}

#[test]
fn test_role_parsing_accepts_aliases() {
    assert_eq!(Role::from_str("CS"), Ok(Role::CustomerService));
    assert_eq!(Role::from_str("customer_service"), Ok(Role::CustomerService));
    assert_eq!(Role::from_str("Technician"), Ok(Role::Technician));
    assert_eq!(Role::from_str("leader"), Ok(Role::Leader));
    assert_eq!(
        Role::from_str("admin"),
        Err(DomainError::InvalidRole(String::from("admin")))
    );
}

#[test]
fn test_attachment_type_defaults_to_photo() {
    assert_eq!(AttachmentType::default(), AttachmentType::Photo);
    assert_eq!(AttachmentType::from_str("document"), Ok(AttachmentType::Photo));
    assert_eq!(AttachmentType::from_str("cost"), Ok(AttachmentType::Cost));
}

#[test]
fn test_rating_bounds() {
    assert!(Rating::new(0).is_err());
    assert_eq!(Rating::new(5).map(Rating::value), Ok(5));
    assert_eq!(Rating::new(6), Err(DomainError::InvalidRating(6)));
    assert!(serde_json::from_str::<Rating>("7").is_err());
}

#[test]
fn test_case_number_generation_and_trim() {
    assert_eq!(CaseNumber::generate(2026, 42).value(), "WC-2026-00042");
    assert_eq!(CaseNumber::new("  WC-1 ").unwrap().value(), "WC-1");
    assert!(CaseNumber::new("   ").is_err());
}
