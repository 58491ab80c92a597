// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use casetrack_persistence::Persistence;

use super::helpers::{
    LEADER_USER, TECH_USER, advance_from, create_case_at_closing_with_estimate,
    create_case_at_solution, create_registered_case, create_test_cause, create_test_cs,
    create_test_leader, create_test_other_technician, create_test_persistence,
    create_test_technician, create_valid_request, reload, submit_cost,
};
use crate::{
    AdvanceStageRequest, ApiError, AssignmentForm, CaseCapabilities, CaseInfo, ClosingForm,
    ExecutionForm, ListCasesRequest, ListCasesResponse, RejectRequest, SaveCostRequest,
    SaveFinalCostRequest, UpdateCaseRequest, advance_stage, approve_cost, approve_final_cost,
    cancel_case, close_case, create_case, get_case, get_case_capabilities, list_cases, redo_case,
    reject_cost, reject_final_cost, save_cost, save_final_cost, update_case,
};

#[test]
fn test_create_case_starts_at_assignment() {
    let mut store: Persistence = create_test_persistence();

    let case: CaseInfo = create_registered_case(&mut store);

    assert_eq!(case.current_stage, 1);
    assert_eq!(case.status, "open");
    assert_eq!(case.attempt_number, 1);
    assert_eq!(case.version, 1);
    assert_eq!(case.assignment.assigned_to, Some(TECH_USER));
    assert!(case.case_number.ends_with(&format!("-{:05}", case.case_id)));
    assert!(case.created_at.is_some());
}

#[test]
fn test_create_case_requires_customer_service() {
    let mut store: Persistence = create_test_persistence();

    let result = create_case(
        &mut store,
        create_valid_request(),
        &create_test_technician(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::PermissionDenied { .. })));
    assert!(list_cases(&mut store, &ListCasesRequest::default(), &create_test_cs())
        .unwrap()
        .cases
        .is_empty());
}

#[test]
fn test_get_missing_case_is_not_found() {
    let mut store: Persistence = create_test_persistence();

    let result = get_case(&mut store, 404, &create_test_cs());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_scenario_a_assign_and_advance() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_registered_case(&mut store).case_id;

    let case: CaseInfo = advance_from(&mut store, case_id, 1, &create_test_cs());

    assert_eq!(case.current_stage, 2);
    assert_eq!(case.status, "in_progress");
    assert_eq!(case.version, 2);
}

#[test]
fn test_advance_without_assignee_fails() {
    let mut store: Persistence = create_test_persistence();
    let mut request = create_valid_request();
    request.assignment.assigned_to = None;
    let case_id: i64 = create_case(&mut store, request, &create_test_cs(), create_test_cause())
        .unwrap()
        .case
        .case_id;

    let result = advance_stage(
        &mut store,
        case_id,
        AdvanceStageRequest { from_stage: 1 },
        &create_test_cs(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Validation { rule, .. }) if rule == "required_field"));
}

#[test]
fn test_advance_from_old_stage_is_stale() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_registered_case(&mut store).case_id;
    advance_from(&mut store, case_id, 1, &create_test_cs());

    let result = advance_stage(
        &mut store,
        case_id,
        AdvanceStageRequest { from_stage: 1 },
        &create_test_cs(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::StaleStage { .. })));
    assert_eq!(reload(&mut store, case_id).current_stage, 2);
}

#[test]
fn test_unassigned_technician_cannot_edit_investigation() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_registered_case(&mut store).case_id;
    advance_from(&mut store, case_id, 1, &create_test_cs());

    let result = advance_stage(
        &mut store,
        case_id,
        AdvanceStageRequest { from_stage: 2 },
        &create_test_other_technician(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::PermissionDenied { .. })));
}

#[test]
fn test_scenario_b_cost_approval_unblocks_advance() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;

    let submitted: CaseInfo = submit_cost(&mut store, case_id, 500.0).case;
    assert_eq!(submitted.status, "pending");
    assert_eq!(submitted.cost.status.as_deref(), Some("pending"));

    let blocked = advance_stage(
        &mut store,
        case_id,
        AdvanceStageRequest { from_stage: 3 },
        &create_test_technician(),
        create_test_cause(),
    );
    assert!(matches!(blocked, Err(ApiError::CostApprovalPending)));

    let approved: CaseInfo =
        approve_cost(&mut store, case_id, &create_test_leader(), create_test_cause())
            .unwrap()
            .case;
    assert_eq!(approved.cost.status.as_deref(), Some("approved"));
    assert_eq!(approved.status, "in_progress");

    let advanced: CaseInfo = advance_from(&mut store, case_id, 3, &create_test_technician());
    assert_eq!(advanced.current_stage, 4);
}

#[test]
fn test_technician_cannot_approve_cost() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    submit_cost(&mut store, case_id, 500.0);

    let result = approve_cost(
        &mut store,
        case_id,
        &create_test_technician(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::PermissionDenied { .. })));
}

#[test]
fn test_scenario_c_cancel_after_rejection_is_terminal() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    submit_cost(&mut store, case_id, 500.0);

    let rejected: CaseInfo = reject_cost(
        &mut store,
        case_id,
        RejectRequest {
            reason: Some(String::from("Too expensive")),
        },
        &create_test_leader(),
        create_test_cause(),
    )
    .unwrap()
    .case;
    assert_eq!(rejected.status, "rejected");

    let cancelled: CaseInfo = cancel_case(&mut store, case_id, &create_test_cs(), create_test_cause())
        .unwrap()
        .case;
    assert_eq!(cancelled.status, "cancelled");

    let request: UpdateCaseRequest = UpdateCaseRequest {
        assignment: Some(AssignmentForm::default()),
        ..UpdateCaseRequest::default()
    };
    let result = update_case(
        &mut store,
        case_id,
        request,
        &create_test_cs(),
        create_test_cause(),
    );
    assert!(matches!(result, Err(ApiError::CaseClosed { case_id: id }) if id == case_id));
}

#[test]
fn test_cancel_without_rejection_fails() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;

    let result = cancel_case(&mut store, case_id, &create_test_cs(), create_test_cause());

    assert!(result.is_err());
    assert_eq!(reload(&mut store, case_id).status, "in_progress");
}

#[test]
fn test_withdrawing_rejected_cost_resumes_case() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    submit_cost(&mut store, case_id, 500.0);
    reject_cost(
        &mut store,
        case_id,
        RejectRequest::default(),
        &create_test_leader(),
        create_test_cause(),
    )
    .unwrap();

    let case: CaseInfo = save_cost(
        &mut store,
        case_id,
        SaveCostRequest {
            required: false,
            estimated_cost: None,
            description: None,
        },
        &create_test_technician(),
        create_test_cause(),
    )
    .unwrap()
    .case;

    assert_eq!(case.status, "in_progress");
    assert!(!case.cost.required);
    assert_eq!(case.attempt_number, 1);
    assert_eq!(advance_from(&mut store, case_id, 3, &create_test_technician()).current_stage, 4);
}

#[test]
fn test_scenario_d_matching_final_cost_closes_without_leader() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_closing_with_estimate(&mut store, 500.0).case_id;

    let missing = close_case(&mut store, case_id, &create_test_cs(), create_test_cause());
    assert!(matches!(missing, Err(ApiError::FinalCostMissing)));

    let saved: CaseInfo = save_final_cost(
        &mut store,
        case_id,
        SaveFinalCostRequest { amount: 500.0 },
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap()
    .case;
    assert!(saved.final_cost.matches_estimate);

    let closed: CaseInfo = close_case(&mut store, case_id, &create_test_cs(), create_test_cause())
        .unwrap()
        .case;
    assert_eq!(closed.status, "closed");
}

#[test]
fn test_scenario_e_differing_final_cost_needs_leader() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_closing_with_estimate(&mut store, 500.0).case_id;
    save_final_cost(
        &mut store,
        case_id,
        SaveFinalCostRequest { amount: 450.0 },
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap();

    let blocked = close_case(&mut store, case_id, &create_test_cs(), create_test_cause());
    assert!(matches!(blocked, Err(ApiError::FinalCostPending)));

    let approved: CaseInfo =
        approve_final_cost(&mut store, case_id, &create_test_leader(), create_test_cause())
            .unwrap()
            .case;
    assert_eq!(approved.final_cost.status.as_deref(), Some("approved"));
    assert_eq!(approved.final_cost.approved_by, Some(LEADER_USER));

    let closed: CaseInfo = close_case(&mut store, case_id, &create_test_cs(), create_test_cause())
        .unwrap()
        .case;
    assert_eq!(closed.status, "closed");
}

#[test]
fn test_rejected_final_cost_can_be_corrected() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_closing_with_estimate(&mut store, 500.0).case_id;
    save_final_cost(
        &mut store,
        case_id,
        SaveFinalCostRequest { amount: 650.0 },
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap();
    reject_final_cost(
        &mut store,
        case_id,
        RejectRequest::default(),
        &create_test_leader(),
        create_test_cause(),
    )
    .unwrap();

    save_final_cost(
        &mut store,
        case_id,
        SaveFinalCostRequest { amount: 500.004 },
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap();

    assert!(close_case(&mut store, case_id, &create_test_cs(), create_test_cause()).is_ok());
}

#[test]
fn test_scenario_f_redo_returns_to_solution() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_closing_with_estimate(&mut store, 500.0).case_id;
    update_case(
        &mut store,
        case_id,
        UpdateCaseRequest {
            closing: Some(ClosingForm {
                cs_notes: Some(String::from("Customer unhappy")),
                final_feedback: None,
                final_rating: Some(2),
            }),
            ..UpdateCaseRequest::default()
        },
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap();

    let case: CaseInfo = redo_case(&mut store, case_id, &create_test_cs(), create_test_cause())
        .unwrap()
        .case;

    assert_eq!(case.current_stage, 3);
    assert_eq!(case.attempt_number, 2);
    assert_eq!(case.status, "in_progress");
    assert_eq!(case.closing, ClosingForm::default());
    assert_eq!(case.execution.report, None);
    assert!(case.execution.checklist.iter().all(|checked| !checked));
    assert_eq!(case.final_cost.amount, None);
    assert_eq!(case.cost.status, None);
}

#[test]
fn test_execution_form_round_trips_through_store() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    advance_from(&mut store, case_id, 3, &create_test_technician());

    let form: ExecutionForm = ExecutionForm {
        report: Some(String::from("Frame replaced")),
        checklist: vec![true, true, true, false, false, true],
        client_signature: Some(String::from("data:image/png;base64,AAAA")),
        client_feedback: Some(String::from("Quick work")),
        client_rating: Some(5),
        signature_pad: None,
    };
    update_case(
        &mut store,
        case_id,
        UpdateCaseRequest {
            execution: Some(form.clone()),
            ..UpdateCaseRequest::default()
        },
        &create_test_technician(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(reload(&mut store, case_id).execution, form);
}

#[test]
fn test_invalid_rating_is_rejected_by_workflow() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_closing_with_estimate(&mut store, 100.0).case_id;

    let result = update_case(
        &mut store,
        case_id,
        UpdateCaseRequest {
            closing: Some(ClosingForm {
                final_rating: Some(6),
                ..ClosingForm::default()
            }),
            ..UpdateCaseRequest::default()
        },
        &create_test_cs(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Validation { rule, .. }) if rule == "rating_range"));
}

#[test]
fn test_list_cases_filters_by_status() {
    let mut store: Persistence = create_test_persistence();
    create_registered_case(&mut store);
    let pending_id: i64 = create_case_at_solution(&mut store).case_id;
    submit_cost(&mut store, pending_id, 120.0);

    let all: ListCasesResponse =
        list_cases(&mut store, &ListCasesRequest::default(), &create_test_cs()).unwrap();
    assert_eq!(all.cases.len(), 2);

    let pending: ListCasesResponse = list_cases(
        &mut store,
        &ListCasesRequest {
            status: Some(String::from("pending")),
        },
        &create_test_leader(),
    )
    .unwrap();
    assert_eq!(pending.cases.len(), 1);
    assert_eq!(pending.cases[0].case_id, pending_id);
    assert_eq!(pending.cases[0].cost_status_label, "pending");
}

#[test]
fn test_list_cases_rejects_unknown_status() {
    let mut store: Persistence = create_test_persistence();

    let result = list_cases(
        &mut store,
        &ListCasesRequest {
            status: Some(String::from("archived")),
        },
        &create_test_cs(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { field, .. }) if field == "status"));
}

#[test]
fn test_capabilities_follow_the_case() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    submit_cost(&mut store, case_id, 80.0);

    let leader: CaseCapabilities =
        get_case_capabilities(&mut store, case_id, &create_test_leader()).unwrap();
    assert!(leader.can_review_cost.is_allowed());

    approve_cost(&mut store, case_id, &create_test_leader(), create_test_cause()).unwrap();

    let leader: CaseCapabilities =
        get_case_capabilities(&mut store, case_id, &create_test_leader()).unwrap();
    assert!(!leader.can_review_cost.is_allowed());
    let tech: CaseCapabilities =
        get_case_capabilities(&mut store, case_id, &create_test_technician()).unwrap();
    assert!(tech.can_advance.is_allowed());
    assert!(!tech.can_save_cost.is_allowed());
}

#[test]
fn test_every_action_bumps_the_version() {
    let mut store: Persistence = create_test_persistence();
    let case_id: i64 = create_case_at_solution(&mut store).case_id;
    let before: u64 = reload(&mut store, case_id).version;

    submit_cost(&mut store, case_id, 80.0);

    assert_eq!(reload(&mut store, case_id).version, before + 1);
}
