// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use casetrack_audit::Cause;
use casetrack_domain::Role;
use casetrack_persistence::Persistence;

use crate::{
    AdvanceStageRequest, AssignmentForm, AuthenticatedActor, CaseInfo, CaseResponse,
    CreateCaseRequest, InvestigationForm, SaveCostRequest, UpdateCaseRequest, advance_stage,
    approve_cost, create_case, get_case, save_cost, update_case,
};

pub const CS_USER: i64 = 1;
pub const TECH_USER: i64 = 7;
pub const OTHER_TECH_USER: i64 = 8;
pub const LEADER_USER: i64 = 9;

pub fn create_test_cs() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("cs-1"), CS_USER, Role::CustomerService)
}

pub fn create_test_technician() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("tech-7"), TECH_USER, Role::Technician)
}

pub fn create_test_other_technician() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("tech-8"), OTHER_TECH_USER, Role::Technician)
}

pub fn create_test_leader() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("leader-9"), LEADER_USER, Role::Leader)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_valid_request() -> CreateCaseRequest {
    CreateCaseRequest {
        assignment: AssignmentForm {
            client_id: Some(100),
            site_id: Some(200),
            contact_id: Some(300),
            assigned_to: Some(TECH_USER),
            case_type: Some(String::from("warranty")),
            priority: Some(String::from("high")),
            description: Some(String::from("Armrest loose")),
        },
    }
}

/// Registers a case assigned to [`TECH_USER`].
pub fn create_registered_case(store: &mut Persistence) -> CaseInfo {
    create_case(
        store,
        create_valid_request(),
        &create_test_cs(),
        create_test_cause(),
    )
    .unwrap()
    .case
}

pub fn advance_from(
    store: &mut Persistence,
    case_id: i64,
    from_stage: u8,
    actor: &AuthenticatedActor,
) -> CaseInfo {
    advance_stage(
        store,
        case_id,
        AdvanceStageRequest { from_stage },
        actor,
        create_test_cause(),
    )
    .unwrap()
    .case
}

/// Registers a case and walks it to the solution stage.
pub fn create_case_at_solution(store: &mut Persistence) -> CaseInfo {
    let case_id: i64 = create_registered_case(store).case_id;
    advance_from(store, case_id, 1, &create_test_cs());
    let request: UpdateCaseRequest = UpdateCaseRequest {
        investigation: Some(InvestigationForm {
            report: Some(String::from("Frame bolt sheared")),
            checklist: vec![true, true, false, false, false, false],
        }),
        ..UpdateCaseRequest::default()
    };
    update_case(
        store,
        case_id,
        request,
        &create_test_technician(),
        create_test_cause(),
    )
    .unwrap();
    advance_from(store, case_id, 2, &create_test_technician())
}

pub fn submit_cost(store: &mut Persistence, case_id: i64, amount: f64) -> CaseResponse {
    save_cost(
        store,
        case_id,
        SaveCostRequest {
            required: true,
            estimated_cost: Some(amount),
            description: Some(String::from("Replacement frame")),
        },
        &create_test_technician(),
        create_test_cause(),
    )
    .unwrap()
}

/// Walks a case to the closing stage with an approved estimate of `estimate`.
pub fn create_case_at_closing_with_estimate(store: &mut Persistence, estimate: f64) -> CaseInfo {
    let case_id: i64 = create_case_at_solution(store).case_id;
    submit_cost(store, case_id, estimate);
    approve_cost(store, case_id, &create_test_leader(), create_test_cause()).unwrap();
    advance_from(store, case_id, 3, &create_test_technician());
    advance_from(store, case_id, 4, &create_test_technician())
}

pub fn reload(store: &mut Persistence, case_id: i64) -> CaseInfo {
    get_case(store, case_id, &create_test_cs()).unwrap().case
}
