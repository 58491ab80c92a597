// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use casetrack::{
    AssignmentChanges, CaseChanges, Command, InvestigationChanges, TransitionResult, apply,
    open_case,
};
use casetrack_audit::{Actor, Cause};
use casetrack_domain::{AssignmentDetails, Case, CaseNumber, NewCase, PermissionContext, Role};

pub const CS_USER: i64 = 1;
pub const TECH_USER: i64 = 7;
pub const OTHER_TECH_USER: i64 = 8;
pub const LEADER_USER: i64 = 9;

pub const fn cs() -> PermissionContext {
    PermissionContext::new(Role::CustomerService, CS_USER)
}

pub const fn tech() -> PermissionContext {
    PermissionContext::new(Role::Technician, TECH_USER)
}

pub const fn leader() -> PermissionContext {
    PermissionContext::new(Role::Leader, LEADER_USER)
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_actor(ctx: &PermissionContext) -> Actor {
    Actor::new(
        format!("user-{}", ctx.current_user_id),
        ctx.role.as_str().to_string(),
    )
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-789"), String::from("Persistence test"))
}

pub fn create_test_new_case() -> NewCase {
    NewCase {
        client_id: Some(100),
        site_id: Some(200),
        contact_id: Some(300),
        assigned_to: Some(TECH_USER),
        assignment: AssignmentDetails {
            case_type: Some(String::from("warranty")),
            priority: Some(String::from("normal")),
            description: Some(String::from("Sofa leg cracked")),
        },
    }
}

/// Registers a case with the next free id and stores it.
pub fn create_stored_case(persistence: &mut Persistence) -> Case {
    let case_id: i64 = persistence.next_case_id().unwrap();
    let result: TransitionResult = open_case(
        case_id,
        CaseNumber::generate(2026, case_id),
        create_test_new_case(),
        &cs(),
        create_test_actor(&cs()),
        create_test_cause(),
    )
    .unwrap();
    persistence.create_case(&result.new_case).unwrap()
}

/// Applies a command to the stored case and saves the result.
pub fn apply_and_save(
    persistence: &mut Persistence,
    case_id: i64,
    command: Command,
    ctx: &PermissionContext,
) -> Case {
    let case: Case = persistence.get_case(case_id).unwrap();
    let result: TransitionResult = apply(
        &case,
        command,
        ctx,
        create_test_actor(ctx),
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap()
}

pub fn advance_stored(persistence: &mut Persistence, case_id: i64, ctx: &PermissionContext) -> Case {
    let case: Case = persistence.get_case(case_id).unwrap();
    apply_and_save(
        persistence,
        case_id,
        Command::AdvanceStage {
            from_stage: case.current_stage,
        },
        ctx,
    )
}

/// A stored case walked to the solution stage.
pub fn create_stored_case_at_solution(persistence: &mut Persistence) -> Case {
    let case: Case = create_stored_case(persistence);
    let case_id: i64 = case.case_id;
    advance_stored(persistence, case_id, &cs());
    apply_and_save(
        persistence,
        case_id,
        Command::UpdateCase {
            changes: CaseChanges {
                investigation: Some(InvestigationChanges {
                    report: Some(String::from("Joint glue failed")),
                    ..InvestigationChanges::default()
                }),
                ..CaseChanges::default()
            },
        },
        &tech(),
    );
    advance_stored(persistence, case_id, &tech())
}

pub fn reassign_changes(technician: i64) -> CaseChanges {
    CaseChanges {
        assignment: Some(AssignmentChanges {
            client_id: Some(100),
            site_id: Some(200),
            contact_id: Some(300),
            assigned_to: Some(technician),
            case_type: Some(String::from("warranty")),
            priority: Some(String::from("urgent")),
            description: Some(String::from("Sofa leg cracked")),
        }),
        ..CaseChanges::default()
    }
}
