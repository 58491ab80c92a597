// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AssignmentChanges, CaseChanges, Command, CoreError, InvestigationChanges, TransitionResult,
    apply, open_case,
};
use casetrack_audit::{Actor, Cause};
use casetrack_domain::{
    AssignmentDetails, Case, CaseNumber, NewCase, PermissionContext, Role, Stage,
};

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

pub const fn other_tech() -> PermissionContext {
    PermissionContext::new(Role::Technician, OTHER_TECH_USER)
}

pub const fn leader() -> PermissionContext {
    PermissionContext::new(Role::Leader, LEADER_USER)
}

pub fn create_test_actor(ctx: &PermissionContext) -> Actor {
    Actor::new(
        format!("user-{}", ctx.current_user_id),
        ctx.role.as_str().to_string(),
    )
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Workflow request"))
}

pub fn create_test_new_case() -> NewCase {
    NewCase {
        client_id: Some(100),
        site_id: Some(200),
        contact_id: Some(300),
        assigned_to: None,
        assignment: AssignmentDetails {
            case_type: Some(String::from("warranty")),
            priority: Some(String::from("high")),
            description: Some(String::from("Recliner mechanism jammed")),
        },
    }
}

pub fn try_apply(case: &Case, command: Command, ctx: &PermissionContext) -> Result<Case, CoreError> {
    apply(case, command, ctx, create_test_actor(ctx), create_test_cause())
        .map(|result: TransitionResult| result.new_case)
}

pub fn apply_ok(case: &Case, command: Command, ctx: &PermissionContext) -> Case {
    try_apply(case, command, ctx).unwrap()
}

pub fn create_test_case() -> Case {
    open_case(
        1,
        CaseNumber::generate(2026, 1),
        create_test_new_case(),
        &cs(),
        create_test_actor(&cs()),
        create_test_cause(),
    )
    .unwrap()
    .new_case
}

pub fn assign_changes(technician: i64) -> CaseChanges {
    let new_case: NewCase = create_test_new_case();
    CaseChanges {
        assignment: Some(AssignmentChanges {
            client_id: new_case.client_id,
            site_id: new_case.site_id,
            contact_id: new_case.contact_id,
            assigned_to: Some(technician),
            case_type: new_case.assignment.case_type,
            priority: new_case.assignment.priority,
            description: new_case.assignment.description,
        }),
        ..CaseChanges::default()
    }
}

pub fn advance(case: &Case, ctx: &PermissionContext) -> Case {
    apply_ok(
        case,
        Command::AdvanceStage {
            from_stage: case.current_stage,
        },
        ctx,
    )
}

/// A case assigned to `TECH_USER` and walked to the solution stage.
pub fn create_case_at_solution() -> Case {
    let case: Case = create_test_case();
    let case: Case = apply_ok(
        &case,
        Command::UpdateCase {
            changes: assign_changes(TECH_USER),
        },
        &cs(),
    );
    let case: Case = advance(&case, &cs());
    let case: Case = apply_ok(
        &case,
        Command::UpdateCase {
            changes: CaseChanges {
                investigation: Some(InvestigationChanges {
                    report: Some(String::from("Spring broken")),
                    ..InvestigationChanges::default()
                }),
                ..CaseChanges::default()
            },
        },
        &tech(),
    );
    let case: Case = advance(&case, &tech());
    assert_eq!(case.current_stage, Stage::SolutionPlan);
    case
}

pub fn save_cost(amount: f64) -> Command {
    Command::SaveCost {
        required: true,
        estimated_cost: Some(amount),
        description: Some(String::from("Replacement mechanism")),
    }
}

/// A solution-stage case whose estimate of `amount` was approved.
pub fn create_case_with_approved_cost(amount: f64) -> Case {
    let case: Case = apply_ok(&create_case_at_solution(), save_cost(amount), &tech());
    apply_ok(&case, Command::ApproveCost, &leader())
}

/// A case at the closing stage with an approved estimate of `amount`.
pub fn create_case_at_closing(amount: f64) -> Case {
    let case: Case = create_case_with_approved_cost(amount);
    let case: Case = advance(&case, &tech());
    let case: Case = advance(&case, &tech());
    assert_eq!(case.current_stage, Stage::Closing);
    case
}

/// A case at the closing stage that never needed a cost.
pub fn create_case_at_closing_without_cost() -> Case {
    let case: Case = advance(&create_case_at_solution(), &tech());
    advance(&case, &tech())
}
