// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AssignmentDetails, Case, CaseNumber, CaseStatus, NewCase, PermissionContext, Role, Stage,
};

pub const CS_USER: i64 = 1;
pub const TECH_USER: i64 = 7;
pub const OTHER_TECH_USER: i64 = 8;
pub const LEADER_USER: i64 = 9;

pub fn create_test_new_case() -> NewCase {
    NewCase {
        client_id: Some(100),
        site_id: Some(200),
        contact_id: Some(300),
        assigned_to: None,
        assignment: AssignmentDetails {
            case_type: Some(String::from("warranty")),
            priority: Some(String::from("normal")),
            description: Some(String::from("Sofa leg cracked")),
        },
    }
}

pub fn create_test_case() -> Case {
    Case::open(
        1,
        CaseNumber::generate(2026, 1),
        create_test_new_case(),
        CS_USER,
    )
}

/// A case assigned to `TECH_USER` sitting at `stage` with status in progress.
pub fn create_test_case_at(stage: Stage) -> Case {
    let mut case: Case = create_test_case();
    case.assigned_to = Some(TECH_USER);
    case.current_stage = stage;
    if stage > Stage::Assignment {
        case.status = CaseStatus::InProgress;
    }
    case
}

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
