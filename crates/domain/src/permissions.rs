// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Who may do what on which stage.
//!
//! Permission is decided in two steps. The capability table says what a
//! role may ever do on a stage; the state rules then narrow that down using
//! the case's status, current stage, and assignee.

use crate::case::Case;
use crate::types::{Role, Stage};

/// The caller's identity as seen by the permission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionContext {
    /// The caller's role.
    pub role: Role,
    /// The caller's user id.
    pub current_user_id: i64,
}

impl PermissionContext {
    /// Creates a permission context.
    #[must_use]
    pub const fn new(role: Role, current_user_id: i64) -> Self {
        Self {
            role,
            current_user_id,
        }
    }
}

/// What a role may do on a stage, before state is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCapability {
    /// Nothing.
    None,
    /// Edit the stage's content.
    Edit,
    /// Review the stage's costs.
    Approve,
}

/// The declarative stage × role table.
#[must_use]
pub const fn capability_for(stage: Stage, role: Role) -> StageCapability {
    match (stage, role) {
        (Stage::Assignment | Stage::Closing, Role::CustomerService)
        | (Stage::Investigation | Stage::SolutionPlan | Stage::Execution, Role::Technician) => {
            StageCapability::Edit
        }
        (Stage::SolutionPlan | Stage::Closing, Role::Leader) => StageCapability::Approve,
        _ => StageCapability::None,
    }
}

/// The technician working the current stage of an assigned case.
fn is_assigned_technician_at(stage: Stage, case: &Case, ctx: &PermissionContext) -> bool {
    case.current_stage == stage && case.assigned_to == Some(ctx.current_user_id)
}

/// Customer service may touch a rejected solution stage, to cancel only.
fn cs_rejected_cost_fallback(case: &Case, ctx: &PermissionContext) -> bool {
    ctx.role == Role::CustomerService
        && case.current_stage == Stage::SolutionPlan
        && case.solution.cost.is_rejected()
}

/// Returns true if the caller may edit content on `stage`, excluding the
/// customer service cancel fallback.
#[must_use]
pub fn can_edit_content(stage: Stage, case: &Case, ctx: &PermissionContext) -> bool {
    if !case.is_active() {
        return false;
    }
    if capability_for(stage, ctx.role) != StageCapability::Edit {
        return false;
    }
    match stage {
        Stage::Assignment | Stage::Closing => true,
        Stage::Investigation | Stage::Execution => is_assigned_technician_at(stage, case, ctx),
        // Any technician, once the case has reached the solution stage.
        Stage::SolutionPlan => case.current_stage >= Stage::SolutionPlan,
    }
}

/// Returns true if the caller may act on `stage`.
///
/// This is [`can_edit_content`] plus the customer service right to act on
/// a rejected solution stage, which authorises cancelling only.
#[must_use]
pub fn can_edit(stage: Stage, case: &Case, ctx: &PermissionContext) -> bool {
    if can_edit_content(stage, case, ctx) {
        return true;
    }
    stage == Stage::SolutionPlan && case.is_active() && cs_rejected_cost_fallback(case, ctx)
}

/// Returns true if the caller may cancel the case.
#[must_use]
pub fn can_cancel(case: &Case, ctx: &PermissionContext) -> bool {
    case.is_active() && cs_rejected_cost_fallback(case, ctx)
}

/// Returns true if the caller may approve or reject costs on `stage`.
#[must_use]
pub fn can_approve(stage: Stage, case: &Case, ctx: &PermissionContext) -> bool {
    case.is_active() && capability_for(stage, ctx.role) == StageCapability::Approve
}
