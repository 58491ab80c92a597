// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use casetrack_domain::{Case, CaseStatus, Stage};

/// Represents the person performing an action on a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The actor's role (e.g., "cs", "technician", "leader").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The actor's role
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the request that triggered an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The workflow action that was performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`AdvanceStage`", "`ApproveCost`").
    pub name: String,
    /// Optional additional details, such as a rejection reason.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The workflow-relevant state of a case at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// The case's stage.
    pub stage: Stage,
    /// The case's status.
    pub status: CaseStatus,
    /// The attempt counter.
    pub attempt_number: u32,
    /// A compact rendering of the rest of the workflow state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(stage: Stage, status: CaseStatus, attempt_number: u32, data: String) -> Self {
        Self {
            stage,
            status,
            attempt_number,
            data,
        }
    }

    /// Captures the workflow state of a case.
    #[must_use]
    pub fn of(case: &Case) -> Self {
        Self::new(
            case.current_stage,
            case.status,
            case.attempt_number,
            case.summary(),
        )
    }
}

/// Identifies the case an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRef {
    /// Store identifier.
    pub case_id: i64,
    /// Human-facing case number.
    pub case_number: String,
}

impl CaseRef {
    /// Creates a reference to a case.
    #[must_use]
    pub fn of(case: &Case) -> Self {
        Self {
            case_id: case.case_id,
            case_number: case.case_number.value().to_string(),
        }
    }
}

/// An immutable audit event representing one case transition.
///
/// Every successful workflow command produces exactly one audit event
/// capturing who acted, why, what they did, and the case state on either
/// side of the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The case that changed.
    pub case: CaseRef,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    #[must_use]
    pub const fn new(
        case: CaseRef,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            case,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Creates an event for a transition from `before` to `after`.
    #[must_use]
    pub fn for_transition(
        before: &Case,
        after: &Case,
        actor: Actor,
        cause: Cause,
        action: Action,
    ) -> Self {
        Self::new(
            CaseRef::of(after),
            actor,
            cause,
            action,
            StateSnapshot::of(before),
            StateSnapshot::of(after),
        )
    }

    /// Returns true if the transition moved the case to another stage.
    #[must_use]
    pub fn changed_stage(&self) -> bool {
        self.before.stage != self.after.stage
    }
}
