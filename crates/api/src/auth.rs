// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication types.
//!
//! Identity is taken from the request as-is. The only check performed here
//! is that the caller named themselves and a role the workflow knows about.

use casetrack_audit::Actor;
use casetrack_domain::{PermissionContext, Role};

use crate::error::AuthError;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor, as recorded in audit events.
    pub id: String,
    /// The workflow user id, compared against `assigned_to`.
    pub user_id: i64,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `user_id` - The workflow user id
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, user_id: i64, role: Role) -> Self {
        Self { id, user_id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }

    /// The identity the permission rules evaluate.
    #[must_use]
    pub const fn permission_context(&self) -> PermissionContext {
        PermissionContext::new(self.role, self.user_id)
    }
}

/// Stub authentication function.
///
/// Real credential checks are out of scope; this only validates the
/// shape of the claimed identity.
///
/// # Arguments
///
/// * `actor_id` - The identifier of the actor to authenticate
/// * `user_id` - The workflow user id
/// * `role` - The claimed role (`cs`, `technician`, or `leader`)
///
/// # Errors
///
/// Returns an error if the actor id is empty, the user id is not positive,
/// or the role is unknown.
pub fn authenticate_stub(
    actor_id: String,
    user_id: i64,
    role: &str,
) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    if user_id <= 0 {
        return Err(AuthError::AuthenticationFailed {
            reason: format!("User id must be positive (got {user_id})"),
        });
    }
    let role: Role = role
        .parse()
        .map_err(|_| AuthError::AuthenticationFailed {
            reason: format!("Unknown role '{role}'. Must be 'cs', 'technician' or 'leader'"),
        })?;
    Ok(AuthenticatedActor::new(actor_id, user_id, role))
}
