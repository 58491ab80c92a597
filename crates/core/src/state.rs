// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use casetrack_audit::AuditEvent;
use casetrack_domain::Case;

/// The result of a successful transition.
///
/// Transitions never mutate the input case; the caller persists `new_case`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The case after the transition.
    pub new_case: Case,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
