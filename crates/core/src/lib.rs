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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod attachments;
mod command;
mod cost;
mod error;
mod final_cost;
mod state;
mod transition;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, open_case};
pub use command::{
    AssignmentChanges, CaseChanges, ClosingChanges, Command, ExecutionChanges,
    InvestigationChanges, SolutionChanges,
};
pub use error::CoreError;
pub use final_cost::ensure_closable;
pub use state::TransitionResult;
