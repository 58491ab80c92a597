// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for CaseTrack.
//!
//! Cases are stored in `SQLite` through Diesel: one row per case in `cases`
//! and one row per file in `case_attachments`. Checklists are stored as
//! JSON arrays of booleans in TEXT columns.
//!
//! ## Versioning
//!
//! Every row carries a `version`. A new case is stored at version 1 and
//! each save bumps it by one, but only if the caller's expected version
//! still matches. A mismatch is reported as
//! [`PersistenceError::VersionConflict`] and nothing is written.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

use casetrack::TransitionResult;
use casetrack_domain::{Case, CaseStatus};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{AttachmentRecord, CaseRecord};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for cases and their attachments.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Returns the id the next registered case will receive.
    ///
    /// Callers must hold exclusive access to the store between this call
    /// and [`Self::create_case`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_case_id(&mut self) -> Result<i64, PersistenceError> {
        queries::next_case_id(&mut self.conn)
    }

    /// Stores a newly registered case.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or case number already exists or the
    /// write fails.
    pub fn create_case(&mut self, case: &Case) -> Result<Case, PersistenceError> {
        mutations::insert_case(&mut self.conn, case)
    }

    /// Loads a case with its attachments.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CaseNotFound` if the case does not exist.
    pub fn get_case(&mut self, case_id: i64) -> Result<Case, PersistenceError> {
        queries::get_case(&mut self.conn, case_id)
    }

    /// Lists cases, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is invalid.
    pub fn list_cases(&mut self, status: Option<CaseStatus>) -> Result<Vec<Case>, PersistenceError> {
        queries::list_cases(&mut self.conn, status)
    }

    /// Saves a case, guarded by the version the caller loaded.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::VersionConflict` if the stored version has
    /// moved on, or `PersistenceError::CaseNotFound` if the case is gone.
    pub fn save_case(
        &mut self,
        case: &Case,
        expected_version: u64,
    ) -> Result<Case, PersistenceError> {
        mutations::save_case(&mut self.conn, case, expected_version)
    }

    /// Persists the case produced by a transition.
    ///
    /// The engine never touches the version, so the new case still carries
    /// the version it was loaded at.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<Case, PersistenceError> {
        debug!(
            case_id = result.new_case.case_id,
            action = %result.audit_event.action.name,
            "Persisting transition"
        );
        self.save_case(&result.new_case, result.new_case.version)
    }

    /// Returns the stored version of a case.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CaseNotFound` if the case does not exist.
    pub fn stored_version(&mut self, case_id: i64) -> Result<u64, PersistenceError> {
        queries::stored_version(&mut self.conn, case_id)
    }
}
