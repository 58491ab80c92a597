// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case writes.
//!
//! A case row and its attachment rows are always written in one
//! transaction. Attachment rows are replaced wholesale on every save.

use casetrack_domain::Case;
use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::data_models::{AttachmentRecord, CaseRecord};
use crate::diesel_schema::{case_attachments, cases};
use crate::error::PersistenceError;
use crate::queries;

/// Current time as an RFC 3339 timestamp.
fn timestamp() -> Result<String, PersistenceError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn write_attachments(conn: &mut SqliteConnection, case: &Case) -> Result<(), PersistenceError> {
    diesel::delete(case_attachments::table.filter(case_attachments::case_id.eq(case.case_id)))
        .execute(conn)?;
    let rows: Vec<AttachmentRecord> = case
        .attachments
        .iter()
        .map(|a| AttachmentRecord::from_attachment(case.case_id, a))
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(case_attachments::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts a newly registered case at version 1.
///
/// Returns the case as stored, with its version and timestamps set.
///
/// # Errors
///
/// Returns an error if the id or case number is already taken or the
/// write fails.
pub fn insert_case(conn: &mut SqliteConnection, case: &Case) -> Result<Case, PersistenceError> {
    let now: String = timestamp()?;
    let record: CaseRecord = CaseRecord::from_case(case, 1, now.clone(), now.clone())?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(cases::table)
            .values(&record)
            .execute(conn)?;
        write_attachments(conn, case)
    })?;

    info!(case_id = case.case_id, case_number = %case.case_number, "Inserted case");

    let mut stored: Case = case.clone();
    stored.version = 1;
    stored.created_at = Some(now.clone());
    stored.updated_at = Some(now);
    Ok(stored)
}

/// Saves a case if its stored version still equals `expected_version`.
///
/// The stored version is incremented. Returns the case as stored.
///
/// # Errors
///
/// Returns `PersistenceError::VersionConflict` if another save happened
/// first, or `PersistenceError::CaseNotFound` if the case does not exist.
pub fn save_case(
    conn: &mut SqliteConnection,
    case: &Case,
    expected_version: u64,
) -> Result<Case, PersistenceError> {
    let now: String = timestamp()?;
    let new_version: u64 = expected_version + 1;
    let created_at: String = case.created_at.clone().unwrap_or_else(|| now.clone());
    let record: CaseRecord = CaseRecord::from_case(case, new_version, created_at, now.clone())?;
    let expected: i64 = record.version - 1;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            cases::table
                .filter(cases::case_id.eq(case.case_id))
                .filter(cases::version.eq(expected)),
        )
        .set(&record)
        .execute(conn)?;

        if updated == 0 {
            let actual: u64 = queries::stored_version(conn, case.case_id)?;
            return Err(PersistenceError::VersionConflict {
                case_id: case.case_id,
                expected: expected_version,
                actual,
            });
        }
        write_attachments(conn, case)
    })?;

    debug!(case_id = case.case_id, version = new_version, "Saved case");

    let mut stored: Case = case.clone();
    stored.version = new_version;
    stored.updated_at = Some(now);
    if stored.created_at.is_none() {
        stored.created_at = Some(record.created_at);
    }
    Ok(stored)
}
