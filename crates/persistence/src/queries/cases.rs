// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Case lookups.

use casetrack_domain::{Case, CaseStatus};
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;
use tracing::debug;

use crate::data_models::{AttachmentRecord, CaseRecord};
use crate::diesel_schema::{case_attachments, cases};
use crate::error::PersistenceError;

/// Loads the attachment rows of one case in id order.
fn load_attachments(
    conn: &mut SqliteConnection,
    case_id: i64,
) -> Result<Vec<AttachmentRecord>, PersistenceError> {
    Ok(case_attachments::table
        .filter(case_attachments::case_id.eq(case_id))
        .order(case_attachments::attachment_id.asc())
        .select(AttachmentRecord::as_select())
        .load(conn)?)
}

/// Loads a case with its attachments.
///
/// # Errors
///
/// Returns `PersistenceError::CaseNotFound` if no such case exists, or
/// `PersistenceError::CorruptRecord` if the stored row is invalid.
pub fn get_case(conn: &mut SqliteConnection, case_id: i64) -> Result<Case, PersistenceError> {
    let record: CaseRecord = cases::table
        .find(case_id)
        .select(CaseRecord::as_select())
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::CaseNotFound(case_id))?;
    let attachments: Vec<AttachmentRecord> = load_attachments(conn, case_id)?;
    debug!(case_id, attachments = attachments.len(), "Loaded case");
    record.into_case(attachments)
}

/// Lists cases in id order, optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn list_cases(
    conn: &mut SqliteConnection,
    status: Option<CaseStatus>,
) -> Result<Vec<Case>, PersistenceError> {
    let mut query = cases::table
        .order(cases::case_id.asc())
        .select(CaseRecord::as_select())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(cases::status.eq(status.as_str()));
    }
    let records: Vec<CaseRecord> = query.load(conn)?;

    let ids: Vec<i64> = records.iter().map(|r| r.case_id).collect();
    let mut attachments_by_case: BTreeMap<i64, Vec<AttachmentRecord>> = BTreeMap::new();
    let rows: Vec<AttachmentRecord> = case_attachments::table
        .filter(case_attachments::case_id.eq_any(ids))
        .order((
            case_attachments::case_id.asc(),
            case_attachments::attachment_id.asc(),
        ))
        .select(AttachmentRecord::as_select())
        .load(conn)?;
    for row in rows {
        attachments_by_case.entry(row.case_id).or_default().push(row);
    }

    records
        .into_iter()
        .map(|record| {
            let attachments: Vec<AttachmentRecord> = attachments_by_case
                .remove(&record.case_id)
                .unwrap_or_default();
            record.into_case(attachments)
        })
        .collect()
}

/// Returns the id the next registered case will receive.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn next_case_id(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    let highest: Option<i64> = cases::table
        .select(diesel::dsl::max(cases::case_id))
        .first(conn)?;
    Ok(highest.unwrap_or(0) + 1)
}

/// Returns the stored version of a case.
///
/// # Errors
///
/// Returns `PersistenceError::CaseNotFound` if no such case exists.
pub fn stored_version(conn: &mut SqliteConnection, case_id: i64) -> Result<u64, PersistenceError> {
    let version: i64 = cases::table
        .find(case_id)
        .select(cases::version)
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::CaseNotFound(case_id))?;
    version
        .to_u64()
        .ok_or_else(|| PersistenceError::CorruptRecord {
            case_id,
            reason: format!("version column holds {version}"),
        })
}
