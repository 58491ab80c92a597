// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::case::NewCase;
use crate::error::DomainError;
use time::Date;
use time::macros::format_description;

/// Parses a planned execution date in `YYYY-MM-DD` form.
///
/// # Arguments
///
/// * `value` - The date string to parse
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the value is not a calendar date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::InvalidDate {
            value: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the date cannot be formatted.
pub fn format_date(date: Date) -> Result<String, DomainError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| DomainError::InvalidDate {
            value: date.to_string(),
            error: e.to_string(),
        })
}

/// Validates the references supplied when registering a case.
///
/// Identifiers are opaque to the workflow but must be positive when present.
///
/// # Errors
///
/// Returns `DomainError::InvariantViolation` naming the offending reference.
pub fn validate_new_case(new_case: &NewCase) -> Result<(), DomainError> {
    let references: [(&str, Option<i64>); 4] = [
        ("client_id", new_case.client_id),
        ("site_id", new_case.site_id),
        ("contact_id", new_case.contact_id),
        ("assigned_to", new_case.assigned_to),
    ];
    for (name, value) in references {
        if let Some(id) = value
            && id <= 0
        {
            return Err(DomainError::InvariantViolation(format!(
                "{name} must be a positive id (got {id})"
            )));
        }
    }
    Ok(())
}
