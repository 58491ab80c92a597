// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-length stage checklists and their storage codec.
//!
//! In memory a checklist is a typed `[bool; N]` whose length is fixed per
//! stage. At the store boundary it is a JSON array string such as
//! `"[true,false,false]"`. Decoding is lenient: empty, malformed, or
//! wrong-length input yields the all-false checklist of the stage's length.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of items on the investigation (stage 2) checklist.
pub const INVESTIGATION_ITEMS: usize = 6;
/// Number of items on the solution (stage 3) checklist.
pub const SOLUTION_ITEMS: usize = 5;
/// Number of items on the execution (stage 4) checklist.
pub const EXECUTION_ITEMS: usize = 6;

/// Errors produced by strict checklist decoding and item updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    /// The stored text is not a JSON array of booleans.
    #[error("malformed checklist: {0}")]
    Malformed(String),
    /// The decoded sequence has the wrong number of items.
    #[error("checklist has {actual} items, expected {expected}")]
    WrongLength {
        /// The stage's fixed item count.
        expected: usize,
        /// The number of items found.
        actual: usize,
    },
    /// An item index past the end of the checklist.
    #[error("checklist item {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The checklist length.
        len: usize,
    },
}

/// A checklist with exactly `N` boolean items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checklist<const N: usize> {
    items: [bool; N],
}

/// Stage 2 checklist.
pub type InvestigationChecklist = Checklist<INVESTIGATION_ITEMS>;
/// Stage 3 checklist.
pub type SolutionChecklist = Checklist<SOLUTION_ITEMS>;
/// Stage 4 checklist.
pub type ExecutionChecklist = Checklist<EXECUTION_ITEMS>;

impl<const N: usize> Checklist<N> {
    /// The fixed item count.
    pub const LEN: usize = N;

    /// Creates a checklist from its items.
    #[must_use]
    pub const fn new(items: [bool; N]) -> Self {
        Self { items }
    }

    /// Creates a checklist with every item unchecked.
    #[must_use]
    pub const fn unchecked() -> Self {
        Self { items: [false; N] }
    }

    /// Returns the items in order.
    #[must_use]
    pub const fn items(&self) -> &[bool; N] {
        &self.items
    }

    /// Returns whether the item at `index` is checked.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.items.get(index).copied()
    }

    /// Checks or unchecks the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::IndexOutOfRange` if `index >= N`.
    pub fn set(&mut self, index: usize, checked: bool) -> Result<(), ChecklistError> {
        let slot: &mut bool = self
            .items
            .get_mut(index)
            .ok_or(ChecklistError::IndexOutOfRange { index, len: N })?;
        *slot = checked;
        Ok(())
    }

    /// Returns the number of checked items.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|checked| **checked).count()
    }

    /// Returns true if every item is checked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|checked| *checked)
    }

    /// Encodes the checklist into its stored form.
    #[must_use]
    pub fn encode(&self) -> String {
        let body: Vec<&str> = self
            .items
            .iter()
            .map(|checked| if *checked { "true" } else { "false" })
            .collect();
        format!("[{}]", body.join(","))
    }

    /// Decodes a stored checklist, rejecting anything that is not an array
    /// of exactly `N` booleans.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::Malformed` or `ChecklistError::WrongLength`.
    pub fn try_decode(raw: &str) -> Result<Self, ChecklistError> {
        let values: Vec<bool> =
            serde_json::from_str(raw).map_err(|e| ChecklistError::Malformed(e.to_string()))?;
        Self::try_from(values)
    }

    /// Decodes a stored checklist, falling back to the unchecked checklist
    /// for empty, malformed, or wrong-length input.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::unchecked();
        }
        Self::try_decode(raw).unwrap_or_else(|_| Self::unchecked())
    }

    /// Decodes an optional stored checklist (`NULL` columns decode unchecked).
    #[must_use]
    pub fn decode_optional(raw: Option<&str>) -> Self {
        raw.map_or_else(Self::unchecked, Self::decode)
    }
}

impl<const N: usize> Default for Checklist<N> {
    fn default() -> Self {
        Self::unchecked()
    }
}

impl<const N: usize> TryFrom<Vec<bool>> for Checklist<N> {
    type Error = ChecklistError;

    fn try_from(values: Vec<bool>) -> Result<Self, Self::Error> {
        let actual: usize = values.len();
        let items: [bool; N] = values
            .try_into()
            .map_err(|_| ChecklistError::WrongLength {
                expected: N,
                actual,
            })?;
        Ok(Self { items })
    }
}

impl<const N: usize> Serialize for Checklist<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, const N: usize> Deserialize<'de> for Checklist<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<bool> = Vec::deserialize(deserializer)?;
        Self::try_from(values).map_err(serde::de::Error::custom)
    }
}
