// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Files attached to a case, grouped by the stage they were uploaded to.

use crate::error::DomainError;
use crate::types::{AttachmentType, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file stored against a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Case-local identifier, allocated in upload order.
    pub attachment_id: i64,
    /// Original file name.
    pub filename: String,
    /// Where the file content lives.
    pub url: String,
    /// The stage the file belongs to.
    pub stage: Stage,
    /// Photo/document or cost support.
    pub attachment_type: AttachmentType,
    /// The user who uploaded the file.
    pub uploaded_by: Option<i64>,
}

/// A file about to be attached. The id is allocated on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttachment {
    /// Original file name.
    pub filename: String,
    /// Where the file content lives.
    pub url: String,
}

impl NewAttachment {
    /// Creates a new attachment description.
    ///
    /// # Errors
    ///
    /// Returns an error if either the file name or the location is blank.
    pub fn new(filename: &str, url: &str) -> Result<Self, DomainError> {
        let filename: &str = filename.trim();
        let url: &str = url.trim();
        if filename.is_empty() {
            return Err(DomainError::InvalidAttachmentFile(String::from(
                "file name cannot be empty",
            )));
        }
        if url.is_empty() {
            return Err(DomainError::InvalidAttachmentFile(format!(
                "'{filename}' has no location"
            )));
        }
        Ok(Self {
            filename: filename.to_string(),
            url: url.to_string(),
        })
    }
}

/// Every attachment on a case, keyed by stage.
///
/// Ids are never reused within a case, even after a delete or a redo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageAttachments {
    by_stage: BTreeMap<Stage, Vec<Attachment>>,
    next_id: i64,
}

impl StageAttachments {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_stage: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Rebuilds the set from stored rows.
    ///
    /// Rows are grouped by stage and kept in id order. The next id continues
    /// after the largest stored id unless `next_id` is already past it.
    #[must_use]
    pub fn from_attachments(attachments: Vec<Attachment>, next_id: i64) -> Self {
        let mut by_stage: BTreeMap<Stage, Vec<Attachment>> = BTreeMap::new();
        let mut highest: i64 = 0;
        for attachment in attachments {
            highest = highest.max(attachment.attachment_id);
            by_stage.entry(attachment.stage).or_default().push(attachment);
        }
        for list in by_stage.values_mut() {
            list.sort_by_key(|a| a.attachment_id);
        }
        Self {
            by_stage,
            next_id: next_id.max(highest + 1).max(1),
        }
    }

    /// The id the next upload will receive.
    #[must_use]
    pub const fn next_id(&self) -> i64 {
        self.next_id
    }

    /// Appends files to a stage and returns the stored attachments.
    pub fn add(
        &mut self,
        stage: Stage,
        files: Vec<NewAttachment>,
        attachment_type: AttachmentType,
        uploaded_by: Option<i64>,
    ) -> Vec<Attachment> {
        if self.next_id < 1 {
            self.next_id = 1;
        }
        let mut stored: Vec<Attachment> = Vec::with_capacity(files.len());
        for file in files {
            let attachment: Attachment = Attachment {
                attachment_id: self.next_id,
                filename: file.filename,
                url: file.url,
                stage,
                attachment_type,
                uploaded_by,
            };
            self.next_id += 1;
            stored.push(attachment);
        }
        self.by_stage
            .entry(stage)
            .or_default()
            .extend(stored.iter().cloned());
        stored
    }

    /// Finds an attachment by id.
    #[must_use]
    pub fn find(&self, attachment_id: i64) -> Option<&Attachment> {
        self.by_stage
            .values()
            .flatten()
            .find(|a| a.attachment_id == attachment_id)
    }

    /// Removes an attachment by id and returns it.
    pub fn remove(&mut self, attachment_id: i64) -> Option<Attachment> {
        for list in self.by_stage.values_mut() {
            if let Some(pos) = list.iter().position(|a| a.attachment_id == attachment_id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    /// Returns a stage's attachments in upload order.
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> &[Attachment] {
        self.by_stage.get(&stage).map_or(&[], Vec::as_slice)
    }

    /// Drops every attachment of a stage.
    pub fn clear_stage(&mut self, stage: Stage) {
        self.by_stage.remove(&stage);
    }

    /// Splits the solution stage into cost support and general files.
    #[must_use]
    pub fn split_solution(&self) -> (Vec<&Attachment>, Vec<&Attachment>) {
        self.for_stage(Stage::SolutionPlan)
            .iter()
            .partition(|a| a.attachment_type == AttachmentType::Cost)
    }

    /// Iterates over every attachment, stage by stage.
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.by_stage.values().flatten()
    }

    /// Total number of attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_stage.values().map(Vec::len).sum()
    }

    /// Returns true if no attachments exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
