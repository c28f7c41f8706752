//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Entrada.
//! The Entrada project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Entry Record Module
//!
//! This module provides the data structures for entry records as the
//! export pipeline reads them: the relational row shape returned by the
//! entry store, and the serde model of the schema-less JSON document each
//! row carries.
//!
//! ## Design Principles
//!
//! - **Flexibility**: Answer values stay `serde_json::Value` — entries are
//!   collected by heterogeneous clients and carry no fixed schema
//! - **Tolerance**: Every payload field defaults when absent; a malformed
//!   document degrades to a skipped row, never an aborted export
//! - **Immutability**: Entries are read-only during export; nothing here
//!   mutates stored data

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{EnError, Result};

/// Payload `type` marker for top-level form entries.
pub const KIND_ENTRY: &str = "entry";
/// Payload `type` marker for branch entries.
pub const KIND_BRANCH_ENTRY: &str = "branch_entry";

/// One row as returned by the entry store: the relational columns kept
/// outside the JSON document, plus the raw document itself.
#[derive(Clone, Debug)]
pub struct EnEntryRow {
    /// Denormalized entry title.
    pub title: String,
    /// Raw entry JSON document.
    pub entry_data: String,
    /// Raw JSON map of branch input ref to stored branch-entry count.
    pub branch_counts: Option<String>,
    /// Identifier of the collecting user, when known.
    pub user_id: Option<u64>,
    /// Storage-format upload timestamp.
    pub uploaded_at: String,
}

impl EnEntryRow {
    /// Constructs a row from its title, raw document, and upload time.
    pub fn new(
        title: impl Into<String>,
        entry_data: impl Into<String>,
        uploaded_at: impl Into<String>,
    ) -> Self {
        EnEntryRow {
            title: title.into(),
            entry_data: entry_data.into(),
            branch_counts: None,
            user_id: None,
            uploaded_at: uploaded_at.into(),
        }
    }

    /// Attaches a raw branch-counts JSON map.
    pub fn with_branch_counts(mut self, counts: impl Into<String>) -> Self {
        self.branch_counts = Some(counts.into());
        self
    }

    /// Attaches the collecting user's identifier.
    pub fn with_user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// The body common to form entries and branch entries. Answer slots stay
/// untyped: clients write bookkeeping keys next to `answer` (jump state
/// and the like), and only the answer itself matters for export.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnEntryBody {
    #[serde(default)]
    pub entry_uuid: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

impl EnEntryBody {
    /// Returns the stored answer for an input ref, or `Null` when the
    /// slot is absent or malformed.
    pub fn answer(&self, input_ref: &str) -> Value {
        match self.answers.get(input_ref) {
            Some(slot) => slot.get("answer").cloned().unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnParentData {
    #[serde(default)]
    pub parent_entry_uuid: String,
    #[serde(default)]
    pub parent_form_ref: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnBranchData {
    #[serde(default)]
    pub owner_entry_uuid: String,
    #[serde(default)]
    pub owner_input_ref: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct EnRelation<T> {
    #[serde(default)]
    data: Option<T>,
}

/// Linkage of an entry to its parent entry (hierarchy forms) or owning
/// entry (branch entries).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnRelationships {
    #[serde(default)]
    parent: EnRelation<EnParentData>,
    #[serde(default)]
    branch: EnRelation<EnBranchData>,
}

impl EnRelationships {
    /// Parent entry uuid for hierarchy entries, when linked.
    pub fn parent_entry_uuid(&self) -> &str {
        self.parent
            .data
            .as_ref()
            .map(|d| d.parent_entry_uuid.as_str())
            .unwrap_or("")
    }

    /// Owning entry uuid for branch entries, when linked.
    pub fn owner_entry_uuid(&self) -> &str {
        self.branch
            .data
            .as_ref()
            .map(|d| d.owner_entry_uuid.as_str())
            .unwrap_or("")
    }
}

/// Parsed entry document. The `type` marker selects which of the two body
/// keys is populated.
#[derive(Clone, Debug, Deserialize)]
pub struct EnEntryPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    entry: Option<EnEntryBody>,
    #[serde(default)]
    branch_entry: Option<EnEntryBody>,
    #[serde(default)]
    pub relationships: EnRelationships,
}

impl EnEntryPayload {
    /// Parses a raw entry document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let payload: EnEntryPayload = serde_json::from_str(raw)?;
        Ok(payload)
    }

    /// Returns the body selected by the `type` marker.
    pub fn body(&self) -> Result<&EnEntryBody> {
        let body = if self.kind == KIND_BRANCH_ENTRY {
            self.branch_entry.as_ref()
        } else {
            self.entry.as_ref()
        };
        body.ok_or_else(|| {
            EnError::schema(format!("entry document has no '{}' body", self.kind))
        })
    }
}

/// Per-entry counts of stored branch entries, keyed by branch input ref.
pub type EnBranchCounts = HashMap<String, u64>;

/// Parses the raw branch-counts column. Absent or malformed maps degrade
/// to empty (branch columns then report zero).
pub fn parse_branch_counts(raw: Option<&str>) -> EnBranchCounts {
    match raw {
        Some(text) if !text.is_empty() => match serde_json::from_str(text) {
            Ok(counts) => counts,
            Err(e) => {
                log::debug!("unparseable branch counts: {}", e);
                EnBranchCounts::new()
            }
        },
        _ => EnBranchCounts::new(),
    }
}
