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

//! # Collaborator Interfaces Module
//!
//! Seams between the export core and its surroundings: the entry store
//! (counted, chunked, forward-only reads), the media URL builder, and
//! the user email lookup. The exporter only ever sees these traits, so
//! any persistence layer can sit behind them.
//!
//! Reference implementations ship alongside the traits: an in-memory
//! store and static resolvers, used by the integration tests and by
//! embedders that already hold their data in memory.

use std::collections::HashMap;

use crate::errors::Result;
use crate::project::EnMediaType;
use crate::record::EnEntryRow;

/// Sort order applied to entry reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnSortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Read filters passed through to the entry store.
#[derive(Clone, Debug, Default)]
pub struct EnEntryFilters {
    pub sort: EnSortOrder,
}

/// Visitor invoked once per chunk of rows.
pub type EnChunkVisitor<'a> = &'a mut dyn FnMut(&[EnEntryRow]) -> Result<()>;

/// Chunked, forward-only read access to stored entries.
///
/// `count_*` runs before the matching `read_*` so the writer can report
/// progress and stream correct JSON without buffering; both must observe
/// the same data set within one export.
pub trait EnEntryStore {
    /// Number of entries collected against a form.
    fn count_entries(&self, project_id: u64, form_ref: &str) -> Result<usize>;

    /// Visits a form's entries in chunks of at most `chunk_size` rows.
    fn read_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        filters: &EnEntryFilters,
        chunk_size: usize,
        visit: EnChunkVisitor<'_>,
    ) -> Result<()>;

    /// Number of branch entries collected against one branch input.
    fn count_branch_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        branch_ref: &str,
    ) -> Result<usize>;

    /// Visits a branch input's entries in chunks of at most `chunk_size`
    /// rows.
    fn read_branch_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        branch_ref: &str,
        filters: &EnEntryFilters,
        chunk_size: usize,
        visit: EnChunkVisitor<'_>,
    ) -> Result<()>;
}

/// Builds client-reachable URLs for stored media files.
pub trait EnMediaUrlResolver {
    fn build_url(
        &self,
        project_slug: &str,
        media_type: EnMediaType,
        format: &str,
        filename: &str,
    ) -> String;
}

/// Resolves collecting users to email addresses for the `created_by`
/// column.
pub trait EnUserEmailResolver {
    fn resolve_email(&self, user_id: u64) -> Option<String>;
}

/// Media URL resolver targeting the platform's internal media endpoint.
#[derive(Clone, Debug)]
pub struct EnApiMediaUrls {
    base_url: String,
}

impl EnApiMediaUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        EnApiMediaUrls { base_url }
    }
}

impl EnMediaUrlResolver for EnApiMediaUrls {
    fn build_url(
        &self,
        project_slug: &str,
        media_type: EnMediaType,
        format: &str,
        filename: &str,
    ) -> String {
        format!(
            "{}/api/internal/media/{}?type={}&format={}&name={}",
            self.base_url,
            project_slug,
            media_type.as_str(),
            format,
            filename
        )
    }
}

/// Email resolver over a fixed user table.
#[derive(Clone, Debug, Default)]
pub struct EnStaticEmails {
    emails: HashMap<u64, String>,
}

impl EnStaticEmails {
    pub fn new(emails: impl IntoIterator<Item = (u64, String)>) -> Self {
        EnStaticEmails {
            emails: emails.into_iter().collect(),
        }
    }
}

impl EnUserEmailResolver for EnStaticEmails {
    fn resolve_email(&self, user_id: u64) -> Option<String> {
        self.emails.get(&user_id).cloned()
    }
}

/// In-memory entry store keyed the same way the relational store is.
#[derive(Debug, Default)]
pub struct EnMemoryStore {
    entries: HashMap<(u64, String), Vec<EnEntryRow>>,
    branch_entries: HashMap<(u64, String, String), Vec<EnEntryRow>>,
}

impl EnMemoryStore {
    pub fn new() -> Self {
        EnMemoryStore::default()
    }

    /// Adds a form entry row.
    pub fn add_entry(&mut self, project_id: u64, form_ref: impl Into<String>, row: EnEntryRow) {
        self.entries
            .entry((project_id, form_ref.into()))
            .or_default()
            .push(row);
    }

    /// Adds a branch entry row.
    pub fn add_branch_entry(
        &mut self,
        project_id: u64,
        form_ref: impl Into<String>,
        branch_ref: impl Into<String>,
        row: EnEntryRow,
    ) {
        self.branch_entries
            .entry((project_id, form_ref.into(), branch_ref.into()))
            .or_default()
            .push(row);
    }

    fn sorted(rows: &[EnEntryRow], filters: &EnEntryFilters) -> Vec<EnEntryRow> {
        let mut rows = rows.to_vec();
        match filters.sort {
            EnSortOrder::Oldest => rows.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at)),
            EnSortOrder::Newest => rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
        }
        rows
    }

    fn visit_chunked(
        rows: Vec<EnEntryRow>,
        chunk_size: usize,
        visit: EnChunkVisitor<'_>,
    ) -> Result<()> {
        for chunk in rows.chunks(chunk_size.max(1)) {
            visit(chunk)?;
        }
        Ok(())
    }
}

impl EnEntryStore for EnMemoryStore {
    fn count_entries(&self, project_id: u64, form_ref: &str) -> Result<usize> {
        Ok(self
            .entries
            .get(&(project_id, form_ref.to_string()))
            .map(Vec::len)
            .unwrap_or(0))
    }

    fn read_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        filters: &EnEntryFilters,
        chunk_size: usize,
        visit: EnChunkVisitor<'_>,
    ) -> Result<()> {
        let rows = self
            .entries
            .get(&(project_id, form_ref.to_string()))
            .map(|r| Self::sorted(r, filters))
            .unwrap_or_default();
        Self::visit_chunked(rows, chunk_size, visit)
    }

    fn count_branch_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        branch_ref: &str,
    ) -> Result<usize> {
        Ok(self
            .branch_entries
            .get(&(project_id, form_ref.to_string(), branch_ref.to_string()))
            .map(Vec::len)
            .unwrap_or(0))
    }

    fn read_branch_entries(
        &self,
        project_id: u64,
        form_ref: &str,
        branch_ref: &str,
        filters: &EnEntryFilters,
        chunk_size: usize,
        visit: EnChunkVisitor<'_>,
    ) -> Result<()> {
        let rows = self
            .branch_entries
            .get(&(project_id, form_ref.to_string(), branch_ref.to_string()))
            .map(|r| Self::sorted(r, filters))
            .unwrap_or_default();
        Self::visit_chunked(rows, chunk_size, visit)
    }
}
