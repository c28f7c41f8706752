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

//! # Streaming Export Writer Module
//!
//! Writes one output file per form or branch by driving a chunked read
//! from the entry store: header once, then transcode-and-append row by
//! row. Memory use is bounded by the chunk size; nothing is accumulated
//! across chunks.
//!
//! CSV files open with a UTF-8 byte-order mark so spreadsheet imports
//! pick the right encoding. JSON files stream `{"data":[...]}` without
//! ever holding more than one record in memory. Every file is written
//! under an exclusive advisory lock, and a failed row write aborts the
//! file so no half-written output reaches the archive.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::store::{EnEntryFilters, EnEntryStore, EnUserEmailResolver};
use crate::transcode::{
    build_header, csv_cell, transcode_entry, EnOutputFormat, EnOutputRecord, EnTranscodeContext,
    CREATED_BY_FALLBACK,
};

/// UTF-8 byte-order mark prepended to CSV output.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Counters accumulated across the files of one export.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnExportStats {
    /// Rows written across all files.
    pub rows_written: usize,
    /// Rows skipped because the entry document would not parse.
    pub rows_skipped: usize,
    /// Output files created.
    pub files_created: usize,
}

/// Stream writer producing one output file per call.
pub struct EnStreamWriter<'a> {
    store: &'a dyn EnEntryStore,
    users: &'a dyn EnUserEmailResolver,
    filters: EnEntryFilters,
    chunk_size: usize,
}

impl<'a> EnStreamWriter<'a> {
    /// Creates a writer reading through the given store with the default
    /// chunk size.
    pub fn new(store: &'a dyn EnEntryStore, users: &'a dyn EnUserEmailResolver) -> Self {
        EnStreamWriter {
            store,
            users,
            filters: EnEntryFilters::default(),
            chunk_size: 1000,
        }
    }

    /// Overrides the rows-per-chunk bound.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Overrides the read filters.
    pub fn with_filters(mut self, filters: EnEntryFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Writes one output file for a form (`branch_ref` none) or one
    /// branch input of that form.
    pub fn write_file(
        &self,
        ctx: &EnTranscodeContext<'_>,
        branch_ref: Option<&str>,
        path: &Path,
        stats: &mut EnExportStats,
    ) -> Result<()> {
        let project_id = ctx.project.id;
        let total = match branch_ref {
            None => self.store.count_entries(project_id, ctx.form_ref)?,
            Some(branch) => self
                .store
                .count_branch_entries(project_id, ctx.form_ref, branch)?,
        };
        log::info!(
            "writing {} rows to {}",
            total,
            path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        // Exclusive advisory lock for the duration of the write; released
        // when the handle closes.
        file.lock()?;

        // Per-file memo of user id to email, so a thousand rows by the
        // same collector cost one lookup.
        let mut emails: HashMap<u64, String> = HashMap::new();
        let mut created_by = |user_id: Option<u64>| -> String {
            match user_id {
                Some(id) => emails
                    .entry(id)
                    .or_insert_with(|| {
                        self.users
                            .resolve_email(id)
                            .unwrap_or_else(|| CREATED_BY_FALLBACK.to_string())
                    })
                    .clone(),
                None => CREATED_BY_FALLBACK.to_string(),
            }
        };

        match ctx.format {
            EnOutputFormat::Csv => {
                file.write_all(&UTF8_BOM)?;
                let mut writer = csv::Writer::from_writer(BufWriter::new(file));
                writer.write_record(&build_header(ctx))?;
                let mut visit = |chunk: &[crate::record::EnEntryRow]| -> Result<()> {
                    for row in chunk {
                        match transcode_entry(row, &created_by(row.user_id), ctx) {
                            Some(record) => {
                                writer.write_record(
                                    record.iter().map(|(_, value)| csv_cell(value)),
                                )?;
                                stats.rows_written += 1;
                            }
                            None => stats.rows_skipped += 1,
                        }
                    }
                    log::debug!("{} rows transcoded so far", stats.rows_written);
                    Ok(())
                };
                self.read(project_id, ctx.form_ref, branch_ref, &mut visit)?;
                writer.flush()?;
            }
            EnOutputFormat::Json => {
                let mut writer = BufWriter::new(file);
                writer.write_all(b"{\"data\":[")?;
                let mut written = 0usize;
                let mut visit = |chunk: &[crate::record::EnEntryRow]| -> Result<()> {
                    for row in chunk {
                        match transcode_entry(row, &created_by(row.user_id), ctx) {
                            Some(record) => {
                                if written > 0 {
                                    writer.write_all(b",")?;
                                }
                                let json = serde_json::to_string(&to_object(record))?;
                                writer.write_all(json.as_bytes())?;
                                written += 1;
                                stats.rows_written += 1;
                            }
                            None => stats.rows_skipped += 1,
                        }
                    }
                    Ok(())
                };
                self.read(project_id, ctx.form_ref, branch_ref, &mut visit)?;
                writer.write_all(b"]}")?;
                writer.flush()?;
            }
        }

        stats.files_created += 1;
        Ok(())
    }

    fn read(
        &self,
        project_id: u64,
        form_ref: &str,
        branch_ref: Option<&str>,
        visit: &mut dyn FnMut(&[crate::record::EnEntryRow]) -> Result<()>,
    ) -> Result<()> {
        match branch_ref {
            None => self.store.read_entries(
                project_id,
                form_ref,
                &self.filters,
                self.chunk_size,
                visit,
            ),
            Some(branch) => self.store.read_branch_entries(
                project_id,
                form_ref,
                branch,
                &self.filters,
                self.chunk_size,
                visit,
            ),
        }
    }
}

/// Builds the JSON object for one record, keeping column order.
fn to_object(record: EnOutputRecord) -> Value {
    let mut object = Map::with_capacity(record.len());
    for (name, value) in record {
        object.insert(name, value);
    }
    Value::Object(object)
}
