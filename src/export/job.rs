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

//! # Export Job Module
//!
//! The single public entry point of the pipeline. One export request
//! walks the project's forms sequentially, writes one file per form and
//! one per branch input into a request-scoped directory (cleared up
//! front), and hands the results to the archive assembler.
//!
//! The boolean contract: every internal failure is caught here, logged,
//! and folded into `false`. Nothing panics or escapes to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::export::archive::assemble;
use crate::export::writer::{EnExportStats, EnStreamWriter};
use crate::project::{slugify, EnProject, EnProjectMapping};
use crate::resolve::resolve;
use crate::store::{EnEntryFilters, EnEntryStore, EnMediaUrlResolver, EnSortOrder, EnUserEmailResolver};
use crate::transcode::{EnEntryKind, EnOutputFormat, EnTranscodeContext};

/// Parameters of one export request.
#[derive(Clone, Debug)]
pub struct EnExportParams {
    pub format: EnOutputFormat,
    pub map_index: usize,
    pub sort: EnSortOrder,
}

impl EnExportParams {
    /// Parameters with the default map and sort order.
    pub fn new(format: EnOutputFormat) -> Self {
        EnExportParams {
            format,
            map_index: 0,
            sort: EnSortOrder::default(),
        }
    }

    /// Selects a named map by index.
    pub fn with_map_index(mut self, map_index: usize) -> Self {
        self.map_index = map_index;
        self
    }

    /// Overrides the read sort order.
    pub fn with_sort(mut self, sort: EnSortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Drives a complete export of one project.
pub struct EnExporter<'a> {
    store: &'a dyn EnEntryStore,
    media: &'a dyn EnMediaUrlResolver,
    users: &'a dyn EnUserEmailResolver,
    chunk_size: usize,
}

impl<'a> EnExporter<'a> {
    pub fn new(
        store: &'a dyn EnEntryStore,
        media: &'a dyn EnMediaUrlResolver,
        users: &'a dyn EnUserEmailResolver,
    ) -> Self {
        EnExporter {
            store,
            media,
            users,
            chunk_size: 1000,
        }
    }

    /// Overrides the rows-per-chunk bound.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Exports a project into `out_dir`, producing the
    /// `<slug>-<format>.zip` artifact there. Failures are logged and
    /// reported as `false`; no partial archive is left behind.
    pub fn export(
        &self,
        project: &EnProject,
        mapping: &EnProjectMapping,
        params: &EnExportParams,
        out_dir: &Path,
    ) -> bool {
        match self.run(project, mapping, params, out_dir) {
            Ok(archive) => {
                log::info!("export of '{}' complete: {}", project.slug, archive.display());
                true
            }
            Err(e) => {
                log::error!("export of '{}' failed: {}", project.slug, e);
                false
            }
        }
    }

    /// Fallible export pipeline; `export()` is the boolean wrapper.
    pub fn run(
        &self,
        project: &EnProject,
        mapping: &EnProjectMapping,
        params: &EnExportParams,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        // The directory is request-scoped: start from a clean slate so a
        // retry can never archive a previous attempt's files.
        if out_dir.exists() {
            fs::remove_dir_all(out_dir)?;
        }
        fs::create_dir_all(out_dir)?;

        let writer = EnStreamWriter::new(self.store, self.users)
            .with_chunk_size(self.chunk_size)
            .with_filters(EnEntryFilters { sort: params.sort });

        let mut stats = EnExportStats::default();
        let mut branch_counter = 0usize;

        for (index, form) in project.forms.iter().enumerate() {
            let resolved = resolve(mapping, project, &form.form_ref, None, params.map_index)?;
            let ctx = EnTranscodeContext {
                project,
                resolved: &resolved,
                form_ref: &form.form_ref,
                kind: EnEntryKind::Form,
                format: params.format,
                media: self.media,
            };
            let form_slug = display_slug(&form.slug, &form.name, &form.form_ref);
            let path = out_dir.join(format!(
                "form-{}__{}.{}",
                index + 1,
                form_slug,
                params.format.ext()
            ));
            writer.write_file(&ctx, None, &path, &mut stats)?;

            for branch_input in form.branch_inputs() {
                branch_counter += 1;
                let resolved = resolve(
                    mapping,
                    project,
                    &form.form_ref,
                    Some(branch_input.input_ref.as_str()),
                    params.map_index,
                )?;
                let ctx = EnTranscodeContext {
                    project,
                    resolved: &resolved,
                    form_ref: &form.form_ref,
                    kind: EnEntryKind::Branch,
                    format: params.format,
                    media: self.media,
                };
                let branch_slug = display_slug(
                    "",
                    &branch_input.question,
                    &branch_input.input_ref,
                );
                let path = out_dir.join(format!(
                    "branch-{}__{}.{}",
                    branch_counter,
                    branch_slug,
                    params.format.ext()
                ));
                writer.write_file(&ctx, Some(branch_input.input_ref.as_str()), &path, &mut stats)?;
            }
        }

        log::info!(
            "transcoded {} rows ({} skipped) into {} files",
            stats.rows_written,
            stats.rows_skipped,
            stats.files_created
        );
        assemble(out_dir, &project.slug, params.format)
    }
}

/// File-name slug with fallbacks: stored slug, then slugified display
/// name, then the ref itself.
fn display_slug(slug: &str, name: &str, fallback_ref: &str) -> String {
    if !slug.is_empty() {
        return slug.to_string();
    }
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    slugify(fallback_ref)
}
