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

//! # Archive Assembler Module
//!
//! Packages the per-form and per-branch output files into the single
//! downloadable `<slug>-<format>.zip` artifact. Source files are only
//! deleted after the archive is fully written, so a failed assembly
//! leaves everything in place for inspection.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{EnError, Result};
use crate::transcode::EnOutputFormat;

/// Collects every `*.<format>` file in `out_dir` into one deflated zip
/// archive and removes the originals.
pub fn assemble(out_dir: &Path, project_slug: &str, format: EnOutputFormat) -> Result<PathBuf> {
    let sources = list_sources(out_dir, format)?;
    if sources.is_empty() {
        return Err(EnError::export("archive", "no output files to archive"));
    }

    let archive_path = out_dir.join(format!("{}-{}.zip", project_slug, format.ext()));
    let file = File::create(&archive_path)?;
    let mut archive = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for source in &sources {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EnError::export("archive", "output file has no name"))?;
        archive.start_file(name, options)?;
        let mut reader = File::open(source)?;
        io::copy(&mut reader, &mut archive)?;
    }
    archive.finish()?;

    for source in &sources {
        fs::remove_file(source)?;
    }
    log::info!(
        "archived {} files into {}",
        sources.len(),
        archive_path.display()
    );
    Ok(archive_path)
}

/// Output files of the given format, in name order so re-exports produce
/// identical archives.
fn list_sources(out_dir: &Path, format: EnOutputFormat) -> Result<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e == format.ext())
                .unwrap_or(false)
        })
        .collect();
    sources.sort();
    Ok(sources)
}
