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

//! # Entrada Core Library
//!
//! Entrada is the entry-mapping and export engine for mobile/web
//! data-collection projects. It takes raw, schema-less JSON entry records
//! (with nested answers, branches, and groups) and transforms them, row by
//! row, into flat CSV or JSON output according to a user-configurable
//! field mapping — handling coordinate conversion, multi-value questions,
//! media URL resolution, and privacy-sensitive field suppression along
//! the way.
//!
//! ## Module Overview
//!
//! - **project**: project schema (forms, inputs) and mapping configuration
//! - **record**: entry rows and the serde model of entry documents
//! - **geo**: WGS84 latitude/longitude to UTM projection
//! - **datetime**: display-format token table and timestamp conversion
//! - **resolve**: mapping resolution (map selection, group flattening)
//! - **answers**: type-directed answer serialization
//! - **transcode**: entry-to-record transcoding and header building
//! - **store**: collaborator traits (entry store, media URLs, user emails)
//! - **export**: streaming file writer, archive assembler, export job
//! - **errors**: the canonical error enumeration
//!
//! ## Quick Start
//!
//! ```rust
//! use entrada::{EnExporter, EnExportParams, EnOutputFormat};
//!
//! let exporter = EnExporter::new(&store, &media, &users);
//! let params = EnExportParams::new(EnOutputFormat::Csv);
//! let ok = exporter.export(&project, &mapping, &params, out_dir);
//! ```
//!
//! ## Architecture
//!
//! One export request is synchronous, single-threaded, and forward-only:
//! forms are processed sequentially, entries are read in bounded chunks,
//! and each output file is written once under an exclusive lock before
//! everything is packaged into a single zip artifact.
//!
//! ## Error Handling
//!
//! Internal operations return `Result<T, EnError>`. Row-level problems
//! degrade (skipped rows, empty values); everything else folds into the
//! boolean result of `export()`.

pub mod answers;
pub mod datetime;
pub mod errors;
pub mod export;
pub mod geo;
pub mod project;
pub mod record;
pub mod resolve;
pub mod store;
pub mod transcode;

pub use errors::{EnError, Result};
pub use geo::{utm_from_lonlat, EnUtm};
pub use project::{
    slugify, EnAccess, EnColumnRule, EnForm, EnFormMap, EnInput, EnInputMap, EnInputType,
    EnMapDefinition, EnMediaType, EnProject, EnProjectMapping,
};
pub use record::{parse_branch_counts, EnBranchCounts, EnEntryPayload, EnEntryRow};
pub use resolve::{resolve, EnResolvedMap, EnResolvedRule};
pub use answers::{
    join_multi_csv, location_column_names, parse_answer, EnAnswerContext, EnLocationParts,
    EnParsedValue,
};
pub use transcode::{
    build_header, transcode_entry, EnEntryKind, EnOutputFormat, EnOutputRecord,
    EnTranscodeContext,
};
pub use store::{
    EnApiMediaUrls, EnChunkVisitor, EnEntryFilters, EnEntryStore, EnMediaUrlResolver,
    EnMemoryStore, EnSortOrder, EnStaticEmails, EnUserEmailResolver,
};
pub use export::{assemble, EnExportParams, EnExportStats, EnExporter, EnStreamWriter};
