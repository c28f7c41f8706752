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

//! # Data Export Module
//!
//! This module provides the export side of the pipeline: the streaming
//! per-file writer, the archive assembler, and the export job that ties
//! them together behind the single `export()` entry point.

pub mod archive;
pub mod job;
pub mod writer;

pub use archive::assemble;
pub use job::{EnExportParams, EnExporter};
pub use writer::{EnExportStats, EnStreamWriter};
