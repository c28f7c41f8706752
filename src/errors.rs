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

//! # Entrada Error Module
//!
//! This module defines the error types and utilities used throughout the
//! Entrada engine for consistent error handling and reporting.
//!
//! ## Error Handling Philosophy
//!
//! Entrada uses a structured error approach with the following principles:
//!
//! - **Explicit Error Types**: Each error variant represents a specific
//!   category of failure, making it easier to handle errors appropriately
//! - **Context-Rich**: Errors include relevant context (export stage names,
//!   detailed messages) to aid debugging
//! - **Contained**: Nothing escapes the public `export()` contract — parse
//!   failures degrade to skipped rows or empty values, and everything else
//!   folds into a single success/failure result
//! - **Serde Support**: Errors can be serialized/deserialized for logging
//!   and persistence
//!
//! ## Error Categories
//!
//! - **Io**: Filesystem errors (locks, directories, writes)
//! - **Schema**: Malformed project definitions or entry payloads
//! - **Validation**: Invalid parameters or inputs
//! - **Mapping**: Unresolvable mapping configurations
//! - **Export**: Failures while driving the export pipeline
//! - **Serde**: Serialization/deserialization errors
//! - **Zip**: ZIP archive operation errors
//! - **Internal**: Unexpected internal failures

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;

/// Convenience result type used throughout Entrada.
pub type Result<T> = std::result::Result<T, EnError>;

/// Canonical error enumeration for Entrada.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum EnError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Errors caused by malformed project definitions or entry payloads.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Errors raised while resolving a mapping configuration.
    #[error("mapping error: {message}")]
    Mapping { message: String },

    /// Failures that occur while driving the export pipeline.
    #[error("export error at stage '{stage}': {message}")]
    Export { stage: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors originating from ZIP file operations.
    #[error("zip error: {0}")]
    Zip(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for EnError {
    fn from(err: io::Error) -> Self {
        EnError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EnError {
    fn from(err: serde_json::Error) -> Self {
        EnError::Serde(err.to_string())
    }
}

impl From<ZipError> for EnError {
    fn from(err: ZipError) -> Self {
        EnError::Zip(err.to_string())
    }
}

impl From<csv::Error> for EnError {
    fn from(err: csv::Error) -> Self {
        EnError::Io(err.to_string())
    }
}

impl EnError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        EnError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        EnError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct mapping errors.
    pub fn mapping<T: Into<String>>(message: T) -> Self {
        EnError::Mapping {
            message: message.into(),
        }
    }

    /// Helper to construct export errors.
    pub fn export(stage: impl Into<String>, message: impl Into<String>) -> Self {
        EnError::Export {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        EnError::Internal(message.into())
    }
}
