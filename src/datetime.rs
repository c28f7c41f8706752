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

//! # Datetime Formatting Module
//!
//! Date and time answers are stored as ISO timestamps but exported in the
//! display format the question was configured with. The display formats
//! form a small closed set, translated here through a fixed token table.
//!
//! Storage timestamps (`uploaded_at`) arrive in the database format and
//! are converted to the same ISO-with-milliseconds representation entry
//! payloads use, so both timestamp columns read consistently.

use chrono::NaiveDateTime;

/// ISO representation used inside entry payloads.
const ISO_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
/// Database timestamp representation.
const STORAGE: &str = "%Y-%m-%d %H:%M:%S";

/// Translates a configured display format into a chrono format string.
///
/// Unknown formats yield `None`; the caller degrades the value to an
/// empty string.
pub fn strftime_pattern(display_format: &str) -> Option<&'static str> {
    match display_format {
        "dd/MM/YYYY" => Some("%d/%m/%Y"),
        "MM/dd/YYYY" => Some("%m/%d/%Y"),
        "YYYY/MM/dd" => Some("%Y/%m/%d"),
        "MM/YYYY" => Some("%m/%Y"),
        "dd/MM" => Some("%d/%m"),
        "HH:mm:ss" => Some("%H:%M:%S"),
        "hh:mm:ss" => Some("%I:%M:%S"),
        "HH:mm" => Some("%H:%M"),
        "mm:ss" => Some("%M:%S"),
        _ => None,
    }
}

/// Parses a stored ISO answer timestamp, with or without milliseconds or
/// the trailing `Z`.
fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.fZ")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Reformats a stored date/time answer into its configured display format.
///
/// Empty answers, unknown display formats, and unparseable stored values
/// all yield an empty string.
pub fn format_datetime_answer(raw: &str, display_format: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let pattern = match strftime_pattern(display_format) {
        Some(p) => p,
        None => {
            log::debug!("unknown datetime display format '{}'", display_format);
            return String::new();
        }
    };
    match parse_iso(raw) {
        Some(dt) => dt.format(pattern).to_string(),
        None => {
            log::debug!("unparseable datetime answer '{}'", raw);
            String::new()
        }
    }
}

/// Converts a storage timestamp to the ISO-with-milliseconds form used in
/// entry payloads. Values already in ISO form are normalized; anything
/// unparseable passes through verbatim rather than losing data.
pub fn storage_to_iso(raw: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, STORAGE) {
        return dt.format(ISO_MILLIS).to_string();
    }
    if let Some(dt) = parse_iso(raw) {
        return dt.format(ISO_MILLIS).to_string();
    }
    log::debug!("unparseable storage timestamp '{}'", raw);
    raw.to_string()
}
