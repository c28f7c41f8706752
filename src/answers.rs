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

//! # Answer Parser Module
//!
//! Type-directed serialization of stored answer values. Each input type
//! has its own representation on device (possible-answer refs, coordinate
//! objects, filenames, ISO timestamps), and each maps to its own export
//! rule. The dispatch is one `match` over the closed [`EnInputType`] set.
//!
//! Parsing never fails: malformed or missing values degrade to empty
//! output so one bad answer cannot take down an export.

use serde_json::{Number, Value};

use crate::datetime::format_datetime_answer;
use crate::geo::{utm_from_lonlat, EnUtm};
use crate::project::{EnInput, EnInputMap, EnInputType};
use crate::record::EnBranchCounts;
use crate::store::EnMediaUrlResolver;

/// JSON keys of the nested location object, in emission order.
pub const LOCATION_JSON_KEYS: [&str; 6] = [
    "latitude",
    "longitude",
    "accuracy",
    "UTM_Northing",
    "UTM_Easting",
    "UTM_Zone",
];

/// CSV column-name prefixes of the location expansion, in emission order.
pub const LOCATION_CSV_PREFIXES: [&str; 6] = [
    "lat_",
    "long_",
    "accuracy_",
    "UTM_Northing_",
    "UTM_Easting_",
    "UTM_Zone_",
];

/// The six CSV column names a location input expands to under a mapped
/// output name.
pub fn location_column_names(map_key: &str) -> [String; 6] {
    LOCATION_CSV_PREFIXES.map(|prefix| format!("{}{}", prefix, map_key))
}

/// The six components of a location answer. Missing coordinates leave
/// everything `Null`/`None` and render as empty values.
#[derive(Clone, Debug, Default)]
pub struct EnLocationParts {
    pub latitude: Value,
    pub longitude: Value,
    pub accuracy: Value,
    pub utm: Option<EnUtm>,
}

impl EnLocationParts {
    /// Components as output values in emission order.
    pub fn values(&self) -> [Value; 6] {
        let (northing, easting, zone) = match &self.utm {
            Some(utm) => (
                Value::Number(utm.northing.into()),
                Value::Number(utm.easting.into()),
                Value::String(utm.zone.clone()),
            ),
            None => (Value::Null, Value::Null, Value::Null),
        };
        [
            self.latitude.clone(),
            self.longitude.clone(),
            self.accuracy.clone(),
            northing,
            easting,
            zone,
        ]
    }
}

/// A parsed answer ready for format-specific rendering.
#[derive(Clone, Debug)]
pub enum EnParsedValue {
    /// One scalar cell.
    Scalar(Value),
    /// Resolved multi-choice labels (joined for CSV, kept as a list for
    /// JSON).
    List(Vec<String>),
    /// The six-way location expansion.
    Location(EnLocationParts),
}

/// Everything the parser needs from the surrounding export.
pub struct EnAnswerContext<'a> {
    pub project_slug: &'a str,
    pub is_private: bool,
    pub media: &'a dyn EnMediaUrlResolver,
    pub branch_counts: &'a EnBranchCounts,
}

/// Serializes one stored answer according to its input type and map
/// entry.
pub fn parse_answer(
    input: &EnInput,
    answer: &Value,
    entry: &EnInputMap,
    ctx: &EnAnswerContext<'_>,
) -> EnParsedValue {
    match input.input_type {
        t if t.is_single_choice() => {
            let label = answer
                .as_str()
                .map(|r| entry.answer_label(r))
                .unwrap_or("");
            EnParsedValue::Scalar(Value::String(label.to_string()))
        }
        t if t.is_multi_choice() => {
            let labels = match answer.as_array() {
                Some(refs) => refs
                    .iter()
                    .filter_map(|r| r.as_str())
                    .map(|r| entry.answer_label(r))
                    .filter(|label| !label.is_empty())
                    .map(|label| label.to_string())
                    .collect(),
                None => Vec::new(),
            };
            EnParsedValue::List(labels)
        }
        EnInputType::Location => EnParsedValue::Location(parse_location(answer)),
        EnInputType::Branch => {
            let count = ctx.branch_counts.get(&input.input_ref).copied().unwrap_or(0);
            EnParsedValue::Scalar(Value::Number(count.into()))
        }
        EnInputType::Date | EnInputType::Time => {
            let raw = answer.as_str().unwrap_or("");
            let display = input.datetime_format.as_deref().unwrap_or("");
            EnParsedValue::Scalar(Value::String(format_datetime_answer(raw, display)))
        }
        EnInputType::Photo | EnInputType::Audio | EnInputType::Video => {
            parse_media(input.input_type, answer, ctx)
        }
        EnInputType::Integer => EnParsedValue::Scalar(cast_integer(answer)),
        EnInputType::Decimal => EnParsedValue::Scalar(cast_decimal(answer)),
        EnInputType::Group | EnInputType::Readme => EnParsedValue::Scalar(Value::Null),
        _ => EnParsedValue::Scalar(answer.clone()),
    }
}

/// Joins resolved multi-choice labels into one CSV cell, wrapping any
/// label that itself contains a comma in double quotes.
pub fn join_multi_csv(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| {
            if label.contains(',') {
                format!("\"{}\"", label)
            } else {
                label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_media(
    input_type: EnInputType,
    answer: &Value,
    ctx: &EnAnswerContext<'_>,
) -> EnParsedValue {
    let Some(media_type) = input_type.media_type() else {
        return EnParsedValue::Scalar(Value::String(String::new()));
    };
    let filename = answer.as_str().unwrap_or("");
    if filename.is_empty() {
        return EnParsedValue::Scalar(Value::String(String::new()));
    }
    // Private media stays a bare filename; access-controlled URLs are
    // resolved by the importing client.
    if ctx.is_private {
        return EnParsedValue::Scalar(Value::String(filename.to_string()));
    }
    let url = ctx.media.build_url(
        ctx.project_slug,
        media_type,
        media_type.export_format(),
        filename,
    );
    EnParsedValue::Scalar(Value::String(url))
}

fn parse_location(answer: &Value) -> EnLocationParts {
    let latitude = answer.get("latitude").cloned().unwrap_or(Value::Null);
    let longitude = answer.get("longitude").cloned().unwrap_or(Value::Null);
    let (lat, long) = match (coordinate(&latitude), coordinate(&longitude)) {
        (Some(lat), Some(long)) => (lat, long),
        _ => return EnLocationParts::default(),
    };
    EnLocationParts {
        latitude,
        longitude,
        accuracy: answer.get("accuracy").cloned().unwrap_or(Value::Null),
        utm: utm_from_lonlat(long, lat),
    }
}

/// Reads a coordinate stored either as a JSON number or a numeric string.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.is_empty() => s.parse().ok(),
        _ => None,
    }
}

fn cast_integer(answer: &Value) -> Value {
    match answer {
        Value::Number(_) => answer.clone(),
        Value::String(s) if s.is_empty() => Value::String(String::new()),
        Value::String(s) => match s.parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => {
                log::debug!("non-integer answer '{}'", s);
                Value::String(String::new())
            }
        },
        _ => Value::String(String::new()),
    }
}

fn cast_decimal(answer: &Value) -> Value {
    match answer {
        Value::Number(_) => answer.clone(),
        Value::String(s) if s.is_empty() => Value::String(String::new()),
        Value::String(s) => match s.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => {
                log::debug!("non-decimal answer '{}'", s);
                Value::String(String::new())
            }
        },
        _ => Value::String(String::new()),
    }
}
