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

//! # Entry Transcoder Module
//!
//! Converts one stored entry row into one ordered output record, and
//! derives the matching header. The column sequence is a compatibility
//! contract with existing consumers: identity/linkage columns, the two
//! timestamps, `created_by` on private projects, `title`, then the
//! mapped answers in resolver order with the location expansion.
//!
//! Header and rows walk the resolved map through the same helpers, so a
//! header always lines up with every row written under it.

use serde_json::{Map, Value};

use crate::answers::{
    join_multi_csv, location_column_names, parse_answer, EnAnswerContext, EnParsedValue,
    LOCATION_JSON_KEYS,
};
use crate::datetime::storage_to_iso;
use crate::project::{EnInput, EnProject};
use crate::record::{parse_branch_counts, EnEntryPayload, EnEntryRow};
use crate::resolve::EnResolvedMap;
use crate::store::EnMediaUrlResolver;

/// Reserved identity/metadata column names.
pub const COL_ENTRY_UUID: &str = "ec5_uuid";
pub const COL_PARENT_UUID: &str = "ec5_parent_uuid";
pub const COL_BRANCH_OWNER_UUID: &str = "ec5_branch_owner_uuid";
pub const COL_BRANCH_UUID: &str = "ec5_branch_uuid";
pub const COL_CREATED_AT: &str = "created_at";
pub const COL_UPLOADED_AT: &str = "uploaded_at";
pub const COL_CREATED_BY: &str = "created_by";
pub const COL_TITLE: &str = "title";

/// `created_by` value when no email can be resolved.
pub const CREATED_BY_FALLBACK: &str = "n/a";

/// Output file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnOutputFormat {
    Csv,
    Json,
}

impl EnOutputFormat {
    /// File extension, also used in artifact names.
    pub fn ext(&self) -> &'static str {
        match self {
            EnOutputFormat::Csv => "csv",
            EnOutputFormat::Json => "json",
        }
    }
}

/// Whether a file holds form entries or branch entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnEntryKind {
    Form,
    Branch,
}

/// An ordered output record: one (column name, value) pair per cell.
pub type EnOutputRecord = Vec<(String, Value)>;

/// Everything fixed across the rows of one output file.
pub struct EnTranscodeContext<'a> {
    pub project: &'a EnProject,
    pub resolved: &'a EnResolvedMap<'a>,
    pub form_ref: &'a str,
    pub kind: EnEntryKind,
    pub format: EnOutputFormat,
    pub media: &'a dyn EnMediaUrlResolver,
}

impl<'a> EnTranscodeContext<'a> {
    /// The top-of-hierarchy form omits the parent linkage column.
    fn is_top_form(&self) -> bool {
        self.form_ref == self.project.first_form_ref()
    }
}

/// Builds the column header for one output file.
pub fn build_header(ctx: &EnTranscodeContext<'_>) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    match ctx.kind {
        EnEntryKind::Branch => {
            header.push(COL_BRANCH_OWNER_UUID.to_string());
            header.push(COL_BRANCH_UUID.to_string());
        }
        EnEntryKind::Form => {
            header.push(COL_ENTRY_UUID.to_string());
            if !ctx.is_top_form() {
                header.push(COL_PARENT_UUID.to_string());
            }
        }
    }
    header.push(COL_CREATED_AT.to_string());
    header.push(COL_UPLOADED_AT.to_string());
    if ctx.project.is_private() {
        header.push(COL_CREATED_BY.to_string());
    }
    header.push(COL_TITLE.to_string());

    for input in &ctx.resolved.inputs {
        if input.input_type.is_structural() {
            continue;
        }
        if let Some(key) = ctx.resolved.rule_for(&input.input_ref).map_key() {
            header.extend(input_column_names(input, key, ctx.format));
        }
    }
    header
}

/// Converts one entry row into an output record.
///
/// `created_by` is only consulted on private projects. Returns `None`
/// for unparseable entry documents; the caller logs/counts and moves on.
pub fn transcode_entry(
    row: &EnEntryRow,
    created_by: &str,
    ctx: &EnTranscodeContext<'_>,
) -> Option<EnOutputRecord> {
    let payload = match EnEntryPayload::from_json(&row.entry_data) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("skipping unparseable entry: {}", e);
            return None;
        }
    };
    let body = match payload.body() {
        Ok(body) => body,
        Err(e) => {
            log::warn!("skipping entry without body: {}", e);
            return None;
        }
    };

    let mut record: EnOutputRecord = Vec::new();
    match ctx.kind {
        EnEntryKind::Branch => {
            record.push((
                COL_BRANCH_OWNER_UUID.to_string(),
                Value::String(payload.relationships.owner_entry_uuid().to_string()),
            ));
            record.push((
                COL_BRANCH_UUID.to_string(),
                Value::String(body.entry_uuid.clone()),
            ));
        }
        EnEntryKind::Form => {
            record.push((
                COL_ENTRY_UUID.to_string(),
                Value::String(body.entry_uuid.clone()),
            ));
            if !ctx.is_top_form() {
                record.push((
                    COL_PARENT_UUID.to_string(),
                    Value::String(payload.relationships.parent_entry_uuid().to_string()),
                ));
            }
        }
    }
    record.push((
        COL_CREATED_AT.to_string(),
        Value::String(body.created_at.clone()),
    ));
    record.push((
        COL_UPLOADED_AT.to_string(),
        Value::String(storage_to_iso(&row.uploaded_at)),
    ));
    if ctx.project.is_private() {
        record.push((
            COL_CREATED_BY.to_string(),
            Value::String(created_by.to_string()),
        ));
    }
    record.push((COL_TITLE.to_string(), Value::String(row.title.clone())));

    let branch_counts = parse_branch_counts(row.branch_counts.as_deref());
    let answer_ctx = EnAnswerContext {
        project_slug: &ctx.project.slug,
        is_private: ctx.project.is_private(),
        media: ctx.media,
        branch_counts: &branch_counts,
    };

    for input in &ctx.resolved.inputs {
        if input.input_type.is_structural() {
            continue;
        }
        let rule = ctx.resolved.rule_for(&input.input_ref);
        let key = match rule.map_key() {
            Some(key) => key.to_string(),
            None => continue,
        };
        let answer = body.answer(&input.input_ref);
        let entry_map = ctx.resolved.entry_for(&input.input_ref);
        let parsed = parse_answer(input, &answer, &entry_map, &answer_ctx);
        append_parsed(&mut record, input, &key, parsed, ctx.format);
    }

    Some(record)
}

/// Column names one input contributes, in emission order.
fn input_column_names(input: &EnInput, key: &str, format: EnOutputFormat) -> Vec<String> {
    if input.input_type == crate::project::EnInputType::Location
        && format == EnOutputFormat::Csv
    {
        location_column_names(key).to_vec()
    } else {
        vec![key.to_string()]
    }
}

/// Appends one parsed answer under the same names `input_column_names`
/// yields for the input.
fn append_parsed(
    record: &mut EnOutputRecord,
    input: &EnInput,
    key: &str,
    parsed: EnParsedValue,
    format: EnOutputFormat,
) {
    match parsed {
        EnParsedValue::Scalar(value) => record.push((key.to_string(), blank(value))),
        EnParsedValue::List(labels) => match format {
            EnOutputFormat::Csv => {
                record.push((key.to_string(), Value::String(join_multi_csv(&labels))))
            }
            EnOutputFormat::Json => record.push((
                key.to_string(),
                Value::Array(labels.into_iter().map(Value::String).collect()),
            )),
        },
        EnParsedValue::Location(parts) => match format {
            EnOutputFormat::Csv => {
                let names = input_column_names(input, key, format);
                for (name, value) in names.into_iter().zip(parts.values()) {
                    record.push((name, blank(value)));
                }
            }
            EnOutputFormat::Json => {
                let mut object = Map::new();
                for (name, value) in LOCATION_JSON_KEYS.iter().zip(parts.values()) {
                    object.insert((*name).to_string(), blank(value));
                }
                record.push((key.to_string(), Value::Object(object)));
            }
        },
    }
}

/// Absent values export as empty strings, not nulls.
fn blank(value: Value) -> Value {
    if value.is_null() {
        Value::String(String::new())
    } else {
        value
    }
}

/// Renders one output value as a CSV cell.
pub fn csv_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
