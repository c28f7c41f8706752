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

//! # Entrada Core Tests - Answer Parser
//!
//! Tests for the type-specific answer serialization rules.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test answers
//! ```

use entrada::{
    join_multi_csv, parse_answer, utm_from_lonlat, EnAnswerContext, EnApiMediaUrls,
    EnBranchCounts, EnInput, EnInputMap, EnInputType, EnParsedValue,
};
use serde_json::{json, Value};

fn context<'a>(
    media: &'a EnApiMediaUrls,
    counts: &'a EnBranchCounts,
    is_private: bool,
) -> EnAnswerContext<'a> {
    EnAnswerContext {
        project_slug: "tree-survey",
        is_private,
        media,
        branch_counts: counts,
    }
}

fn scalar(parsed: EnParsedValue) -> Value {
    match parsed {
        EnParsedValue::Scalar(value) => value,
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn radio_resolves_through_possible_answers() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-colour", EnInputType::Radio);
    let entry = EnInputMap::to("colour").with_answer("pa-red", "Red");

    let parsed = parse_answer(&input, &json!("pa-red"), &entry, &ctx);
    assert_eq!(scalar(parsed), json!("Red"));

    let unmapped = parse_answer(&input, &json!("pa-unknown"), &entry, &ctx);
    assert_eq!(scalar(unmapped), json!(""));
}

#[test]
fn checkbox_round_trip() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-tags", EnInputType::Checkbox);
    let entry = EnInputMap::to("tags")
        .with_answer("a_ref", "Red")
        .with_answer("b_ref", "Blue");

    let parsed = parse_answer(&input, &json!(["a_ref", "b_ref"]), &entry, &ctx);
    let labels = match parsed {
        EnParsedValue::List(labels) => labels,
        other => panic!("expected list, got {:?}", other),
    };
    assert_eq!(labels, vec!["Red", "Blue"]);
    assert_eq!(join_multi_csv(&labels), "Red, Blue");
}

#[test]
fn checkbox_with_unmapped_refs_drops_them() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-tags", EnInputType::Searchmultiple);
    let entry = EnInputMap::to("tags").with_answer("a_ref", "Red");

    let parsed = parse_answer(&input, &json!(["a_ref", "gone"]), &entry, &ctx);
    match parsed {
        EnParsedValue::List(labels) => assert_eq!(labels, vec!["Red"]),
        other => panic!("expected list, got {:?}", other),
    }

    let none = parse_answer(&input, &json!(["gone"]), &entry, &ctx);
    match none {
        EnParsedValue::List(labels) => assert!(labels.is_empty()),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn location_expands_to_six_values() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-site", EnInputType::Location);
    let entry = EnInputMap::to("site");

    let answer = json!({"latitude": 10.0, "longitude": 20.0, "accuracy": 5});
    let parsed = parse_answer(&input, &answer, &entry, &ctx);
    let parts = match parsed {
        EnParsedValue::Location(parts) => parts,
        other => panic!("expected location, got {:?}", other),
    };
    let values = parts.values();
    assert_eq!(values.len(), 6);
    assert_eq!(values[0], json!(10.0));
    assert_eq!(values[1], json!(20.0));
    assert_eq!(values[2], json!(5));

    let expected = utm_from_lonlat(20.0, 10.0).unwrap();
    assert_eq!(values[3], json!(expected.northing));
    assert_eq!(values[4], json!(expected.easting));
    assert_eq!(values[5], json!(expected.zone));
}

#[test]
fn location_without_coordinates_is_all_empty() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-site", EnInputType::Location);
    let entry = EnInputMap::to("site");

    for answer in [json!({}), json!({"latitude": 10.0}), json!({"latitude": "", "longitude": ""})] {
        let parsed = parse_answer(&input, &answer, &entry, &ctx);
        match parsed {
            EnParsedValue::Location(parts) => {
                assert!(parts.values().iter().all(|v| v.is_null()));
            }
            other => panic!("expected location, got {:?}", other),
        }
    }
}

#[test]
fn branch_reports_stored_count() {
    let media = EnApiMediaUrls::new("https://example.org");
    let mut counts = EnBranchCounts::new();
    counts.insert("ref-visits".to_string(), 3);
    let ctx = context(&media, &counts, false);
    let input = EnInput::new("ref-visits", EnInputType::Branch);
    let entry = EnInputMap::to("sightings");

    let parsed = parse_answer(&input, &Value::Null, &entry, &ctx);
    assert_eq!(scalar(parsed), json!(3));

    let missing = EnInput::new("ref-other", EnInputType::Branch);
    let parsed = parse_answer(&missing, &Value::Null, &entry, &ctx);
    assert_eq!(scalar(parsed), json!(0));
}

#[test]
fn date_and_time_use_display_format() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);

    let date = EnInput::new("ref-d", EnInputType::Date).with_datetime_format("dd/MM/YYYY");
    let parsed = parse_answer(&date, &json!("2023-05-22T00:00:00.000"), &EnInputMap::to("d"), &ctx);
    assert_eq!(scalar(parsed), json!("22/05/2023"));

    let time = EnInput::new("ref-t", EnInputType::Time).with_datetime_format("HH:mm:ss");
    let parsed = parse_answer(&time, &json!("2023-05-22T14:05:09.000"), &EnInputMap::to("t"), &ctx);
    assert_eq!(scalar(parsed), json!("14:05:09"));

    let parsed = parse_answer(&date, &json!(""), &EnInputMap::to("d"), &ctx);
    assert_eq!(scalar(parsed), json!(""));
}

#[test]
fn public_media_builds_url_private_keeps_filename() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let input = EnInput::new("ref-photo", EnInputType::Photo);
    let entry = EnInputMap::to("photo");

    let public = context(&media, &counts, false);
    let parsed = parse_answer(&input, &json!("shot.jpg"), &entry, &public);
    assert_eq!(
        scalar(parsed),
        json!("https://example.org/api/internal/media/tree-survey?type=photo&format=entry_original&name=shot.jpg")
    );

    let private = context(&media, &counts, true);
    let parsed = parse_answer(&input, &json!("shot.jpg"), &entry, &private);
    assert_eq!(scalar(parsed), json!("shot.jpg"));

    let parsed = parse_answer(&input, &json!(""), &entry, &public);
    assert_eq!(scalar(parsed), json!(""));
}

#[test]
fn numeric_casts_preserve_empty_strings() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);

    let integer = EnInput::new("ref-i", EnInputType::Integer);
    assert_eq!(scalar(parse_answer(&integer, &json!("41"), &EnInputMap::to("i"), &ctx)), json!(41));
    assert_eq!(scalar(parse_answer(&integer, &json!(""), &EnInputMap::to("i"), &ctx)), json!(""));
    assert_eq!(scalar(parse_answer(&integer, &json!(7), &EnInputMap::to("i"), &ctx)), json!(7));

    let decimal = EnInput::new("ref-f", EnInputType::Decimal);
    assert_eq!(
        scalar(parse_answer(&decimal, &json!("2.5"), &EnInputMap::to("f"), &ctx)),
        json!(2.5)
    );
    assert_eq!(scalar(parse_answer(&decimal, &json!(""), &EnInputMap::to("f"), &ctx)), json!(""));
}

#[test]
fn text_answers_pass_through() {
    let media = EnApiMediaUrls::new("https://example.org");
    let counts = EnBranchCounts::new();
    let ctx = context(&media, &counts, false);

    for input_type in [
        EnInputType::Text,
        EnInputType::Textarea,
        EnInputType::Phone,
        EnInputType::Barcode,
    ] {
        let input = EnInput::new("ref-x", input_type);
        let parsed = parse_answer(&input, &json!("as is, verbatim"), &EnInputMap::to("x"), &ctx);
        assert_eq!(scalar(parsed), json!("as is, verbatim"));
    }
}

#[test]
fn multi_value_labels_with_commas_are_quoted() {
    let labels = vec!["Oak".to_string(), "Ash, Mountain".to_string()];
    assert_eq!(join_multi_csv(&labels), "Oak, \"Ash, Mountain\"");
}
