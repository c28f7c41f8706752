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

//! # Entrada Core Tests - Mapping Resolver
//!
//! Tests for map selection, default fallback, branch descent, group
//! flattening, and duplicate output-name handling.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test mapping
//! ```

use entrada::{
    resolve, EnColumnRule, EnForm, EnFormMap, EnInput, EnInputMap, EnInputType, EnMapDefinition,
    EnProject, EnProjectMapping,
};
use serde_json::json;

fn survey_project() -> EnProject {
    EnProject::new(7, "Tree Survey").with_forms(vec![EnForm::new("form-1", "Survey")
        .with_inputs(vec![
            EnInput::new("ref-species", EnInputType::Dropdown),
            EnInput::new("ref-details", EnInputType::Group).with_group(vec![
                EnInput::new("ref-height", EnInputType::Decimal),
                EnInput::new("ref-notes", EnInputType::Textarea),
            ]),
            EnInput::new("ref-visits", EnInputType::Branch).with_branch(vec![
                EnInput::new("ref-visitor", EnInputType::Text),
                EnInput::new("ref-when", EnInputType::Date).with_datetime_format("dd/MM/YYYY"),
            ]),
            EnInput::new("ref-info", EnInputType::Readme),
        ])])
}

fn survey_mapping() -> EnProjectMapping {
    let custom: EnFormMap = [
        ("ref-species".to_string(), EnInputMap::to("species")),
        (
            "ref-details".to_string(),
            EnInputMap::default()
                .with_group_entry("ref-height", EnInputMap::to("height_m"))
                .with_group_entry("ref-notes", EnInputMap::hidden()),
        ),
        (
            "ref-visits".to_string(),
            EnInputMap::to("visits")
                .with_branch_entry("ref-visitor", EnInputMap::to("visitor"))
                .with_branch_entry("ref-when", EnInputMap::to("visited_on")),
        ),
    ]
    .into_iter()
    .collect();

    let auto: EnFormMap = [
        ("ref-species".to_string(), EnInputMap::to("1_Species")),
        (
            "ref-visits".to_string(),
            EnInputMap::to("3_Visits")
                .with_branch_entry("ref-visitor", EnInputMap::to("1_Visitor")),
        ),
    ]
    .into_iter()
    .collect();

    EnProjectMapping::new(vec![
        EnMapDefinition::new("auto", 0).with_form("form-1", auto),
        EnMapDefinition::new("custom", 1).with_form("form-1", custom),
    ])
}

#[test]
fn selects_map_by_index() {
    let project = survey_project();
    let mapping = survey_mapping();
    let custom = resolve(&mapping, &project, "form-1", None, 1).unwrap();
    assert_eq!(custom.rule_for("ref-species"), EnColumnRule::Mapped("species".into()));
    let auto = resolve(&mapping, &project, "form-1", None, 0).unwrap();
    assert_eq!(auto.rule_for("ref-species"), EnColumnRule::Mapped("1_Species".into()));
}

#[test]
fn out_of_range_index_matches_default_map() {
    let project = survey_project();
    let mapping = survey_mapping();
    let fallback = resolve(&mapping, &project, "form-1", None, 42).unwrap();
    let default = resolve(&mapping, &project, "form-1", None, 0).unwrap();
    for input_ref in ["ref-species", "ref-details", "ref-height", "ref-visits"] {
        assert_eq!(fallback.rule_for(input_ref), default.rule_for(input_ref));
    }
}

#[test]
fn group_children_join_the_flat_namespace() {
    let project = survey_project();
    let resolved = resolve(&survey_mapping(), &project, "form-1", None, 1).unwrap();
    let order: Vec<&str> = resolved.inputs.iter().map(|i| i.input_ref.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "ref-species",
            "ref-details",
            "ref-height",
            "ref-notes",
            "ref-visits",
            "ref-info"
        ]
    );
    assert_eq!(resolved.rule_for("ref-height"), EnColumnRule::Mapped("height_m".into()));
    assert_eq!(resolved.rule_for("ref-notes"), EnColumnRule::Hidden);
    // The group holder itself never maps to a column.
    assert_eq!(resolved.rule_for("ref-details"), EnColumnRule::Suppressed);
}

#[test]
fn branch_descent_resolves_branch_namespace() {
    let project = survey_project();
    let resolved = resolve(&survey_mapping(), &project, "form-1", Some("ref-visits"), 1).unwrap();
    let order: Vec<&str> = resolved.inputs.iter().map(|i| i.input_ref.as_str()).collect();
    assert_eq!(order, vec!["ref-visitor", "ref-when"]);
    assert_eq!(resolved.rule_for("ref-visitor"), EnColumnRule::Mapped("visitor".into()));
    assert_eq!(resolved.rule_for("ref-when"), EnColumnRule::Mapped("visited_on".into()));
}

#[test]
fn branch_children_missing_from_map_are_suppressed() {
    let project = survey_project();
    let resolved = resolve(&survey_mapping(), &project, "form-1", Some("ref-visits"), 0).unwrap();
    assert_eq!(resolved.rule_for("ref-visitor"), EnColumnRule::Mapped("1_Visitor".into()));
    assert_eq!(resolved.rule_for("ref-when"), EnColumnRule::Suppressed);
}

#[test]
fn duplicate_location_expansion_collides() {
    // A text input claiming "lat_site" collides with the location
    // expansion of an input mapped to "site"; the later claimant loses.
    let project = EnProject::new(1, "P").with_forms(vec![EnForm::new("form-1", "F")
        .with_inputs(vec![
            EnInput::new("ref-loc", EnInputType::Location),
            EnInput::new("ref-text", EnInputType::Text),
        ])]);
    let form_map: EnFormMap = [
        ("ref-loc".to_string(), EnInputMap::to("site")),
        ("ref-text".to_string(), EnInputMap::to("lat_site")),
    ]
    .into_iter()
    .collect();
    let mapping =
        EnProjectMapping::new(vec![EnMapDefinition::new("auto", 0).with_form("form-1", form_map)]);
    let resolved = resolve(&mapping, &project, "form-1", None, 0).unwrap();
    assert_eq!(resolved.rule_for("ref-loc"), EnColumnRule::Mapped("site".into()));
    assert_eq!(resolved.rule_for("ref-text"), EnColumnRule::Suppressed);
}

#[test]
fn stored_mapping_json_resolves() {
    let raw = json!([{
        "name": "auto",
        "map_index": 0,
        "is_default": true,
        "forms": {
            "form-1": {
                "ref-species": {"hide": false, "map_to": "species"},
                "ref-details": {
                    "map_to": false,
                    "group": {"ref-height": {"map_to": "height_m"}}
                }
            }
        }
    }]);
    let mapping: EnProjectMapping = serde_json::from_value(raw).unwrap();
    let project = survey_project();
    let resolved = resolve(&mapping, &project, "form-1", None, 0).unwrap();
    assert_eq!(resolved.rule_for("ref-species"), EnColumnRule::Mapped("species".into()));
    assert_eq!(resolved.rule_for("ref-height"), EnColumnRule::Mapped("height_m".into()));
    assert_eq!(resolved.rule_for("ref-details"), EnColumnRule::Suppressed);
}

#[test]
fn unknown_form_is_an_error() {
    let project = survey_project();
    assert!(resolve(&survey_mapping(), &project, "form-9", None, 0).is_err());
}
