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

//! # Mapping Configuration Module
//!
//! A project carries a small set of named maps. Each map selects, per
//! form and per input ref, whether the input is exported and under what
//! output column name, with nested sub-maps for group children and
//! branch children and per-possible-answer output labels.
//!
//! Stored mapping JSON is loose about `map_to`: legacy writers emit
//! `false`, `""`, or omit the key entirely. All three deserialize to the
//! same state, and visibility is an explicit three-state
//! [`EnColumnRule`] rather than a pile of falsy checks.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Output rule for one input under one map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnColumnRule {
    /// Exported under the given column name.
    Mapped(String),
    /// Shown in the map but without a usable output name; the column is
    /// suppressed entirely.
    Suppressed,
    /// Explicitly hidden by the map.
    Hidden,
}

impl EnColumnRule {
    /// Derives the rule for an input's map entry. An absent entry
    /// suppresses the column, as does an entry with no usable `map_to`;
    /// `hide` wins over any name.
    pub fn of(entry: Option<&EnInputMap>) -> EnColumnRule {
        match entry {
            None => EnColumnRule::Suppressed,
            Some(m) if m.hide => EnColumnRule::Hidden,
            Some(m) => match &m.map_to {
                Some(key) => EnColumnRule::Mapped(key.clone()),
                None => EnColumnRule::Suppressed,
            },
        }
    }

    /// Output name when mapped.
    pub fn map_key(&self) -> Option<&str> {
        match self {
            EnColumnRule::Mapped(key) => Some(key.as_str()),
            _ => None,
        }
    }
}

/// Folds `false`, `""`, `null`, and missing values into `None`; only a
/// non-empty string is a usable output name.
fn de_map_to<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Output label for one possible answer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnAnswerMap {
    #[serde(default, deserialize_with = "de_map_to")]
    pub map_to: Option<String>,
}

/// Map entry for one input ref.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnInputMap {
    #[serde(default)]
    pub hide: bool,
    #[serde(default, deserialize_with = "de_map_to")]
    pub map_to: Option<String>,
    /// Possible-answer ref to output label.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub possible_answers: HashMap<String, EnAnswerMap>,
    /// Sub-map for group children, keyed by their own refs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub group: HashMap<String, EnInputMap>,
    /// Sub-map for branch children, keyed by their own refs.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub branch: HashMap<String, EnInputMap>,
}

impl EnInputMap {
    /// Entry mapped to the given output name.
    pub fn to(key: impl Into<String>) -> Self {
        EnInputMap {
            map_to: Some(key.into()),
            ..EnInputMap::default()
        }
    }

    /// Entry explicitly hidden.
    pub fn hidden() -> Self {
        EnInputMap {
            hide: true,
            ..EnInputMap::default()
        }
    }

    /// Adds a possible-answer output label.
    pub fn with_answer(mut self, answer_ref: impl Into<String>, label: impl Into<String>) -> Self {
        self.possible_answers.insert(
            answer_ref.into(),
            EnAnswerMap {
                map_to: Some(label.into()),
            },
        );
        self
    }

    /// Adds a group-child map entry.
    pub fn with_group_entry(mut self, child_ref: impl Into<String>, entry: EnInputMap) -> Self {
        self.group.insert(child_ref.into(), entry);
        self
    }

    /// Adds a branch-child map entry.
    pub fn with_branch_entry(mut self, child_ref: impl Into<String>, entry: EnInputMap) -> Self {
        self.branch.insert(child_ref.into(), entry);
        self
    }

    /// Output label for a possible-answer ref, empty when unmapped.
    pub fn answer_label(&self, answer_ref: &str) -> &str {
        self.possible_answers
            .get(answer_ref)
            .and_then(|a| a.map_to.as_deref())
            .unwrap_or("")
    }
}

/// Per-form map: input ref to map entry.
pub type EnFormMap = HashMap<String, EnInputMap>;

/// One named map of a project's mapping configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnMapDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub map_index: usize,
    #[serde(default)]
    pub is_default: bool,
    /// Form ref to form map.
    #[serde(default)]
    pub forms: HashMap<String, EnFormMap>,
}

impl EnMapDefinition {
    /// Constructs an empty map definition.
    pub fn new(name: impl Into<String>, map_index: usize) -> Self {
        EnMapDefinition {
            name: name.into(),
            map_index,
            is_default: map_index == 0,
            forms: HashMap::new(),
        }
    }

    /// Adds a form map.
    pub fn with_form(mut self, form_ref: impl Into<String>, map: EnFormMap) -> Self {
        self.forms.insert(form_ref.into(), map);
        self
    }
}

/// The full mapping configuration of a project.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnProjectMapping {
    pub maps: Vec<EnMapDefinition>,
}

impl EnProjectMapping {
    pub fn new(maps: Vec<EnMapDefinition>) -> Self {
        EnProjectMapping { maps }
    }

    /// Selects the map with the given index, falling back to the default
    /// map and finally to the first map. A project must always have at
    /// least one usable map; `None` only when the configuration is empty.
    pub fn select(&self, map_index: usize) -> Option<&EnMapDefinition> {
        self.maps
            .iter()
            .find(|m| m.map_index == map_index)
            .or_else(|| self.maps.iter().find(|m| m.is_default))
            .or_else(|| self.maps.first())
    }
}
