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

//! # Mapping Resolver Module
//!
//! Turns a project's mapping configuration plus a form (or branch)
//! reference into the ordered input list to export and the per-ref
//! column rules. Group children are flattened into the parent namespace
//! here, so downstream code iterates one flat list and looks rules up by
//! plain ref.
//!
//! Output names must be unique within a file (spreadsheet consumers key
//! on them). Mapping configurations are user-authored, so the resolver
//! validates the flattened name set — including the six-way location
//! expansion — and suppresses any later claimant of an already-used name
//! with a warning.

use std::collections::{HashMap, HashSet};

use crate::answers::location_column_names;
use crate::errors::{EnError, Result};
use crate::project::{
    EnColumnRule, EnForm, EnFormMap, EnInput, EnInputMap, EnInputType, EnProject,
    EnProjectMapping,
};

/// Resolved rule for one input: visibility plus the map entry carrying
/// possible-answer labels.
#[derive(Clone, Debug)]
pub struct EnResolvedRule {
    pub rule: EnColumnRule,
    pub entry: EnInputMap,
}

/// Result of resolving one (form or branch, map index) combination.
#[derive(Debug)]
pub struct EnResolvedMap<'a> {
    /// Inputs in emission order, group children flattened in place after
    /// the group input itself.
    pub inputs: Vec<&'a EnInput>,
    rules: HashMap<String, EnResolvedRule>,
}

impl<'a> EnResolvedMap<'a> {
    /// Column rule for an input ref. Refs without a rule are suppressed.
    pub fn rule_for(&self, input_ref: &str) -> EnColumnRule {
        self.rules
            .get(input_ref)
            .map(|r| r.rule.clone())
            .unwrap_or(EnColumnRule::Suppressed)
    }

    /// Map entry for an input ref (possible-answer labels etc.).
    pub fn entry_for(&self, input_ref: &str) -> EnInputMap {
        self.rules
            .get(input_ref)
            .map(|r| r.entry.clone())
            .unwrap_or_default()
    }
}

/// Resolves the mapping for one form, or for one branch input of that
/// form when `branch_ref` is given.
///
/// The map at `map_index` is selected with a mandatory fallback to the
/// project's default map, so any index yields a usable mapping as long
/// as the configuration is non-empty.
pub fn resolve<'a>(
    mapping: &EnProjectMapping,
    project: &'a EnProject,
    form_ref: &str,
    branch_ref: Option<&str>,
    map_index: usize,
) -> Result<EnResolvedMap<'a>> {
    let map_def = mapping
        .select(map_index)
        .ok_or_else(|| EnError::mapping(format!("project '{}' has no mapping", project.slug)))?;

    let form = project
        .form_by_ref(form_ref)
        .ok_or_else(|| EnError::schema(format!("unknown form ref '{}'", form_ref)))?;

    let form_map = match map_def.forms.get(form_ref) {
        Some(map) => map.clone(),
        None => {
            log::warn!(
                "map '{}' has no entries for form '{}'",
                map_def.name,
                form_ref
            );
            EnFormMap::new()
        }
    };

    let (inputs, namespace) = match branch_ref {
        None => {
            let inputs = flatten_inputs(&form.inputs);
            let namespace = flatten_namespace(form_map, &inputs);
            (inputs, namespace)
        }
        Some(branch_ref) => {
            let branch_input = find_branch_input(form, branch_ref).ok_or_else(|| {
                EnError::schema(format!(
                    "form '{}' has no branch input '{}'",
                    form_ref, branch_ref
                ))
            })?;
            // The owning input's map entry may itself live inside a group
            // sub-map, so descend through the flattened form namespace.
            let top = flatten_inputs(&form.inputs);
            let form_namespace = flatten_namespace(form_map, &top);
            let branch_map = form_namespace
                .get(branch_ref)
                .map(|entry| entry.branch.clone())
                .unwrap_or_default();
            let inputs = flatten_inputs(&branch_input.branch);
            let namespace = flatten_namespace(branch_map, &inputs);
            (inputs, namespace)
        }
    };

    let mut rules: HashMap<String, EnResolvedRule> = HashMap::new();
    for input in &inputs {
        let entry = namespace.get(&input.input_ref);
        rules.insert(
            input.input_ref.clone(),
            EnResolvedRule {
                rule: EnColumnRule::of(entry),
                entry: entry.cloned().unwrap_or_default(),
            },
        );
    }

    suppress_duplicate_names(&inputs, &mut rules);

    Ok(EnResolvedMap { inputs, rules })
}

/// Flattens group children into the iteration order, directly after the
/// group input itself. Branch children stay behind their branch input
/// (they export through their own branch file).
fn flatten_inputs(inputs: &[EnInput]) -> Vec<&EnInput> {
    let mut flat = Vec::with_capacity(inputs.len());
    for input in inputs {
        flat.push(input);
        if input.input_type == EnInputType::Group {
            for child in &input.group {
                flat.push(child);
            }
        }
    }
    flat
}

/// Merges group sub-maps into the flat per-ref namespace. Group children
/// are addressed by their own refs, never a compound path.
fn flatten_namespace(base: EnFormMap, inputs: &[&EnInput]) -> HashMap<String, EnInputMap> {
    let mut namespace = base;
    let group_refs: Vec<&str> = inputs
        .iter()
        .filter(|i| i.input_type == EnInputType::Group)
        .map(|i| i.input_ref.as_str())
        .collect();
    for group_ref in group_refs {
        let children = match namespace.get(group_ref) {
            Some(entry) => entry.group.clone(),
            None => continue,
        };
        for (child_ref, child_entry) in children {
            namespace.insert(child_ref, child_entry);
        }
    }
    namespace
}

/// Locates a branch input by ref, searching top-level inputs and group
/// children.
fn find_branch_input<'a>(form: &'a EnForm, branch_ref: &str) -> Option<&'a EnInput> {
    for input in &form.inputs {
        if input.input_ref == branch_ref && input.input_type == EnInputType::Branch {
            return Some(input);
        }
        if input.input_type == EnInputType::Group {
            if let Some(child) = input
                .group
                .iter()
                .find(|c| c.input_ref == branch_ref && c.input_type == EnInputType::Branch)
            {
                return Some(child);
            }
        }
    }
    None
}

/// Enforces unique flattened output names. The first claimant of a name
/// keeps it; later claimants are suppressed with a warning, keeping
/// header/row parity intact for both formats.
fn suppress_duplicate_names(inputs: &[&EnInput], rules: &mut HashMap<String, EnResolvedRule>) {
    let mut seen: HashSet<String> = HashSet::new();
    for input in inputs {
        if input.input_type.is_structural() {
            continue;
        }
        let key = match rules.get(&input.input_ref) {
            Some(resolved) => match resolved.rule.map_key() {
                Some(key) => key.to_string(),
                None => continue,
            },
            None => continue,
        };
        // Locations claim their base key (the JSON object key) plus the
        // six expanded CSV names.
        let mut names: Vec<String> = vec![key.clone()];
        if input.input_type == EnInputType::Location {
            names.extend(location_column_names(&key));
        }
        if names.iter().any(|n| seen.contains(n)) {
            log::warn!(
                "duplicate output name '{}' for input '{}'; column suppressed",
                key,
                input.input_ref
            );
            if let Some(resolved) = rules.get_mut(&input.input_ref) {
                resolved.rule = EnColumnRule::Suppressed;
            }
            continue;
        }
        seen.extend(names);
    }
}
