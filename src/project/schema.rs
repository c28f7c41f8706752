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

//! # Project Schema Module
//!
//! The versioned, user-authored schema a project collects entries
//! against: an ordered list of forms, each an ordered list of inputs.
//! Input types are a closed set, so dispatch is a `match` over
//! [`EnInputType`] rather than anything reflective.
//!
//! Branch and group inputs nest their own ordered child input lists.
//! Children keep their own refs (refs are unique project-wide) but are
//! flattened into the parent's iteration order when columns are emitted.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Project visibility. Private projects suppress media URLs and add the
/// `created_by` column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnAccess {
    #[default]
    Public,
    Private,
}

/// Media kind carried by a media-type input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnMediaType {
    Photo,
    Audio,
    Video,
}

impl EnMediaType {
    /// Wire name used in media URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnMediaType::Photo => "photo",
            EnMediaType::Audio => "audio",
            EnMediaType::Video => "video",
        }
    }

    /// Stored variant requested when exporting (photos export the
    /// original capture, not a thumbnail).
    pub fn export_format(&self) -> &'static str {
        match self {
            EnMediaType::Photo => "entry_original",
            EnMediaType::Audio => "audio",
            EnMediaType::Video => "video",
        }
    }
}

/// Closed enumeration of input (question) types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnInputType {
    Text,
    Integer,
    Decimal,
    Date,
    Time,
    Dropdown,
    Radio,
    Checkbox,
    Searchsingle,
    Searchmultiple,
    Textarea,
    Location,
    Photo,
    Audio,
    Video,
    Barcode,
    Branch,
    Group,
    Readme,
    Phone,
}

impl EnInputType {
    /// Structural inputs hold or present other content and never emit an
    /// answer column of their own.
    pub fn is_structural(&self) -> bool {
        matches!(self, EnInputType::Group | EnInputType::Readme)
    }

    /// Single-choice inputs whose answer is a possible-answer ref.
    pub fn is_single_choice(&self) -> bool {
        matches!(self, EnInputType::Dropdown | EnInputType::Radio)
    }

    /// Multi-choice inputs whose answer is a list of possible-answer refs.
    pub fn is_multi_choice(&self) -> bool {
        matches!(
            self,
            EnInputType::Checkbox | EnInputType::Searchsingle | EnInputType::Searchmultiple
        )
    }

    /// Media kind for media inputs, `None` otherwise.
    pub fn media_type(&self) -> Option<EnMediaType> {
        match self {
            EnInputType::Photo => Some(EnMediaType::Photo),
            EnInputType::Audio => Some(EnMediaType::Audio),
            EnInputType::Video => Some(EnMediaType::Video),
            _ => None,
        }
    }
}

/// One question definition within a form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnInput {
    #[serde(rename = "ref")]
    pub input_ref: String,
    #[serde(rename = "type")]
    pub input_type: EnInputType,
    #[serde(default)]
    pub question: String,
    /// Display format for date/time inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_format: Option<String>,
    /// Ordered child inputs of a branch input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch: Vec<EnInput>,
    /// Ordered child inputs of a group input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<EnInput>,
}

impl EnInput {
    /// Constructs an input with the given ref and type.
    pub fn new(input_ref: impl Into<String>, input_type: EnInputType) -> Self {
        EnInput {
            input_ref: input_ref.into(),
            input_type,
            question: String::new(),
            datetime_format: None,
            branch: Vec::new(),
            group: Vec::new(),
        }
    }

    /// Sets the question text.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    /// Sets the date/time display format.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    /// Sets the branch child inputs.
    pub fn with_branch(mut self, children: Vec<EnInput>) -> Self {
        self.branch = children;
        self
    }

    /// Sets the group child inputs.
    pub fn with_group(mut self, children: Vec<EnInput>) -> Self {
        self.group = children;
        self
    }
}

/// One level of a project's (possibly hierarchical) entry schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnForm {
    #[serde(rename = "ref")]
    pub form_ref: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub inputs: Vec<EnInput>,
}

impl EnForm {
    /// Constructs a form; the slug derives from the name.
    pub fn new(form_ref: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        EnForm {
            form_ref: form_ref.into(),
            name,
            slug,
            inputs: Vec::new(),
        }
    }

    /// Sets the form's ordered inputs.
    pub fn with_inputs(mut self, inputs: Vec<EnInput>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Branch inputs of this form in form order, including branches
    /// nested inside groups.
    pub fn branch_inputs(&self) -> Vec<&EnInput> {
        let mut branches = Vec::new();
        for input in &self.inputs {
            match input.input_type {
                EnInputType::Branch => branches.push(input),
                EnInputType::Group => branches.extend(
                    input
                        .group
                        .iter()
                        .filter(|c| c.input_type == EnInputType::Branch),
                ),
                _ => {}
            }
        }
        branches
    }

    /// Looks up a top-level input by ref.
    pub fn input_by_ref(&self, input_ref: &str) -> Option<&EnInput> {
        self.inputs.iter().find(|i| i.input_ref == input_ref)
    }
}

/// A data-collection project: schema plus identity and visibility.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnProject {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub access: EnAccess,
    #[serde(default)]
    pub forms: Vec<EnForm>,
}

impl EnProject {
    /// Constructs a project; the slug derives from the name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        EnProject {
            id,
            name,
            slug,
            access: EnAccess::Public,
            forms: Vec::new(),
        }
    }

    /// Sets the project visibility.
    pub fn with_access(mut self, access: EnAccess) -> Self {
        self.access = access;
        self
    }

    /// Sets the project's ordered forms.
    pub fn with_forms(mut self, forms: Vec<EnForm>) -> Self {
        self.forms = forms;
        self
    }

    pub fn is_private(&self) -> bool {
        self.access == EnAccess::Private
    }

    /// Ref of the top-of-hierarchy form.
    pub fn first_form_ref(&self) -> &str {
        self.forms.first().map(|f| f.form_ref.as_str()).unwrap_or("")
    }

    /// Looks up a form by ref.
    pub fn form_by_ref(&self, form_ref: &str) -> Option<&EnForm> {
        self.forms.iter().find(|f| f.form_ref == form_ref)
    }
}

/// Lowercase, hyphen-separated slug used in output file names.
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug regex"));
    re.replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
