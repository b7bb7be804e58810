//! Data-driven description of the public submission form.
//!
//! The schema is plain data: each field carries its value type, its
//! validation rules and a rendering hint. Renderers walk the schema, so a new
//! field only needs a new [`FieldSpec`] entry here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    countries::COUNTRIES,
    domain::{NewLead, VisaCategory},
};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const COUNTRY: &str = "country";
pub const LINKEDIN: &str = "linkedin";
pub const VISAS: &str = "visas";
pub const MESSAGE: &str = "message";
pub const RESUME: &str = "resume";

pub const VISA_OPTIONS: &[&str] = &["O1", "EB2A", "EB2-NIW", "I don't know"];
pub const MESSAGE_MAX_LENGTH: usize = 500;
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Choice { options: &'static [&'static str] },
    Choices { options: &'static [&'static str] },
    File { accept: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldRules {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum UiHint {
    Input,
    Dropdown,
    Checkboxes,
    TextArea { rows: u8 },
    FilePicker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub kind: FieldKind,
    pub rules: FieldRules,
    pub ui: UiHint,
}

impl FieldSpec {
    fn new(name: &'static str, title: &'static str, kind: FieldKind, ui: UiHint) -> Self {
        Self {
            name,
            title,
            kind,
            rules: FieldRules::default(),
            ui,
        }
    }

    fn required(mut self) -> Self {
        self.rules.required = true;
        self
    }

    fn max_length(mut self, max: usize) -> Self {
        self.rules.max_length = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSection {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FormSchema {
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.name == name)
    }

    /// Checks submitted values against every non-file field and returns one
    /// error per offending field, in schema order.
    pub fn validate(&self, data: &FormData) -> Vec<FieldError> {
        self.fields()
            .filter_map(|field| {
                validate_field(field, &data.values(field.name)).map(|message| FieldError {
                    field: field.name,
                    message,
                })
            })
            .collect()
    }
}

fn validate_field(field: &FieldSpec, values: &[&str]) -> Option<String> {
    if matches!(field.kind, FieldKind::File { .. }) {
        return None;
    }
    if values.is_empty() {
        return field
            .rules
            .required
            .then(|| "is a required property".to_string());
    }

    if let Some(max) = field.rules.max_length {
        if values.iter().any(|value| value.chars().count() > max) {
            return Some(format!("must NOT have more than {max} characters"));
        }
    }

    match field.kind {
        FieldKind::Email => {
            if !validator::validate_email(values[0]) {
                return Some("must match format \"email\"".to_string());
            }
        }
        FieldKind::Choice { options } => {
            if !options.contains(&values[0]) {
                return Some("must be equal to one of the allowed values".to_string());
            }
        }
        FieldKind::Choices { options } => {
            if values.iter().any(|value| !options.contains(value)) {
                return Some("must be equal to one of the allowed values".to_string());
            }
            for (index, value) in values.iter().enumerate() {
                if values[..index].contains(value) {
                    return Some("must NOT have duplicate items".to_string());
                }
            }
        }
        FieldKind::Text | FieldKind::File { .. } => {}
    }
    None
}

/// Submitted form values keyed by field name. Repeated keys (checkbox
/// groups) keep every value in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Trimmed, non-empty values for `name`.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.values
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).into_iter().next()
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.values(name).contains(&value)
    }

    pub fn to_new_lead(&self) -> NewLead {
        let text = |name: &str| self.first(name).map(str::to_string);
        let mut visas: Vec<VisaCategory> = Vec::new();
        for visa in self.values(VISAS).into_iter().filter_map(VisaCategory::parse) {
            if !visas.contains(&visa) {
                visas.push(visa);
            }
        }

        NewLead {
            first_name: text(FIRST_NAME),
            last_name: text(LAST_NAME),
            email: text(EMAIL),
            linkedin: text(LINKEDIN),
            country: text(COUNTRY),
            visas: (!visas.is_empty()).then_some(visas),
            resume: text(RESUME),
            message: text(MESSAGE),
        }
    }
}

pub fn lead_form_schema() -> FormSchema {
    FormSchema {
        sections: vec![
            FormSection {
                title: "Want to understand your visa options?",
                description: Some(
                    "Submit the form below and our team of experienced attorneys will review \
                     your information and send a preliminary assessment of your case based on \
                     your goals.",
                ),
                fields: vec![
                    FieldSpec::new(FIRST_NAME, "First Name", FieldKind::Text, UiHint::Input)
                        .required(),
                    FieldSpec::new(LAST_NAME, "Last Name", FieldKind::Text, UiHint::Input)
                        .required(),
                    FieldSpec::new(EMAIL, "Email", FieldKind::Email, UiHint::Input).required(),
                    FieldSpec::new(
                        COUNTRY,
                        "Country of Citizenship",
                        FieldKind::Choice { options: COUNTRIES },
                        UiHint::Dropdown,
                    )
                    .required(),
                    FieldSpec::new(LINKEDIN, "LinkedIn Profile", FieldKind::Text, UiHint::Input)
                        .required(),
                ],
            },
            FormSection {
                title: "Visa Categories of Interest?",
                description: None,
                fields: vec![FieldSpec::new(
                    VISAS,
                    "Visa categories",
                    FieldKind::Choices {
                        options: VISA_OPTIONS,
                    },
                    UiHint::Checkboxes,
                )],
            },
            FormSection {
                title: "How can we help you?",
                description: None,
                fields: vec![FieldSpec::new(
                    MESSAGE,
                    "How can we help you?",
                    FieldKind::Text,
                    UiHint::TextArea { rows: 6 },
                )
                .required()
                .max_length(MESSAGE_MAX_LENGTH)],
            },
            FormSection {
                title: "Resume / CV (file upload)",
                description: None,
                fields: vec![FieldSpec::new(
                    RESUME,
                    "Resume / CV",
                    FieldKind::File {
                        accept: RESUME_CONTENT_TYPE,
                    },
                    UiHint::FilePicker,
                )],
            },
        ],
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
