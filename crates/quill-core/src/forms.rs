//! Public form inputs and their validation.
//!
//! Inputs are trimmed before validation. A blank required field reports
//! only [`REQUIRED`]; other rules are checked with `validator`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";

/// Field name → error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Result of submitting a form: the accepted value, or errors to show.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<T> {
    Accepted(T),
    Rejected(FormErrors),
}

impl<T> FormOutcome<T> {
    pub fn accepted(&self) -> Option<&T> {
        match self {
            FormOutcome::Accepted(value) => Some(value),
            FormOutcome::Rejected(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&FormErrors> {
        match self {
            FormOutcome::Accepted(_) => None,
            FormOutcome::Rejected(errors) => Some(errors),
        }
    }
}

/// Required-field check plus `validator` rules, keyed by field.
fn clean<F: Validate>(form: &F, required: &[(&'static str, &str)]) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();
    let blank: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();

    for field in &blank {
        errors.add(*field, REQUIRED);
    }

    if let Err(validation) = form.validate() {
        collect(&validation, &blank, &mut errors);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn collect(validation: &ValidationErrors, skip: &[&str], errors: &mut FormErrors) {
    for (field, field_errors) in validation.field_errors() {
        let field = field.to_string();
        if skip.contains(&field.as_str()) {
            continue;
        }
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            errors.add(field.clone(), message);
        }
    }
}

/// Comment submitted on a post detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(length(max = 80, message = "Ensure this value has at most 80 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

impl CommentInput {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.body = self.body.trim().to_string();

        clean(
            &self,
            &[
                ("name", self.name.as_str()),
                ("email", self.email.as_str()),
                ("body", self.body.as_str()),
            ],
        )?;
        Ok(self)
    }
}

/// "Email this post" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SharePostInput {
    #[serde(default)]
    #[validate(length(max = 25, message = "Ensure this value has at most 25 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub to: String,
    #[serde(default)]
    pub comments: String,
}

impl SharePostInput {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.to = self.to.trim().to_string();
        self.comments = self.comments.trim().to_string();

        clean(
            &self,
            &[
                ("name", self.name.as_str()),
                ("email", self.email.as_str()),
                ("to", self.to.as_str()),
            ],
        )?;
        Ok(self)
    }
}

/// Validate a raw search query; blank input is a required-field error.
pub fn clean_search_query(raw: &str) -> Result<String, FormErrors> {
    let query = raw.trim();
    if query.is_empty() {
        let mut errors = FormErrors::default();
        errors.add("query", REQUIRED);
        return Err(errors);
    }
    Ok(query.to_string())
}
