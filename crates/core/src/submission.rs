//! Submission validation and intake preparation.
//!
//! Validation reports at most one error per field: the first failing rule
//! in the order required, format, then range or length.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::elements::{ChoiceOption, ElementConfig, ProposalElement, TextFormat};
use crate::error::{CoreError, FieldError};
use crate::form::{input_field, option_field, selected_packages, FormValue, FormValues};
use crate::pricing::{self, PricingResult};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-()+]+$").expect("valid phone regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("valid url regex"));

/// Date format used by date pickers and their bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated, priced submission ready for intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub values: FormValues,
    pub pricing: PricingResult,
}

/// Validate `values` against every input element of a template.
///
/// Returns an empty vector when the submission is acceptable.
pub fn validate_submission(elements: &[ProposalElement], values: &FormValues) -> Vec<FieldError> {
    let mut ordered: Vec<&ProposalElement> = elements.iter().collect();
    ordered.sort_by_key(|el| el.order());

    ordered
        .into_iter()
        .filter_map(|element| check_element(element, values))
        .collect()
}

/// Validate and price a submission.
pub fn prepare_submission(
    elements: &[ProposalElement],
    values: FormValues,
) -> Result<Submission, CoreError> {
    let errors = validate_submission(elements, &values);
    if !errors.is_empty() {
        return Err(CoreError::FieldValidation(errors));
    }
    let pricing = pricing::evaluate(elements, &values);
    Ok(Submission { values, pricing })
}

fn check_element(element: &ProposalElement, values: &FormValues) -> Option<FieldError> {
    let field = input_field(element);
    let value = values.get(field).filter(|v| !v.is_empty());
    let fail = |message: String| Some(FieldError::new(field, message));

    match element.config() {
        ElementConfig::NumberInput(c) => {
            let Some(value) = value else {
                return c.required.then(|| required(field, &c.label));
            };
            let Some(n) = value.as_number() else {
                return fail(format!("{} must be a number", c.label));
            };
            if let Some(min) = c.min.filter(|min| n < *min) {
                return fail(format!("{} must be at least {min}", c.label));
            }
            if let Some(max) = c.max.filter(|max| n > *max) {
                return fail(format!("{} must be at most {max}", c.label));
            }
            None
        }
        ElementConfig::TextInput(c) => {
            let Some(value) = value else {
                return c.required.then(|| required(field, &c.label));
            };
            let Some(text) = value.as_text() else {
                return fail(format!("{} must be text", c.label));
            };
            let text = text.trim();
            if let Some(format) = c.validation {
                let (re, message) = match format {
                    TextFormat::Email => (&EMAIL_RE, "Please enter a valid email address"),
                    TextFormat::Phone => (&PHONE_RE, "Please enter a valid phone number"),
                    TextFormat::Url => (&URL_RE, "Please enter a valid URL"),
                };
                if !re.is_match(text) {
                    return fail(message.to_string());
                }
            }
            check_length(field, &c.label, text, c.max_length)
        }
        ElementConfig::Textarea(c) => {
            let Some(value) = value else {
                return c.required.then(|| required(field, &c.label));
            };
            match value.as_text() {
                Some(text) => check_length(field, &c.label, text.trim(), c.max_length),
                None => fail(format!("{} must be text", c.label)),
            }
        }
        ElementConfig::DatePicker(c) => {
            let Some(value) = value else {
                return c.required.then(|| required(field, &c.label));
            };
            let Some(date) = value.as_text().and_then(parse_date) else {
                return fail(format!("{} must be a valid date", c.label));
            };
            if let Some(min) = parse_date(&c.min_date).filter(|min| date < *min) {
                return fail(format!("{} must be on or after {min}", c.label));
            }
            if let Some(max) = parse_date(&c.max_date).filter(|max| date > *max) {
                return fail(format!("{} must be on or before {max}", c.label));
            }
            None
        }
        ElementConfig::Dropdown(c) => check_choice(field, &c.label, c.required, &c.options, value),
        ElementConfig::RadioGroup(c) => {
            check_choice(field, &c.label, c.required, &c.options, value)
        }
        ElementConfig::CheckboxGroup(c) => {
            let any_checked = c
                .options
                .iter()
                .any(|o| values.is_checked(&option_field(element.id(), &o.value)));
            (c.required && !any_checked).then(|| required(field, &c.label))
        }
        ElementConfig::PackageTiers(c) => {
            if c.allow_multiple || selected_packages(c, values).nth(1).is_none() {
                return None;
            }
            fail(format!("Only one option may be selected for {}", c.label))
        }
        _ => None,
    }
}

fn required(field: &str, label: &str) -> FieldError {
    FieldError::new(field, format!("{label} is required"))
}

fn check_length(
    field: &str,
    label: &str,
    text: &str,
    max_length: Option<usize>,
) -> Option<FieldError> {
    let max = max_length?;
    (text.chars().count() > max)
        .then(|| FieldError::new(field, format!("{label} must be at most {max} characters")))
}

fn check_choice(
    field: &str,
    label: &str,
    is_required: bool,
    options: &[ChoiceOption],
    value: Option<&FormValue>,
) -> Option<FieldError> {
    let Some(value) = value else {
        return is_required.then(|| required(field, label));
    };
    let known = value
        .as_text()
        .is_some_and(|selected| options.iter().any(|o| o.value == selected));
    (!known).then(|| FieldError::new(field, format!("{label} has an invalid selection")))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
