//! Form values entered by a proposal viewer, and the field-naming contract
//! shared with the renderer.
//!
//! | Element           | Field name                             |
//! |-------------------|----------------------------------------|
//! | `number_input`    | `pricingVariable`, else the element id |
//! | text-like inputs  | element id                             |
//! | `service_toggles` | `services.<serviceId>`                 |
//! | `package_tiers`   | `package.<packageId>`                  |
//! | `checkbox_group`  | `<elementId>.<optionValue>`            |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::elements::{ElementConfig, PackageTiersConfig, ProposalElement};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field naming
// ---------------------------------------------------------------------------

pub fn service_field(service_id: &str) -> String {
    format!("services.{service_id}")
}

pub fn package_field(package_id: &str) -> String {
    format!("package.{package_id}")
}

pub fn option_field(element_id: &str, option_value: &str) -> String {
    format!("{element_id}.{option_value}")
}

/// Field name under which a single-valued element stores its input.
pub fn input_field(element: &ProposalElement) -> &str {
    match element.config() {
        ElementConfig::NumberInput(c) => c.pricing_variable.as_deref().unwrap_or(element.id()),
        _ => element.id(),
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single entered value. HTML inputs often deliver numbers and flags as
/// strings, so the accessors are lenient about representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FormValue {
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => match s.trim() {
                "" | "false" | "off" | "0" => Some(false),
                _ => Some(true),
            },
            Self::List(items) => Some(!items.is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as "not provided" for required checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(true) | Self::Number(_) => false,
        }
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// All values of one form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FormValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FormValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FormValue> {
        self.0.remove(field)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FormValue::as_number)
    }

    /// `None` when the field was never touched.
    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FormValue::as_bool)
    }

    pub fn is_checked(&self, field: &str) -> bool {
        self.flag(field).unwrap_or(false)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FormValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Ids of the packages currently selected in a `package_tiers` element,
/// in declaration order.
pub fn selected_packages<'a>(
    config: &'a PackageTiersConfig,
    values: &'a FormValues,
) -> impl Iterator<Item = &'a str> + 'a {
    config
        .packages
        .iter()
        .filter(move |p| values.is_checked(&package_field(&p.id)))
        .map(|p| p.id.as_str())
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Live form state for one rendered template.
///
/// Wraps [`FormValues`] with the interactions that carry invariants, most
/// importantly the exclusive-choice rule for single-select packages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: FormValues,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form state pre-filled with each input's configured default value.
    pub fn seeded(elements: &[ProposalElement]) -> Self {
        let mut values = FormValues::new();
        for element in elements {
            match element.config() {
                ElementConfig::NumberInput(c) => {
                    if let Some(default) = c.default_value {
                        values.set(input_field(element), default);
                    }
                }
                ElementConfig::DatePicker(c) if !c.default_value.is_empty() => {
                    values.set(element.id(), c.default_value.as_str());
                }
                _ => {}
            }
        }
        Self { values }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn into_values(self) -> FormValues {
        self.values
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FormValue>) {
        self.values.set(field, value);
    }

    pub fn clear(&mut self, field: &str) {
        self.values.remove(field);
    }

    pub fn toggle_service(&mut self, service_id: &str, enabled: bool) {
        self.values.set(service_field(service_id), enabled);
    }

    pub fn set_option(&mut self, element_id: &str, option_value: &str, checked: bool) {
        self.values.set(option_field(element_id, option_value), checked);
    }

    /// Select a package of the `package_tiers` element `element_id`.
    ///
    /// When the element does not allow multiple selections every other
    /// package of that element is deselected first.
    pub fn select_package(
        &mut self,
        elements: &[ProposalElement],
        element_id: &str,
        package_id: &str,
    ) -> Result<(), CoreError> {
        let config = package_config(elements, element_id)?;
        if !config.packages.iter().any(|p| p.id == package_id) {
            return Err(CoreError::Validation(format!(
                "Package '{package_id}' does not exist in element '{element_id}'"
            )));
        }

        if !config.allow_multiple {
            for other in config.packages.iter().filter(|p| p.id != package_id) {
                self.values.set(package_field(&other.id), false);
            }
        }
        self.values.set(package_field(package_id), true);
        Ok(())
    }

    pub fn deselect_package(&mut self, package_id: &str) {
        self.values.set(package_field(package_id), false);
    }
}

fn package_config<'a>(
    elements: &'a [ProposalElement],
    element_id: &str,
) -> Result<&'a PackageTiersConfig, CoreError> {
    let element = elements
        .iter()
        .find(|el| el.id() == element_id)
        .ok_or_else(|| CoreError::Validation(format!("Element '{element_id}' not found")))?;
    match element.config() {
        ElementConfig::PackageTiers(c) => Ok(c),
        _ => Err(CoreError::Validation(format!(
            "Element '{element_id}' is not a package_tiers element"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
