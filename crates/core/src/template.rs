//! The persisted template document and the checks applied before it is
//! written.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::elements::{ElementConfig, ProposalElement, RawElement};
use crate::error::CoreError;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SLUG_LEN: usize = 255;

pub const DEFAULT_NAME: &str = "Untitled Template";
pub const DEFAULT_SLUG: &str = "untitled-template";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex"));

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Content of a template as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub elements: Vec<ProposalElement>,
    #[serde(default = "empty_object")]
    pub theme_config: serde_json::Value,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            theme_config: empty_object(),
        }
    }
}

impl TemplateConfig {
    /// Parse an untyped `configJson` payload.
    ///
    /// Unlike plain deserialization this keeps the domain error of the first
    /// bad element, so an unknown type surfaces as
    /// [`CoreError::UnknownElementType`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            elements: Vec<RawElement>,
            #[serde(default)]
            theme_config: serde_json::Value,
        }

        let raw: Raw = serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Invalid template config: {e}")))?;
        let elements = raw
            .elements
            .into_iter()
            .map(ProposalElement::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let theme_config = if raw.theme_config.is_null() {
            empty_object()
        } else {
            raw.theme_config
        };
        Ok(Self {
            elements,
            theme_config,
        })
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// `{ name, slug, description, configJson: { elements, theme_config } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "configJson", default)]
    pub config_json: TemplateConfig,
}

impl TemplateDocument {
    /// Everything that must hold before a document may be written.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_slug(&self.slug)?;
        for element in &self.config_json.elements {
            element.config().validate()?;
        }
        validate_references(&self.config_json.elements)
    }

    pub fn elements(&self) -> &[ProposalElement] {
        &self.config_json.elements
    }
}

// ---------------------------------------------------------------------------
// Metadata checks
// ---------------------------------------------------------------------------

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Template name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Template name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be between 1 and {MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase letters, numbers, and hyphens".into(),
        ));
    }
    Ok(())
}

/// Derive a slug from a display name: `"Wedding Film 2026!"` → `"wedding-film-2026"`.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Public preview URL of a published template.
pub fn public_url(base_url: &str, slug: &str) -> String {
    format!("{}/proposals/preview/{slug}", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Pricing references
// ---------------------------------------------------------------------------

/// Every `pricing_tiers.basedOn` must name the pricing variable of some
/// number input in the same template.
pub fn validate_references(elements: &[ProposalElement]) -> Result<(), CoreError> {
    let variables: HashSet<&str> = elements
        .iter()
        .filter_map(|el| match el.config() {
            ElementConfig::NumberInput(c) => c.pricing_variable.as_deref(),
            _ => None,
        })
        .collect();

    for element in elements {
        if let ElementConfig::PricingTiers(c) = element.config() {
            if !variables.contains(c.based_on.as_str()) {
                return Err(CoreError::DanglingReference {
                    element_id: element.id().to_string(),
                    reference: c.based_on.clone(),
                });
            }
        }
    }
    Ok(())
}

/// A band of quantities that an input accepts but no tier prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageWarning {
    /// The `pricing_tiers` element with the gap.
    pub element_id: String,
    pub pricing_variable: String,
    pub from: u64,
    /// `None` means the gap is open-ended.
    pub to: Option<u64>,
    pub message: String,
}

/// Report integer quantities inside each bound input's `[min, max]` range
/// that no tier of the bound `pricing_tiers` element covers.
///
/// Quantities below 1 are never priced, so the audited range starts at 1 at
/// the earliest.
pub fn audit_tier_coverage(elements: &[ProposalElement]) -> Vec<CoverageWarning> {
    let mut warnings = Vec::new();

    for input in elements {
        let ElementConfig::NumberInput(c) = input.config() else {
            continue;
        };
        let Some(variable) = c.pricing_variable.as_deref() else {
            continue;
        };
        let Some((tiers_id, tiers)) = elements.iter().find_map(|el| match el.config() {
            ElementConfig::PricingTiers(t) if t.based_on == variable => Some((el.id(), t)),
            _ => None,
        }) else {
            continue;
        };

        let lo = c.min.map_or(1, |min| min.max(1.0).ceil() as u64);
        let hi = c.max.map(|max| max.max(0.0).floor() as u64);
        if matches!(hi, Some(hi) if hi < lo) {
            continue;
        }

        let mut bands: Vec<(u64, Option<u64>)> = tiers
            .tiers
            .iter()
            .map(|t| (u64::from(t.min_qty), t.max_qty.map(u64::from)))
            .collect();
        bands.sort_by_key(|(min, _)| *min);

        for (from, to) in uncovered(lo, hi, &bands) {
            let message = match to {
                Some(to) if to == from => {
                    format!("Quantity {from} for '{variable}' matches no pricing tier")
                }
                Some(to) => format!("Quantities {from}-{to} for '{variable}' match no pricing tier"),
                None => format!("Quantities {from} and above for '{variable}' match no pricing tier"),
            };
            warnings.push(CoverageWarning {
                element_id: tiers_id.to_string(),
                pricing_variable: variable.to_string(),
                from,
                to,
                message,
            });
        }
    }

    warnings
}

/// Gaps in `[lo, hi]` not covered by `bands` (sorted by lower bound).
fn uncovered(lo: u64, hi: Option<u64>, bands: &[(u64, Option<u64>)]) -> Vec<(u64, Option<u64>)> {
    let mut gaps = Vec::new();
    let mut cursor = lo;

    for &(min, max) in bands {
        if matches!(hi, Some(hi) if cursor > hi) {
            return gaps;
        }
        if matches!(max, Some(max) if max < cursor) {
            continue;
        }
        if min > cursor {
            let end = min - 1;
            gaps.push((cursor, Some(hi.map_or(end, |hi| hi.min(end)))));
        }
        match max {
            Some(max) => cursor = cursor.max(max + 1),
            None => return gaps,
        }
    }

    match hi {
        Some(hi) if cursor <= hi => gaps.push((cursor, Some(hi))),
        Some(_) => {}
        None => gaps.push((cursor, None)),
    }
    gaps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
