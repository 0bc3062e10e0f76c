//! Pricing evaluation: element sequence + form values → line items and totals.
//!
//! Pricing is declared by the consuming element, never by the input: a
//! number input only produces a charge when a `pricing_tiers` element is
//! based on its pricing variable. Partial pricing is always computable, so
//! required-field violations never block evaluation.

use serde::Serialize;

use crate::elements::{ChoiceOption, ElementConfig, PricingTiersConfig, ProposalElement};
use crate::form::{option_field, selected_packages, service_field, FormValues};
use crate::money::Money;

/// Currency symbol used when the template has no pricing summary.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// One priced contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Element that produced this item.
    pub element_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    pub total: Money,
}

/// A quantity that fell outside every tier of the pricing element bound to
/// it. It contributes nothing to the total but is reported so the gap is
/// visible rather than silently lost revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedTier {
    pub element_id: String,
    pub pricing_variable: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub subtotal: Money,
    pub line_items: Vec<LineItem>,
    /// Present only when a pricing summary element shows tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Money>,
    pub discount_amount: Money,
    pub total: Money,
    pub currency_symbol: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_tiers: Vec<UnmatchedTier>,
}

impl PricingResult {
    pub fn formatted_total(&self) -> String {
        self.total.format_with(&self.currency_symbol)
    }
}

/// Compute pricing for `elements` (in `order` sequence) against `values`.
pub fn evaluate(elements: &[ProposalElement], values: &FormValues) -> PricingResult {
    let mut ordered: Vec<&ProposalElement> = elements.iter().collect();
    ordered.sort_by_key(|el| el.order());

    let mut line_items = Vec::new();
    let mut unmatched_tiers = Vec::new();

    for element in &ordered {
        match element.config() {
            ElementConfig::NumberInput(c) => {
                let Some(variable) = c.pricing_variable.as_deref() else {
                    continue;
                };
                let Some(quantity) = values.number(variable).filter(|q| *q > 0.0) else {
                    continue;
                };
                let Some((tier_element, tiers)) = find_tier_element(&ordered, variable) else {
                    continue;
                };
                match tiers.find_tier(quantity) {
                    Some(tier) => line_items.push(LineItem {
                        element_id: element.id().to_string(),
                        label: c.label.clone(),
                        quantity: Some(quantity),
                        unit_price: Some(tier.price_per_unit),
                        total: tier.price_per_unit.times_quantity(quantity),
                    }),
                    None => {
                        tracing::debug!(
                            element_id = tier_element.id(),
                            variable,
                            quantity,
                            "No pricing tier matches quantity"
                        );
                        unmatched_tiers.push(UnmatchedTier {
                            element_id: tier_element.id().to_string(),
                            pricing_variable: variable.to_string(),
                            quantity,
                        });
                    }
                }
            }
            ElementConfig::ServiceToggles(c) => {
                for service in &c.services {
                    let enabled = values
                        .flag(&service_field(&service.id))
                        .unwrap_or(service.default_enabled);
                    if enabled {
                        line_items.push(LineItem {
                            element_id: element.id().to_string(),
                            label: service.name.clone(),
                            quantity: None,
                            unit_price: None,
                            total: service.base_price,
                        });
                    }
                }
            }
            ElementConfig::Dropdown(c) => {
                push_choice(&mut line_items, element, &c.label, &c.options, values);
            }
            ElementConfig::RadioGroup(c) => {
                push_choice(&mut line_items, element, &c.label, &c.options, values);
            }
            ElementConfig::CheckboxGroup(c) => {
                for option in &c.options {
                    if option.price_modifier.is_zero()
                        || !values.is_checked(&option_field(element.id(), &option.value))
                    {
                        continue;
                    }
                    line_items.push(choice_item(element, &c.label, option));
                }
            }
            ElementConfig::PackageTiers(c) => {
                let limit = if c.allow_multiple { usize::MAX } else { 1 };
                for package_id in selected_packages(c, values).take(limit) {
                    if let Some(package) = c.packages.iter().find(|p| p.id == package_id) {
                        line_items.push(LineItem {
                            element_id: element.id().to_string(),
                            label: package.name.clone(),
                            quantity: None,
                            unit_price: None,
                            total: package.price,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    let subtotal: Money = line_items.iter().map(|item| item.total).sum();

    let summary = ordered.iter().find_map(|el| match el.config() {
        ElementConfig::PricingSummary(c) => Some(c),
        _ => None,
    });
    let tax_amount = summary
        .filter(|s| s.show_tax)
        .map(|s| subtotal.apply_rate(s.tax_rate.unwrap_or(0.0)));
    let currency_symbol = summary
        .map(|s| s.currency_symbol.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

    // No discount mechanism exists yet; the field is reserved.
    let discount_amount = Money::ZERO;
    let total = subtotal + tax_amount.unwrap_or(Money::ZERO) - discount_amount;

    PricingResult {
        subtotal,
        line_items,
        tax_amount,
        discount_amount,
        total,
        currency_symbol,
        unmatched_tiers,
    }
}

/// First `pricing_tiers` element (in sequence order) based on `variable`.
fn find_tier_element<'a>(
    ordered: &[&'a ProposalElement],
    variable: &str,
) -> Option<(&'a ProposalElement, &'a PricingTiersConfig)> {
    ordered.iter().find_map(|el| match el.config() {
        ElementConfig::PricingTiers(c) if c.based_on == variable => Some((*el, c)),
        _ => None,
    })
}

fn push_choice(
    line_items: &mut Vec<LineItem>,
    element: &ProposalElement,
    label: &str,
    options: &[ChoiceOption],
    values: &FormValues,
) {
    let Some(selected) = values.text(element.id()) else {
        return;
    };
    if let Some(option) = options
        .iter()
        .find(|o| o.value == selected && !o.price_modifier.is_zero())
    {
        line_items.push(choice_item(element, label, option));
    }
}

fn choice_item(element: &ProposalElement, label: &str, option: &ChoiceOption) -> LineItem {
    LineItem {
        element_id: element.id().to_string(),
        label: format!("{label}: {}", option.label),
        quantity: None,
        unit_price: None,
        total: option.price_modifier,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
