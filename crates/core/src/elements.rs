//! Proposal element types, per-type configuration schemas and defaults.
//!
//! Every element carries a configuration payload whose shape is fixed by
//! its [`ElementType`]. Payloads are modelled as the tagged union
//! [`ElementConfig`], one strongly-typed struct per type, so pricing and
//! validation never have to inspect an untyped JSON object.
//!
//! On the wire an element is `{ id, type, order, config }` with camelCase
//! config keys. Deserialization goes through [`RawElement`] so that an
//! unknown `type` surfaces as [`CoreError::UnknownElementType`] and a
//! malformed payload as [`CoreError::Validation`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::Money;

// ---------------------------------------------------------------------------
// Element type
// ---------------------------------------------------------------------------

/// Closed set of element types a proposal template can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Hero,
    RichText,
    Image,
    Video,
    NumberInput,
    TextInput,
    Textarea,
    DatePicker,
    Dropdown,
    ServiceToggles,
    CheckboxGroup,
    RadioGroup,
    PricingTiers,
    PackageTiers,
    PricingSummary,
    SubmitButton,
    Divider,
}

impl ElementType {
    /// All element types in palette order.
    pub const ALL: [ElementType; 17] = [
        Self::Hero,
        Self::RichText,
        Self::Image,
        Self::Video,
        Self::NumberInput,
        Self::TextInput,
        Self::Textarea,
        Self::DatePicker,
        Self::Dropdown,
        Self::ServiceToggles,
        Self::CheckboxGroup,
        Self::RadioGroup,
        Self::PricingTiers,
        Self::PackageTiers,
        Self::PricingSummary,
        Self::SubmitButton,
        Self::Divider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::RichText => "rich_text",
            Self::Image => "image",
            Self::Video => "video",
            Self::NumberInput => "number_input",
            Self::TextInput => "text_input",
            Self::Textarea => "textarea",
            Self::DatePicker => "date_picker",
            Self::Dropdown => "dropdown",
            Self::ServiceToggles => "service_toggles",
            Self::CheckboxGroup => "checkbox_group",
            Self::RadioGroup => "radio_group",
            Self::PricingTiers => "pricing_tiers",
            Self::PackageTiers => "package_tiers",
            Self::PricingSummary => "pricing_summary",
            Self::SubmitButton => "submit_button",
            Self::Divider => "divider",
        }
    }

    /// Palette entry for the builder UI.
    pub fn metadata(self) -> ElementMetadata {
        use ElementCategory::*;
        let (label, icon, category, description) = match self {
            Self::Hero => ("Hero Section", "🎯", Content, "Header with title and subtitle"),
            Self::RichText => ("Rich Text", "📝", Content, "Formatted text content"),
            Self::Image => ("Image", "🖼️", Content, "Standalone image"),
            Self::Video => ("Video", "🎥", Content, "Embedded video"),
            Self::NumberInput => ("Number Input", "🔢", Inputs, "Quantity selector"),
            Self::TextInput => ("Text Input", "✏️", Inputs, "Short text field"),
            Self::Textarea => ("Textarea", "📄", Inputs, "Long text field"),
            Self::DatePicker => ("Date Picker", "📅", Inputs, "Date selection"),
            Self::Dropdown => ("Dropdown", "▼", Inputs, "Single choice dropdown"),
            Self::ServiceToggles => ("Service Toggles", "☑️", Selections, "Enable/disable services"),
            Self::CheckboxGroup => ("Checkbox Group", "☐", Selections, "Multi-select checkboxes"),
            Self::RadioGroup => ("Radio Group", "◉", Selections, "Single-select radios"),
            Self::PricingTiers => ("Pricing Tiers", "💰", Pricing, "Tiered pricing based on quantity"),
            Self::PackageTiers => ("Package Tiers", "📦", Pricing, "Predefined packages"),
            Self::PricingSummary => ("Pricing Summary", "🧾", Pricing, "Live-updating total"),
            Self::SubmitButton => ("Submit Button", "✉️", Actions, "Submit proposal form"),
            Self::Divider => ("Divider", "—", Actions, "Visual separator"),
        };
        ElementMetadata {
            element_type: self,
            label,
            icon,
            category,
            description,
        }
    }

    /// Generate a fresh element id such as `hero-4f1c...`.
    ///
    /// Backed by a v4 UUID, so ids created in the same instant never collide.
    pub fn new_element_id(self) -> String {
        format!("{}-{}", self.as_str(), Uuid::new_v4().simple())
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownElementType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Palette metadata
// ---------------------------------------------------------------------------

/// Palette grouping of element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Content,
    Inputs,
    Selections,
    Pricing,
    Actions,
}

impl ElementCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Inputs => "Inputs",
            Self::Selections => "Selections",
            Self::Pricing => "Pricing",
            Self::Actions => "Actions",
        }
    }
}

/// Display metadata for one palette entry.
#[derive(Debug, Clone, Serialize)]
pub struct ElementMetadata {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub label: &'static str,
    pub icon: &'static str,
    pub category: ElementCategory,
    pub description: &'static str,
}

// ---------------------------------------------------------------------------
// Shared config value types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Format rule applied to a text input on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Email,
    Phone,
    Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleLayout {
    List,
    #[default]
    Grid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPosition {
    #[default]
    Inline,
    Sticky,
}

/// One selectable option of a dropdown, radio group or checkbox group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Amount added to the subtotal when this option is chosen.
    #[serde(default)]
    pub price_modifier: Money,
}

impl ChoiceOption {
    fn placeholder(n: u32) -> Self {
        Self {
            value: format!("option-{n}"),
            label: format!("Option {n}"),
            description: None,
            price_modifier: Money::ZERO,
        }
    }
}

/// A service that can be switched on in a `service_toggles` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub default_enabled: bool,
}

/// A quantity band of a `pricing_tiers` element. `max_qty: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    #[serde(default)]
    pub label: String,
    pub min_qty: u32,
    pub max_qty: Option<u32>,
    pub price_per_unit: Money,
}

impl PricingTier {
    pub fn matches(&self, quantity: f64) -> bool {
        if quantity < f64::from(self.min_qty) {
            return false;
        }
        match self.max_qty {
            None => true,
            Some(max) => quantity <= f64::from(max),
        }
    }
}

/// A fixed-price package of a `package_tiers` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub recommended: bool,
}

// ---------------------------------------------------------------------------
// Per-type configs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroConfig {
    pub title: String,
    pub subtitle: String,
    pub text_align: TextAlign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: "Your Proposal Title".into(),
            subtitle: "Subtitle goes here".into(),
            text_align: TextAlign::Center,
            background_color: Some("#1a1a1a".into()),
            text_color: Some("#ffffff".into()),
            background_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RichTextConfig {
    pub content: String,
    pub text_align: TextAlign,
    pub font_size: String,
}

impl Default for RichTextConfig {
    fn default() -> Self {
        Self {
            content: "<h2>Heading</h2><p>Your content here...</p>".into(),
            text_align: TextAlign::Left,
            font_size: "base".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageConfig {
    pub image_url: String,
    pub alt_text: String,
    pub caption: String,
    pub width: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            image_url: String::new(),
            alt_text: "Image".into(),
            caption: String::new(),
            width: "full".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoConfig {
    pub embed_url: String,
    pub aspect_ratio: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            embed_url: String::new(),
            aspect_ratio: "16:9".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberInputConfig {
    pub label: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub required: bool,
    /// Key under which the entered number is exposed to pricing elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_variable: Option<String>,
}

impl Default for NumberInputConfig {
    fn default() -> Self {
        Self {
            label: "Quantity".into(),
            placeholder: "Enter number".into(),
            min: Some(1.0),
            max: Some(1000.0),
            step: None,
            default_value: Some(1.0),
            help_text: None,
            required: true,
            pricing_variable: Some("quantity".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextInputConfig {
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<TextFormat>,
}

impl Default for TextInputConfig {
    fn default() -> Self {
        Self {
            label: "Your Name".into(),
            placeholder: String::new(),
            required: false,
            help_text: None,
            max_length: None,
            validation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextareaConfig {
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl Default for TextareaConfig {
    fn default() -> Self {
        Self {
            label: "Additional Details".into(),
            placeholder: String::new(),
            required: false,
            help_text: None,
            max_length: None,
            rows: Some(4),
        }
    }
}

/// Date bounds are ISO `YYYY-MM-DD` strings; empty means unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatePickerConfig {
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    pub help_text: String,
    pub default_value: String,
    pub min_date: String,
    pub max_date: String,
}

impl Default for DatePickerConfig {
    fn default() -> Self {
        Self {
            label: "Event Date".into(),
            placeholder: String::new(),
            required: false,
            help_text: String::new(),
            default_value: String::new(),
            min_date: String::new(),
            max_date: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropdownConfig {
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    pub help_text: String,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            label: "Select Option".into(),
            placeholder: "Choose...".into(),
            required: false,
            help_text: String::new(),
            options: vec![ChoiceOption::placeholder(1), ChoiceOption::placeholder(2)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadioGroupConfig {
    pub label: String,
    pub required: bool,
    pub layout: String,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl Default for RadioGroupConfig {
    fn default() -> Self {
        Self {
            label: "Choose One".into(),
            required: false,
            layout: "vertical".into(),
            options: vec![ChoiceOption::placeholder(1), ChoiceOption::placeholder(2)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckboxGroupConfig {
    pub label: String,
    /// When set, at least one option must be checked on submission.
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl Default for CheckboxGroupConfig {
    fn default() -> Self {
        Self {
            label: "Select All That Apply".into(),
            required: false,
            options: vec![ChoiceOption::placeholder(1), ChoiceOption::placeholder(2)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceTogglesConfig {
    pub label: String,
    #[serde(default)]
    pub services: Vec<Service>,
    pub layout: ToggleLayout,
    pub allow_multiple: bool,
}

impl Default for ServiceTogglesConfig {
    fn default() -> Self {
        Self {
            label: "Select Services".into(),
            services: vec![Service {
                id: "service-1".into(),
                name: "Service 1".into(),
                description: "Description".into(),
                base_price: Money::from_major(500),
                icon: None,
                default_enabled: false,
            }],
            layout: ToggleLayout::Grid,
            allow_multiple: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingTiersConfig {
    pub label: String,
    /// Pricing variable of the number input whose value selects the tier.
    pub based_on: String,
    pub show_calculation: bool,
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
}

impl PricingTiersConfig {
    /// First tier, in declaration order, covering `quantity`.
    pub fn find_tier(&self, quantity: f64) -> Option<&PricingTier> {
        self.tiers.iter().find(|tier| tier.matches(quantity))
    }
}

impl Default for PricingTiersConfig {
    fn default() -> Self {
        let tier = |label: &str, min_qty, max_qty, price| PricingTier {
            label: label.into(),
            min_qty,
            max_qty,
            price_per_unit: Money::from_major(price),
        };
        Self {
            label: "Pricing".into(),
            based_on: "quantity".into(),
            show_calculation: true,
            tiers: vec![
                tier("1-10 units", 1, Some(10), 100),
                tier("11-50 units", 11, Some(50), 90),
                tier("51+ units", 51, None, 80),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageTiersConfig {
    pub label: String,
    pub layout: String,
    pub allow_multiple: bool,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Default for PackageTiersConfig {
    fn default() -> Self {
        let package = |id: &str, name: &str, price, icon: &str, features: &[&str], recommended| {
            Package {
                id: id.into(),
                name: name.into(),
                price: Money::from_major(price),
                icon: Some(icon.into()),
                features: features.iter().map(|f| f.to_string()).collect(),
                recommended,
            }
        };
        Self {
            label: "Choose Your Package".into(),
            layout: "cards".into(),
            allow_multiple: false,
            packages: vec![
                package("basic", "Basic", 1000, "📦", &["Feature 1", "Feature 2", "Feature 3"], false),
                package(
                    "pro",
                    "Professional",
                    2500,
                    "🚀",
                    &["Everything in Basic", "Feature 4", "Feature 5", "Priority Support"],
                    true,
                ),
                package(
                    "enterprise",
                    "Enterprise",
                    5000,
                    "⭐",
                    &["Everything in Pro", "Feature 6", "Feature 7", "Dedicated Account Manager"],
                    false,
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingSummaryConfig {
    pub label: String,
    pub show_breakdown: bool,
    pub show_tax: bool,
    /// Fraction, e.g. `0.08` for 8%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    pub show_discount: bool,
    pub currency_symbol: String,
    pub position: SummaryPosition,
}

impl Default for PricingSummaryConfig {
    fn default() -> Self {
        Self {
            label: "Total Investment".into(),
            show_breakdown: true,
            show_tax: false,
            tax_rate: None,
            show_discount: false,
            currency_symbol: "$".into(),
            position: SummaryPosition::Inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitButtonConfig {
    pub label: String,
    pub variant: String,
    pub size: String,
    pub full_width: bool,
    pub success_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl Default for SubmitButtonConfig {
    fn default() -> Self {
        Self {
            label: "Request This Proposal".into(),
            variant: "primary".into(),
            size: "lg".into(),
            full_width: true,
            success_message: "Thank you! We will be in touch soon.".into(),
            redirect_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividerConfig {}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Configuration payload of one element, keyed by element type.
///
/// Serializes as the bare inner object; the type tag lives on the element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementConfig {
    Hero(HeroConfig),
    RichText(RichTextConfig),
    Image(ImageConfig),
    Video(VideoConfig),
    NumberInput(NumberInputConfig),
    TextInput(TextInputConfig),
    Textarea(TextareaConfig),
    DatePicker(DatePickerConfig),
    Dropdown(DropdownConfig),
    ServiceToggles(ServiceTogglesConfig),
    CheckboxGroup(CheckboxGroupConfig),
    RadioGroup(RadioGroupConfig),
    PricingTiers(PricingTiersConfig),
    PackageTiers(PackageTiersConfig),
    PricingSummary(PricingSummaryConfig),
    SubmitButton(SubmitButtonConfig),
    Divider(DividerConfig),
}

/// Default configuration for a type named on the wire.
///
/// Unknown names fail loudly instead of yielding an empty config, which
/// would hide renderer bugs.
pub fn default_config(type_name: &str) -> Result<ElementConfig, CoreError> {
    let element_type: ElementType = type_name.parse()?;
    Ok(ElementConfig::default_for(element_type))
}

impl ElementConfig {
    /// Builder defaults for a freshly added element of `element_type`.
    pub fn default_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Hero => Self::Hero(HeroConfig::default()),
            ElementType::RichText => Self::RichText(RichTextConfig::default()),
            ElementType::Image => Self::Image(ImageConfig::default()),
            ElementType::Video => Self::Video(VideoConfig::default()),
            ElementType::NumberInput => Self::NumberInput(NumberInputConfig::default()),
            ElementType::TextInput => Self::TextInput(TextInputConfig::default()),
            ElementType::Textarea => Self::Textarea(TextareaConfig::default()),
            ElementType::DatePicker => Self::DatePicker(DatePickerConfig::default()),
            ElementType::Dropdown => Self::Dropdown(DropdownConfig::default()),
            ElementType::ServiceToggles => Self::ServiceToggles(ServiceTogglesConfig::default()),
            ElementType::CheckboxGroup => Self::CheckboxGroup(CheckboxGroupConfig::default()),
            ElementType::RadioGroup => Self::RadioGroup(RadioGroupConfig::default()),
            ElementType::PricingTiers => Self::PricingTiers(PricingTiersConfig::default()),
            ElementType::PackageTiers => Self::PackageTiers(PackageTiersConfig::default()),
            ElementType::PricingSummary => Self::PricingSummary(PricingSummaryConfig::default()),
            ElementType::SubmitButton => Self::SubmitButton(SubmitButtonConfig::default()),
            ElementType::Divider => Self::Divider(DividerConfig::default()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Hero(_) => ElementType::Hero,
            Self::RichText(_) => ElementType::RichText,
            Self::Image(_) => ElementType::Image,
            Self::Video(_) => ElementType::Video,
            Self::NumberInput(_) => ElementType::NumberInput,
            Self::TextInput(_) => ElementType::TextInput,
            Self::Textarea(_) => ElementType::Textarea,
            Self::DatePicker(_) => ElementType::DatePicker,
            Self::Dropdown(_) => ElementType::Dropdown,
            Self::ServiceToggles(_) => ElementType::ServiceToggles,
            Self::CheckboxGroup(_) => ElementType::CheckboxGroup,
            Self::RadioGroup(_) => ElementType::RadioGroup,
            Self::PricingTiers(_) => ElementType::PricingTiers,
            Self::PackageTiers(_) => ElementType::PackageTiers,
            Self::PricingSummary(_) => ElementType::PricingSummary,
            Self::SubmitButton(_) => ElementType::SubmitButton,
            Self::Divider(_) => ElementType::Divider,
        }
    }

    /// Parse a raw JSON payload against the schema of `element_type`.
    pub fn from_value(
        element_type: ElementType,
        value: serde_json::Value,
    ) -> Result<Self, CoreError> {
        fn parse<T: serde::de::DeserializeOwned>(
            element_type: ElementType,
            value: serde_json::Value,
        ) -> Result<T, CoreError> {
            serde_json::from_value(value).map_err(|e| {
                CoreError::Validation(format!("Invalid config for {element_type} element: {e}"))
            })
        }

        // A missing payload means "all defaults".
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };

        Ok(match element_type {
            ElementType::Hero => Self::Hero(parse(element_type, value)?),
            ElementType::RichText => Self::RichText(parse(element_type, value)?),
            ElementType::Image => Self::Image(parse(element_type, value)?),
            ElementType::Video => Self::Video(parse(element_type, value)?),
            ElementType::NumberInput => Self::NumberInput(parse(element_type, value)?),
            ElementType::TextInput => Self::TextInput(parse(element_type, value)?),
            ElementType::Textarea => Self::Textarea(parse(element_type, value)?),
            ElementType::DatePicker => Self::DatePicker(parse(element_type, value)?),
            ElementType::Dropdown => Self::Dropdown(parse(element_type, value)?),
            ElementType::ServiceToggles => Self::ServiceToggles(parse(element_type, value)?),
            ElementType::CheckboxGroup => Self::CheckboxGroup(parse(element_type, value)?),
            ElementType::RadioGroup => Self::RadioGroup(parse(element_type, value)?),
            ElementType::PricingTiers => Self::PricingTiers(parse(element_type, value)?),
            ElementType::PackageTiers => Self::PackageTiers(parse(element_type, value)?),
            ElementType::PricingSummary => Self::PricingSummary(parse(element_type, value)?),
            ElementType::SubmitButton => Self::SubmitButton(parse(element_type, value)?),
            ElementType::Divider => Self::Divider(parse(element_type, value)?),
        })
    }

    /// Semantic checks that the serde schema alone cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::NumberInput(c) => {
                if let (Some(min), Some(max)) = (c.min, c.max) {
                    if min > max {
                        return Err(invalid(format!(
                            "Number input '{}' has min {min} greater than max {max}",
                            c.label
                        )));
                    }
                }
                if matches!(&c.pricing_variable, Some(v) if v.trim().is_empty()) {
                    return Err(invalid(format!(
                        "Number input '{}' has an empty pricing variable",
                        c.label
                    )));
                }
            }
            Self::TextInput(TextInputConfig { max_length: Some(0), label, .. })
            | Self::Textarea(TextareaConfig { max_length: Some(0), label, .. }) => {
                return Err(invalid(format!("Field '{label}' has a max length of zero")));
            }
            Self::Dropdown(c) => check_options(&c.label, &c.options)?,
            Self::RadioGroup(c) => check_options(&c.label, &c.options)?,
            Self::CheckboxGroup(c) => check_options(&c.label, &c.options)?,
            Self::ServiceToggles(c) => {
                check_unique_ids(&c.label, c.services.iter().map(|s| s.id.as_str()))?;
                if let Some(s) = c.services.iter().find(|s| s.base_price.is_negative()) {
                    return Err(invalid(format!("Service '{}' has a negative price", s.name)));
                }
            }
            Self::PricingTiers(c) => {
                if c.based_on.trim().is_empty() {
                    return Err(invalid(format!(
                        "Pricing tiers '{}' must name the input they are based on",
                        c.label
                    )));
                }
                for tier in &c.tiers {
                    if matches!(tier.max_qty, Some(max) if max < tier.min_qty) {
                        return Err(invalid(format!(
                            "Tier '{}' has maxQty below minQty",
                            tier.label
                        )));
                    }
                    if tier.price_per_unit.is_negative() {
                        return Err(invalid(format!("Tier '{}' has a negative price", tier.label)));
                    }
                }
            }
            Self::PackageTiers(c) => {
                check_unique_ids(&c.label, c.packages.iter().map(|p| p.id.as_str()))?;
                if let Some(p) = c.packages.iter().find(|p| p.price.is_negative()) {
                    return Err(invalid(format!("Package '{}' has a negative price", p.name)));
                }
            }
            Self::PricingSummary(c) => {
                if let Some(rate) = c.tax_rate {
                    if !(0.0..=1.0).contains(&rate) {
                        return Err(invalid(format!(
                            "Tax rate must be a fraction between 0 and 1 (got {rate})"
                        )));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn invalid(msg: String) -> CoreError {
    CoreError::Validation(msg)
}

fn check_options(label: &str, options: &[ChoiceOption]) -> Result<(), CoreError> {
    check_unique_ids(label, options.iter().map(|o| o.value.as_str()))
}

fn check_unique_ids<'a>(label: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(invalid(format!("'{label}' contains an entry with an empty id")));
        }
        if !seen.insert(id) {
            return Err(invalid(format!("'{label}' contains duplicate id '{id}'")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Wire shape of an element before its config is checked against its type.
#[derive(Debug, Deserialize)]
pub struct RawElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub order: u32,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One configurable unit of a proposal template.
///
/// The type tag is fixed at creation; only the config payload and order
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElement")]
pub struct ProposalElement {
    id: String,
    #[serde(rename = "type")]
    element_type: ElementType,
    order: u32,
    config: ElementConfig,
}

impl ProposalElement {
    /// A new element with a fresh id and default config.
    pub fn new(element_type: ElementType, order: u32) -> Self {
        Self {
            id: element_type.new_element_id(),
            element_type,
            order,
            config: ElementConfig::default_for(element_type),
        }
    }

    /// Build an element with an explicit id and config.
    pub fn with_config(id: impl Into<String>, order: u32, config: ElementConfig) -> Self {
        Self {
            id: id.into(),
            element_type: config.element_type(),
            order,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    /// Replace the config wholesale. The new payload must match the element type.
    pub fn set_config(&mut self, config: ElementConfig) -> Result<(), CoreError> {
        if config.element_type() != self.element_type {
            return Err(CoreError::Validation(format!(
                "Cannot assign a {} config to {} element '{}'",
                config.element_type(),
                self.element_type,
                self.id
            )));
        }
        self.config = config;
        Ok(())
    }
}

impl TryFrom<RawElement> for ProposalElement {
    type Error = CoreError;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(CoreError::Validation("Element id must not be empty".into()));
        }
        let element_type: ElementType = raw.element_type.parse()?;
        let config = ElementConfig::from_value(element_type, raw.config)?;
        config.validate()?;
        Ok(Self {
            id: raw.id,
            element_type,
            order: raw.order,
            config,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn every_type_round_trips_through_its_name() {
        for t in ElementType::ALL {
            assert_eq!(t.as_str().parse::<ElementType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_type_name_is_an_error_not_an_empty_config() {
        assert_matches!(
            default_config("carousel"),
            Err(CoreError::UnknownElementType(name)) if name == "carousel"
        );
    }

    #[test]
    fn hero_defaults() {
        let ElementConfig::Hero(hero) = default_config("hero").unwrap() else {
            panic!("expected hero config");
        };
        assert_eq!(hero.title, "Your Proposal Title");
        assert_eq!(hero.text_align, TextAlign::Center);
    }

    #[test]
    fn defaults_match_their_type_and_validate() {
        for t in ElementType::ALL {
            let config = ElementConfig::default_for(t);
            assert_eq!(config.element_type(), t);
            config.validate().unwrap();
        }
    }

    #[test]
    fn number_input_default_exposes_quantity_variable() {
        let ElementConfig::NumberInput(c) = ElementConfig::default_for(ElementType::NumberInput)
        else {
            panic!("expected number input config");
        };
        assert_eq!(c.pricing_variable.as_deref(), Some("quantity"));
        assert!(c.required);
        assert_eq!(c.min, Some(1.0));
        assert_eq!(c.max, Some(1000.0));
    }

    #[test]
    fn default_config_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(ElementConfig::default_for(ElementType::PricingTiers))
            .unwrap();
        assert_eq!(value["basedOn"], "quantity");
        assert_eq!(value["tiers"][0]["minQty"], 1);
        assert_eq!(value["tiers"][2]["maxQty"], serde_json::Value::Null);
        assert_eq!(value["tiers"][1]["pricePerUnit"], 90.0);
    }

    #[test]
    fn element_deserializes_from_wire_shape() {
        let element: ProposalElement = serde_json::from_value(json!({
            "id": "service_toggles-1",
            "type": "service_toggles",
            "order": 3,
            "config": {
                "label": "Add-ons",
                "services": [
                    {"id": "drone", "name": "Drone", "basePrice": 750, "defaultEnabled": true}
                ]
            }
        }))
        .unwrap();

        assert_eq!(element.element_type(), ElementType::ServiceToggles);
        assert_eq!(element.order(), 3);
        let ElementConfig::ServiceToggles(c) = element.config() else {
            panic!("expected service toggles");
        };
        assert_eq!(c.services[0].base_price, Money::from_major(750));
        assert!(c.services[0].default_enabled);
        assert!(c.allow_multiple, "missing fields fall back to defaults");
    }

    #[test]
    fn element_with_unknown_type_is_rejected() {
        let err = serde_json::from_value::<ProposalElement>(json!({
            "id": "x", "type": "carousel", "order": 0, "config": {}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Unknown element type"));
    }

    #[test]
    fn element_with_malformed_config_is_rejected() {
        let err = serde_json::from_value::<ProposalElement>(json!({
            "id": "x", "type": "pricing_tiers", "order": 0,
            "config": {"tiers": [{"minQty": "one", "maxQty": null, "pricePerUnit": 10}]}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Invalid config for pricing_tiers"));
    }

    #[test]
    fn inverted_tier_range_fails_validation() {
        let config = ElementConfig::PricingTiers(PricingTiersConfig {
            tiers: vec![PricingTier {
                label: "bad".into(),
                min_qty: 10,
                max_qty: Some(5),
                price_per_unit: Money::from_major(1),
            }],
            ..Default::default()
        });
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_package_ids_fail_validation() {
        let mut c = PackageTiersConfig::default();
        c.packages[1].id = "basic".into();
        assert_matches!(
            ElementConfig::PackageTiers(c).validate(),
            Err(CoreError::Validation(msg)) if msg.contains("duplicate id 'basic'")
        );
    }

    #[test]
    fn tax_rate_out_of_range_fails_validation() {
        let c = PricingSummaryConfig {
            tax_rate: Some(8.0),
            ..Default::default()
        };
        assert!(ElementConfig::PricingSummary(c).validate().is_err());
    }

    #[test]
    fn set_config_rejects_mismatched_variant() {
        let mut element = ProposalElement::new(ElementType::Hero, 0);
        let err = element
            .set_config(ElementConfig::default_for(ElementType::Divider))
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(element.element_type(), ElementType::Hero);
    }

    #[test]
    fn fresh_ids_do_not_collide() {
        let ids: HashSet<String> = (0..1_000)
            .map(|_| ElementType::Hero.new_element_id())
            .collect();
        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|id| id.starts_with("hero-")));
    }

    #[test]
    fn palette_metadata_categories() {
        assert_eq!(ElementType::PricingTiers.metadata().category, ElementCategory::Pricing);
        assert_eq!(ElementType::Divider.metadata().category, ElementCategory::Actions);
        assert_eq!(ElementCategory::Selections.label(), "Selections");
    }
}
