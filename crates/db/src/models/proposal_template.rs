//! Proposal template models and DTOs.
//!
//! Defines the database row struct for `proposal_templates`, the list
//! projection with submission counts, and the create/update/duplicate
//! request types used by the API layer.

use commandcentered_core::error::CoreError;
use commandcentered_core::template::{self, TemplateConfig, TemplateDocument};
use commandcentered_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `proposal_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalTemplate {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub config_json: serde_json::Value,
    pub published_config_json: Option<serde_json::Value>,
    pub published_name: Option<String>,
    pub published_description: Option<String>,
    pub published_slug: Option<String>,
    pub published_url: Option<String>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProposalTemplate {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// The editable document.
    pub fn document(&self) -> Result<TemplateDocument, CoreError> {
        Ok(TemplateDocument {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            config_json: self.parse_config(&self.config_json)?,
        })
    }

    /// The live snapshot taken at the last publish, if any.
    pub fn published_document(&self) -> Result<Option<TemplateDocument>, CoreError> {
        let (Some(config), Some(name), Some(slug)) = (
            &self.published_config_json,
            &self.published_name,
            &self.published_slug,
        ) else {
            return Ok(None);
        };
        Ok(Some(TemplateDocument {
            name: name.clone(),
            slug: slug.clone(),
            description: self.published_description.clone(),
            config_json: self.parse_config(config)?,
        }))
    }

    /// Stored configs were validated on write, so a parse failure here is
    /// data corruption rather than bad input.
    fn parse_config(&self, value: &serde_json::Value) -> Result<TemplateConfig, CoreError> {
        TemplateConfig::from_value(value.clone()).map_err(|e| {
            CoreError::Internal(format!(
                "Stored config of proposal template {} is unreadable: {e}",
                self.id
            ))
        })
    }
}

/// A template as shown in the list view, with its submission count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalTemplateSummary {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub published_url: Option<String>,
    pub published_at: Option<Timestamp>,
    pub submission_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public projection of a published template.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedProposal {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(rename = "configJson")]
    pub config_json: TemplateConfig,
    pub published_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new proposal template.
///
/// `config_json` is accepted untyped and replaced with the normalized
/// document by the handler before it reaches the repository.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProposalTemplate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug_format"))]
    pub slug: String,
    #[validate(length(max = 100))]
    pub service_type: Option<String>,
    pub description: Option<String>,
    #[serde(default, alias = "configJson")]
    pub config_json: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating a proposal template.
/// All fields are optional; only provided fields are updated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProposalTemplate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug_format"))]
    pub slug: Option<String>,
    #[validate(length(max = 100))]
    pub service_type: Option<String>,
    pub description: Option<String>,
    #[serde(default, alias = "configJson")]
    pub config_json: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Request body for duplicating a template as a new draft.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DuplicateProposalTemplate {
    #[validate(length(min = 1, max = 255))]
    pub new_name: String,
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug_format"))]
    pub new_slug: String,
}

fn validate_slug_format(slug: &str) -> Result<(), ValidationError> {
    template::validate_slug(slug).map_err(|_| {
        ValidationError::new("slug_format")
            .with_message("must contain only lowercase letters, numbers, and hyphens".into())
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row(config_json: serde_json::Value) -> ProposalTemplate {
        ProposalTemplate {
            id: 7,
            name: "Gala".into(),
            slug: "gala".into(),
            service_type: None,
            description: None,
            config_json,
            published_config_json: None,
            published_name: None,
            published_description: None,
            published_slug: None,
            published_url: None,
            published_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_dto_rejects_bad_slug() {
        let input = CreateProposalTemplate {
            name: "Gala".into(),
            slug: "Spring Gala".into(),
            service_type: None,
            description: None,
            config_json: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("slug"));
    }

    #[test]
    fn update_dto_validates_only_present_fields() {
        assert!(UpdateProposalTemplate::default().validate().is_ok());
        let input = UpdateProposalTemplate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn unpublished_row_has_no_live_document() {
        let template = row(json!({"elements": [], "theme_config": {}}));
        assert!(!template.is_published());
        assert!(template.published_document().unwrap().is_none());
        assert_eq!(template.document().unwrap().slug, "gala");
    }

    #[test]
    fn live_document_uses_published_title() {
        let mut template = row(json!({"elements": [], "theme_config": {}}));
        template.name = "Gala (draft rename)".into();
        template.description = Some("Draft blurb".into());
        template.published_config_json = Some(json!({"elements": [], "theme_config": {}}));
        template.published_name = Some("Gala".into());
        template.published_slug = Some("gala".into());
        template.published_at = Some(Utc::now());

        let live = template.published_document().unwrap().unwrap();
        assert_eq!(live.name, "Gala");
        assert_eq!(live.description, None);
        assert_eq!(template.document().unwrap().name, "Gala (draft rename)");
    }

    #[test]
    fn corrupt_stored_config_is_internal_error() {
        let template = row(json!({"elements": [{"id": "x", "type": "nope", "order": 0}]}));
        assert!(matches!(template.document(), Err(CoreError::Internal(_))));
    }
}
