//! PostgreSQL implementation of the core persistence contract.

use async_trait::async_trait;
use commandcentered_core::error::CoreError;
use commandcentered_core::persistence::{PublishedTemplate, StoredTemplate, TemplateBackend};
use commandcentered_core::template::{self, TemplateDocument};
use commandcentered_core::types::DbId;
use sqlx::PgPool;

use crate::models::proposal_template::{CreateProposalTemplate, ProposalTemplate};
use crate::repositories::ProposalTemplateRepo;

const ENTITY: &str = "ProposalTemplate";

/// [`TemplateBackend`] over the `proposal_templates` table.
#[derive(Debug, Clone)]
pub struct PgTemplateBackend {
    pool: PgPool,
    public_base_url: String,
}

impl PgTemplateBackend {
    /// `public_base_url` prefixes the preview URL handed out on publish.
    pub fn new(pool: PgPool, public_base_url: impl Into<String>) -> Self {
        Self {
            pool,
            public_base_url: public_base_url.into(),
        }
    }

    async fn find(&self, id: DbId) -> Result<ProposalTemplate, CoreError> {
        ProposalTemplateRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })
    }
}

#[async_trait]
impl TemplateBackend for PgTemplateBackend {
    async fn get(&self, id: DbId) -> Result<StoredTemplate, CoreError> {
        stored(self.find(id).await?)
    }

    async fn create(&self, document: &TemplateDocument) -> Result<StoredTemplate, CoreError> {
        let input = CreateProposalTemplate {
            name: document.name.clone(),
            slug: document.slug.clone(),
            service_type: None,
            description: document.description.clone(),
            config_json: Some(encode_config(document)?),
        };
        let row = ProposalTemplateRepo::create(&self.pool, &input)
            .await
            .map_err(map_db_error)?;
        tracing::debug!(template_id = row.id, "Proposal template row created");
        stored(row)
    }

    async fn update(
        &self,
        id: DbId,
        document: &TemplateDocument,
    ) -> Result<StoredTemplate, CoreError> {
        let config_json = encode_config(document)?;
        let row = ProposalTemplateRepo::replace_document(
            &self.pool,
            id,
            &document.name,
            &document.slug,
            document.description.as_deref(),
            &config_json,
        )
        .await
        .map_err(map_db_error)?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        stored(row)
    }

    async fn publish(&self, id: DbId) -> Result<PublishedTemplate, CoreError> {
        let row = self.find(id).await?;
        if row.document()?.elements().is_empty() {
            return Err(CoreError::Validation(
                "Cannot publish template without any elements".into(),
            ));
        }

        let url = template::public_url(&self.public_base_url, &row.slug);
        let row = ProposalTemplateRepo::publish(&self.pool, id, &url)
            .await
            .map_err(map_db_error)?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;

        Ok(PublishedTemplate {
            id: row.id,
            slug: row.slug,
            published_url: url,
            published_at: row.published_at.unwrap_or(row.updated_at),
        })
    }
}

fn stored(row: ProposalTemplate) -> Result<StoredTemplate, CoreError> {
    Ok(StoredTemplate {
        id: row.id,
        document: row.document()?,
        is_published: row.is_published(),
        published_url: row.published_url,
        updated_at: row.updated_at,
    })
}

fn encode_config(document: &TemplateDocument) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(&document.config_json)
        .map_err(|e| CoreError::Internal(format!("Failed to encode template config: {e}")))
}

/// Unique violations become conflicts; everything else is a persistence
/// failure reported as-is.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    CoreError::Persistence(err.to_string())
}
