//! Persistence contract between the editor and the backend procedure layer.
//!
//! The core never talks to a database. Whatever stores templates (the
//! PostgreSQL repository in the `db` crate, or an in-memory map in tests)
//! implements [`TemplateBackend`]. Errors from the backend are returned to
//! the caller unchanged.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::template::TemplateDocument;
use crate::types::{DbId, Timestamp};

/// A template as the backend holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    pub id: DbId,
    pub document: TemplateDocument,
    pub is_published: bool,
    pub published_url: Option<String>,
    pub updated_at: Timestamp,
}

/// Outcome of publishing a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedTemplate {
    pub id: DbId,
    pub slug: String,
    pub published_url: String,
    pub published_at: Timestamp,
}

#[async_trait]
pub trait TemplateBackend: Send + Sync {
    async fn get(&self, id: DbId) -> Result<StoredTemplate, CoreError>;

    async fn create(&self, document: &TemplateDocument) -> Result<StoredTemplate, CoreError>;

    async fn update(
        &self,
        id: DbId,
        document: &TemplateDocument,
    ) -> Result<StoredTemplate, CoreError>;

    /// Snapshot the stored document as the live version and return its
    /// public URL. Publishing an already published template overwrites the
    /// snapshot.
    async fn publish(&self, id: DbId) -> Result<PublishedTemplate, CoreError>;
}
