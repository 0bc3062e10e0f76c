//! Repository for the `proposal_templates` table.

use commandcentered_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

use crate::models::proposal_template::{
    CreateProposalTemplate, ProposalTemplate, ProposalTemplateSummary, UpdateProposalTemplate,
};

/// Column list for proposal_templates queries.
const COLUMNS: &str = "id, name, slug, service_type, description, config_json, \
    published_config_json, published_name, published_description, published_slug, \
    published_url, published_at, created_at, updated_at";

/// Provides CRUD and lifecycle operations for proposal templates.
pub struct ProposalTemplateRepo;

impl ProposalTemplateRepo {
    /// Insert a new draft template. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProposalTemplate,
    ) -> Result<ProposalTemplate, sqlx::Error> {
        let config_json = input
            .config_json
            .clone()
            .unwrap_or_else(|| json!({ "elements": [], "theme_config": {} }));
        let query = format!(
            "INSERT INTO proposal_templates
                (name, slug, service_type, description, config_json)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.service_type)
            .bind(&input.description)
            .bind(&config_json)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposal_templates WHERE id = $1");
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the template whose live version is served under `slug`.
    ///
    /// Matches the slug captured at publish time, so renaming a draft does
    /// not break its public link until it is published again.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposal_templates
             WHERE published_slug = $1 AND published_at IS NOT NULL"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List templates, newest first, with their submission counts.
    ///
    /// `search` matches name or description case-insensitively;
    /// `service_type` is an exact filter.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        service_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProposalTemplateSummary>, sqlx::Error> {
        let pattern = search.map(|term| format!("%{term}%"));
        sqlx::query_as::<_, ProposalTemplateSummary>(
            "SELECT t.id, t.name, t.slug, t.service_type, t.description,
                    t.published_url, t.published_at,
                    COUNT(s.id) AS submission_count,
                    t.created_at, t.updated_at
             FROM proposal_templates t
             LEFT JOIN proposal_submissions s ON s.template_id = t.id
             WHERE ($1::text IS NULL OR t.name ILIKE $1 OR t.description ILIKE $1)
               AND ($2::text IS NULL OR t.service_type = $2)
             GROUP BY t.id
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(&pattern)
        .bind(service_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Update a template. Only provided fields are updated; the published
    /// snapshot is never touched. Returns `None` if the template does not
    /// exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProposalTemplate,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE proposal_templates SET
                name         = COALESCE($1, name),
                slug         = COALESCE($2, slug),
                service_type = COALESCE($3, service_type),
                description  = COALESCE($4, description),
                config_json  = COALESCE($5, config_json)
             WHERE id = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.service_type)
            .bind(&input.description)
            .bind(&input.config_json)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a template's document wholesale. A `None` description
    /// clears it. `service_type` and the published snapshot are untouched.
    /// Returns `None` if the template does not exist.
    pub async fn replace_document(
        pool: &PgPool,
        id: DbId,
        name: &str,
        slug: &str,
        description: Option<&str>,
        config_json: &serde_json::Value,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE proposal_templates SET
                name        = $2,
                slug        = $3,
                description = $4,
                config_json = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(id)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(config_json)
            .fetch_optional(pool)
            .await
    }

    /// Snapshot the current document as the live version.
    ///
    /// Re-publishing overwrites the previous snapshot and URL. Returns
    /// `None` if the template does not exist.
    pub async fn publish(
        pool: &PgPool,
        id: DbId,
        published_url: &str,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE proposal_templates SET
                published_config_json = config_json,
                published_name        = name,
                published_description = description,
                published_slug        = slug,
                published_url         = $2,
                published_at          = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(id)
            .bind(published_url)
            .fetch_optional(pool)
            .await
    }

    /// Copy a template's draft content into a new unpublished template.
    /// Returns `None` if the original does not exist.
    pub async fn duplicate(
        pool: &PgPool,
        id: DbId,
        new_name: &str,
        new_slug: &str,
    ) -> Result<Option<ProposalTemplate>, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposal_templates
                (name, slug, service_type, description, config_json)
             SELECT $2, $3, service_type, description, config_json
             FROM proposal_templates WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalTemplate>(&query)
            .bind(id)
            .bind(new_name)
            .bind(new_slug)
            .fetch_optional(pool)
            .await
    }

    /// Delete a template by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM proposal_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `slug` is taken by any template other than `exclude_id`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM proposal_templates
                WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Number of submissions recorded against a template.
    pub async fn count_submissions(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM proposal_submissions WHERE template_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
