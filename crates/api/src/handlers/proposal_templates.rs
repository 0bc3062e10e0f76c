//! Handlers for proposal template management.
//!
//! Every write runs the submitted `config_json` through the element model,
//! so unknown element types and malformed configs are rejected before they
//! reach the database. Pricing references must resolve; tier coverage gaps
//! come back as warnings alongside the saved template.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use commandcentered_core::elements::{ElementConfig, ElementMetadata, ElementType};
use commandcentered_core::error::CoreError;
use commandcentered_core::persistence::TemplateBackend;
use commandcentered_core::template::{self, CoverageWarning, TemplateConfig, TemplateDocument};
use commandcentered_core::types::{
    clamp_limit, clamp_offset, DbId, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use commandcentered_db::backend::PgTemplateBackend;
use commandcentered_db::models::proposal_template::{
    CreateProposalTemplate, DuplicateProposalTemplate, ProposalTemplate, UpdateProposalTemplate,
};
use commandcentered_db::repositories::{ProposalSubmissionRepo, ProposalTemplateRepo};
use commandcentered_db::DbPool;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::{PaginationParams, TemplateListParams};
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "ProposalTemplate";

/// A template as returned by create and update, with the tier coverage gaps
/// found in the saved document.
#[derive(Debug, Serialize)]
pub struct SavedTemplate {
    #[serde(flatten)]
    pub template: ProposalTemplate,
    pub coverage_warnings: Vec<CoverageWarning>,
}

/// One palette entry of the builder.
#[derive(Debug, Serialize)]
pub struct ElementTypeInfo {
    #[serde(flatten)]
    pub metadata: ElementMetadata,
    pub category_label: &'static str,
    pub default_config: ElementConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_template(pool: &DbPool, id: DbId) -> AppResult<ProposalTemplate> {
    ProposalTemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
}

async fn ensure_slug_available(pool: &DbPool, slug: &str, exclude_id: Option<DbId>) -> AppResult<()> {
    if ProposalTemplateRepo::slug_exists(pool, slug, exclude_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Slug '{slug}' is already in use"
        ))));
    }
    Ok(())
}

fn encode_config(config: &TemplateConfig) -> AppResult<serde_json::Value> {
    serde_json::to_value(config)
        .map_err(|e| AppError::InternalError(format!("Failed to encode template config: {e}")))
}

fn saved(template: ProposalTemplate, document: &TemplateDocument) -> SavedTemplate {
    SavedTemplate {
        template,
        coverage_warnings: template::audit_tier_coverage(document.elements()),
    }
}

// ---------------------------------------------------------------------------
// GET /api/v1/proposal-templates
// ---------------------------------------------------------------------------

/// List templates with submission counts, newest first.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let service_type = params.service_type.as_deref().filter(|s| !s.is_empty());

    let templates =
        ProposalTemplateRepo::list(&state.pool, search, service_type, limit, offset).await?;

    Ok(Json(DataResponse { data: templates }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/proposal-templates
// ---------------------------------------------------------------------------

pub async fn create_template(
    State(state): State<AppState>,
    Json(mut input): Json<CreateProposalTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let config_json = match input.config_json.take() {
        Some(value) => TemplateConfig::from_value(value)?,
        None => TemplateConfig::default(),
    };
    let document = TemplateDocument {
        name: input.name.clone(),
        slug: input.slug.clone(),
        description: input.description.clone(),
        config_json,
    };
    document.validate()?;
    ensure_slug_available(&state.pool, &document.slug, None).await?;

    input.config_json = Some(encode_config(&document.config_json)?);
    let template = ProposalTemplateRepo::create(&state.pool, &input).await?;

    tracing::info!(
        template_id = template.id,
        slug = %template.slug,
        elements = document.elements().len(),
        "Proposal template created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: saved(template, &document),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /api/v1/proposal-templates/element-types
// ---------------------------------------------------------------------------

/// Palette metadata for every element type, with its default config.
pub async fn list_element_types() -> AppResult<impl IntoResponse> {
    let types: Vec<ElementTypeInfo> = ElementType::ALL
        .into_iter()
        .map(|element_type| {
            let metadata = element_type.metadata();
            ElementTypeInfo {
                category_label: metadata.category.label(),
                metadata,
                default_config: ElementConfig::default_for(element_type),
            }
        })
        .collect();

    Ok(Json(DataResponse { data: types }))
}

// ---------------------------------------------------------------------------
// GET /api/v1/proposal-templates/{id}
// ---------------------------------------------------------------------------

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = find_template(&state.pool, id).await?;
    Ok(Json(DataResponse { data: template }))
}

// ---------------------------------------------------------------------------
// PUT /api/v1/proposal-templates/{id}
// ---------------------------------------------------------------------------

/// Patch a template's draft. The published snapshot is left untouched until
/// the next publish.
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProposalTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let existing = find_template(&state.pool, id).await?;
    let current = existing.document()?;

    let config_json = match input.config_json.take() {
        Some(value) => TemplateConfig::from_value(value)?,
        None => current.config_json,
    };
    let document = TemplateDocument {
        name: input.name.clone().unwrap_or(current.name),
        slug: input.slug.clone().unwrap_or(current.slug),
        description: input.description.clone().or(current.description),
        config_json,
    };
    document.validate()?;
    if document.slug != existing.slug {
        ensure_slug_available(&state.pool, &document.slug, Some(id)).await?;
    }

    input.config_json = Some(encode_config(&document.config_json)?);
    let template = ProposalTemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;

    tracing::info!(template_id = id, "Proposal template updated");

    Ok(Json(DataResponse {
        data: saved(template, &document),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/proposal-templates/{id}
// ---------------------------------------------------------------------------

/// Delete a template. Refused with 409 while submissions reference it.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_template(&state.pool, id).await?;

    let submissions = ProposalTemplateRepo::count_submissions(&state.pool, id).await?;
    if submissions > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Template has {submissions} submission(s) and cannot be deleted"
        ))));
    }

    ProposalTemplateRepo::delete(&state.pool, id).await?;
    tracing::info!(template_id = id, "Proposal template deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /api/v1/proposal-templates/{id}/publish
// ---------------------------------------------------------------------------

/// Make the current draft the live version served under its slug.
pub async fn publish_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let backend = PgTemplateBackend::new(state.pool.clone(), state.config.public_base_url.clone());
    let published = backend.publish(id).await?;

    tracing::info!(
        template_id = id,
        url = %published.published_url,
        "Proposal template published",
    );

    Ok(Json(DataResponse { data: published }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/proposal-templates/{id}/duplicate
// ---------------------------------------------------------------------------

pub async fn duplicate_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DuplicateProposalTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    find_template(&state.pool, id).await?;
    ensure_slug_available(&state.pool, &input.new_slug, None).await?;

    let copy = ProposalTemplateRepo::duplicate(&state.pool, id, &input.new_name, &input.new_slug)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;

    tracing::info!(
        template_id = id,
        copy_id = copy.id,
        slug = %copy.slug,
        "Proposal template duplicated",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}

// ---------------------------------------------------------------------------
// GET /api/v1/proposal-templates/{id}/submissions
// ---------------------------------------------------------------------------

pub async fn list_submissions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    find_template(&state.pool, id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let submissions =
        ProposalSubmissionRepo::list_for_template(&state.pool, id, limit, offset).await?;

    Ok(Json(DataResponse { data: submissions }))
}
