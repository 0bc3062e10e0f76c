//! Handlers for the client-facing side of a published proposal.
//!
//! Everything here reads the snapshot taken at publish time, never the
//! working draft.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use commandcentered_core::form::FormValues;
use commandcentered_core::pricing::{self, PricingResult};
use commandcentered_core::submission;
use commandcentered_core::template::TemplateDocument;
use commandcentered_core::types::{DbId, Timestamp};
use commandcentered_db::models::proposal_submission::CreateProposalSubmission;
use commandcentered_db::models::proposal_template::{ProposalTemplate, PublishedProposal};
use commandcentered_db::repositories::{ProposalSubmissionRepo, ProposalTemplateRepo};
use commandcentered_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of the price and submit endpoints: the client's entered values,
/// keyed by field name.
#[derive(Debug, Deserialize)]
pub struct ProposalForm {
    #[serde(default)]
    pub values: FormValues,
}

/// Returned to the client once a submission is stored.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: DbId,
    pub status: String,
    pub formatted_total: String,
    pub pricing: PricingResult,
    pub created_at: Timestamp,
}

async fn load_published(pool: &DbPool, slug: &str) -> AppResult<(ProposalTemplate, TemplateDocument)> {
    let not_found = || AppError::NotFound(format!("No published proposal at '{slug}'"));

    let template = ProposalTemplateRepo::find_published_by_slug(pool, slug)
        .await?
        .ok_or_else(not_found)?;
    let document = template.published_document()?.ok_or_else(not_found)?;
    Ok((template, document))
}

// ---------------------------------------------------------------------------
// GET /api/v1/public/proposals/{slug}
// ---------------------------------------------------------------------------

pub async fn get_published_proposal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (template, document) = load_published(&state.pool, &slug).await?;

    Ok(Json(DataResponse {
        data: PublishedProposal {
            id: template.id,
            name: document.name,
            slug: document.slug,
            description: document.description,
            config_json: document.config_json,
            published_at: template.published_at,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/public/proposals/{slug}/price
// ---------------------------------------------------------------------------

/// Live pricing preview. Never fails on incomplete input; fields that are
/// not filled in yet simply contribute nothing.
pub async fn price_proposal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<ProposalForm>,
) -> AppResult<impl IntoResponse> {
    let (_, document) = load_published(&state.pool, &slug).await?;
    let result = pricing::evaluate(document.elements(), &form.values);

    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/public/proposals/{slug}/submissions
// ---------------------------------------------------------------------------

/// Validate, price and store a client's submission. Field problems come back
/// as 422 with one entry per offending field.
pub async fn submit_proposal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<ProposalForm>,
) -> AppResult<impl IntoResponse> {
    let (template, document) = load_published(&state.pool, &slug).await?;

    let prepared = submission::prepare_submission(document.elements(), form.values)?;
    let input = CreateProposalSubmission::from_submission(template.id, &prepared)?;
    let stored = ProposalSubmissionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        template_id = template.id,
        submission_id = stored.id,
        total_cents = stored.total_cents,
        "Proposal submission received",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionReceipt {
                id: stored.id,
                status: stored.status,
                formatted_total: prepared.pricing.formatted_total(),
                pricing: prepared.pricing,
                created_at: stored.created_at,
            },
        }),
    ))
}
