use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use commandcentered_core::error::CoreError;
use commandcentered_core::types::DbId;
use commandcentered_db::models::proposal_submission::UpdateSubmissionStatus;
use commandcentered_db::repositories::ProposalSubmissionRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/proposal-submissions/{id}/status
pub async fn update_submission_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubmissionStatus>,
) -> AppResult<impl IntoResponse> {
    let submission = ProposalSubmissionRepo::update_status(&state.pool, id, input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProposalSubmission",
            id,
        }))?;

    tracing::info!(submission_id = id, status = %input.status, "Submission status updated");

    Ok(Json(DataResponse { data: submission }))
}
