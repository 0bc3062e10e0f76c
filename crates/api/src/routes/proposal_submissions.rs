use axum::routing::put;
use axum::Router;

use crate::handlers::proposal_submissions;
use crate::state::AppState;

/// Submission review routes mounted at `/proposal-submissions`.
///
/// ```text
/// PUT /{id}/status  -> update_submission_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}/status",
        put(proposal_submissions::update_submission_status),
    )
}
