//! Unauthenticated routes serving published proposals to clients.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public_proposals;
use crate::state::AppState;

/// Public proposal routes mounted at `/public/proposals`.
///
/// ```text
/// GET  /{slug}              -> get_published_proposal
/// POST /{slug}/price        -> price_proposal
/// POST /{slug}/submissions  -> submit_proposal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(public_proposals::get_published_proposal))
        .route("/{slug}/price", post(public_proposals::price_proposal))
        .route("/{slug}/submissions", post(public_proposals::submit_proposal))
}
