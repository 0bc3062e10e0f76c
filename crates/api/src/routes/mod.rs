pub mod health;
pub mod proposal_submissions;
pub mod proposal_templates;
pub mod public_proposals;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /proposal-templates                              list, create (GET, POST)
/// /proposal-templates/element-types                palette metadata (GET)
/// /proposal-templates/{id}                         get, update, delete
/// /proposal-templates/{id}/publish                 publish (POST)
/// /proposal-templates/{id}/duplicate               duplicate as draft (POST)
/// /proposal-templates/{id}/submissions             list submissions (GET)
///
/// /proposal-submissions/{id}/status                update status (PUT)
///
/// /public/proposals/{slug}                         published snapshot (GET)
/// /public/proposals/{slug}/price                   pricing preview (POST)
/// /public/proposals/{slug}/submissions             submit (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/proposal-templates", proposal_templates::router())
        .nest("/proposal-submissions", proposal_submissions::router())
        .nest("/public/proposals", public_proposals::router())
}
