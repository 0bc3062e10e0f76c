//! Route definitions for proposal template management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::proposal_templates;
use crate::state::AppState;

/// Template routes mounted at `/proposal-templates`.
///
/// ```text
/// GET    /                    -> list_templates
/// POST   /                    -> create_template
/// GET    /element-types       -> list_element_types
/// GET    /{id}                -> get_template
/// PUT    /{id}                -> update_template
/// DELETE /{id}                -> delete_template
/// POST   /{id}/publish        -> publish_template
/// POST   /{id}/duplicate      -> duplicate_template
/// GET    /{id}/submissions    -> list_submissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(proposal_templates::list_templates).post(proposal_templates::create_template),
        )
        .route("/element-types", get(proposal_templates::list_element_types))
        .route(
            "/{id}",
            get(proposal_templates::get_template)
                .put(proposal_templates::update_template)
                .delete(proposal_templates::delete_template),
        )
        .route("/{id}/publish", post(proposal_templates::publish_template))
        .route("/{id}/duplicate", post(proposal_templates::duplicate_template))
        .route("/{id}/submissions", get(proposal_templates::list_submissions))
}
