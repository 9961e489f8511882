//! Survey API module
//!
//! Templates are global; campaigns and responses are scoped under a company.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/survey-templates", template_routes())
        .nest(
            "/api/companies/{company_id}/survey-campaigns",
            campaign_routes(),
        )
}

fn template_routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list_templates).post(handler::create_template))
}

fn campaign_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_campaigns).post(handler::create_campaign))
        .route(
            "/{id}",
            get(handler::get_campaign).delete(handler::delete_campaign),
        )
        .route(
            "/{id}/responses",
            get(handler::list_responses).post(handler::create_response),
        )
}
