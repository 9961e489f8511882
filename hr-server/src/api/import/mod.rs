//! Bulk Import API module

mod handler;

use axum::{Router, extract::DefaultBodyLimit, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/import/employees", post(handler::employees))
        // Raise axum's default 2MB body cap; headroom for multipart framing
        // so the handler's own size check produces the response
        .layer(DefaultBodyLimit::max(handler::MAX_FILE_SIZE + 64 * 1024))
}
