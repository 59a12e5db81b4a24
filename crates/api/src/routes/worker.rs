use axum::routing::get;
use axum::Router;

use crate::handlers::worker;
use crate::state::AppState;

/// Routes mounted at `/workers`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /stats     -> stats
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(worker::list).post(worker::create))
        .route("/stats", get(worker::stats))
        .route(
            "/{id}",
            get(worker::get_by_id)
                .put(worker::update)
                .delete(worker::delete),
        )
}
