use axum::routing::get;
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /          -> list (?status&priority&project_id)
/// POST   /          -> create
/// GET    /stats     -> stats
/// GET    /{id}      -> get_by_id
/// PATCH  /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route("/stats", get(task::stats))
        .route(
            "/{id}",
            get(task::get_by_id)
                .patch(task::update)
                .delete(task::delete),
        )
}
