use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /               -> list (?type&status)
/// POST   /               -> create
/// GET    /stats          -> stats
/// POST   /mark-overdue   -> mark_overdue
/// GET    /{id}           -> get_by_id
/// PATCH  /{id}           -> update
/// DELETE /{id}           -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payment::list).post(payment::create))
        .route("/stats", get(payment::stats))
        .route("/mark-overdue", post(payment::mark_overdue))
        .route(
            "/{id}",
            get(payment::get_by_id)
                .patch(payment::update)
                .delete(payment::delete),
        )
}
