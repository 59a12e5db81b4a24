use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET    /stats      -> stats
/// GET    /chart      -> chart
/// GET    /activity   -> activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard::stats))
        .route("/chart", get(dashboard::chart))
        .route("/activity", get(dashboard::activity))
}
