use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invoice;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /templates   -> templates (public catalogue)
/// POST   /generate    -> generate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(invoice::templates))
        .route("/generate", post(invoice::generate))
}
