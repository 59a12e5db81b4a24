pub mod auth;
pub mod client;
pub mod dashboard;
pub mod health;
pub mod invoice;
pub mod payment;
pub mod project;
pub mod task;
pub mod worker;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Everything except `/auth/register`, `/auth/login` and
/// `/invoices/templates` requires a Bearer token.
///
/// ```text
/// /auth/register, /auth/login, /auth/me
/// /clients, /clients/{id}
/// /projects, /projects/{id}
/// /tasks, /tasks/stats, /tasks/{id}
/// /workers, /workers/stats, /workers/{id}
/// /payments, /payments/stats, /payments/mark-overdue, /payments/{id}
/// /dashboard/stats, /dashboard/chart, /dashboard/activity
/// /branding
/// /invoices/templates, /invoices/generate
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/clients", client::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/workers", worker::router())
        .nest("/payments", payment::router())
        .nest("/dashboard", dashboard::router())
        .nest("/invoices", invoice::router())
        .route(
            "/branding",
            get(handlers::branding::get).put(handlers::branding::upsert),
        )
}
