//! Axum handlers, one module per resource.

pub mod auth;
pub mod branding;
pub mod client;
pub mod dashboard;
pub mod invoice;
pub mod payment;
pub mod project;
pub mod task;
pub mod worker;

/// Today's date in UTC, used for date stamping and overdue checks.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
