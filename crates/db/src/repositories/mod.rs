//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! take `&PgPool` plus the owning account's `user_id`. Operations that
//! must commit atomically with aggregate recomputation open their own
//! transaction; [`AggregateRepo`] works on a borrowed connection.

pub mod aggregate_repo;
pub mod branding_repo;
pub mod client_repo;
pub mod dashboard_repo;
pub mod payment_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;
pub mod worker_repo;

pub use aggregate_repo::AggregateRepo;
pub use branding_repo::BrandingRepo;
pub use client_repo::ClientRepo;
pub use dashboard_repo::DashboardRepo;
pub use payment_repo::PaymentRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
pub use worker_repo::WorkerRepo;
