//! Domain types and pure business logic for gigledger.
//!
//! Nothing in this crate performs I/O. Persistence lives in `gigledger-db`
//! and the HTTP surface in `gigledger-api`.

pub mod dashboard;
pub mod error;
pub mod finance;
pub mod invoice;
pub mod patch;
pub mod payment;
pub mod status;
pub mod task_lifecycle;
pub mod types;
pub mod validation;
