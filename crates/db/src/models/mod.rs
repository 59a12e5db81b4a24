//! Row models and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO
//! - An update DTO whose nullable fields use `double_option`, merged into
//!   the current row before it is written back

pub mod branding;
pub mod client;
pub mod dashboard;
pub mod payment;
pub mod project;
pub mod task;
pub mod user;
pub mod worker;
