//! Error type for repository operations that enforce domain rules.

use gigledger_core::error::CoreError;

/// Failure of a repository operation that can reject a request on domain
/// grounds (missing parent, deletion guard) as well as fail in the driver.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
