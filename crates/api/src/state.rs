use std::sync::Arc;

use crate::config::ServerConfig;

/// Handler state: the ledger database and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub pool: gigledger_db::DbPool,
    pub config: Arc<ServerConfig>,
}
