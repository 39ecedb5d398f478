use std::sync::Arc;

use sqlshelf_db::Database;

use crate::assistant::Assistant;
use crate::library::{HistoryLedger, QueryRepository, ShareRegistry};

pub type AppState = Arc<AppStateInner>;

/// Runtime settings the handlers need; read from the environment by the binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    /// Base for share links. Derived from the request `Host` when unset.
    pub public_url: Option<String>,
}

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub settings: Settings,
    pub queries: QueryRepository,
    pub history: HistoryLedger,
    pub shares: ShareRegistry,
    pub assistant: Option<Assistant>,
}

impl AppStateInner {
    /// Wires every component to the one shared store handle.
    pub fn new(db: Arc<Database>, settings: Settings, assistant: Option<Assistant>) -> AppState {
        let history = HistoryLedger::new(db.clone());
        let queries = QueryRepository::new(db.clone(), history.clone());
        let shares = ShareRegistry::new(db.clone(), queries.clone());

        Arc::new(Self {
            db,
            settings,
            queries,
            history,
            shares,
            assistant,
        })
    }
}
