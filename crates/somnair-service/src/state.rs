//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use somnair_core::AirQualitySource;
use somnair_store::Store;

use crate::config::Config;
use crate::session::SessionSlot;
use crate::tools::ToolSurface;

/// Shared application state.
///
/// The store synchronizes its own connection, so it is shared directly.
/// The session slot is the only state mutated by handlers.
pub struct AppState {
    /// Tool surface bound to the store and lookup source.
    pub tools: ToolSurface,
    /// Configuration the service was started with.
    pub config: Config,
    /// The single conversation session.
    pub session: RwLock<SessionSlot>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, lookup: Arc<dyn AirQualitySource>, config: Config) -> Arc<Self> {
        let tools = ToolSurface::new(Arc::new(store), lookup).with_defaults(config.defaults);
        Arc::new(Self {
            tools,
            config,
            session: RwLock::new(SessionSlot::new()),
        })
    }

    /// The observation store.
    pub fn store(&self) -> &Store {
        self.tools.store()
    }
}
