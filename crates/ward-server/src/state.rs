use std::sync::{Arc, Mutex};

use ward_runtime::{AgentRegistry, Hub};
use ward_store::Store;
use ward_types::EngineConfig;

/// Shared handles every route handler closes over. Cheap to clone —
/// everything inside is already behind an `Arc` or its own lock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub registry: Arc<AgentRegistry>,
    pub hub: Arc<Hub>,
    pub config: Arc<Mutex<EngineConfig>>,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(store: Store, api_key: Option<String>) -> ward_store::Result<Self> {
        let registry = AgentRegistry::new();
        let entries: Vec<_> = store
            .list_registry()?
            .into_iter()
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed registry entry at boot");
                    None
                }
            })
            .collect();
        registry.seed(entries);
        let config = store.load_config()?;

        Ok(Self {
            store: Arc::new(store),
            registry: Arc::new(registry),
            hub: Arc::new(Hub::new()),
            config: Arc::new(Mutex::new(config)),
            api_key,
        })
    }
}
