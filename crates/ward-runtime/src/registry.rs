use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use ward_types::AgentRegistryEntry;

/// Process-wide cache of known agents, mirroring the durable registry
/// file C1 owns. `ward-server` seeds this from `Store::list_registry()`
/// at boot and writes through to the store on every mutation; this type
/// only holds the in-memory view consulted on the request path (spec
/// §4.5 `POST /agents/register`, `GET /sessions` agent lookups).
#[derive(Default)]
pub struct AgentRegistry {
    entries: Mutex<HashMap<String, AgentRegistryEntry>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, entries: Vec<AgentRegistryEntry>) {
        let mut guard = self.entries.lock().unwrap();
        for entry in entries {
            guard.insert(entry.name.clone(), entry);
        }
    }

    /// Idempotent by name (spec §4.5): returns the existing entry if one
    /// is already registered, otherwise inserts and returns a fresh one.
    pub fn register_hook(&self, name: &str) -> AgentRegistryEntry {
        let mut guard = self.entries.lock().unwrap();
        if let Some(existing) = guard.get(name) {
            return existing.clone();
        }
        let entry = AgentRegistryEntry::new_hook(format!("hook-{name}"), name);
        guard.insert(name.to_string(), entry.clone());
        entry
    }

    pub fn touch_last_run(&self, name: &str) {
        let mut guard = self.entries.lock().unwrap();
        if let Some(entry) = guard.get_mut(name) {
            entry.last_run = Some(Utc::now());
        }
    }

    pub fn get(&self, name: &str) -> Option<AgentRegistryEntry> {
        self.entries.lock().unwrap().get(name).cloned()
    }

    pub fn list(&self) -> Vec<AgentRegistryEntry> {
        let mut entries: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_hook_is_idempotent_by_name() {
        let registry = AgentRegistry::new();
        let first = registry.register_hook("bot-a");
        let second = registry.register_hook("bot-a");
        assert_eq!(first.id, second.id);
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn seed_preloads_entries_from_durable_storage() {
        let registry = AgentRegistry::new();
        registry.seed(vec![AgentRegistryEntry::new_hook("hook-x", "bot-x")]);
        assert!(registry.get("bot-x").is_some());
    }

    #[test]
    fn touch_last_run_updates_only_the_named_entry() {
        let registry = AgentRegistry::new();
        registry.register_hook("bot-a");
        registry.register_hook("bot-b");
        registry.touch_last_run("bot-a");
        assert!(registry.get("bot-a").unwrap().last_run.is_some());
        assert!(registry.get("bot-b").unwrap().last_run.is_none());
    }
}
