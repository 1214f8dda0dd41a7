use serde::{Deserialize, Serialize};

/// Does the pipeline cancel offending tool calls, or only observe them?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    Monitor,
    Intervene,
}

impl Default for GuardMode {
    fn default() -> Self {
        GuardMode::Monitor
    }
}

/// Recognized, persisted configuration. Unknown keys sent on `PUT /config`
/// are ignored rather than rejected (see spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub guard_mode: GuardMode,
    pub max_steps: u32,
    pub enable_ai_eval: bool,
    pub enable_shadow_browser: bool,
    pub loop_window: usize,
    pub loop_threshold: usize,
    pub max_same_tool: usize,
    pub security_score_threshold: u8,
    pub relevance_score_threshold: u8,
    pub auto_intervene_on_loop: bool,
    pub log_retention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            guard_mode: GuardMode::Monitor,
            max_steps: 50,
            enable_ai_eval: true,
            enable_shadow_browser: false,
            loop_window: 5,
            loop_threshold: 3,
            max_same_tool: 10,
            security_score_threshold: 70,
            relevance_score_threshold: 30,
            auto_intervene_on_loop: false,
            log_retention_days: 30,
        }
    }
}

impl EngineConfig {
    /// The allow-list of keys `PUT /config` is permitted to change.
    pub const MUTABLE_KEYS: &'static [&'static str] = &[
        "guard_mode",
        "max_steps",
        "enable_ai_eval",
        "enable_shadow_browser",
        "loop_window",
        "loop_threshold",
        "max_same_tool",
        "security_score_threshold",
        "relevance_score_threshold",
        "auto_intervene_on_loop",
        "log_retention_days",
    ];

    pub fn validate(&self) -> Result<(), String> {
        if self.max_steps < 1 {
            return Err("max_steps must be >= 1".into());
        }
        if self.loop_window < 2 {
            return Err("loop_window must be >= 2".into());
        }
        if self.loop_threshold < 2 {
            return Err("loop_threshold must be >= 2".into());
        }
        if self.max_same_tool < 1 {
            return Err("max_same_tool must be >= 1".into());
        }
        Ok(())
    }

    /// Apply a PUT payload, ignoring any key not in `MUTABLE_KEYS`.
    /// Returns the list of keys that were actually updated.
    pub fn apply_patch(&mut self, patch: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
        let mut updated = Vec::new();
        let mut current = serde_json::to_value(&*self).expect("EngineConfig always serializes");
        let obj = current.as_object_mut().expect("EngineConfig serializes to an object");
        for key in Self::MUTABLE_KEYS {
            if let Some(value) = patch.get(*key) {
                obj.insert((*key).to_string(), value.clone());
                updated.push((*key).to_string());
            }
        }
        if !updated.is_empty() {
            if let Ok(parsed) = serde_json::from_value::<EngineConfig>(current) {
                *self = parsed;
            } else {
                updated.clear();
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.guard_mode, GuardMode::Monitor);
        assert_eq!(cfg.max_steps, 50);
        assert_eq!(cfg.loop_window, 5);
        assert_eq!(cfg.loop_threshold, 3);
        assert_eq!(cfg.max_same_tool, 10);
    }

    #[test]
    fn apply_patch_ignores_unknown_keys() {
        let mut cfg = EngineConfig::default();
        let mut patch = serde_json::Map::new();
        patch.insert("max_steps".into(), serde_json::json!(75));
        patch.insert("totally_unknown".into(), serde_json::json!(true));
        let updated = cfg.apply_patch(&patch);
        assert_eq!(updated, vec!["max_steps".to_string()]);
        assert_eq!(cfg.max_steps, 75);
    }
}
