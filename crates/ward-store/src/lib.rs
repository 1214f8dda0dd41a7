pub mod error;
mod index;
mod merge;

pub use error::{Error, Result};
pub use index::Index;
pub use merge::merge_session;

use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use ward_core::atomic_write_json;
use ward_types::{EngineConfig, QualityIssue, StepRecord};

/// Durable, atomic, merge-aware persistence for sessions, issues, the
/// step journal, and the agent registry (spec §4.1).
///
/// All mutating operations on a given store are serialized through a
/// single writer lock; readers never block on it and tolerate a
/// momentarily missing file by returning `Error::NotFound`.
pub struct Store {
    root: PathBuf,
    write_lock: Mutex<()>,
    index: Index,
}

fn sessions_dir(root: &Path) -> PathBuf {
    root.join("sessions")
}

fn issues_dir(root: &Path) -> PathBuf {
    root.join("issues")
}

fn steps_dir(root: &Path) -> PathBuf {
    root.join("steps")
}

fn session_path(root: &Path, session_id: &str) -> PathBuf {
    sessions_dir(root).join(format!("{session_id}.json"))
}

fn registry_path(root: &Path) -> PathBuf {
    root.join("agents_registry.json")
}

fn config_path(root: &Path) -> PathBuf {
    root.join("config.json")
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(sessions_dir(&root))?;
        std::fs::create_dir_all(issues_dir(&root))?;
        std::fs::create_dir_all(steps_dir(&root))?;
        let index = Index::open(&root.join("index.sqlite3"))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
            index,
        })
    }

    #[cfg(test)]
    pub fn open_in_memory_index(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(sessions_dir(&root))?;
        std::fs::create_dir_all(issues_dir(&root))?;
        std::fs::create_dir_all(steps_dir(&root))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
            index: Index::open_in_memory()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Atomically write `report` (a full or partial session document),
    /// merging field-by-field with any existing document for the same
    /// `session_id`. Returns the merged document as persisted.
    pub fn put_session(&self, report: &Value) -> Result<Value> {
        let session_id = report
            .get("session_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("session document missing session_id".to_string()))?
            .to_string();

        let _guard = self.write_lock.lock().unwrap();
        let path = session_path(&self.root, &session_id);
        let existing = self.read_json_if_exists(&path)?;
        let merged = merge_session(existing.as_ref(), report);
        atomic_write_json(&path, &merged)?;

        let agent_name = merged.get("agent_name").and_then(Value::as_str).unwrap_or("unknown");
        let started_at = merged
            .get("started_at")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let ended_at = merged.get("ended_at").and_then(Value::as_str);
        let overall_quality = merged
            .get("overall_quality")
            .and_then(Value::as_str)
            .unwrap_or("PENDING");
        self.index
            .upsert_session(&session_id, agent_name, started_at, ended_at, overall_quality)?;

        Ok(merged)
    }

    /// Atomically write `report` verbatim, bypassing the field-level merge
    /// `put_session` performs. Exists for the one case merge-on-write
    /// cannot express: resuming a session must be able to *clear*
    /// `ended_at`, and the merge invariant (a present field is never
    /// erased by an absent one) forbids that by design. Callers build the
    /// full next revision themselves (typically starting from
    /// `get_session`) and hand it here.
    pub fn replace_session(&self, report: &Value) -> Result<Value> {
        let session_id = report
            .get("session_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("session document missing session_id".to_string()))?
            .to_string();

        let _guard = self.write_lock.lock().unwrap();
        let path = session_path(&self.root, &session_id);
        atomic_write_json(&path, report)?;

        let agent_name = report.get("agent_name").and_then(Value::as_str).unwrap_or("unknown");
        let started_at = report.get("started_at").and_then(Value::as_str).unwrap_or_default();
        let ended_at = report.get("ended_at").and_then(Value::as_str);
        let overall_quality = report.get("overall_quality").and_then(Value::as_str).unwrap_or("PENDING");
        self.index
            .upsert_session(&session_id, agent_name, started_at, ended_at, overall_quality)?;

        Ok(report.clone())
    }

    /// Append one step to the per-day journal. Serialized through the
    /// same writer lock as every other mutation.
    pub fn append_step_log(&self, record: &StepRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let day = Utc::now().format("%Y%m%d");
        let path = steps_dir(&self.root).join(format!("{day}.jsonl"));
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn put_issue(&self, issue: &QualityIssue) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = issues_dir(&self.root).join(format!("{}.json", issue.issue_id));
        let value = serde_json::to_value(issue)?;
        atomic_write_json(&path, &value)?;
        Ok(())
    }

    /// Idempotent-by-name upsert into the registry, under the same
    /// writer lock (spec §5 "a single process-wide lock protects the
    /// agent registry JSON").
    pub fn put_registry_entry(&self, entry: &Value) -> Result<Value> {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::NotFound("registry entry missing name".to_string()))?;

        let _guard = self.write_lock.lock().unwrap();
        let path = registry_path(&self.root);
        let mut entries: Vec<Value> = self
            .read_json_if_exists(&path)?
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();

        if let Some(existing) = entries.iter_mut().find(|e| e.get("name").and_then(Value::as_str) == Some(name)) {
            *existing = entry.clone();
        } else {
            entries.push(entry.clone());
        }

        atomic_write_json(&path, &Value::Array(entries))?;
        Ok(entry.clone())
    }

    pub fn list_registry(&self) -> Result<Vec<Value>> {
        let path = registry_path(&self.root);
        Ok(self
            .read_json_if_exists(&path)?
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default())
    }

    pub fn get_session(&self, session_id: &str) -> Result<Value> {
        let path = session_path(&self.root, session_id);
        self.read_json_if_exists(&path)?
            .ok_or_else(|| Error::NotFound(format!("session {session_id}")))
    }

    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = session_path(&self.root, session_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        self.index.remove_session(session_id)?;
        Ok(())
    }

    /// Session ids in `started_at` descending order (DESIGN.md's
    /// resolution of the sort-order inconsistency in the original
    /// source), resolved to full documents.
    pub fn list_sessions(&self, limit: usize) -> Result<Vec<Value>> {
        let ids = self.index.list_session_ids(limit)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(v) = self.read_json_if_exists(&session_path(&self.root, &id))? {
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Delete session files whose mtime is older than `retention_days`.
    /// Returns the number of files removed.
    pub fn cleanup(&self, retention_days: u32) -> Result<usize> {
        let _guard = self.write_lock.lock().unwrap();
        let cutoff = std::time::SystemTime::now()
            .checked_sub(std::time::Duration::from_secs(retention_days as u64 * 86_400))
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

        let mut removed = 0usize;
        for dir in [sessions_dir(&self.root), issues_dir(&self.root), steps_dir(&self.root)] {
            let Ok(read_dir) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in read_dir.flatten() {
                let path = entry.path();
                let Ok(meta) = entry.metadata() else { continue };
                let Ok(modified) = meta.modified() else { continue };
                if modified < cutoff {
                    if std::fs::remove_file(&path).is_ok() {
                        removed += 1;
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            let _ = self.index.remove_session(stem);
                        }
                    }
                }
            }
        }
        Ok(removed)
    }

    /// Load engine configuration from `config.json`, falling back to
    /// defaults on first run (spec §6, server and CLI share this file so
    /// the two surfaces can't drift).
    pub fn load_config(&self) -> Result<EngineConfig> {
        let path = config_path(&self.root);
        match self.read_json_if_exists(&path)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(EngineConfig::default()),
        }
    }

    pub fn save_config(&self, config: &EngineConfig) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = config_path(&self.root);
        let value = serde_json::to_value(config)?;
        atomic_write_json(&path, &value)?;
        Ok(())
    }

    fn read_json_if_exists(&self, path: &Path) -> Result<Option<Value>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Per-day bucket naming used by the step journal, exposed for tests and
/// for the cleanup routine's retention accounting.
pub fn journal_key_for(day: chrono::NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use ward_types::{StepStatus, TaskDefinition};

    #[test]
    fn put_session_then_get_roundtrips() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        let report = serde_json::json!({
            "session_id": "s1",
            "agent_name": "bot",
            "started_at": "2026-01-01T00:00:00Z",
            "overall_quality": "PENDING",
            "steps": []
        });
        store.put_session(&report).unwrap();
        let got = store.get_session("s1").unwrap();
        assert_eq!(got["agent_name"], serde_json::json!("bot"));
    }

    #[test]
    fn put_session_merges_with_existing() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        store
            .put_session(&serde_json::json!({
                "session_id": "s1",
                "agent_name": "bot",
                "started_at": "2026-01-01T00:00:00Z",
                "overall_quality": "PENDING",
                "steps": [{"step_id": "a", "relevance_score": null}]
            }))
            .unwrap();
        store
            .put_session(&serde_json::json!({
                "session_id": "s1",
                "steps": [{"step_id": "a", "relevance_score": 95}]
            }))
            .unwrap();
        let got = store.get_session("s1").unwrap();
        assert_eq!(got["steps"][0]["relevance_score"], serde_json::json!(95));
        assert_eq!(got["agent_name"], serde_json::json!("bot"));
    }

    #[test]
    fn replace_session_can_clear_a_previously_set_field() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        store
            .put_session(&serde_json::json!({
                "session_id": "s1",
                "agent_name": "bot",
                "started_at": "2026-01-01T00:00:00Z",
                "overall_quality": "PENDING",
                "ended_at": "2026-01-01T01:00:00Z"
            }))
            .unwrap();
        store
            .replace_session(&serde_json::json!({
                "session_id": "s1",
                "agent_name": "bot",
                "started_at": "2026-01-01T00:00:00Z",
                "overall_quality": "PENDING",
                "ended_at": null
            }))
            .unwrap();
        let got = store.get_session("s1").unwrap();
        assert!(got["ended_at"].is_null());
    }

    #[test]
    fn load_config_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        let config = store.load_config().unwrap();
        assert_eq!(config.max_steps, EngineConfig::default().max_steps);
    }

    #[test]
    fn save_then_load_config_roundtrips() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        let mut config = EngineConfig::default();
        config.max_steps = 123;
        store.save_config(&config).unwrap();
        assert_eq!(store.load_config().unwrap().max_steps, 123);
    }

    #[test]
    fn get_missing_session_is_not_found() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        assert!(matches!(store.get_session("missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn registry_upsert_is_idempotent_by_name() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        let entry = serde_json::json!({"id": "1", "name": "hook-agent", "source": "hook"});
        store.put_registry_entry(&entry).unwrap();
        store.put_registry_entry(&entry).unwrap();
        assert_eq!(store.list_registry().unwrap().len(), 1);
    }

    #[test]
    fn list_sessions_orders_by_started_at_desc() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        store
            .put_session(&serde_json::json!({
                "session_id": "older",
                "agent_name": "bot",
                "started_at": "2026-01-01T00:00:00Z",
                "overall_quality": "PENDING"
            }))
            .unwrap();
        store
            .put_session(&serde_json::json!({
                "session_id": "newer",
                "agent_name": "bot",
                "started_at": "2026-01-02T00:00:00Z",
                "overall_quality": "PENDING"
            }))
            .unwrap();
        let listed = store.list_sessions(10).unwrap();
        assert_eq!(listed[0]["session_id"], serde_json::json!("newer"));
        assert_eq!(listed[1]["session_id"], serde_json::json!("older"));
    }

    #[test]
    fn append_step_log_appends_jsonl() {
        let dir = tempdir().unwrap();
        let store = Store::open_in_memory_index(dir.path()).unwrap();
        let task = TaskDefinition::new("t1", "do a thing", 10);
        let _ = task;
        let record = StepRecord {
            step_id: "a".into(),
            step_number: 1,
            timestamp: Utc::now(),
            tool_name: "read".into(),
            tool_input: serde_json::json!({}),
            tool_result: "ok".into(),
            status: StepStatus::Success,
            relevance_score: None,
            security_score: None,
            reasoning: None,
            metadata: Value::Null,
        };
        store.append_step_log(&record).unwrap();
        store.append_step_log(&record).unwrap();
        let day = Utc::now().format("%Y%m%d");
        let contents = std::fs::read_to_string(steps_dir(store.root()).join(format!("{day}.jsonl"))).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
