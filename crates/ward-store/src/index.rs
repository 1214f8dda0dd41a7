use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Rebuildable secondary index mirroring session id, agent name, and
/// timing/quality fields for fast listing and filtering. The JSON files
/// under `sessions/` remain the system of record; this index is never
/// consulted to answer "does this session exist", only to order/filter.
pub struct Index {
    conn: Connection,
}

impl Index {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let index = Self { conn };
        index.init_schema()?;
        Ok(index)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let index = Self { conn };
        index.init_schema()?;
        Ok(index)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                agent_name TEXT NOT NULL,
                started_at TEXT NOT NULL,
                ended_at TEXT,
                overall_quality TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);",
        )?;
        Ok(())
    }

    pub fn upsert_session(
        &self,
        session_id: &str,
        agent_name: &str,
        started_at: &str,
        ended_at: Option<&str>,
        overall_quality: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (session_id, agent_name, started_at, ended_at, overall_quality)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(session_id) DO UPDATE SET
                agent_name = excluded.agent_name,
                started_at = excluded.started_at,
                ended_at = COALESCE(excluded.ended_at, sessions.ended_at),
                overall_quality = excluded.overall_quality",
            params![session_id, agent_name, started_at, ended_at, overall_quality],
        )?;
        Ok(())
    }

    pub fn remove_session(&self, session_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE session_id = ?1", params![session_id])?;
        Ok(())
    }

    /// Session ids ordered by `started_at` descending (see DESIGN.md's
    /// resolution of the sort-order inconsistency across the original
    /// source), most recent first.
    pub fn list_session_ids(&self, limit: usize) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT session_id FROM sessions ORDER BY started_at DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_then_list_orders_by_started_at_desc() {
        let index = Index::open_in_memory().unwrap();
        index
            .upsert_session("s1", "bot", "2026-01-01T00:00:00Z", None, "PENDING")
            .unwrap();
        index
            .upsert_session("s2", "bot", "2026-01-02T00:00:00Z", None, "PENDING")
            .unwrap();
        let ids = index.list_session_ids(10).unwrap();
        assert_eq!(ids, vec!["s2".to_string(), "s1".to_string()]);
    }

    #[test]
    fn upsert_is_idempotent_and_preserves_ended_at_when_new_value_absent() {
        let index = Index::open_in_memory().unwrap();
        index
            .upsert_session("s1", "bot", "2026-01-01T00:00:00Z", Some("2026-01-01T01:00:00Z"), "GOOD")
            .unwrap();
        index
            .upsert_session("s1", "bot", "2026-01-01T00:00:00Z", None, "EXCELLENT")
            .unwrap();
        let ids = index.list_session_ids(10).unwrap();
        assert_eq!(ids, vec!["s1".to_string()]);
    }
}
