use anyhow::{Context, Result};
use ward_store::Store;

pub fn list(store: &Store, limit: usize) -> Result<()> {
    let sessions = store.list_sessions(limit)?;
    if sessions.is_empty() {
        println!("no sessions recorded");
        return Ok(());
    }
    for raw in &sessions {
        let session = ward_server::normalize::normalize_session(raw);
        let id = session.get("session_id").and_then(|v| v.as_str()).unwrap_or("?");
        let agent = session.get("agent_name").and_then(|v| v.as_str()).unwrap_or("?");
        let status = session.get("status").and_then(|v| v.as_str()).unwrap_or("?");
        let quality = session.get("overall_quality").and_then(|v| v.as_str()).unwrap_or("?");
        println!("{id}  {agent:<20}  {status:<10}  {quality}");
    }
    Ok(())
}

pub fn show(store: &Store, session_id: &str) -> Result<()> {
    let raw = store.get_session(session_id).with_context(|| format!("no such session: {session_id}"))?;
    let session = ward_server::normalize::normalize_session(&raw);
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}
