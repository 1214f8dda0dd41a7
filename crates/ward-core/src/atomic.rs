use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` via a temp file created in the same directory,
/// fsynced, then renamed into place. A crash at any point before the
/// rename leaves `path` untouched; a crash after leaves the new content
/// fully formed. Never produces a zero-length or half-written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".ward-tmp-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Convenience wrapper for JSON values.
pub fn atomic_write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions").join("s1.json");
        atomic_write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        let read: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(read, serde_json::json!({"a": 1}));
    }

    #[test]
    fn overwrite_replaces_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s1.json");
        atomic_write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        atomic_write_json(&path, &serde_json::json!({"a": 2})).unwrap();
        let read: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(read, serde_json::json!({"a": 2}));
    }
}
