use anyhow::Result;
use ward_store::Store;

pub fn handle(store: &Store, retention_days: Option<u32>) -> Result<()> {
    let retention_days = match retention_days {
        Some(days) => days,
        None => store.load_config()?.log_retention_days,
    };
    let removed = store.cleanup(retention_days)?;
    println!("removed {removed} record(s) older than {retention_days} day(s)");
    Ok(())
}
