use anyhow::{bail, Result};
use serde_json::{Map, Value};
use ward_store::Store;
use ward_types::EngineConfig;

pub fn get(store: &Store) -> Result<()> {
    let config = store.load_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn set(store: &Store, key: &str, raw_value: &str) -> Result<()> {
    if !EngineConfig::MUTABLE_KEYS.contains(&key) {
        bail!("unrecognized config key '{key}' (expected one of {:?})", EngineConfig::MUTABLE_KEYS);
    }

    let mut config = store.load_config()?;
    let mut patch = Map::new();
    patch.insert(key.to_string(), parse_value(raw_value));
    let updated = config.apply_patch(&patch);
    if updated.is_empty() {
        bail!("value '{raw_value}' could not be applied to '{key}'");
    }
    config.validate().map_err(anyhow::Error::msg)?;

    store.save_config(&config)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Parse a CLI-supplied value as JSON (so `true`, `50`, `"monitor"` all
/// work unquoted) and fall back to a plain string for bare words like
/// `intervene`.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
