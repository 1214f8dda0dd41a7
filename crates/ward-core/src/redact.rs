use serde_json::Value;

/// Closed, case-insensitive substring list of sensitive key markers
/// (invariant 5). Matched against the lowercased key name at every
/// nesting depth.
pub const SENSITIVE_MARKERS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "private_key",
    "access_key",
    "auth",
    "credential",
    "session_id",
    "cookie",
];

pub const REDACTION_MARKER: &str = "***REDACTED***";

/// Replace any value under a sensitive key with the redaction marker,
/// recursing into nested objects and arrays at arbitrary depth.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let lower = k.to_lowercase();
                if SENSITIVE_MARKERS.iter().any(|m| lower.contains(m)) {
                    out.insert(k.clone(), Value::String(REDACTION_MARKER.to_string()));
                } else {
                    out.insert(k.clone(), redact(v));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}
