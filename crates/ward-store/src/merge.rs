use serde_json::{Map, Value};

/// Null / empty-string / empty-list count as "absent" for merge purposes
/// (spec §4.1, §8 property 2). Objects, numbers, and booleans are always
/// considered present, even `false` or `0`.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Merge one field: the new value wins unless it's absent, in which case
/// the existing value survives (a non-⊥ field is never replaced by ⊥).
fn merge_field(existing: Option<&Value>, incoming: Option<&Value>) -> Option<Value> {
    match (existing, incoming) {
        (_, Some(new)) if !is_absent(new) => Some(new.clone()),
        (Some(old), _) => Some(old.clone()),
        (None, Some(new)) => Some(new.clone()),
        (None, None) => None,
    }
}

fn step_id(step: &Value) -> Option<&str> {
    step.get("step_id").and_then(Value::as_str)
}

/// Merge the `steps` arrays by `step_id`: for each existing step, only
/// overwrite fields whose new value is non-null/non-empty/non-empty-list;
/// steps present only in the incoming array are appended in order.
fn merge_steps(existing: &[Value], incoming: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(existing.len().max(incoming.len()));
    let mut seen_incoming: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for old_step in existing {
        let matching = old_step
            .get("step_id")
            .and_then(Value::as_str)
            .and_then(|id| incoming.iter().find(|s| step_id(s) == Some(id)));

        match matching {
            Some(new_step) => {
                if let Some(id) = step_id(new_step) {
                    seen_incoming.insert(id);
                }
                merged.push(merge_step_fields(old_step, new_step));
            }
            None => merged.push(old_step.clone()),
        }
    }

    for new_step in incoming {
        let is_new = match step_id(new_step) {
            Some(id) => !seen_incoming.contains(id) && !existing.iter().any(|s| step_id(s) == Some(id)),
            None => true,
        };
        if is_new {
            merged.push(new_step.clone());
        }
    }

    merged
}

fn merge_step_fields(old_step: &Value, new_step: &Value) -> Value {
    let (Value::Object(old_map), Value::Object(new_map)) = (old_step, new_step) else {
        return new_step.clone();
    };
    let mut out = Map::new();
    let mut keys: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    keys.sort();
    keys.dedup();
    for key in keys {
        if let Some(v) = merge_field(old_map.get(key), new_map.get(key)) {
            out.insert(key.clone(), v);
        }
    }
    Value::Object(out)
}

/// Field-level merge of a whole session document (spec §4.1 `put_session`,
/// invariant 6, testable property 2).
///
/// `existing` is `None` on first write. Top-level keys the engine doesn't
/// know about (added externally, e.g. by a dashboard normalization pass)
/// are preserved verbatim when the incoming write doesn't touch them.
pub fn merge_session(existing: Option<&Value>, incoming: &Value) -> Value {
    let Some(existing) = existing else {
        return incoming.clone();
    };
    let (Value::Object(old_map), Value::Object(new_map)) = (existing, incoming) else {
        return incoming.clone();
    };

    let mut out = Map::new();
    let mut keys: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        if key == "steps" {
            let old_steps = old_map.get("steps").and_then(Value::as_array).cloned().unwrap_or_default();
            let new_steps = new_map.get("steps").and_then(Value::as_array).cloned().unwrap_or_default();
            if new_map.contains_key("steps") {
                out.insert("steps".to_string(), Value::Array(merge_steps(&old_steps, &new_steps)));
            } else if old_map.contains_key("steps") {
                out.insert("steps".to_string(), Value::Array(old_steps));
            }
            continue;
        }
        if let Some(v) = merge_field(old_map.get(key), new_map.get(key)) {
            out.insert(key.clone(), v);
        }
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_write_has_no_existing_document() {
        let incoming = json!({"session_id": "s1", "agent_name": "bot"});
        assert_eq!(merge_session(None, &incoming), incoming);
    }

    #[test]
    fn score_backfill_replaces_null_without_erasing_siblings() {
        let existing = json!({
            "session_id": "s1",
            "steps": [{"step_id": "a", "relevance_score": null, "tool_name": "read"}]
        });
        let incoming = json!({
            "session_id": "s1",
            "steps": [{"step_id": "a", "relevance_score": 90}]
        });
        let merged = merge_session(Some(&existing), &incoming);
        let step = &merged["steps"][0];
        assert_eq!(step["relevance_score"], json!(90));
        assert_eq!(step["tool_name"], json!("read"));
    }

    #[test]
    fn external_top_level_field_is_preserved() {
        let existing = json!({"session_id": "s1", "status": "active"});
        let incoming = json!({"session_id": "s1", "overall_quality": "GOOD"});
        let merged = merge_session(Some(&existing), &incoming);
        assert_eq!(merged["status"], json!("active"));
        assert_eq!(merged["overall_quality"], json!("GOOD"));
    }

    #[test]
    fn non_null_field_is_never_overwritten_by_null() {
        let existing = json!({"session_id": "s1", "efficiency_score": 80});
        let incoming = json!({"session_id": "s1", "efficiency_score": null});
        let merged = merge_session(Some(&existing), &incoming);
        assert_eq!(merged["efficiency_score"], json!(80));
    }

    #[test]
    fn new_steps_are_appended() {
        let existing = json!({"session_id": "s1", "steps": [{"step_id": "a"}]});
        let incoming = json!({"session_id": "s1", "steps": [{"step_id": "b"}]});
        let merged = merge_session(Some(&existing), &incoming);
        let ids: Vec<&str> = merged["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["step_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
