use serde_json::Value;

/// A stable textual encoding of a JSON value with object keys sorted,
/// used as the canonical form for call-signature hashing (spec §4.2).
/// Inputs are not otherwise inspected or normalized.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('"');
                out.push_str(key);
                out.push_str("\":");
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

/// The canonical call signature used for duplicate/loop detection:
/// `(tool_name, canonicalized tool_input)`.
pub fn call_signature(tool_name: &str, tool_input: &Value) -> String {
    format!("{tool_name}:{}", canonicalize(tool_input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_affect_signature() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn differing_values_produce_differing_signatures() {
        let a = call_signature("read", &json!({"path": "a"}));
        let b = call_signature("read", &json!({"path": "b"}));
        assert_ne!(a, b);
    }
}
