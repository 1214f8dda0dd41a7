use serde_json::Value;
use ward_core::SENSITIVE_MARKERS;
use ward_types::{IssueType, QualityIssue};

const SSL_BYPASS_FIELDS: &[&str] = &["verify_ssl", "verify", "ssl_verify", "check_ssl", "ssl_check"];
const SHELL_FLAG_FIELDS: &[&str] = &["shell", "use_shell", "shell_mode"];
const COMMAND_FIELDS: &[&str] = &["command", "cmd", "args", "script", "query"];
const SHELL_METACHARS: &[&str] = &["&&", "||", ";", "|", "`", "$(", ">", "<", "../", "..\\"];

fn field_is_false(input: &Value, field: &str) -> bool {
    matches!(input.get(field), Some(Value::Bool(false)))
}

fn field_is_true(input: &Value, field: &str) -> bool {
    matches!(input.get(field), Some(Value::Bool(true)))
}

fn field_contains_metachar(input: &Value, field: &str) -> bool {
    match input.get(field) {
        Some(Value::String(s)) => SHELL_METACHARS.iter().any(|m| s.contains(m)),
        _ => false,
    }
}

/// Rule 1: deterministic security-bypass pattern scan over a tool call's
/// input fields. Independent of the other rules; may emit more than one
/// issue for a single step.
pub fn scan_security_bypass(issue_id_base: &str, tool_input: &Value) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let Value::Object(map) = tool_input else {
        return issues;
    };

    if SSL_BYPASS_FIELDS.iter().any(|f| field_is_false(tool_input, f)) {
        issues.push(QualityIssue::new(
            format!("{issue_id_base}-ssl"),
            IssueType::SecurityBypass,
            8,
            "TLS/SSL certificate verification disabled",
        ));
    }

    if SHELL_FLAG_FIELDS.iter().any(|f| field_is_true(tool_input, f)) {
        issues.push(QualityIssue::new(
            format!("{issue_id_base}-shell"),
            IssueType::SecurityBypass,
            9,
            "shell execution mode enabled",
        ));
    }

    if COMMAND_FIELDS.iter().any(|f| field_contains_metachar(tool_input, f)) {
        issues.push(QualityIssue::new(
            format!("{issue_id_base}-metachar"),
            IssueType::SecurityBypass,
            8,
            "shell metacharacter present in command-like field",
        ));
    }

    for (key, value) in map {
        let lower = key.to_lowercase();
        if SENSITIVE_MARKERS.iter().any(|m| lower.contains(m)) {
            if let Value::String(s) = value {
                if !s.is_empty() {
                    issues.push(QualityIssue::new(
                        format!("{issue_id_base}-cred"),
                        IssueType::SecurityBypass,
                        7,
                        format!("credential-like value passed in field `{key}`"),
                    ));
                    break;
                }
            }
        }
    }

    issues
}
