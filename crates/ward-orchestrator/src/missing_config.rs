/// Closed set of missing-config / auth-failure substrings scanned over a
/// step's full, untruncated result (spec §4.4). Matching, case-
/// insensitively, upgrades the step to FAILED and emits a MISSING_CONFIG
/// issue even when the framework itself did not raise an exception.
pub const MISSING_CONFIG_PATTERNS: &[(&str, &str)] = &[
    ("no knowledge base id", "knowledge base id is not configured"),
    ("authenticationerror", "authentication is failing against the backend"),
    ("retcode: 33004", "exchange/API credentials are rejected"),
    ("invalid api-key", "API key is invalid or missing"),
    ("invalid api key", "API key is invalid or missing"),
    ("unauthorized", "caller is not authorized for this resource"),
    ("access denied", "caller is not authorized for this resource"),
    ("not configured", "a required integration is not configured"),
    ("no such index", "a required search index does not exist"),
    ("configuration missing", "required configuration is absent"),
    ("resource not found", "a referenced resource does not exist"),
    ("missing credentials", "required credentials were not supplied"),
];

pub fn find_missing_config_hint(result: &str) -> Option<&'static str> {
    let lower = result.to_lowercase();
    MISSING_CONFIG_PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, hint)| *hint)
}
