/// Judge responses are JSON but LLMs routinely wrap them in markdown
/// code fences or add prose around them. Trim to the first `{` through
/// the last `}` before parsing (spec §4.4 "Robustness").
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_lenient<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    match extract_json_object(text) {
        Some(slice) => serde_json::from_str(slice),
        None => serde_json::from_str(text),
    }
}
