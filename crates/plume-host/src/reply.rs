//! Response formatting for tool entry points.

/// Format a tool response for the host.
///
/// Plain text by default; a JSON object of shape `{"message": ...}` when the
/// caller declared native structured-output support.
pub fn reply(message: impl Into<String>, structured: bool) -> String {
    let message = message.into();
    if structured {
        serde_json::json!({ "message": message }).to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_passes_through() {
        assert_eq!(reply("2 memories added.", false), "2 memories added.");
    }

    #[test]
    fn test_structured_reply_wraps_in_message_object() {
        let out = reply("Weather for Lyon", true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"message": "Weather for Lyon"}));
    }

    #[test]
    fn test_structured_reply_keeps_non_ascii() {
        let out = reply("Température : 21°C", true);
        assert!(out.contains("Température"));
    }
}
