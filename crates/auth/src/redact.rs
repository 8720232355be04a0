//! Masking helpers for credential material in log output.
//!
//! Tokens and client identifiers must never reach a log line whole. The
//! invariant: at most the first and last [`VISIBLE`] characters of a value
//! may appear; anything short enough that prefix and suffix would cover the
//! whole value is masked entirely.

/// Characters kept at each end of a redacted value.
const VISIBLE: usize = 4;

/// Replacement for the hidden middle of a value.
const MASK: &str = "##### REDACTED #####";

/// Maximum length for an error response body to log (prevents log flooding).
const MAX_ERROR_BODY_LOG_LENGTH: usize = 500;

/// Mask a credential value for logging.
///
/// Values longer than `2 * VISIBLE` characters keep their first and last
/// four characters around the mask; shorter values are masked entirely.
#[must_use]
pub fn redact(value: &str) -> String {
    let len = value.chars().count();
    if len <= 2 * VISIBLE {
        return MASK.to_string();
    }
    let prefix: String = value.chars().take(VISIBLE).collect();
    let suffix: String = value.chars().skip(len - VISIBLE).collect();
    format!("{prefix}{MASK}{suffix}")
}

/// Sanitize an HTTP response body for logging: truncate long bodies and
/// blank out well-known token-bearing JSON fields.
#[must_use]
pub fn sanitize_body(body: &str) -> String {
    let truncated = if body.len() > MAX_ERROR_BODY_LOG_LENGTH {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_ERROR_BODY_LOG_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} total bytes]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    if let Ok(mut json) = serde_json::from_str::<serde_json::Value>(&truncated) {
        for field in ["access_token", "refresh_token", "id_token", "token", "secret"] {
            if json.get(field).is_some() {
                json[field] = serde_json::json!("[REDACTED]");
            }
        }
        json.to_string()
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn long_value_keeps_four_chars_each_end() {
        let token = "abcdefghijklmnop";
        let masked = redact(token);
        assert_eq!(masked, format!("abcd{MASK}mnop"));
        assert!(!masked.contains("efghijkl"));
    }

    #[test]
    fn never_exposes_more_than_prefix_and_suffix() {
        for len in 8..64 {
            let token: String = "x".repeat(len - 1) + "y";
            let masked = redact(&token);
            let visible: usize = masked.chars().filter(|&c| c == 'x' || c == 'y').count();
            assert!(visible <= 8, "len {len} exposed {visible} chars");
        }
    }

    #[test]
    fn short_value_is_fully_masked() {
        assert_eq!(redact("abcd1234"), MASK);
        assert_eq!(redact(""), MASK);
    }

    #[test]
    fn sanitize_redacts_token_fields() {
        let body = r#"{"access_token":"abc","expires_in":3600}"#;
        let out = sanitize_body(body);
        assert!(!out.contains("abc"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "z".repeat(2000);
        let out = sanitize_body(&body);
        assert!(out.contains("truncated"));
        assert!(out.len() < body.len());
    }
}
