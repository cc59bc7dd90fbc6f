use chrono::{DateTime, Local, Utc};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp in local time for history rows
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%b %d, %Y %H:%M").to_string()
}

/// Parse an operand typed by the user; only finite numbers are accepted.
pub fn parse_operand(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Hello", 2), "He");
    }

    #[test]
    fn test_parse_operand() {
        assert_eq!(parse_operand("15"), Some(15.0));
        assert_eq!(parse_operand(" -2.5 "), Some(-2.5));
        assert_eq!(parse_operand("3,75"), None);
        assert_eq!(parse_operand("1e3"), Some(1000.0));
        assert_eq!(parse_operand(""), None);
        assert_eq!(parse_operand("abc"), None);
        assert_eq!(parse_operand("inf"), None);
        assert_eq!(parse_operand("NaN"), None);
    }
}
