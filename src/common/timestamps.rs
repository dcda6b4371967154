// src/common/timestamps.rs

use chrono::{DateTime, SecondsFormat, Utc};

/// Carimbo ISO-8601 em UTC com milissegundos (o mesmo formato que o
/// front-end grava com `toISOString()`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_str(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_parseable() {
        let stamp = now_iso();
        assert!(parse_str(&stamp).is_some());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn garbage_is_not_a_timestamp() {
        assert!(parse_str("ontem").is_none());
        assert!(parse_str("").is_none());
        assert!(parse_str(" 2024-06-01T10:00:00.000Z ").is_some());
    }
}
