use chrono::{Local, NaiveDateTime};

const COMPACT_PUBLISHED_FMT: &str = "%Y%m%dT%H%M%S";

/// Render a `published_at` stamp for display; unknown formats pass through.
pub fn format_published_at(raw: &str) -> String {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, COMPACT_PUBLISHED_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| trimmed.to_string())
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_compact_vendor_stamps() {
        assert_eq!(format_published_at("20240105T143000"), "2024-01-05 14:30");
        assert_eq!(format_published_at("2024-01-05T09:05:00"), "2024-01-05 09:05");
        assert_eq!(format_published_at("yesterday"), "yesterday");
    }
}
