use chrono::{DateTime, Utc};

#[allow(unused)]
pub fn time_millis() -> i64 {
    let time: DateTime<chrono::Utc> = Utc::now();
    time.timestamp_millis()
}

/// Format an epoch-millis timestamp for display. Unset timestamps (zero or
/// negative) render empty so unstarted vertices show blank cells.
pub fn date_format(millis: i64) -> String {
    if millis <= 0 {
        return String::new();
    }
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(time) => time.format("%d %b %Y %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Format a duration in millis as a compact "1h 2m 3s" style string.
pub fn timing_format(millis: i64) -> String {
    if millis <= 0 {
        return String::new();
    }
    if millis < 1000 {
        return format!("{}ms", millis);
    }

    let total_secs = millis / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}
