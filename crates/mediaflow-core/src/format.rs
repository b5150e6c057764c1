//! Human-readable formatting for sizes and durations.

/// Format a byte count.
///
/// Zero renders as an empty string, matching how absent sizes are shown.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes == 0 {
        return String::new();
    }
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.2} GB", value / GB)
    }
}

/// Format a duration in seconds as `h:mm:ss` or `m:ss`.
///
/// Zero renders as an empty string.
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    if total_secs == 0 {
        return String::new();
    }
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
