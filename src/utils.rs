/// Seconds in one 8-hour work day
pub const WORK_DAY_SECONDS: u64 = 8 * 3600;

/// Percentage of `part` in `whole`, or `None` when `whole` is zero.
pub fn share(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        None
    } else {
        Some(part / whole * 100.0)
    }
}

/// Format logged time using 8-hour work days, e.g. `1d 2h 3m`.
pub fn format_seconds(seconds: u64) -> String {
    let days = seconds / WORK_DAY_SECONDS;
    let rest = seconds % WORK_DAY_SECONDS;
    let (hours, rest) = (rest / 3600, rest % 3600);
    let (minutes, secs) = (rest / 60, rest % 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Uppercased first letters of each word: "jane van doe" -> "JVD".
pub fn initials(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}
