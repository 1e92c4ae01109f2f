use crate::types::{Media, MediaSummary};

fn split_components(value: &str) -> Option<(i64, i64, i64)> {
    let mut parts = value.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    Some((h.parse().ok()?, m.parse().ok()?, s.parse().ok()?))
}

fn total_seconds(h: i64, m: i64, s: i64) -> i64 {
    h.saturating_mul(3600)
        .saturating_add(m.saturating_mul(60))
        .saturating_add(s)
}

/// Parse an `H:M:S` timestamp into total seconds.
///
/// Returns `None` unless the value has exactly three `:`-separated integer
/// components. Components are not range checked, so `45:30:00` parses.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let (h, m, s) = split_components(value)?;
    Some(total_seconds(h, m, s))
}

/// Format seconds as HH:MM:SS timestamp
pub fn format_seconds(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Bring an out-of-range timestamp back inside `[0, length]`.
///
/// Models often shift units by one place and write `MM:SS` as `HH:MM:SS`, so an
/// out-of-range `H:M:S` is first reread as `00:H:M`. When that is still past
/// the end it is clamped to `length`. A negative total is clamped to
/// `00:00:00`. Values that do not parse are returned untouched.
pub fn correct_timestamp(value: &str, length_in_seconds: u32) -> String {
    let Some((h, m, s)) = split_components(value) else {
        return value.to_string();
    };

    let length = i64::from(length_in_seconds);
    let total = total_seconds(h, m, s);
    if total < 0 {
        return format_seconds(0);
    }
    if total <= length {
        return value.to_string();
    }

    let corrected = h.saturating_mul(60).saturating_add(m);
    if (0..=length).contains(&corrected) {
        return format!("00:{:02}:{:02}", h, m);
    }

    format_seconds(length_in_seconds)
}

/// Human-readable title, summary and cast handed to the model as context.
pub fn summary_document(summary: &MediaSummary) -> String {
    let cast: String = summary
        .cast
        .iter()
        .map(|c| format!("{} - {}\n", c.character_name, c.actor_name))
        .collect();

    format!(
        "Title:{}\nSummary:\n\n{}\nCast:\n\n{}\n",
        summary.title, summary.summary, cast
    )
}

/// Format the assembled timeline as `[start–end] script` lines
pub fn format_timeline(media: &Media) -> String {
    media
        .segments
        .iter()
        .map(|seg| format!("[{}–{}] {}", seg.start, seg.end, seg.script.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
