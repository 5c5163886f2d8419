//! Time display helpers

/// Format seconds as `m:ss`. Negative and non-finite values render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}

/// Format whole seconds as `m:ss`
pub fn format_secs(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
