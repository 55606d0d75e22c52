//! Human-readable renderings of counters and timestamps.

/// At most two units, e.g. `2 days, 3 hours` or `45 minutes, 12 seconds`.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0 seconds".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(unit(days, "day"));
    }
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 && days == 0 {
        parts.push(unit(minutes, "minute"));
    }
    if secs > 0 && days == 0 && hours == 0 {
        parts.push(unit(secs, "second"));
    }
    parts.truncate(2);
    parts.join(", ")
}

fn unit(value: u64, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}

/// `never` for an unset timestamp, otherwise the distance to `now`.
pub fn format_time_ago(timestamp: i64, now: i64) -> String {
    if timestamp <= 0 {
        return "never".to_string();
    }
    match u64::try_from(now - timestamp) {
        Ok(elapsed) => format!("{} ago", format_duration(elapsed)),
        Err(_) => "in the future".to_string(),
    }
}

/// Thousands separated, e.g. `1,234,567`.
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

pub fn format_speed(execs_per_sec: f64) -> String {
    if execs_per_sec >= 1000.0 {
        let whole = execs_per_sec.trunc() as u64;
        let cents = ((execs_per_sec - execs_per_sec.trunc()) * 100.0).round() as u64;
        // Rounding the fraction can carry into the integer part.
        let (whole, cents) = if cents >= 100 { (whole + 1, 0) } else { (whole, cents) };
        format!("{}.{cents:02} execs/sec", format_number(whole))
    } else if execs_per_sec >= 1.0 {
        format!("{execs_per_sec:.2} execs/sec")
    } else {
        format!("{execs_per_sec:.4} execs/sec")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn durations_show_two_units() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(45 * 60 + 12), "45 minutes, 12 seconds");
        assert_eq!(format_duration(3 * 3600 + 5 * 60 + 7), "3 hours, 5 minutes");
        assert_eq!(format_duration(2 * 86_400 + 3 * 3600 + 59), "2 days, 3 hours");
        assert_eq!(format_duration(86_400 + 60), "1 day");
    }

    #[test]
    fn time_ago() {
        assert_eq!(format_time_ago(0, 1_000), "never");
        assert_eq!(format_time_ago(940, 1_000), "1 minute ago");
        assert_eq!(format_time_ago(2_000, 1_000), "in the future");
    }

    #[test]
    fn numbers_and_speeds() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_speed(2_345.756), "2,345.76 execs/sec");
        assert_eq!(format_speed(1_999.999), "2,000.00 execs/sec");
        assert_eq!(format_speed(12.5), "12.50 execs/sec");
        assert_eq!(format_speed(0.5), "0.5000 execs/sec");
        assert_eq!(format_percent(12.346), "12.35%");
    }
}
