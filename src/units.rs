//! Human-readable formatting for byte sizes, counts and durations.

const KIB: f64 = 1024.0;
const BYTE_UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// `1536` → `"1.50 KB"`; values under 1 KiB stay in bytes.
pub fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let magnitude = bytes.unsigned_abs();
    if magnitude < 1024 {
        return format!("{sign}{magnitude} B");
    }
    let mut value = magnitude as f64 / KIB;
    let mut unit = 0;
    while value >= KIB && unit < BYTE_UNITS.len() - 1 {
        value /= KIB;
        unit += 1;
    }
    format!("{sign}{value:.2} {}", BYTE_UNITS[unit])
}

/// `140_000_000` → `"140.00 ms"`.
pub fn format_nanos(nanos: i64) -> String {
    let sign = if nanos < 0 { "-" } else { "" };
    let magnitude = nanos.unsigned_abs();
    let (scaled, unit) = match magnitude {
        0..=999 => return format!("{sign}{magnitude} ns"),
        1_000..=999_999 => (magnitude as f64 / 1e3, "µs"),
        1_000_000..=999_999_999 => (magnitude as f64 / 1e6, "ms"),
        _ => (magnitude as f64 / 1e9, "s"),
    };
    format!("{sign}{scaled:.2} {unit}")
}

/// Integer with thousands separators: `1234567` → `"1,234,567"`.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Hard cut to at most `max_chars` characters, no ellipsis.
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Sample-value unit, decides how a column's numbers are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUnit {
    Nanoseconds,
    Bytes,
    Count,
}

impl ValueUnit {
    pub fn from_unit(unit: &str) -> Self {
        match unit {
            "nanoseconds" => Self::Nanoseconds,
            "bytes" => Self::Bytes,
            _ => Self::Count,
        }
    }

    pub fn format(self, value: i64) -> String {
        match self {
            Self::Nanoseconds => format_nanos(value),
            Self::Bytes => format_bytes(value),
            Self::Count => format_number(value),
        }
    }

    /// Like [`ValueUnit::format`] but positive values carry a leading `+`.
    pub fn format_delta(self, delta: i64) -> String {
        if delta > 0 {
            format!("+{}", self.format(delta))
        } else {
            self.format(delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_scale_through_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_bytes(-40 * 1024 * 1024), "-40.00 MB");
    }

    #[test]
    fn nanos_pick_readable_unit() {
        assert_eq!(format_nanos(999), "999 ns");
        assert_eq!(format_nanos(1_500), "1.50 µs");
        assert_eq!(format_nanos(140_000_000), "140.00 ms");
        assert_eq!(format_nanos(2_500_000_000), "2.50 s");
        assert_eq!(format_nanos(-10_000_000), "-10.00 ms");
    }

    #[test]
    fn numbers_get_grouped() {
        assert_eq!(format_number(280), "280");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(-45_000), "-45,000");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate_str("main.channelReceive", 4), "main");
        assert_eq!(truncate_str("short", 40), "short");
        assert_eq!(truncate_str("héllo", 2), "hé");
    }

    #[test]
    fn delta_marks_growth() {
        assert_eq!(ValueUnit::Count.format_delta(5), "+5");
        assert_eq!(ValueUnit::Count.format_delta(-5), "-5");
        assert_eq!(ValueUnit::Bytes.format_delta(2048), "+2.00 KB");
    }
}
