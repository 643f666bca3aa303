//! Human-readable size and duration formatting.
//!
//! Both helpers are infallible: bad input falls back to `"0B"` / `"0s"`
//! rather than surfacing an error into progress rendering.

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Render a byte count with binary (1024-based) unit prefixes.
pub fn humanbytes(size: u64) -> String {
    if size == 0 {
        return "0B".to_string();
    }

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Render a millisecond count as a compact multi-unit string, e.g.
/// `"1d, 2h, 3m, 4s, 5ms"`. Zero-valued units are omitted; non-finite or
/// negative input yields `"0s"`.
pub fn format_duration(milliseconds: f64) -> String {
    if !milliseconds.is_finite() || milliseconds < 0.0 {
        return "0s".to_string();
    }

    let total = milliseconds as u64;
    let (seconds, milliseconds) = (total / 1000, total % 1000);
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let (days, hours) = (hours / 24, hours % 24);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}s"));
    }
    if milliseconds > 0 {
        parts.push(format!("{milliseconds}ms"));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanbytes_zero() {
        assert_eq!(humanbytes(0), "0B");
    }

    #[test]
    fn humanbytes_small_values_stay_in_bytes() {
        assert_eq!(humanbytes(1), "1 B");
        assert_eq!(humanbytes(512), "512 B");
        assert_eq!(humanbytes(1023), "1023 B");
    }

    #[test]
    fn humanbytes_binary_units() {
        assert_eq!(humanbytes(1024), "1.0 KiB");
        assert_eq!(humanbytes(1536), "1.5 KiB");
        assert_eq!(humanbytes(1024 * 1024), "1.0 MiB");
        assert_eq!(humanbytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn humanbytes_is_monotonic_across_unit_boundaries() {
        fn approx_bytes(rendered: &str) -> f64 {
            if rendered == "0B" {
                return 0.0;
            }
            let (value, unit) = rendered.split_once(' ').unwrap();
            let scale = UNITS.iter().position(|u| *u == unit).unwrap();
            value.parse::<f64>().unwrap() * 1024f64.powi(scale as i32)
        }

        let sizes = [0u64, 1, 512, 1023, 1024, 4096, 1024 * 1024, u64::MAX];
        for window in sizes.windows(2) {
            let a = approx_bytes(&humanbytes(window[0]));
            let b = approx_bytes(&humanbytes(window[1]));
            assert!(a <= b, "{} rendered larger than {}", window[0], window[1]);
        }
    }

    #[test]
    fn duration_zero() {
        assert_eq!(format_duration(0.0), "0s");
    }

    #[test]
    fn duration_ninety_seconds() {
        let formatted = format_duration(90_000.0);
        assert!(formatted.contains("1m"), "got {formatted}");
        assert!(formatted.contains("30s"), "got {formatted}");
    }

    #[test]
    fn duration_appends_each_nonzero_unit() {
        let one_day = 24.0 * 60.0 * 60.0 * 1000.0;
        assert_eq!(format_duration(one_day + 7_000.0), "1d, 7s");
        assert_eq!(format_duration(3_600_000.0 + 60_000.0 + 1_000.0), "1h, 1m, 1s");
        assert_eq!(format_duration(250.0), "250ms");
    }

    #[test]
    fn duration_malformed_input_falls_back() {
        assert_eq!(format_duration(f64::NAN), "0s");
        assert_eq!(format_duration(f64::INFINITY), "0s");
        assert_eq!(format_duration(-5.0), "0s");
    }
}
