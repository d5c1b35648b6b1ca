// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Human-readable formatting for report cells.

use std::time::Duration;

const SI_SUFFIXES: &[&str] = &["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count with SI (base 1000) units.
///
/// Values below ten bytes are printed exactly. Larger values are rounded to
/// one decimal, which is dropped once the mantissa reaches ten: `1.5 kB`,
/// `10 kB`, `235 MB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{} B", bytes);
    }

    let mut exponent = 0;
    let mut scaled = bytes;
    while scaled >= 1000 && exponent < SI_SUFFIXES.len() - 1 {
        scaled /= 1000;
        exponent += 1;
    }
    let value = bytes as f64 / 1000f64.powi(exponent as i32);
    let mantissa = (value * 10.0 + 0.5).floor() / 10.0;

    if mantissa < 10.0 {
        format!("{:.1} {}", mantissa, SI_SUFFIXES[exponent])
    } else {
        format!("{:.0} {}", mantissa, SI_SUFFIXES[exponent])
    }
}

/// Format a duration with a unit that fits its magnitude.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs_f64();

    if total < 1.0 {
        format!("{:.2}ms", total * 1000.0)
    } else if total < 60.0 {
        format!("{:.2}s", total)
    } else if total < 3600.0 {
        let secs = d.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        let secs = d.as_secs();
        format!("{}h{:02}m{:02}s", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

/// Format a saved-space percentage with two decimals.
pub fn format_saved(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:.2}%", p),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(9), "9 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1_000), "1.0 kB");
        assert_eq!(format_bytes(1_500), "1.5 kB");
        assert_eq!(format_bytes(6_000), "6.0 kB");
        assert_eq!(format_bytes(10_000), "10 kB");
        assert_eq!(format_bytes(235_000_000), "235 MB");
        assert_eq!(format_bytes(u64::MAX), "18 EB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.50ms");
        assert_eq!(format_duration(Duration::ZERO), "0.00ms");
        assert_eq!(format_duration(Duration::from_millis(2_340)), "2.34s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_duration(Duration::from_secs(3_600 + 61)), "1h01m01s");
    }

    #[test]
    fn test_format_saved() {
        assert_eq!(format_saved(Some(40.0)), "40.00%");
        assert_eq!(format_saved(Some(-12.5)), "-12.50%");
        assert_eq!(format_saved(None), "n/a");
    }
}
