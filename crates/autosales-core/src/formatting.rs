//! Display formatting for aggregate values.
//!
//! The engine never rounds; everything here is presentation-only.

/// Insert `,` between every group of three digits of an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format `value` with thousands separators and `decimals` fractional digits.
///
/// ```
/// use autosales_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.54, 2), "-9,876.54");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::new();
    // "-0.00" reads as noise; only sign non-zero output.
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Short axis label: `950`, `12.3K`, `4.5M`.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}{:.1}K", abs / 1_000.0)
    } else {
        format!("{sign}{:.0}", abs)
    }
}

/// `part` as a percentage of `whole`; `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Percentage with one decimal and a `%` suffix.
pub fn format_percent(pct: f64) -> String {
    format!("{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(123456.789, 2), "123,456.79");
    }

    #[test]
    fn test_format_number_negative_zero_unsigned() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(12_340.0), "12.3K");
        assert_eq!(format_compact(4_500_000.0), "4.5M");
        assert_eq!(format_compact(-2_000.0), "-2.0K");
    }

    #[test]
    fn test_percentage() {
        assert!((percentage(25.0, 200.0) - 12.5).abs() < 1e-9);
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(format_percent(12.34), "12.3%");
    }
}
