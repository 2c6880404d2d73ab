//! What a batch is asked to achieve, and parsing it from form input.
//!
//! Form fields arrive as text. Numbers are read the way a browser's
//! `parseFloat` reads them: leading whitespace is skipped, the longest
//! numeric prefix is taken, and anything after it is ignored.

use crate::error::ProcessError;
use crate::search::{MAX_QUALITY_FRACTION, MIN_QUALITY_FRACTION};

/// Lowest quality percentage accepted from the quality field.
pub const MIN_QUALITY_PERCENT: f64 = 10.0;
/// Highest quality percentage accepted from the quality field.
pub const MAX_QUALITY_PERCENT: f64 = 100.0;

/// Either a target file size or an explicit encoder quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetMode {
    /// Search for output close to this many kilobytes.
    Size { kilobytes: f64 },
    /// Encode once at this quality fraction.
    Quality { fraction: f64 },
}

impl TargetMode {
    /// Parse the target-size field (kilobytes).
    pub fn size_from_input(input: &str) -> Result<Self, ProcessError> {
        match parse_float(input) {
            Some(kilobytes) if kilobytes.is_finite() && kilobytes > 0.0 => {
                Ok(TargetMode::Size { kilobytes })
            }
            _ => Err(ProcessError::InvalidTarget(input.trim().to_string())),
        }
    }

    /// Parse the quality field (a percentage, 10 to 100 inclusive).
    pub fn quality_from_input(input: &str) -> Result<Self, ProcessError> {
        match parse_float(input) {
            Some(percent) if (MIN_QUALITY_PERCENT..=MAX_QUALITY_PERCENT).contains(&percent) => {
                Ok(TargetMode::Quality {
                    fraction: percent / 100.0,
                })
            }
            _ => Err(ProcessError::InvalidQuality(input.trim().to_string())),
        }
    }

    /// Re-check a mode built directly rather than parsed.
    pub fn validate(self) -> Result<Self, ProcessError> {
        match self {
            TargetMode::Size { kilobytes } if !(kilobytes.is_finite() && kilobytes > 0.0) => {
                Err(ProcessError::InvalidTarget(kilobytes.to_string()))
            }
            TargetMode::Quality { fraction }
                if !(MIN_QUALITY_FRACTION..=MAX_QUALITY_FRACTION).contains(&fraction) =>
            {
                Err(ProcessError::InvalidQuality(format!("{}", fraction * 100.0)))
            }
            mode => Ok(mode),
        }
    }
}

/// Read a leading decimal number from `input`, `parseFloat`-style.
///
/// Returns `None` where `parseFloat` would return `NaN`.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let value = f64::INFINITY;
        return Some(if s.starts_with('-') { -value } else { value });
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Read a leading non-negative integer from `input`, `parseInt`-style.
///
/// Returns `None` for empty or non-numeric input and for values that do not
/// fit a `u32`.
pub fn parse_dimension(input: &str) -> Option<u32> {
    let s = input.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_plain_numbers() {
        assert_eq!(parse_float("50"), Some(50.0));
        assert_eq!(parse_float("  12.5 "), Some(12.5));
        assert_eq!(parse_float("-3"), Some(-3.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_float_trailing_garbage() {
        assert_eq!(parse_float("75%"), Some(75.0));
        assert_eq!(parse_float("50kb"), Some(50.0));
        assert_eq!(parse_float("2e"), Some(2.0));
        assert_eq!(parse_float("1.2.3"), Some(1.2));
    }

    #[test]
    fn test_parse_float_nan_cases() {
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("-"), None);
    }

    #[test]
    fn test_parse_float_infinity() {
        assert_eq!(parse_float("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_float("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_size_from_input() {
        assert_eq!(
            TargetMode::size_from_input("50").unwrap(),
            TargetMode::Size { kilobytes: 50.0 }
        );
        for bad in ["", "0", "-10", "abc", "Infinity"] {
            assert!(matches!(
                TargetMode::size_from_input(bad),
                Err(ProcessError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn test_quality_from_input_bounds() {
        assert_eq!(
            TargetMode::quality_from_input("75").unwrap(),
            TargetMode::Quality { fraction: 0.75 }
        );
        assert_eq!(
            TargetMode::quality_from_input("10").unwrap(),
            TargetMode::Quality { fraction: 0.1 }
        );
        assert_eq!(
            TargetMode::quality_from_input("100").unwrap(),
            TargetMode::Quality { fraction: 1.0 }
        );
        for bad in ["9.99", "100.01", "0", "", "high"] {
            assert!(matches!(
                TargetMode::quality_from_input(bad),
                Err(ProcessError::InvalidQuality(_))
            ));
        }
    }

    #[test]
    fn test_validate_direct_modes() {
        assert!(TargetMode::Size { kilobytes: 1.0 }.validate().is_ok());
        assert!(TargetMode::Size { kilobytes: 0.0 }.validate().is_err());
        assert!(TargetMode::Quality { fraction: 0.1 }.validate().is_ok());
        assert!(TargetMode::Quality { fraction: 0.05 }.validate().is_err());
        assert!(TargetMode::Quality { fraction: f64::NAN }.validate().is_err());
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("1000"), Some(1000));
        assert_eq!(parse_dimension(" 640px"), Some(640));
        assert_eq!(parse_dimension("12.7"), Some(12));
        assert_eq!(parse_dimension(""), None);
        assert_eq!(parse_dimension("-5"), None);
        assert_eq!(parse_dimension("99999999999"), None);
    }
}
