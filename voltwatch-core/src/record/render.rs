//! Fixed-size text rendering
//!
//! Status file readers expect numbers the way a C++ stream prints them by
//! default: six significant digits, no trailing zeros.

use core::fmt::{self, Write};

use heapless::String;

use super::reading::Record;

/// Upper bound on a rendered record, in bytes
pub const RECORD_CAPACITY: usize = 64;

/// Significant digits printed for floating-point fields
pub const SIGNIFICANT_DIGITS: i32 = 6;

/// Scratch size for a single rendered number
const NUMBER_CAPACITY: usize = 32;

/// `Display` adapter printing an `f32` with six significant digits
///
/// Follows the `%g` rules: the decimal exponent after rounding picks
/// fixed notation for `[-4, 6)` and scientific notation otherwise, with a
/// signed exponent of at least two digits (`1e+06`, `9.34975e-06`).
/// Trailing zeros are dropped in both forms.
#[derive(Debug, Clone, Copy)]
pub struct Significant(pub f32);

impl fmt::Display for Significant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if !value.is_finite() {
            return write!(f, "{}", value);
        }
        if value == 0.0 {
            return f.write_str("0");
        }

        let value = value as f64;
        let mut buf: String<NUMBER_CAPACITY> = String::new();
        write!(buf, "{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value)?;
        let (mantissa, exponent) = buf.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
            let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
            let mut fixed: String<NUMBER_CAPACITY> = String::new();
            write!(fixed, "{:.*}", decimals, value)?;
            f.write_str(trim_fraction(&fixed))
        } else {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", trim_fraction(mantissa), sign, exponent.unsigned_abs())
        }
    }
}

/// Drop trailing zeros after the decimal point, and the point itself
fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

impl Record {
    /// Render into a bounded buffer
    ///
    /// Every record fits in [`RECORD_CAPACITY`] bytes, which bounds the
    /// size of the persisted store.
    pub fn render(&self) -> Result<String<RECORD_CAPACITY>, fmt::Error> {
        let mut out = String::new();
        write!(out, "{}", self)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WallTime;

    fn sig(value: f32) -> std::string::String {
        Significant(value).to_string()
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(sig(8.6), "8.6");
        assert_eq!(sig(12.6), "12.6");
        assert_eq!(sig(21.568_635), "21.5686");
        assert_eq!(sig(100.000_01), "100");
        assert_eq!(sig(0.0), "0");
        assert_eq!(sig(-3.25), "-3.25");
        assert_eq!(sig(123_456.7), "123457");
    }

    #[test]
    fn test_significant_rounds_up_a_digit() {
        assert_eq!(sig(9.999_999), "10");
    }

    #[test]
    fn test_significant_scientific_outside_range() {
        assert_eq!(sig(1.0e7), "1e+07");
        assert_eq!(sig(1.5e7), "1.5e+07");
        assert_eq!(sig(0.000_01), "1e-05");
        assert_eq!(sig(9.349_748e-6), "9.34975e-06");
        assert_eq!(sig(-f32::MAX), "-3.40282e+38");
    }

    #[test]
    fn test_significant_exponent_chosen_after_rounding() {
        assert_eq!(sig(999_999.9), "1e+06");
        assert_eq!(sig(999_994.0), "999994");
        assert_eq!(sig(0.000_1), "0.0001");
    }

    #[test]
    fn test_percent_just_above_empty() {
        let percent = crate::config::Calibration::default().percent(7.500_000_5);
        assert_eq!(sig(percent), "9.34975e-06");
    }

    #[test]
    fn test_render_worst_case_fits() {
        let record = Record {
            time: WallTime::new(23, 59, 59).unwrap(),
            voltage: -f32::MAX,
            percent: -0.000_123_456_7,
        };
        let text = record.render().unwrap();
        assert!(text.len() <= RECORD_CAPACITY);
        assert!(text.starts_with("23:59:59, "));
    }

    #[test]
    fn test_render_matches_display() {
        let record = Record {
            time: WallTime::new(7, 5, 0).unwrap(),
            voltage: 11.4,
            percent: 76.47,
        };
        assert_eq!(record.render().unwrap().as_str(), "7:5:0, 11.4, 76.47");
    }
}
