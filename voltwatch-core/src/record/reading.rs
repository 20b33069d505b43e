//! Reading and record types

use core::fmt;

use crate::config::Calibration;

use super::render::Significant;

/// A single battery voltage as delivered by the sensor node
///
/// Always finite; non-finite payloads are rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    volts: f32,
}

impl Reading {
    /// Create a reading, `None` for NaN or infinity
    pub fn new(volts: f32) -> Option<Self> {
        if volts.is_finite() {
            Some(Self { volts })
        } else {
            None
        }
    }

    /// Measured voltage
    pub fn volts(&self) -> f32 {
        self.volts
    }
}

/// Local wall-clock time of day
///
/// Whatever the host clock reports; no timezone normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallTime {
    /// Create a time of day, `None` if a field is out of range
    ///
    /// Seconds go up to 60 to admit a leap second.
    pub fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second <= 60 {
            Some(Self {
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for WallTime {
    /// `H:M:S` without zero padding
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)
    }
}

/// The persisted form of a reading
///
/// Written wholesale; a new record never merges with the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Record {
    /// Time of receipt
    pub time: WallTime,
    /// Voltage, passed through unchanged
    pub voltage: f32,
    /// Derived charge percentage (0 at or below the empty voltage)
    pub percent: f32,
}

impl Record {
    /// Build a record from a reading received at `time`
    pub fn from_reading(reading: Reading, time: WallTime, calibration: &Calibration) -> Self {
        let voltage = reading.volts();
        Self {
            time,
            voltage,
            percent: calibration.percent(voltage),
        }
    }
}

impl fmt::Display for Record {
    /// `H:M:S, voltage, percent`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.time,
            Significant(self.voltage),
            Significant(self.percent)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_rejects_non_finite() {
        assert!(Reading::new(f32::NAN).is_none());
        assert!(Reading::new(f32::INFINITY).is_none());
        assert_eq!(Reading::new(8.6).map(|r| r.volts()), Some(8.6));
    }

    #[test]
    fn test_wall_time_ranges() {
        assert!(WallTime::new(23, 59, 60).is_some());
        assert!(WallTime::new(24, 0, 0).is_none());
        assert!(WallTime::new(0, 60, 0).is_none());
    }

    #[test]
    fn test_record_from_reading() {
        let time = WallTime::new(14, 3, 9).unwrap();
        let record = Record::from_reading(Reading::new(8.6).unwrap(), time, &Calibration::default());

        assert_eq!(record.time, time);
        assert_eq!(record.voltage, 8.6);
        assert!((record.percent - 21.57).abs() < 0.01);
    }

    #[test]
    fn test_low_voltage_record_has_zero_percent() {
        let record = Record::from_reading(
            Reading::new(2.233).unwrap(),
            WallTime::default(),
            &Calibration::default(),
        );
        assert_eq!(record.percent, 0.0);
    }

    #[test]
    fn test_record_display() {
        let record = Record {
            time: WallTime::new(14, 3, 9).unwrap(),
            voltage: 8.6,
            percent: Calibration::default().percent(8.6),
        };
        assert_eq!(record.to_string(), "14:3:9, 8.6, 21.5686");

        let record = Record {
            time: WallTime::new(0, 0, 0).unwrap(),
            voltage: 2.233,
            percent: 0.0,
        };
        assert_eq!(record.to_string(), "0:0:0, 2.233, 0");
    }
}
