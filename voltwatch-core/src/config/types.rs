//! Configuration type definitions

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::supervisor::RestartPolicy;

/// Silence tolerated by the minimal listener before it gives up
pub const MINIMAL_TIMEOUT_MS: u32 = 6_000;

/// Silence tolerated by the hardened listener before it re-arms
pub const HARDENED_TIMEOUT_MS: u32 = 120_000;

/// Pause after a transport error before the radio is polled again
pub const DEFAULT_ERROR_IDLE_MS: u32 = 10;

/// Battery voltage reported as 0%
pub const DEFAULT_EMPTY_VOLTS: f64 = 7.5;

/// Voltage span from 0% to 100% (12.6 V full)
pub const DEFAULT_SPAN_VOLTS: f64 = 5.1;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timeout of zero would time out before the first poll
    ZeroTimeout,
    /// Calibration span must be a positive finite number
    InvalidSpan,
    /// Calibration floor must be finite
    InvalidEmptyVolts,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroTimeout => write!(f, "listener timeout must be greater than zero"),
            ConfigError::InvalidSpan => write!(f, "battery span must be a positive number of volts"),
            ConfigError::InvalidEmptyVolts => write!(f, "battery empty voltage must be finite"),
        }
    }
}

/// Two-point linear battery calibration
///
/// `empty_volts` maps to 0% and `empty_volts + span_volts` to 100%. The
/// defaults match the empirical discharge curve of the monitored pack
/// (7.5 V empty, 12.6 V full). Readings above full are not clamped and
/// report more than 100%.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Calibration {
    /// Voltage at 0%
    pub empty_volts: f64,
    /// Volts between 0% and 100%
    pub span_volts: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            empty_volts: DEFAULT_EMPTY_VOLTS,
            span_volts: DEFAULT_SPAN_VOLTS,
        }
    }
}

impl Calibration {
    /// Derived charge percentage for a voltage
    ///
    /// Exactly 0 at or below `empty_volts`. Computed in double precision
    /// and narrowed, like the sensor firmware's reference calculation.
    pub fn percent(&self, volts: f32) -> f32 {
        let volts = volts as f64;
        if volts > self.empty_volts {
            ((volts - self.empty_volts) / self.span_volts * 100.0) as f32
        } else {
            0.0
        }
    }

    /// Check the calibration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.empty_volts.is_finite() {
            return Err(ConfigError::InvalidEmptyVolts);
        }
        if !self.span_volts.is_finite() || self.span_volts <= 0.0 {
            return Err(ConfigError::InvalidSpan);
        }
        Ok(())
    }
}

/// Listener variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ListenerMode {
    /// Listen once with a short window, then stop
    Minimal,
    /// Long window, re-armed forever after every timeout
    #[default]
    Hardened,
}

/// Listener configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListenerConfig {
    /// Liveness window in milliseconds
    pub timeout_ms: u32,
    /// What happens after a timeout
    pub restart: RestartPolicy,
    /// Voltage to percent mapping
    pub calibration: Calibration,
    /// Pause after a failed wait or read, in milliseconds
    pub error_idle_ms: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::hardened()
    }
}

impl ListenerConfig {
    /// 6 second window, no restart
    pub const fn minimal() -> Self {
        Self {
            timeout_ms: MINIMAL_TIMEOUT_MS,
            restart: RestartPolicy::Never,
            calibration: Calibration {
                empty_volts: DEFAULT_EMPTY_VOLTS,
                span_volts: DEFAULT_SPAN_VOLTS,
            },
            error_idle_ms: DEFAULT_ERROR_IDLE_MS,
        }
    }

    /// 120 second window, restarted immediately and without bound
    pub const fn hardened() -> Self {
        Self {
            timeout_ms: HARDENED_TIMEOUT_MS,
            restart: RestartPolicy::Always { max_restarts: None },
            calibration: Calibration {
                empty_volts: DEFAULT_EMPTY_VOLTS,
                span_volts: DEFAULT_SPAN_VOLTS,
            },
            error_idle_ms: DEFAULT_ERROR_IDLE_MS,
        }
    }

    /// Preset for a listener variant
    pub const fn for_mode(mode: ListenerMode) -> Self {
        match mode {
            ListenerMode::Minimal => Self::minimal(),
            ListenerMode::Hardened => Self::hardened(),
        }
    }

    /// Override the liveness window
    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Liveness window as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms as u64)
    }

    /// Pause after a transport error
    pub fn error_idle(&self) -> Duration {
        Duration::from_millis(self.error_idle_ms as u64)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.calibration.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_presets() {
        let minimal = ListenerConfig::minimal();
        assert_eq!(minimal.timeout(), Duration::from_secs(6));
        assert_eq!(minimal.restart, RestartPolicy::Never);

        let hardened = ListenerConfig::hardened();
        assert_eq!(hardened.timeout(), Duration::from_secs(120));
        assert_eq!(hardened.restart, RestartPolicy::Always { max_restarts: None });

        assert_eq!(ListenerConfig::for_mode(ListenerMode::Minimal), minimal);
        assert_eq!(ListenerConfig::default(), hardened);
        assert_eq!(minimal.error_idle(), Duration::from_millis(10));
    }

    #[test]
    fn test_calibration_reference_points() {
        let cal = Calibration::default();
        assert!((cal.percent(12.6) - 100.0).abs() < 0.01);
        assert!((cal.percent(10.05) - 50.0).abs() < 0.01);
        assert!((cal.percent(8.6) - 21.57).abs() < 0.01);
        assert_eq!(cal.percent(7.5), 0.0);
    }

    #[test]
    fn test_percent_not_clamped() {
        let cal = Calibration::default();
        assert!(cal.percent(13.5) > 100.0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(ListenerConfig::minimal().validate(), Ok(()));
        assert_eq!(
            ListenerConfig::minimal().with_timeout_ms(0).validate(),
            Err(ConfigError::ZeroTimeout)
        );

        let mut config = ListenerConfig::hardened();
        config.calibration.span_volts = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpan));

        config.calibration = Calibration {
            empty_volts: f64::NAN,
            span_volts: 5.1,
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidEmptyVolts));
    }

    proptest! {
        #[test]
        fn prop_percent_zero_at_or_below_empty(v in -1000.0f32..=7.5f32) {
            prop_assert_eq!(Calibration::default().percent(v), 0.0);
        }

        #[test]
        fn prop_percent_linear_above_empty(v in 7.5001f32..1000.0f32) {
            let expected = ((v as f64 - 7.5) / 5.1 * 100.0) as f32;
            prop_assert_eq!(Calibration::default().percent(v), expected);
        }
    }
}
