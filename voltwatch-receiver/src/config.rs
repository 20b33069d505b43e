//! Receiver configuration
//!
//! Loaded from an optional TOML file, then overridden by command line
//! flags. Every field has a default so an absent file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use voltwatch_core::{Calibration, ListenerConfig, ListenerMode, RestartPolicy};
use voltwatch_hal::{DataRate, LinkConfig, PaLevel, RadioNumber};

use crate::cli::Cli;

/// Default status file, shared with the readers that pick it up
pub const DEFAULT_STORE_PATH: &str = "BatteryUpdates.txt";

/// Radio wiring and link settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadioSection {
    /// spidev node the radio hangs off (CSN is the chip select)
    pub spi_device: PathBuf,
    /// SPI clock
    pub spi_speed_hz: u32,
    /// sysfs GPIO number of the CE line
    pub ce_pin: u64,
    /// RF channel
    pub channel: u8,
    /// Over-the-air data rate
    pub data_rate: DataRate,
    /// Transmit power; prompt at startup when unset
    pub pa_level: Option<PaLevel>,
    /// 0 or 1, see [`RadioNumber`]
    pub radio_number: u8,
    /// FIFO poll interval while waiting for data
    pub poll_interval_ms: u64,
}

impl Default for RadioSection {
    fn default() -> Self {
        let link = LinkConfig::default();
        Self {
            spi_device: PathBuf::from("/dev/spidev0.0"),
            spi_speed_hz: 10_000_000,
            ce_pin: 22,
            channel: link.channel,
            data_rate: link.data_rate,
            pa_level: None,
            radio_number: 0,
            poll_interval_ms: 1,
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerSection {
    /// Preset the rest of the section modifies
    pub mode: ListenerMode,
    /// Liveness window override in seconds
    pub timeout_s: Option<u32>,
    /// Bound on hardened-mode restarts (unbounded when unset)
    pub max_restarts: Option<u32>,
}

/// Status file settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Status file path
    pub path: PathBuf,
    /// Log readings instead of writing the file
    pub echo_only: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            echo_only: false,
        }
    }
}

/// Complete receiver configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverConfig {
    pub radio: RadioSection,
    pub listener: ListenerSection,
    pub store: StoreSection,
    pub battery: Calibration,
}

impl ReceiverConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load a configuration file, or defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("cannot read configuration {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command line overrides
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(mode) = cli.mode {
            self.listener.mode = mode.into();
        }
        if let Some(timeout) = cli.timeout {
            self.listener.timeout_s = Some(timeout);
        }
        if let Some(index) = cli.pa_level {
            let level = PaLevel::from_menu_index(index)
                .ok_or_else(|| anyhow!("PA level {index} out of range (0-3)"))?;
            self.radio.pa_level = Some(level);
        }
        if let Some(number) = cli.radio_number {
            self.radio.radio_number = number;
        }
        if let Some(path) = &cli.store {
            self.store.path = path.clone();
        }
        if cli.echo_only {
            self.store.echo_only = true;
        }
        Ok(())
    }

    /// Listener configuration for the session
    pub fn listener_config(&self) -> Result<ListenerConfig> {
        let mut config = ListenerConfig::for_mode(self.listener.mode);

        if let Some(secs) = self.listener.timeout_s {
            let ms = secs
                .checked_mul(1000)
                .ok_or_else(|| anyhow!("timeout of {secs} s is too long"))?;
            config = config.with_timeout_ms(ms);
        }
        match (self.listener.mode, self.listener.max_restarts) {
            (ListenerMode::Hardened, max_restarts) => {
                config.restart = RestartPolicy::Always { max_restarts };
            }
            (ListenerMode::Minimal, Some(_)) => {
                bail!("max_restarts only applies to the hardened listener");
            }
            (ListenerMode::Minimal, None) => {}
        }
        config.calibration = self.battery;

        config.validate().map_err(|e| anyhow!("{e}"))?;
        Ok(config)
    }

    /// Link configuration for the radio at PA level `pa_level`
    pub fn link_config(&self, pa_level: PaLevel) -> Result<LinkConfig> {
        let Some(number) = RadioNumber::from_index(self.radio.radio_number) else {
            bail!("radio number {} must be 0 or 1", self.radio.radio_number);
        };

        let mut link = LinkConfig::for_radio(number);
        link.channel = self.radio.channel;
        link.data_rate = self.radio.data_rate;
        link.pa_level = pa_level;

        link.validate().map_err(|e| anyhow!("{e}"))?;
        Ok(link)
    }
}
