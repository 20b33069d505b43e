//! Linux radio bring-up
//!
//! The radio sits on a spidev node (CSN driven by the SPI controller) with
//! CE on a sysfs GPIO.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use log::debug;
use sysfs_gpio::Direction;
use voltwatch_drivers::radio::Nrf24l01;

use crate::config::RadioSection;

/// nRF24L01 on Linux spidev + sysfs GPIO
pub type LinuxRadio = Nrf24l01<SpidevDevice, SysfsPin, Delay>;

/// Open and configure the SPI device (mode 0, 8-bit words)
fn open_spi(path: &Path, speed_hz: u32) -> Result<SpidevDevice> {
    let mut spi = SpidevDevice::open(path)
        .map_err(|e| anyhow!("{e:?}"))
        .with_context(|| format!("cannot open {}", path.display()))?;

    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .with_context(|| format!("cannot configure {}", path.display()))?;

    debug!("Opened {} at {} Hz", path.display(), speed_hz);
    Ok(spi)
}

/// Export the CE line as an output, driven low
fn export_ce(pin: u64) -> Result<SysfsPin> {
    let ce = SysfsPin::new(pin);
    ce.export()
        .with_context(|| format!("cannot export GPIO {pin}"))?;
    ce.set_direction(Direction::Low)
        .with_context(|| format!("cannot drive GPIO {pin}"))?;

    debug!("Exported CE on GPIO {}", pin);
    Ok(ce)
}

/// Bring up the radio and check that it answers
///
/// The radio is left powered up in standby; link configuration is the
/// caller's job.
pub fn open_radio(radio: &RadioSection) -> Result<LinuxRadio> {
    let spi = open_spi(&radio.spi_device, radio.spi_speed_hz)?;
    let ce = export_ce(radio.ce_pin)?;
    let poll_interval = Duration::from_millis(radio.poll_interval_ms.max(1));

    let mut driver = Nrf24l01::new(spi, ce, Delay).with_poll_interval(poll_interval);
    driver
        .init()
        .map_err(|e| anyhow!("radio hardware is not responding: {e:?}"))?;
    Ok(driver)
}
