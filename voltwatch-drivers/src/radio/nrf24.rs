//! nRF24L01+ transceiver (SPI mode)
//!
//! The nRF24L01+ is a 2.4 GHz transceiver with a register interface over
//! SPI (mode 0, up to 10 MHz) and a separate CE line that gates RX/TX.
//!
//! # SPI Protocol
//!
//! Every transaction starts with a command byte; the chip shifts out its
//! STATUS register while the command is clocked in:
//! - `R_REGISTER | reg`, then one byte (five for address registers)
//! - `W_REGISTER | reg`, then the data
//! - `R_RX_PAYLOAD`, then the static payload size
//!
//! # Features Used
//!
//! - Static payload length on one RX pipe
//! - Enhanced ShockBurst auto-ack with 16-bit CRC
//! - FIFO_STATUS polling instead of the IRQ line

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use voltwatch_hal::link::{
    Address, DataRate, LinkConfig, LinkError, PaLevel, Pipe, ADDRESS_WIDTH, MAX_PAYLOAD_SIZE,
};
use voltwatch_hal::{RadioRx, RadioSetup};

/// nRF24L01+ register addresses
pub mod reg {
    /// Configuration (CRC, power, RX/TX)
    pub const CONFIG: u8 = 0x00;
    /// Auto-ack enable per pipe
    pub const EN_AA: u8 = 0x01;
    /// RX pipe enable
    pub const EN_RXADDR: u8 = 0x02;
    /// Address width
    pub const SETUP_AW: u8 = 0x03;
    /// Auto-retransmit delay and count
    pub const SETUP_RETR: u8 = 0x04;
    /// RF channel
    pub const RF_CH: u8 = 0x05;
    /// Data rate, PA level, LNA gain
    pub const RF_SETUP: u8 = 0x06;
    /// Interrupt flags and RX pipe number
    pub const STATUS: u8 = 0x07;
    /// Pipe 0 receive address (5 bytes)
    pub const RX_ADDR_P0: u8 = 0x0A;
    /// Pipe 1 receive address (5 bytes)
    pub const RX_ADDR_P1: u8 = 0x0B;
    /// Transmit address (5 bytes)
    pub const TX_ADDR: u8 = 0x10;
    /// Pipe 0 static payload width, pipes 1-5 follow
    pub const RX_PW_P0: u8 = 0x11;
    /// FIFO occupancy
    pub const FIFO_STATUS: u8 = 0x17;
    /// Dynamic payload enable per pipe
    pub const DYNPD: u8 = 0x1C;
    /// Feature flags
    pub const FEATURE: u8 = 0x1D;
}

/// SPI command bytes
pub mod cmd {
    /// Read register (OR with address)
    pub const R_REGISTER: u8 = 0x00;
    /// Write register (OR with address)
    pub const W_REGISTER: u8 = 0x20;
    /// Pop the head of the RX FIFO
    pub const R_RX_PAYLOAD: u8 = 0x61;
    /// Clear the TX FIFO
    pub const FLUSH_TX: u8 = 0xE1;
    /// Clear the RX FIFO
    pub const FLUSH_RX: u8 = 0xE2;
    /// No operation, returns STATUS
    pub const NOP: u8 = 0xFF;
}

// CONFIG bits
const EN_CRC: u8 = 1 << 3;
const CRCO: u8 = 1 << 2;
const PWR_UP: u8 = 1 << 1;
const PRIM_RX: u8 = 1 << 0;

// STATUS bits
const RX_DR: u8 = 1 << 6;
const TX_DS: u8 = 1 << 5;
const MAX_RT: u8 = 1 << 4;
const IRQ_FLAGS: u8 = RX_DR | TX_DS | MAX_RT;

// FIFO_STATUS bits
const RX_EMPTY: u8 = 1 << 0;

/// SETUP_AW value for 5-byte addresses
const ADDRESS_WIDTH_5: u8 = 0b11;

/// CONFIG after init: CRC16, powered up, standby
const CONFIG_STANDBY: u8 = EN_CRC | CRCO | PWR_UP;

/// Channel the chip is reset to before [`RadioSetup::configure`]
const RESET_CHANNEL: u8 = 76;

/// Retransmit delay step (x250 us + 250 us)
const RETRY_DELAY: u8 = 5;

/// Retransmit count
const RETRY_COUNT: u8 = 15;

/// Power-on settle time
const POWER_ON_DELAY_MS: u32 = 5;

/// Standby to RX settle time
const RX_SETTLE_US: u32 = 130;

/// Default interval between FIFO polls while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Longest single call into the delay provider, keeps `delay_us` in range
const MAX_DELAY_STEP: Duration = Duration::from_secs(1);

/// nRF24L01+ driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nrf24Error<SpiE, PinE> {
    /// SPI bus error
    Spi(SpiE),
    /// CE pin error
    Pin(PinE),
    /// Register readback after init did not match (value read)
    NotResponding(u8),
    /// Link configuration out of range
    Link(LinkError),
    /// Caller buffer shorter than the payload size
    BufferTooSmall,
}

/// Encode RF_SETUP from PA level and data rate
///
/// The LNA gain bit is always set.
pub fn rf_setup_value(level: PaLevel, rate: DataRate) -> u8 {
    let rate_bits = match rate {
        DataRate::Kbps250 => 0x20,
        DataRate::Mbps1 => 0x00,
        DataRate::Mbps2 => 0x08,
    };
    rate_bits | (level.menu_index() << 1) | 0x01
}

/// Encode SETUP_RETR from delay step and count (4 bits each)
pub fn retries_value(delay: u8, count: u8) -> u8 {
    ((delay & 0x0F) << 4) | (count & 0x0F)
}

/// Pipe number of the RX FIFO head from a STATUS byte
///
/// `None` when the FIFO is empty (RX_P_NO = 0b111).
pub fn pipe_from_status(status: u8) -> Option<Pipe> {
    Pipe::new((status >> 1) & 0x07)
}

/// RX_ADDR register for a pipe
pub fn rx_addr_register(pipe: Pipe) -> u8 {
    reg::RX_ADDR_P0 + pipe.index()
}

/// RX_PW register for a pipe
pub fn rx_pw_register(pipe: Pipe) -> u8 {
    reg::RX_PW_P0 + pipe.index()
}

/// nRF24L01+ driver
///
/// Owns the SPI device (which drives CSN), the CE pin and a delay
/// provider used for settle times and FIFO polling.
pub struct Nrf24l01<SPI, CE, D> {
    spi: SPI,
    ce: CE,
    delay: D,
    /// Shadow of the CONFIG register
    config_reg: u8,
    /// Static payload size in bytes
    payload_size: u8,
    /// Sleep between FIFO polls in `wait_available`
    poll_interval: Duration,
}

impl<SPI, CE, D> Nrf24l01<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    /// Create a new driver
    ///
    /// Does not touch the hardware; call [`Nrf24l01::init`] next.
    pub fn new(spi: SPI, ce: CE, delay: D) -> Self {
        Self {
            spi,
            ce,
            delay,
            config_reg: 0,
            payload_size: MAX_PAYLOAD_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the FIFO poll interval used while waiting for payloads
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Reset the chip to a known state and verify it answers
    ///
    /// Returns [`Nrf24Error::NotResponding`] when the register readback
    /// shows no chip on the bus (all zeros or all ones) or the chip did
    /// not power up.
    pub fn init(&mut self) -> Result<(), Nrf24Error<SPI::Error, CE::Error>> {
        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        let rf_setup = rf_setup_value(PaLevel::Max, DataRate::Mbps1);
        self.write_register(reg::SETUP_RETR, retries_value(RETRY_DELAY, RETRY_COUNT))?;
        self.write_register(reg::RF_SETUP, rf_setup)?;
        self.write_register(reg::SETUP_AW, ADDRESS_WIDTH_5)?;
        self.write_register(reg::DYNPD, 0)?;
        self.write_register(reg::FEATURE, 0)?;
        self.write_register(reg::EN_AA, 0x3F)?;
        self.write_register(reg::STATUS, IRQ_FLAGS)?;
        self.write_register(reg::RF_CH, RESET_CHANNEL)?;
        self.command(cmd::FLUSH_RX)?;
        self.command(cmd::FLUSH_TX)?;

        self.config_reg = CONFIG_STANDBY;
        self.write_register(reg::CONFIG, self.config_reg)?;
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        let readback = self.read_register(reg::RF_SETUP)?;
        if readback == 0x00 || readback == 0xFF {
            return Err(Nrf24Error::NotResponding(readback));
        }
        let readback = self.read_register(reg::CONFIG)?;
        if readback != CONFIG_STANDBY {
            return Err(Nrf24Error::NotResponding(readback));
        }

        Ok(())
    }

    /// Read STATUS
    pub fn status(&mut self) -> Result<u8, Nrf24Error<SPI::Error, CE::Error>> {
        self.command(cmd::NOP)
    }

    /// Release the bus, pin and delay
    pub fn release(self) -> (SPI, CE, D) {
        (self.spi, self.ce, self.delay)
    }

    /// Block for `duration` in steps the delay provider can take
    fn sleep(&mut self, duration: Duration) {
        let mut left = duration;
        while !left.is_zero() {
            let step = left.min(MAX_DELAY_STEP);
            self.delay.delay_us(step.as_micros() as u32);
            left -= step;
        }
    }

    fn command(&mut self, command: u8) -> Result<u8, Nrf24Error<SPI::Error, CE::Error>> {
        let mut buf = [command];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(Nrf24Error::Spi)?;
        Ok(buf[0])
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Nrf24Error<SPI::Error, CE::Error>> {
        let mut buf = [cmd::R_REGISTER | register, cmd::NOP];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(Nrf24Error::Spi)?;
        Ok(buf[1])
    }

    fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), Nrf24Error<SPI::Error, CE::Error>> {
        self.write_register_bytes(register, &[value])
    }

    fn write_register_bytes(
        &mut self,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), Nrf24Error<SPI::Error, CE::Error>> {
        let mut buf = [0u8; 1 + ADDRESS_WIDTH];
        let len = bytes.len().min(ADDRESS_WIDTH);
        buf[0] = cmd::W_REGISTER | register;
        buf[1..=len].copy_from_slice(&bytes[..len]);
        self.spi
            .transfer_in_place(&mut buf[..=len])
            .map_err(Nrf24Error::Spi)
    }

    /// Open a reading pipe on `address`
    ///
    /// Pipes 2-5 share the upper four bytes of pipe 1 and only take the
    /// least significant byte.
    fn open_reading_pipe(
        &mut self,
        pipe: Pipe,
        address: &Address,
    ) -> Result<(), Nrf24Error<SPI::Error, CE::Error>> {
        let bytes = address.as_bytes();
        if pipe.index() < 2 {
            self.write_register_bytes(rx_addr_register(pipe), bytes)?;
        } else {
            self.write_register(rx_addr_register(pipe), bytes[0])?;
        }
        self.write_register(rx_pw_register(pipe), self.payload_size)?;

        let enabled = self.read_register(reg::EN_RXADDR)?;
        self.write_register(reg::EN_RXADDR, enabled | (1 << pipe.index()))
    }
}

impl<SPI, CE, D> RadioSetup for Nrf24l01<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    type Error = Nrf24Error<SPI::Error, CE::Error>;

    fn configure(&mut self, config: &LinkConfig) -> Result<(), Self::Error> {
        config.validate().map_err(Nrf24Error::Link)?;

        self.ce.set_low().map_err(Nrf24Error::Pin)?;
        self.payload_size = config.payload_size;

        self.write_register(reg::RF_CH, config.channel)?;
        self.write_register(reg::RF_SETUP, rf_setup_value(config.pa_level, config.data_rate))?;

        // Writing pipe: TX_ADDR plus pipe 0 for auto-ack
        let tx = config.tx_address.as_bytes();
        self.write_register_bytes(reg::TX_ADDR, tx)?;
        self.write_register_bytes(reg::RX_ADDR_P0, tx)?;
        self.write_register(reg::RX_PW_P0, self.payload_size)?;

        self.open_reading_pipe(config.rx_pipe, &config.rx_address)
    }

    fn start_listening(&mut self) -> Result<(), Self::Error> {
        self.config_reg |= PRIM_RX | PWR_UP;
        self.write_register(reg::CONFIG, self.config_reg)?;
        self.write_register(reg::STATUS, IRQ_FLAGS)?;
        self.ce.set_high().map_err(Nrf24Error::Pin)?;
        self.delay.delay_us(RX_SETTLE_US);
        Ok(())
    }
}

impl<SPI, CE, D> RadioRx for Nrf24l01<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    type Error = Nrf24Error<SPI::Error, CE::Error>;

    fn available(&mut self) -> Result<Option<Pipe>, Self::Error> {
        let fifo = self.read_register(reg::FIFO_STATUS)?;
        if fifo & RX_EMPTY != 0 {
            return Ok(None);
        }
        let status = self.status()?;
        Ok(pipe_from_status(status))
    }

    fn wait_available(&mut self, timeout: Duration) -> Result<Option<Pipe>, Self::Error> {
        let mut waited = Duration::ZERO;

        loop {
            if let Some(pipe) = self.available()? {
                return Ok(Some(pipe));
            }
            if waited >= timeout {
                return Ok(None);
            }

            let step = self.poll_interval.min(timeout - waited);
            self.sleep(step);
            waited += step.max(Duration::from_micros(1));
        }
    }

    fn idle(&mut self, duration: Duration) {
        self.sleep(duration);
    }

    fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let size = self.payload_size as usize;
        if buf.len() < size {
            return Err(Nrf24Error::BufferTooSmall);
        }

        let mut frame = [0u8; 1 + MAX_PAYLOAD_SIZE as usize];
        frame[0] = cmd::R_RX_PAYLOAD;
        self.spi
            .transfer_in_place(&mut frame[..=size])
            .map_err(Nrf24Error::Spi)?;
        buf[..size].copy_from_slice(&frame[1..=size]);

        self.write_register(reg::STATUS, RX_DR)?;
        Ok(size)
    }

    fn payload_size(&self) -> u8 {
        self.payload_size
    }
}
