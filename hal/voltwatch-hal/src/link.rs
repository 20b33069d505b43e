//! Point-to-point link configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest usable RF channel (2400 + 125 MHz)
pub const MAX_CHANNEL: u8 = 125;

/// Largest static payload the link carries
pub const MAX_PAYLOAD_SIZE: u8 = 32;

/// Address width used on both ends of the link
pub const ADDRESS_WIDTH: usize = 5;

/// The address pair shared by the sensor node and this receiver
///
/// Think of an address as a path rather than a device identity: each
/// node transmits on its own address and listens on the other one.
pub const NODE_ADDRESSES: [Address; 2] = [Address(*b"1Node"), Address(*b"2Node")];

/// Logical receive pipe (0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pipe(u8);

impl Pipe {
    /// Number of RX pipes on the link
    pub const COUNT: u8 = 6;

    /// Create a pipe, `None` if out of range
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Pipe index
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Five-byte pipe address, least significant byte first on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(pub [u8; ADDRESS_WIDTH]);

impl Address {
    /// Address bytes in wire order
    pub fn as_bytes(&self) -> &[u8; ADDRESS_WIDTH] {
        &self.0
    }
}

/// Power amplifier level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PaLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm (power-on default)
    #[default]
    Max,
}

impl PaLevel {
    /// Map an operator menu choice (`0 = MIN` .. `3 = MAX`)
    pub fn from_menu_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PaLevel::Min),
            1 => Some(PaLevel::Low),
            2 => Some(PaLevel::High),
            3 => Some(PaLevel::Max),
            _ => None,
        }
    }

    /// Menu index for this level
    pub fn menu_index(self) -> u8 {
        match self {
            PaLevel::Min => 0,
            PaLevel::Low => 1,
            PaLevel::High => 2,
            PaLevel::Max => 3,
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            PaLevel::Min => "MIN",
            PaLevel::Low => "LOW",
            PaLevel::High => "HIGH",
            PaLevel::Max => "MAX",
        }
    }
}

/// Over-the-air data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataRate {
    /// 250 kbps (nRF24L01+ only)
    #[cfg_attr(feature = "serde", serde(rename = "250kbps"))]
    Kbps250,
    /// 1 Mbps
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "1mbps"))]
    Mbps1,
    /// 2 Mbps
    #[cfg_attr(feature = "serde", serde(rename = "2mbps"))]
    Mbps2,
}

/// Which of the two fixed addresses this node transmits from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioNumber {
    /// Transmit on `1Node`, listen on `2Node`
    #[default]
    Zero,
    /// Transmit on `2Node`, listen on `1Node`
    One,
}

impl RadioNumber {
    /// Create from the numeric form used on the command line
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(RadioNumber::Zero),
            1 => Some(RadioNumber::One),
            _ => None,
        }
    }

    /// Address this node transmits from
    pub fn tx_address(self) -> Address {
        match self {
            RadioNumber::Zero => NODE_ADDRESSES[0],
            RadioNumber::One => NODE_ADDRESSES[1],
        }
    }

    /// Address of the peer, opened for reading
    pub fn rx_address(self) -> Address {
        match self {
            RadioNumber::Zero => NODE_ADDRESSES[1],
            RadioNumber::One => NODE_ADDRESSES[0],
        }
    }
}

/// Link configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Channel above [`MAX_CHANNEL`]
    InvalidChannel(u8),
    /// Payload size zero or above [`MAX_PAYLOAD_SIZE`]
    InvalidPayloadSize(u8),
    /// Pipe 0 is reserved for the writing address
    ReservedPipe,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::InvalidChannel(ch) => {
                write!(f, "channel {} out of range (0-{})", ch, MAX_CHANNEL)
            }
            LinkError::InvalidPayloadSize(size) => {
                write!(f, "payload size {} out of range (1-{})", size, MAX_PAYLOAD_SIZE)
            }
            LinkError::ReservedPipe => write!(f, "pipe 0 is reserved for the writing address"),
        }
    }
}

/// Everything the radio needs before it can listen
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// RF channel (0-125)
    pub channel: u8,
    /// Transmit power
    pub pa_level: PaLevel,
    /// Over-the-air data rate
    pub data_rate: DataRate,
    /// Static payload size in bytes
    pub payload_size: u8,
    /// Address loaded into the writing pipe (pipe 0)
    pub tx_address: Address,
    /// Address the peer transmits on
    pub rx_address: Address,
    /// Pipe the peer address is opened on
    pub rx_pipe: Pipe,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::for_radio(RadioNumber::Zero)
    }
}

impl LinkConfig {
    /// Default link for one end of the `1Node`/`2Node` pair
    ///
    /// Carries a single `f32` (4 bytes) on channel 76 at 1 Mbps.
    pub fn for_radio(number: RadioNumber) -> Self {
        Self {
            channel: 76,
            pa_level: PaLevel::Max,
            data_rate: DataRate::Mbps1,
            payload_size: 4,
            tx_address: number.tx_address(),
            rx_address: number.rx_address(),
            rx_pipe: Pipe(1),
        }
    }

    /// Check ranges before touching the hardware
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.channel > MAX_CHANNEL {
            return Err(LinkError::InvalidChannel(self.channel));
        }
        if self.payload_size == 0 || self.payload_size > MAX_PAYLOAD_SIZE {
            return Err(LinkError::InvalidPayloadSize(self.payload_size));
        }
        if self.rx_pipe.index() == 0 {
            return Err(LinkError::ReservedPipe);
        }
        Ok(())
    }
}
