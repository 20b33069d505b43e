//! Radio payload codec
//!
//! The sensor node sends one `f32` per packet: four bytes, IEEE-754,
//! little-endian. postcard's `f32` encoding is exactly that layout.

use super::reading::Reading;

/// Payload length on the wire
pub const PAYLOAD_LEN: usize = 4;

/// Payload decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Payload is not exactly [`PAYLOAD_LEN`] bytes
    WrongLength(usize),
    /// Deserialization failed
    Decode,
    /// Serialization failed
    Encode,
    /// Bytes decode to NaN or infinity
    NotFinite,
}

/// Decode a reading from a raw payload
pub fn decode_reading(bytes: &[u8]) -> Result<Reading, PayloadError> {
    if bytes.len() != PAYLOAD_LEN {
        return Err(PayloadError::WrongLength(bytes.len()));
    }

    let volts: f32 = postcard::from_bytes(bytes).map_err(|_| PayloadError::Decode)?;
    Reading::new(volts).ok_or(PayloadError::NotFinite)
}

/// Encode a reading the way the sensor node transmits it
pub fn encode_reading(reading: Reading) -> Result<[u8; PAYLOAD_LEN], PayloadError> {
    let mut buf = [0u8; PAYLOAD_LEN];
    postcard::to_slice(&reading.volts(), &mut buf).map_err(|_| PayloadError::Encode)?;
    Ok(buf)
}
