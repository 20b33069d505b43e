//! Readings, records and the wire payload
//!
//! A [`Reading`] is what the radio delivered; a [`Record`] is what gets
//! persisted: the reading stamped with local wall-clock time and a
//! derived charge percentage.

pub mod payload;
pub mod reading;
pub mod render;

pub use payload::{decode_reading, encode_reading, PayloadError, PAYLOAD_LEN};
pub use reading::{Reading, Record, WallTime};
pub use render::{Significant, RECORD_CAPACITY};
