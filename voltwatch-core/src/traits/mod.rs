//! Platform seams
//!
//! These traits define the interface between the receive loop and the
//! host: where time comes from and where records go. The radio side lives
//! in `voltwatch-hal`.

pub mod clock;
pub mod sink;

pub use clock::{Clock, WallClock};
pub use sink::RecordSink;
