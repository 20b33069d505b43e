//! Configuration types
//!
//! Listener timing, restart behaviour and battery calibration. The
//! receiver binary deserializes these from its TOML file when the `serde`
//! feature is enabled.

pub mod types;

pub use types::*;
