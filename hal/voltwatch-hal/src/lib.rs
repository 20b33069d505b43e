//! Voltwatch Hardware Abstraction Layer
//!
//! This crate defines the transport shim between the receive loop and a
//! point-to-point radio. Chip drivers (nRF24L01, simulators, test fakes)
//! implement these traits so the same loop runs against any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  voltwatch-receiver (Linux binary)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltwatch-core (listener, records)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltwatch-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voltwatch-drivers (nRF24L01 over SPI)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`radio::RadioSetup`] - Addressing, channel and power configuration
//! - [`radio::RadioRx`] - Payload availability and reads

#![no_std]
#![deny(unsafe_code)]

pub mod link;
pub mod radio;

// Re-export key types at crate root for convenience
pub use link::{Address, DataRate, LinkConfig, LinkError, PaLevel, Pipe, RadioNumber};
pub use radio::{RadioRx, RadioSetup};
