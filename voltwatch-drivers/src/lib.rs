//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in voltwatch-hal:
//!
//! - Radio transceivers (nRF24L01+ over SPI)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod radio;
