//! Board-agnostic core logic for the voltwatch battery monitor
//!
//! This crate contains everything between the radio and the status file
//! that does not depend on a specific platform:
//!
//! - Reading, record and payload types (voltage to percent transform)
//! - Liveness window and the listener state machine
//! - The receive-and-persist session loop
//! - Supervisor with an explicit restart policy
//! - Clock and record sink traits
//! - Listener configuration presets

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod listener;
pub mod record;
pub mod supervisor;
pub mod traits;

pub use config::{Calibration, ListenerConfig, ListenerMode};
pub use listener::{Listen, ListenReport, ListenState, Session};
pub use record::{Reading, Record, WallTime};
pub use supervisor::{RestartPolicy, Supervisor, SupervisorReport};
pub use traits::{Clock, RecordSink, WallClock};
