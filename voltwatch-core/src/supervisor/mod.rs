//! Listener supervision
//!
//! Decides whether a timed-out listener is started again.

pub mod policy;
pub mod runner;

pub use policy::RestartPolicy;
pub use runner::{Supervisor, SupervisorReport};
