//! Receive-and-persist listener
//!
//! One listen invocation arms a liveness window and keeps receiving until
//! the window expires. Every accepted payload is committed and pushes the
//! deadline out; nothing else does.

pub mod liveness;
pub mod machine;
pub mod session;

pub use liveness::LivenessWindow;
pub use machine::{ListenEvent, ListenState};
pub use session::{Listen, ListenReport, Session};
