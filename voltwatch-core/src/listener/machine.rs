//! Listener state machine
//!
//! The listener is either waiting for data or has given up on the
//! current window. Whether to listen again is the supervisor's call.

/// Listener states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListenState {
    /// Window armed, waiting for payloads
    #[default]
    Listening,
    /// Window expired without data
    TimedOut,
}

/// Events that drive the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListenEvent {
    /// A payload was read, decoded and handed to the sink
    PayloadAccepted,
    /// The transport failed or the payload was malformed
    PayloadRejected,
    /// The liveness deadline passed
    DeadlineElapsed,
    /// Caller asked to listen again
    Rearm,
}

impl ListenEvent {
    /// Check if this event refreshes the liveness deadline
    pub fn refreshes_deadline(&self) -> bool {
        matches!(self, ListenEvent::PayloadAccepted)
    }
}

impl ListenState {
    /// Check if the listener is waiting for data
    pub fn is_listening(&self) -> bool {
        matches!(self, ListenState::Listening)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ListenEvent) -> Self {
        use ListenEvent::*;
        use ListenState::*;

        match (self, event) {
            (Listening, PayloadAccepted) => Listening,
            (Listening, PayloadRejected) => Listening,
            (Listening, DeadlineElapsed) => TimedOut,

            (TimedOut, Rearm) => Listening,

            // Default: stay in current state
            _ => self,
        }
    }
}
