//! Restart policy

/// What the supervisor does after a listen invocation times out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestartPolicy {
    /// Run the listener once
    #[default]
    Never,
    /// Re-arm immediately after every timeout
    Always {
        /// Upper bound on restarts, `None` to run forever
        max_restarts: Option<u32>,
    },
}

impl RestartPolicy {
    /// Unbounded restarts
    pub const fn forever() -> Self {
        RestartPolicy::Always { max_restarts: None }
    }

    /// Check if another invocation may follow `restarts` earlier restarts
    pub fn should_restart(&self, restarts: u32) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::Always { max_restarts: None } => true,
            RestartPolicy::Always {
                max_restarts: Some(max),
            } => restarts < *max,
        }
    }
}
