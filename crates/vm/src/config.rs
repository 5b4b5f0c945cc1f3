//! VM configuration.
//!
//! Configuration specifies limits only; the engine enforces them.

/// Runtime limits for the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of instructions to execute. `None` runs until the
    /// program completes, exits or fails.
    pub max_steps: Option<u64>,
}

impl VmConfig {
    /// Create a configuration with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of executed instructions.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}
