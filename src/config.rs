//! Configuration types.

use std::time::Duration;

/// Default bound on each finalization side effect, in seconds.
const DEFAULT_OP_TIMEOUT_SECS: u64 = 30;

/// Flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Upper bound on each finalization side effect (save, report).
    /// Elapsing counts as failure of that step.
    pub op_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(DEFAULT_OP_TIMEOUT_SECS),
        }
    }
}

impl FlowConfig {
    /// Build config from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let op_timeout_secs: u64 = std::env::var("LEAD_INTAKE_OP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_OP_TIMEOUT_SECS);

        Self {
            op_timeout: Duration::from_secs(op_timeout_secs),
        }
    }
}
