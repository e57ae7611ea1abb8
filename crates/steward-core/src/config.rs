//! Orchestration settings, built once at startup

use std::time::Duration;

/// Default overall deadline for one orchestration
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 60_000;

#[derive(Clone, Debug)]
pub struct OrchestrationConfig {
    /// Overall deadline for one orchestration, fan-out branches included
    pub operation_timeout: Duration,
    /// Asset-system state id meaning "salvaged / out of service"
    pub retired_state_id: i64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            retired_state_id: 0,
        }
    }
}

impl OrchestrationConfig {
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn with_retired_state_id(mut self, state_id: i64) -> Self {
        self.retired_state_id = state_id;
        self
    }
}
