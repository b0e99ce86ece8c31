use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Two-phase retry schedule for bridge polling.
///
/// The first `fast_attempts` ticks are spaced `fast_interval` apart, the
/// following `slow_attempts` ticks `slow_interval` apart. A single-phase
/// schedule is expressed with `slow_attempts = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub fast_interval: Duration,
    pub fast_attempts: u32,
    pub slow_interval: Duration,
    pub slow_attempts: u32,
}

impl PollSchedule {
    /// Total number of poll ticks before the widget gives up.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.fast_attempts.saturating_add(self.slow_attempts)
    }

    /// Delay to wait after the `attempt`-th failed tick (1-based) before the
    /// next one. Returns `None` once the budget is spent.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.total_attempts() {
            None
        } else if attempt < self.fast_attempts {
            Some(self.fast_interval)
        } else {
            Some(self.slow_interval)
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_millis(250),
            fast_attempts: 12,
            slow_interval: Duration::from_millis(1_000),
            slow_attempts: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub poll_schedule: PollSchedule,
    /// Maximum nesting depth the payload extractor will descend.
    pub max_extract_depth: usize,
    /// Per-call timeout for bridge accessor awaits; `None` waits indefinitely.
    pub bridge_call_timeout: Option<Duration>,
    /// ISO 4217 code used when a payload does not name its currency.
    pub default_currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            log_level: "info".to_string(),
            poll_schedule: PollSchedule::default(),
            max_extract_depth: 32,
            bridge_call_timeout: None,
            default_currency: "USD".to_string(),
        }
    }
}
