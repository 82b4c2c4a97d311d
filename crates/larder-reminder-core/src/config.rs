//! Reminder scheduling configuration

/// Reminder scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderConfig {
    /// How many recent samples feed the cycle estimate
    pub sample_window: u32,
    /// Averaged estimates above this many days are discarded
    pub max_cycle_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            sample_window: 5,
            max_cycle_days: 365,
        }
    }
}

impl ReminderConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of samples averaged (at least one)
    #[must_use]
    pub fn with_sample_window(mut self, samples: u32) -> Self {
        self.sample_window = samples.max(1);
        self
    }

    /// Set the upper bound for a plausible cycle (at least one day)
    #[must_use]
    pub fn with_max_cycle_days(mut self, days: u32) -> Self {
        self.max_cycle_days = days.max(1);
        self
    }
}
