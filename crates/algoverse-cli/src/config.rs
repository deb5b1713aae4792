//! Environment configuration for the `algoverse` binary.
//!
//! Flags override these values.

use std::time::Duration;

use tracing::warn;

pub const BASE_INTERVAL_VAR: &str = "ALGOVERSE_BASE_INTERVAL_MS";
pub const MAX_STEPS_VAR: &str = "ALGOVERSE_MAX_STEPS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Playback period at speed 1.0.
    pub base_interval: Duration,
    /// Recorder step limit.
    pub max_steps: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            base_interval: Duration::from_millis(1000),
            max_steps: 100_000,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a variable lookup. Unparseable values fall
    /// back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = CliConfig::default();
        let base_interval = parse_var(&lookup, BASE_INTERVAL_VAR)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_interval);
        let max_steps = parse_var(&lookup, MAX_STEPS_VAR)
            .filter(|n| *n >= 2)
            .map(|n| n as usize)
            .unwrap_or(defaults.max_steps);
        CliConfig {
            base_interval,
            max_steps,
        }
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "ignoring invalid value");
            None
        }
    }
}
