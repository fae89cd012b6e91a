//! Service configuration.

use std::time::Duration;

use anyhow::Context;

/// Runtime knobs for the pantry service and its background refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryConfig {
    /// Periodic suggestion recompute.
    pub refresh_interval: Duration,
    /// Trailing-edge window that coalesces bursts of refresh requests.
    pub debounce: Duration,
    /// How long the latest error stays visible; `None` keeps it until replaced.
    pub error_ttl: Option<Duration>,
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60 * 60),
            debounce: Duration::from_secs(1),
            error_ttl: Some(Duration::from_secs(3)),
        }
    }
}

impl PantryConfig {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_error_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.error_ttl = ttl;
        self
    }

    /// Load from `PANTRY_*` environment variables, falling back to defaults.
    ///
    /// - `PANTRY_REFRESH_INTERVAL_SECS`
    /// - `PANTRY_DEBOUNCE_MS`
    /// - `PANTRY_ERROR_TTL_MS` (`0` disables expiry)
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_u64(&lookup, "PANTRY_REFRESH_INTERVAL_SECS") {
            if secs == 0 {
                tracing::warn!("PANTRY_REFRESH_INTERVAL_SECS must be positive; using default");
            } else {
                config.refresh_interval = Duration::from_secs(secs);
            }
        }

        if let Some(ms) = read_u64(&lookup, "PANTRY_DEBOUNCE_MS") {
            config.debounce = Duration::from_millis(ms);
        }

        if let Some(ms) = read_u64(&lookup, "PANTRY_ERROR_TTL_MS") {
            config.error_ttl = (ms > 0).then(|| Duration::from_millis(ms));
        }

        config
    }
}

fn read_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match parse_u64(key, &raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("ignoring {key}: {e:#}");
            None
        }
    }
}

fn parse_u64(key: &str, raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key}={raw:?} is not a non-negative integer"))
}
