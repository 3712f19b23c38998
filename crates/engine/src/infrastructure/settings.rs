//! Environment-driven world settings.
//!
//! Supported environment variables:
//! - WORLD_EMIT_MAX_RETRIES: retries after the first publish attempt (default 3)
//! - WORLD_EMIT_BASE_DELAY_MS: first backoff delay (default 50)
//! - WORLD_EMIT_MAX_DELAY_MS: backoff cap (default 2000)
//! - WORLD_EMIT_JITTER: jitter factor in [0, 1] (default 0)
//! - WORLD_PUBLISHER_MODE: `hard` or `soft` (default `hard`)
//! - WORLD_OBJECT_MAX_NESTING: container nesting limit (default 20)
//!
//! Unset variables take the default. Unparsable ones are logged and ignored.

use std::str::FromStr;

use super::emitter::{PublisherMode, RetryConfig};
use super::memory::DEFAULT_MAX_NESTING_DEPTH;

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSettings {
    pub retry: RetryConfig,
    pub publisher_mode: PublisherMode,
    pub max_nesting_depth: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            publisher_mode: PublisherMode::default(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl WorldSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let retry = &mut settings.retry;

        if let Some(v) = parsed(&lookup, "WORLD_EMIT_MAX_RETRIES") {
            retry.max_retries = v;
        }
        if let Some(v) = parsed(&lookup, "WORLD_EMIT_BASE_DELAY_MS") {
            retry.base_delay_ms = v;
        }
        if let Some(v) = parsed(&lookup, "WORLD_EMIT_MAX_DELAY_MS") {
            retry.max_delay_ms = v;
        }
        if let Some(v) = parsed::<f64>(&lookup, "WORLD_EMIT_JITTER") {
            if (0.0..=1.0).contains(&v) {
                retry.jitter_factor = v;
            } else {
                tracing::warn!(value = v, "WORLD_EMIT_JITTER out of range [0, 1], ignoring");
            }
        }
        if let Some(mode) = parsed(&lookup, "WORLD_PUBLISHER_MODE") {
            settings.publisher_mode = mode;
        }
        if let Some(v) = parsed(&lookup, "WORLD_OBJECT_MAX_NESTING") {
            settings.max_nesting_depth = v;
        }
        settings
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "unparsable setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(WorldSettings::from_lookup(lookup(&[])), WorldSettings::default());
    }

    #[test]
    fn reads_every_variable() {
        let settings = WorldSettings::from_lookup(lookup(&[
            ("WORLD_EMIT_MAX_RETRIES", "5"),
            ("WORLD_EMIT_BASE_DELAY_MS", "10"),
            ("WORLD_EMIT_MAX_DELAY_MS", "100"),
            ("WORLD_EMIT_JITTER", "0.25"),
            ("WORLD_PUBLISHER_MODE", " Soft "),
            ("WORLD_OBJECT_MAX_NESTING", "4"),
        ]));
        assert_eq!(settings.retry.max_retries, 5);
        assert_eq!(settings.retry.base_delay_ms, 10);
        assert_eq!(settings.retry.max_delay_ms, 100);
        assert_eq!(settings.retry.jitter_factor, 0.25);
        assert_eq!(settings.publisher_mode, PublisherMode::Soft);
        assert_eq!(settings.max_nesting_depth, 4);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let settings = WorldSettings::from_lookup(lookup(&[
            ("WORLD_EMIT_MAX_RETRIES", "many"),
            ("WORLD_EMIT_JITTER", "3.0"),
            ("WORLD_PUBLISHER_MODE", "loud"),
        ]));
        assert_eq!(settings, WorldSettings::default());
    }
}
