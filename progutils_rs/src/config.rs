//! Runtime settings for the dispatcher.
//!
//! Settings come from the environment only; there is no config file.
//! Unparseable values fall back to the default with a warning.

use serde::Serialize;

use crate::types::ColorMode;

pub const COLOR_ENV: &str = "PROGUTILS_COLOR";
pub const BATCH_THREADS_ENV: &str = "PROGUTILS_BATCH_THREADS";
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Thread count for `batchThreaded` when `-numThreads` is not given.
pub const DEFAULT_BATCH_THREADS: u32 = 2;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerConfig {
    pub color: ColorMode,
    pub batch_threads: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            batch_threads: DEFAULT_BATCH_THREADS,
        }
    }
}

impl RunnerConfig {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(COLOR_ENV) {
            match raw.parse::<ColorMode>() {
                Ok(mode) => config.color = mode,
                Err(e) => tracing::warn!("{COLOR_ENV}: {e}, using auto"),
            }
        } else if lookup(NO_COLOR_ENV).is_some_and(|v| !v.is_empty()) {
            config.color = ColorMode::Never;
        }

        if let Some(raw) = lookup(BATCH_THREADS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.batch_threads = n,
                _ => tracing::warn!(
                    "{BATCH_THREADS_ENV}={raw:?} is not a positive integer, using {DEFAULT_BATCH_THREADS}"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.batch_threads, 2);
    }

    #[test]
    fn test_explicit_color_beats_no_color() {
        let config =
            RunnerConfig::from_lookup(lookup_from(&[(COLOR_ENV, "always"), (NO_COLOR_ENV, "1")]));
        assert_eq!(config.color, ColorMode::Always);
    }

    #[test]
    fn test_no_color_disables() {
        let config = RunnerConfig::from_lookup(lookup_from(&[(NO_COLOR_ENV, "1")]));
        assert_eq!(config.color, ColorMode::Never);
    }

    #[test]
    fn test_bad_thread_count_keeps_default() {
        let config = RunnerConfig::from_lookup(lookup_from(&[(BATCH_THREADS_ENV, "0")]));
        assert_eq!(config.batch_threads, DEFAULT_BATCH_THREADS);

        let config = RunnerConfig::from_lookup(lookup_from(&[(BATCH_THREADS_ENV, " 6 ")]));
        assert_eq!(config.batch_threads, 6);
    }
}
