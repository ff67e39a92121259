use std::collections::HashMap;

use tracing::trace;

use crate::measurement::{Measurement, env_key};

/// Acceptable range for a measurement: `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
}

impl Threshold {
    pub fn contains(&self, value: f64) -> bool {
        !(value >= self.max || value < self.min)
    }
}

/// Where `<KEY>_MIN` / `<KEY>_MAX` overrides come from.
#[derive(Debug, Clone, Default)]
enum OverrideSource {
    /// Read from the process environment on every lookup.
    #[default]
    Environment,
    Fixed(HashMap<String, String>),
}

impl OverrideSource {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            OverrideSource::Environment => std::env::var(key).ok(),
            OverrideSource::Fixed(values) => values.get(key).cloned(),
        }
    }
}

/// Resolves the acceptable range for a measurement name.
///
/// Nothing is cached: every call consults the override source again, so an
/// edited environment takes effect on the next cycle.
#[derive(Debug, Clone, Default)]
pub struct ThresholdResolver {
    overrides: OverrideSource,
}

impl ThresholdResolver {
    pub fn from_env() -> Self {
        Self {
            overrides: OverrideSource::Environment,
        }
    }

    pub fn with_overrides<K, V>(overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ToString,
        V: ToString,
    {
        Self {
            overrides: OverrideSource::Fixed(
                overrides
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    /// Returns `None` for names outside the tracked set.
    pub fn resolve(&self, name: &str) -> Option<Threshold> {
        let defaults = Measurement::from_name(name)?.default_threshold();
        let key = env_key(name);

        let threshold = Threshold {
            min: self.bound(&format!("{key}_MIN")).unwrap_or(defaults.min),
            max: self.bound(&format!("{key}_MAX")).unwrap_or(defaults.max),
        };
        trace!("{name}: resolved threshold {threshold:?}");

        Some(threshold)
    }

    fn bound(&self, key: &str) -> Option<f64> {
        let raw = self.overrides.get(key)?;
        raw.trim().parse().ok()
    }
}
