//! Substrate configuration

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::Signal;

/// Default capacity of the history ring buffer.
pub const DEFAULT_MAX_HISTORY: usize = 16;

/// Pure mapping from an emitted signal to a field delta.
///
/// Only consulted for emits that carry no explicit delta.
#[derive(Clone)]
pub struct SignalToDelta(Arc<dyn Fn(&Signal) -> f64 + Send + Sync>);

impl SignalToDelta {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Signal) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, signal: &Signal) -> f64 {
        (self.0)(signal)
    }
}

impl fmt::Debug for SignalToDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignalToDelta(<fn>)")
    }
}

/// Configuration rejected by [`SubstrateConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_history must be > 0")]
    ZeroHistory,

    #[error("noise_level must be >= 0 (got {0})")]
    NegativeNoise(f64),

    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f64 },
}

/// Configuration for a feedback substrate.
///
/// Fixed for the lifetime of a substrate; `reset` returns to exactly this.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubstrateConfig {
    /// PRNG seed. Reduced modulo 2^32.
    pub seed: i64,

    /// Constant added to the field each tick.
    pub drift_per_tick: f64,

    /// Scale of the per-tick perturbation, drawn uniformly from [-1, 1).
    pub noise_level: f64,

    /// Capacity of the history ring buffer.
    pub max_history: usize,

    /// Field value at construction and after reset.
    pub field_init: f64,

    /// Optional signal -> delta hook for emits without an explicit delta.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub signal_to_delta: Option<SignalToDelta>,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            drift_per_tick: 0.0,
            noise_level: 0.0,
            max_history: DEFAULT_MAX_HISTORY,
            field_init: 0.0,
            signal_to_delta: None,
        }
    }
}

impl SubstrateConfig {
    /// Create a default configuration with the given seed.
    pub fn new(seed: i64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_drift(mut self, drift_per_tick: f64) -> Self {
        self.drift_per_tick = drift_per_tick;
        self
    }

    pub fn with_noise(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_field_init(mut self, field_init: f64) -> Self {
        self.field_init = field_init;
        self
    }

    /// Install a signal -> delta hook.
    pub fn with_signal_to_delta<F>(mut self, f: F) -> Self
    where
        F: Fn(&Signal) -> f64 + Send + Sync + 'static,
    {
        self.signal_to_delta = Some(SignalToDelta::new(f));
        self
    }

    /// Seed as the 32-bit PRNG state it initializes.
    #[inline]
    pub fn seed_u32(&self) -> u32 {
        self.seed as u32
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        for (name, value) in [
            ("drift_per_tick", self.drift_per_tick),
            ("noise_level", self.noise_level),
            ("field_init", self.field_init),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if self.noise_level < 0.0 {
            return Err(ConfigError::NegativeNoise(self.noise_level));
        }
        Ok(())
    }
}
