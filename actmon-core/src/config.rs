//! Estimator configuration
//!
//! The only tunable is the decay constant τ in seconds. It can be set in code
//! or through the `ACTMON_DECAY_CONSTANT` environment variable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DECAY_CONSTANT_ENV, DEFAULT_DECAY_CONSTANT};

/// Errors from configuration loading
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Cannot parse {var}={value:?} as a number of seconds")]
    Unparseable { var: String, value: String },

    #[error("Decay constant must be a positive finite number of seconds, got {0}")]
    InvalidDecayConstant(f64),
}

/// Configuration shared by every counter in a registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Time constant τ in seconds; half-life is ln(2) * τ
    pub decay_constant: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            decay_constant: DEFAULT_DECAY_CONSTANT,
        }
    }
}

impl ActivityConfig {
    /// Build a validated configuration
    pub fn new(decay_constant: f64) -> Result<Self, ConfigError> {
        if !decay_constant.is_finite() || decay_constant <= 0.0 {
            return Err(ConfigError::InvalidDecayConstant(decay_constant));
        }
        Ok(Self { decay_constant })
    }

    /// Load from the process environment, falling back to the default
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using a custom variable lookup (useful for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(DECAY_CONSTANT_ENV) {
            None => Ok(Self::default()),
            Some(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Some(raw) => {
                let value = raw.trim().parse::<f64>().map_err(|_| ConfigError::Unparseable {
                    var: DECAY_CONSTANT_ENV.to_string(),
                    value: raw.clone(),
                })?;
                Self::new(value)
            }
        }
    }

    /// Half-life implied by the decay constant
    pub fn half_life(&self) -> std::time::Duration {
        crate::half_life(self.decay_constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_twenty_seconds() {
        assert_eq!(ActivityConfig::default().decay_constant, 20.0);
        assert_eq!(ActivityConfig::from_lookup(|_| None).unwrap().decay_constant, 20.0);
    }

    #[test]
    fn test_env_override() {
        let config = ActivityConfig::from_lookup(|var| {
            (var == DECAY_CONSTANT_ENV).then(|| " 45.5 ".to_string())
        })
        .unwrap();
        assert_eq!(config.decay_constant, 45.5);
    }

    #[test]
    fn test_blank_env_uses_default() {
        let config = ActivityConfig::from_lookup(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config, ActivityConfig::default());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = ActivityConfig::from_lookup(|_| Some("fast".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Unparseable { .. }));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(
            ActivityConfig::new(0.0),
            Err(ConfigError::InvalidDecayConstant(0.0))
        );
        assert!(ActivityConfig::new(-3.0).is_err());
        assert!(ActivityConfig::new(f64::INFINITY).is_err());
        assert!(ActivityConfig::from_lookup(|_| Some("NaN".to_string())).is_err());
    }
}
