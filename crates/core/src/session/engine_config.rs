use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enrollment::domain::enrollment_aggregator::SamplingPolicy;
use crate::liveness::domain::liveness_evaluator::LivenessConfig;
use crate::liveness::domain::motion::MovementThresholds;
use crate::matching::domain::matcher::MatchThresholds;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Every tunable of the engine, loadable from a JSON file.
///
/// Missing keys fall back to their defaults, so a config file only needs
/// to name what it overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matching: MatchThresholds,
    pub sampling: SamplingPolicy,
    pub liveness: LivenessConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("matching.recognition", self.matching.recognition)?;
        non_negative("matching.login", self.matching.login)?;

        if self.sampling.max_samples == 0 {
            return Err(ConfigError::Invalid("sampling.max_samples must be >= 1".into()));
        }
        if self.sampling.max_tries == 0 {
            return Err(ConfigError::Invalid("sampling.max_tries must be >= 1".into()));
        }

        let blink = &self.liveness.blink;
        non_negative("liveness.blink.closed", blink.closed)?;
        non_negative("liveness.blink.open", blink.open)?;
        if blink.open <= blink.closed {
            return Err(ConfigError::Invalid(format!(
                "liveness.blink.open ({}) must exceed liveness.blink.closed ({})",
                blink.open, blink.closed
            )));
        }

        let c = &self.liveness.continuous;
        non_negative("liveness.continuous.center_shift_px", c.center_shift_px)?;
        non_negative("liveness.continuous.area_change", c.area_change)?;
        non_negative("liveness.continuous.max_score", c.max_score)?;
        non_negative("liveness.continuous.activation", c.activation)?;
        if !(0.0..=1.0).contains(&c.decay) {
            return Err(ConfigError::Invalid(format!(
                "liveness.continuous.decay must be between 0.0 and 1.0, got {}",
                c.decay
            )));
        }

        movement("liveness.loose", &self.liveness.loose)?;
        movement("liveness.strict", &self.liveness.strict)?;

        // Sampling stops after min(max_samples, max_tries) pulls when a face
        // stays in view; that run must be long enough for the strict gate.
        let pulls = self.sampling.max_samples.min(self.sampling.max_tries) as u64;
        let span_ms = (pulls - 1).saturating_mul(self.sampling.interval_ms);
        if span_ms < self.liveness.strict.min_duration_ms {
            return Err(ConfigError::Invalid(format!(
                "sampling spans at most {span_ms}ms but liveness.strict.min_duration_ms is {}; enrollment could never pass",
                self.liveness.strict.min_duration_ms
            )));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{name} must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn movement(name: &str, t: &MovementThresholds) -> Result<(), ConfigError> {
    non_negative(&format!("{name}.center_shift_px"), t.center_shift_px)?;
    non_negative(&format!("{name}.area_change"), t.area_change)
}
