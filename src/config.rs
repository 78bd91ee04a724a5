use serde::{Deserialize, Serialize};

use crate::error::{LfdError, LfdResult};

/// Default number of neighbours consulted per classification.
pub const DEFAULT_K: usize = 3;

/// Default weight applied to the summed finger-joint angle differences.
pub const DEFAULT_JOINT_WEIGHT: f64 = 10.0;

/// Complete configuration for classification sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LfdConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub metric: MetricConfig,
}

/// k-nearest-neighbour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Number of nearest examples that vote on a label (default: 3).
    pub k: usize,
}

/// Per-frame cost configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Multiplier on the finger-joint term of the frame cost (default: 10).
    pub joint_weight: f64,
}

impl ClassifierConfig {
    pub fn validate(&self) -> LfdResult<()> {
        if self.k == 0 {
            return Err(LfdError::invalid_config("k must be at least 1"));
        }
        Ok(())
    }
}

impl MetricConfig {
    pub fn validate(&self) -> LfdResult<()> {
        if !self.joint_weight.is_finite() || self.joint_weight < 0.0 {
            return Err(LfdError::invalid_config(format!(
                "joint_weight must be finite and non-negative (got {})",
                self.joint_weight
            )));
        }
        Ok(())
    }
}

impl LfdConfig {
    /// Check every section, reporting the first violation.
    pub fn validate(&self) -> LfdResult<()> {
        self.classifier.validate()?;
        self.metric.validate()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            joint_weight: DEFAULT_JOINT_WEIGHT,
        }
    }
}

impl Default for LfdConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            metric: MetricConfig::default(),
        }
    }
}
