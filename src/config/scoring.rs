//! Risk scoring configuration
//!
//! Weights for the four fragility factors plus the bounds on the
//! version-control query.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Trailing window for volatility and contributor counts
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Upper bound on the version-control query before metrics fall back to zero
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,

    #[serde(default)]
    pub weights: RiskWeights,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            history_timeout_ms: default_history_timeout_ms(),
            weights: RiskWeights::default(),
        }
    }
}

fn default_window_days() -> u32 {
    90
}

fn default_history_timeout_ms() -> u64 {
    5000
}

/// Factor weights for the composite fragility score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskWeights {
    #[serde(default = "default_structural_weight")]
    pub structural: f64,

    #[serde(default = "default_volatility_weight")]
    pub volatility: f64,

    #[serde(default = "default_knowledge_weight")]
    pub knowledge: f64,

    #[serde(default = "default_criticality_weight")]
    pub criticality: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            structural: default_structural_weight(),
            volatility: default_volatility_weight(),
            knowledge: default_knowledge_weight(),
            criticality: default_criticality_weight(),
        }
    }
}

pub fn default_structural_weight() -> f64 {
    0.30
}

pub fn default_volatility_weight() -> f64 {
    0.30
}

pub fn default_knowledge_weight() -> f64 {
    0.15
}

pub fn default_criticality_weight() -> f64 {
    0.25
}

impl RiskWeights {
    fn validate_weight(weight: f64, name: &str) -> Result<(), String> {
        if (0.0..=1.0).contains(&weight) {
            Ok(())
        } else {
            Err(format!("{} weight must be between 0.0 and 1.0", name))
        }
    }

    fn sum(&self) -> f64 {
        self.structural + self.volatility + self.knowledge + self.criticality
    }

    /// Validate that weights are in range and sum to 1.0 (with small tolerance)
    pub fn validate(&self) -> Result<(), String> {
        Self::validate_weight(self.structural, "Structural")?;
        Self::validate_weight(self.volatility, "Volatility")?;
        Self::validate_weight(self.knowledge, "Knowledge")?;
        Self::validate_weight(self.criticality, "Criticality")?;

        let sum = self.sum();
        if (sum - 1.0).abs() > 0.001 {
            return Err(format!("Risk weights must sum to 1.0, but sum to {:.3}", sum));
        }
        Ok(())
    }

    /// Normalize weights to ensure they sum to exactly 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 && (sum - 1.0).abs() > f64::EPSILON {
            self.structural /= sum;
            self.volatility /= sum;
            self.knowledge /= sum;
            self.criticality /= sum;
        }
    }
}
