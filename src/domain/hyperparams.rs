// ============================================================
// Layer 3 — Hyperparameter Choices
// ============================================================
// The named choices a training run is configured with:
//   - which optimizer updates the weights
//   - which loss the optimizer minimises
//   - which metric is reported alongside the loss
//
// Each enum parses from the lowercase names used on the command
// line ("adam", "mse", ...) via FromStr, which clap picks up
// automatically, and round-trips through serde with the same
// names so the saved train_config.json stays readable.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ─── OptimizerKind ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    AdamW,
    Sgd,
    RmsProp,
}

impl OptimizerKind {
    /// Learning rate used when the config does not set one
    pub fn default_learning_rate(self) -> f64 {
        match self {
            OptimizerKind::Sgd => 1e-2,
            OptimizerKind::Adam | OptimizerKind::AdamW | OptimizerKind::RmsProp => 1e-3,
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adam"    => Ok(OptimizerKind::Adam),
            "adamw"   => Ok(OptimizerKind::AdamW),
            "sgd"     => Ok(OptimizerKind::Sgd),
            "rmsprop" => Ok(OptimizerKind::RmsProp),
            other     => Err(format!(
                "unknown optimizer '{other}' (expected adam, adamw, sgd or rmsprop)"
            )),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Adam    => "adam",
            OptimizerKind::AdamW   => "adamw",
            OptimizerKind::Sgd     => "sgd",
            OptimizerKind::RmsProp => "rmsprop",
        };
        f.write_str(name)
    }
}

// ─── LossKind ─────────────────────────────────────────────────────────────────
/// Reconstruction loss, reduced by mean over every pixel in the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossKind {
    /// Mean squared error
    Mse,
    /// Mean absolute error
    Mae,
    /// Huber loss with delta = 1.0
    Huber,
}

impl FromStr for LossKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mse" | "mean_squared_error"  => Ok(LossKind::Mse),
            "mae" | "mean_absolute_error" => Ok(LossKind::Mae),
            "huber"                       => Ok(LossKind::Huber),
            other => Err(format!("unknown loss '{other}' (expected mse, mae or huber)")),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LossKind::Mse   => "mse",
            LossKind::Mae   => "mae",
            LossKind::Huber => "huber",
        };
        f.write_str(name)
    }
}

// ─── MetricKind ───────────────────────────────────────────────────────────────
/// Metric reported next to the loss; never used for gradients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Mae,
    Mse,
    Rmse,
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mae" | "mean_absolute_error" => Ok(MetricKind::Mae),
            "mse" | "mean_squared_error"  => Ok(MetricKind::Mse),
            "rmse"                        => Ok(MetricKind::Rmse),
            other => Err(format!("unknown metric '{other}' (expected mae, mse or rmse)")),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Mae  => "mae",
            MetricKind::Mse  => "mse",
            MetricKind::Rmse => "rmse",
        };
        f.write_str(name)
    }
}
