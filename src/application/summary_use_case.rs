// ============================================================
// Layer 2 — SummaryUseCase
// ============================================================
// Describes the architecture without training anything:
//   - with only a latent_dim, the per-layer table is derived
//     from the architecture constants (no weights allocated)
//   - with a model directory, the saved config and weights are
//     restored first, and the restored parameter count is
//     reported next to the table

use anyhow::Result;
use burn::module::Module;

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    inspect,
    model::{format_summary, AutoEncoderConfig},
};

pub enum SummaryTarget {
    /// Fresh architecture for this latent dimension
    LatentDim(usize),
    /// Trained model saved in this directory
    ModelDir(String),
}

pub struct SummaryUseCase {
    target: SummaryTarget,
}

impl SummaryUseCase {
    pub fn new(target: SummaryTarget) -> Self {
        Self { target }
    }

    /// Build the printable report
    pub fn execute(&self) -> Result<String> {
        match &self.target {
            SummaryTarget::LatentDim(latent_dim) => {
                let config = AutoEncoderConfig::new(*latent_dim);
                Ok(format_summary("AutoEncoder", &config.layer_summary()))
            }
            SummaryTarget::ModelDir(dir) => {
                let ckpt      = CheckpointManager::new(dir)?;
                let inspected = inspect::restore(&ckpt)?;
                let table     = format_summary("AutoEncoder", &inspected.config.layer_summary());
                let mut report = format!(
                    "{table}\nrestored from '{}' ({:?} snapshot): {} parameters",
                    dir,
                    inspected.snapshot,
                    inspected.model.num_params(),
                );
                if let Some(encoder) = &inspected.encoder {
                    report.push_str(&format!("\nencoder_final: {} parameters", encoder.num_params()));
                }
                Ok(report)
            }
        }
    }
}
