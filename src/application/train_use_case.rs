// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate hyperparameters         (Layer 2)
//   Step 2: Open timestamped log directory   (Layer 6 - infra)
//   Step 3: Produce images                   (Layer 4 - data)
//   Step 4: Split train/validation           (Layer 4 - data)
//   Step 5: Build datasets                   (Layer 4 - data)
//   Step 6: Save config                      (Layer 6 - infra)
//   Step 7: Run training loop                (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ImageDataset,
    splitter::split_train_val,
    synthetic::SyntheticImages,
};
use crate::domain::{
    hyperparams::{LossKind, MetricKind, OptimizerKind},
    traits::ImageSource,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{MetricsLogger, TrainingHistory},
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the model records and
// reloaded to rebuild the architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub latent_dim:     usize,
    pub optimizer:      OptimizerKind,
    /// None → the optimizer's conventional default
    pub learning_rate:  Option<f64>,
    pub loss:           LossKind,
    pub metric:         MetricKind,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub seed:           u64,
    pub num_workers:    usize,
    pub log_dir:        String,
    pub model_dir:      String,
    pub samples:        usize,
    pub train_fraction: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            latent_dim:     16,
            optimizer:      OptimizerKind::Adam,
            learning_rate:  None,
            loss:           LossKind::Mse,
            metric:         MetricKind::Mae,
            epochs:         50,
            batch_size:     64,
            seed:           42,
            num_workers:    2,
            log_dir:        "logs".to_string(),
            model_dir:      "models".to_string(),
            samples:        1024,
            train_fraction: 0.8,
        }
    }
}

impl TrainConfig {
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
            .unwrap_or_else(|| self.optimizer.default_learning_rate())
    }

    /// Reject settings that would only fail (or silently do nothing)
    /// once the training loop is running.
    pub fn validate(&self) -> Result<()> {
        if self.latent_dim == 0 {
            bail!("latent_dim must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.num_workers == 0 {
            bail!("num_workers must be at least 1");
        }
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            bail!("train_fraction must be in (0, 1], got {}", self.train_fraction);
        }
        if let Some(lr) = self.learning_rate {
            if !(lr.is_finite() && lr > 0.0) {
                bail!("learning_rate must be a positive number, got {lr}");
            }
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the bundled synthetic dataset
    pub fn execute(&self) -> Result<TrainingHistory> {
        let source = SyntheticImages::new(self.config.samples, self.config.seed);
        self.execute_with(&source)
    }

    /// Train on images from any source
    pub fn execute_with(&self, source: &dyn ImageSource) -> Result<TrainingHistory> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Timestamped log directory ─────────────────────────────────
        // Stamped now, before any data work, so the directory name
        // reflects when the run was set up.
        let metrics = MetricsLogger::timestamped(&cfg.log_dir)?;
        tracing::info!("Logging metrics to '{}'", metrics.run_dir().display());

        // ── Step 3: Produce images ────────────────────────────────────────────
        let images = source.images()?;
        if images.is_empty() {
            bail!("No images to train on");
        }
        tracing::info!("Loaded {} images", images.len());

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_images, val_images) = split_train_val(images, cfg.train_fraction, cfg.seed);
        if train_images.is_empty() {
            bail!("train_fraction {} leaves no training images", cfg.train_fraction);
        }
        tracing::info!(
            "Split: {} train, {} validation",
            train_images.len(),
            val_images.len()
        );
        if val_images.is_empty() {
            tracing::warn!("No validation images: the best-model checkpoint will never be written");
        }

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ImageDataset::new(train_images);
        let val_dataset   = ImageDataset::new(val_images);

        // ── Step 6: Save config next to the models ────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.model_dir)?;
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        let history = run_training(cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)?;

        match history.best_val_loss() {
            Some(best) => tracing::info!("Best val_loss: {:.6}", best),
            None       => tracing::info!("No epoch improved val_loss"),
        }
        tracing::info!("Models saved in '{}'", ckpt_manager.dir().display());

        Ok(history)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_sizes() {
        for cfg in [
            TrainConfig { latent_dim: 0, ..TrainConfig::default() },
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { num_workers: 0, ..TrainConfig::default() },
        ] {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_rejects_bad_fraction_and_lr() {
        let bad_fraction = TrainConfig { train_fraction: 0.0, ..TrainConfig::default() };
        assert!(bad_fraction.validate().is_err());
        let too_big = TrainConfig { train_fraction: 1.5, ..TrainConfig::default() };
        assert!(too_big.validate().is_err());
        let bad_lr = TrainConfig { learning_rate: Some(-1.0), ..TrainConfig::default() };
        assert!(bad_lr.validate().is_err());
        let nan_lr = TrainConfig { learning_rate: Some(f64::NAN), ..TrainConfig::default() };
        assert!(nan_lr.validate().is_err());
    }

    #[test]
    fn test_learning_rate_falls_back_to_optimizer_default() {
        let sgd = TrainConfig { optimizer: OptimizerKind::Sgd, ..TrainConfig::default() };
        assert_eq!(sgd.learning_rate(), 1e-2);
        let explicit = TrainConfig { learning_rate: Some(5e-4), ..sgd };
        assert_eq!(explicit.learning_rate(), 5e-4);
    }

    #[test]
    fn test_empty_source_is_an_error() {
        struct Empty;
        impl ImageSource for Empty {
            fn images(&self) -> Result<Vec<crate::domain::image::Image>> { Ok(Vec::new()) }
        }

        let root = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            log_dir:   root.path().join("logs").to_string_lossy().to_string(),
            model_dir: root.path().join("models").to_string_lossy().to_string(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute_with(&Empty).unwrap_err();
        assert!(err.to_string().contains("No images"));
    }
}
