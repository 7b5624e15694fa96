// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights through Module::save_file /
// load_file with Burn's named MessagePack file recorder at full
// precision.
//
// File layout (the recorder appends its own extension):
//   models/
//     best_autoencoder    ← autoencoder at the lowest val_loss so far
//     encoder_final       ← encoder after the last epoch
//     autoencoder_final   ← autoencoder after the last epoch
//     train_config.json   ← hyperparameters, incl. latent_dim
//
// The encoder record is written from the autoencoder's own
// `encoder` field, so it is exactly the half of the trained
// network that produced the final reconstructions.
//
// Loading needs a model of the same architecture to load the
// record into; train_config.json holds the latent_dim needed to
// rebuild it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};
use serde_json;

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{AutoEncoder, Encoder};

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const BEST_AUTOENCODER:  &str = "best_autoencoder";
const FINAL_ENCODER:     &str = "encoder_final";
const FINAL_AUTOENCODER: &str = "autoencoder_final";
const CONFIG_FILE:       &str = "train_config.json";

/// Which autoencoder record to restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// Lowest validation loss seen during training
    Best,
    /// State after the final epoch
    Final,
}

impl Snapshot {
    fn file_stem(self) -> &'static str {
        match self {
            Snapshot::Best  => BEST_AUTOENCODER,
            Snapshot::Final => FINAL_AUTOENCODER,
        }
    }
}

// ─── BestCheckpoint ───────────────────────────────────────────────────────────
/// Save-best-only policy: monitor validation loss, lower is better.
///
/// A missing or non-finite value never counts as an improvement,
/// so a run with no validation data never writes a best checkpoint.
#[derive(Debug, Clone)]
pub struct BestCheckpoint {
    best: f64,
}

impl BestCheckpoint {
    pub fn new() -> Self {
        Self { best: f64::INFINITY }
    }

    /// Record `val_loss`; true when it beats every earlier value.
    pub fn observe(&mut self, val_loss: Option<f64>) -> bool {
        match val_loss {
            Some(loss) if loss.is_finite() && loss < self.best => {
                self.best = loss;
                true
            }
            _ => false,
        }
    }

    /// Best value observed so far, if any
    pub fn best(&self) -> Option<f64> {
        self.best.is_finite().then_some(self.best)
    }
}

impl Default for BestCheckpoint {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CheckpointManager ────────────────────────────────────────────────────────
/// Owns the model directory and every file written into it.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager for `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the best-so-far autoencoder checkpoint.
    pub fn save_best<B: Backend>(&self, model: &AutoEncoder<B>) -> Result<()> {
        self.record::<B, _>(model, BEST_AUTOENCODER)
    }

    /// Persist both sub-models at the end of training.
    pub fn save_final<B: Backend>(&self, model: &AutoEncoder<B>) -> Result<()> {
        self.record::<B, _>(&model.encoder, FINAL_ENCODER)?;
        self.record::<B, _>(model, FINAL_AUTOENCODER)?;
        tracing::info!("Saved final encoder and autoencoder to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_autoencoder<B: Backend>(
        &self,
        model:    AutoEncoder<B>,
        snapshot: Snapshot,
        device:   &B::Device,
    ) -> Result<AutoEncoder<B>> {
        let path = self.dir.join(snapshot.file_stem());
        model
            .load_file(path.clone(), &ModelRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load autoencoder '{}'. Have you trained the model first?",
                    path.display())
            })
    }

    pub fn load_encoder<B: Backend>(
        &self,
        encoder: Encoder<B>,
        device:  &B::Device,
    ) -> Result<Encoder<B>> {
        let path = self.dir.join(FINAL_ENCODER);
        encoder
            .load_file(path.clone(), &ModelRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load encoder '{}'. Have you trained the model first?",
                    path.display())
            })
    }

    /// True once a record named `snapshot` has been written.
    pub fn has_snapshot(&self, snapshot: Snapshot) -> bool {
        self.record_exists(snapshot.file_stem())
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    fn record<B: Backend, M: Module<B>>(&self, module: &M, stem: &str) -> Result<()> {
        let path = self.dir.join(stem);
        module
            .clone()
            .save_file(path.clone(), &ModelRecorder::new())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::debug!("Saved record '{}'", path.display());
        Ok(())
    }

    fn record_exists(&self, stem: &str) -> bool {
        let prefix = format!("{stem}.");
        fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            })
            .unwrap_or(false)
    }
}
