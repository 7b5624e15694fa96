// ============================================================
// Layer 5 — Saved Model Inspection
// ============================================================
// Rebuilds a trained autoencoder from its model directory:
// train_config.json gives the latent_dim, the record gives the
// weights. Runs on the CPU backend since nothing is trained.

use anyhow::Result;

use crate::infra::checkpoint::{CheckpointManager, Snapshot};
use crate::ml::model::{AutoEncoder, AutoEncoderConfig, Encoder};

type InspectBackend = burn::backend::NdArray;

pub struct InspectedModel {
    pub config:   AutoEncoderConfig,
    pub snapshot: Snapshot,
    pub model:    AutoEncoder<InspectBackend>,
    /// The standalone encoder record, present once training finished
    pub encoder:  Option<Encoder<InspectBackend>>,
}

/// Restore the final autoencoder, falling back to the best
/// checkpoint when training was interrupted before the end.
pub fn restore(ckpt_manager: &CheckpointManager) -> Result<InspectedModel> {
    let train_cfg = ckpt_manager.load_config()?;
    let config    = AutoEncoderConfig::new(train_cfg.latent_dim);
    let device    = Default::default();

    let snapshot = if ckpt_manager.has_snapshot(Snapshot::Final) {
        Snapshot::Final
    } else {
        Snapshot::Best
    };

    let model = ckpt_manager.load_autoencoder(config.init::<InspectBackend>(&device), snapshot, &device)?;
    tracing::info!("Restored {:?} autoencoder (latent_dim={})", snapshot, config.latent_dim);

    let encoder = match snapshot {
        Snapshot::Final => {
            let fresh = config.init::<InspectBackend>(&device).encoder;
            Some(ckpt_manager.load_encoder(fresh, &device)?)
        }
        Snapshot::Best => None,
    };

    Ok(InspectedModel { config, snapshot, model, encoder })
}
