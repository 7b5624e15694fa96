// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fits the autoencoder to reproduce its own input:
//
//   for each epoch:
//     train  — shuffled batches, forward, loss, backward, step
//     valid  — model.valid() on the inner backend, no autodiff
//     best   — overwrite best_autoencoder when val_loss improves
//     log    — one CSV row, one progress line
//   after the last epoch:
//     save encoder_final + autoencoder_final, write history.json
//
// Key Burn insight:
//   - Training uses an Autodiff<…> backend for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The validation batcher must also use B::InnerBackend
//
// The optimizer is picked at runtime, but each Burn optimizer
// is its own type, so `fit` is generic over it and the match
// below monomorphises one loop per optimizer.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{Context, Result};
use std::sync::Arc;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, AdamWConfig, GradientsParams, Optimizer, RmsPropConfig, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageDataset,
};
use crate::domain::hyperparams::OptimizerKind;
use crate::infra::{
    checkpoint::{BestCheckpoint, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger, TrainingHistory},
};
use crate::ml::loss::{reconstruction_loss, MetricMean, RunningMean};
use crate::ml::model::{format_summary, AutoEncoder, AutoEncoderConfig};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingHistory> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    let (_, history) =
        train_loop::<MyBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)?;
    Ok(history)
}

/// Backend-generic training entry point; returns the trained model
/// alongside its history.
pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<(AutoEncoder<B>, TrainingHistory)> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = AutoEncoderConfig::new(cfg.latent_dim);
    let model: AutoEncoder<B> = model_cfg.init(&device);

    let rows = model_cfg.layer_summary();
    let encoder_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.name.starts_with("encoder."))
        .cloned()
        .collect();
    tracing::info!("Encoder model summary:\n{}", format_summary("Encoder", &encoder_rows));
    tracing::info!("Auto encoder model summary:\n{}", format_summary("AutoEncoder", &rows));

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    // Validation runs on the inner backend, without autodiff
    let val_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(val_dataset);

    let loaders = Loaders { train: train_loader, valid: val_loader };
    let lr      = cfg.learning_rate();
    tracing::info!("Compiling with optimizer={} lr={} loss={} metric={}",
        cfg.optimizer, lr, cfg.loss, cfg.metric);

    match cfg.optimizer {
        OptimizerKind::Adam => {
            let optim = AdamConfig::new().with_epsilon(1e-7).init::<B, AutoEncoder<B>>();
            fit(model, optim, cfg, &loaders, ckpt_manager, metrics)
        }
        OptimizerKind::AdamW => {
            let optim = AdamWConfig::new()
                .with_epsilon(1e-7)
                .with_weight_decay(0.004)
                .init::<B, AutoEncoder<B>>();
            fit(model, optim, cfg, &loaders, ckpt_manager, metrics)
        }
        OptimizerKind::Sgd => {
            let optim = SgdConfig::new().init::<B, AutoEncoder<B>>();
            fit(model, optim, cfg, &loaders, ckpt_manager, metrics)
        }
        OptimizerKind::RmsProp => {
            let optim = RmsPropConfig::new()
                .with_alpha(0.9)
                .with_epsilon(1e-7)
                .init::<B, AutoEncoder<B>>();
            fit(model, optim, cfg, &loaders, ckpt_manager, metrics)
        }
    }
}

struct Loaders<B: AutodiffBackend> {
    train: Arc<dyn DataLoader<ImageBatch<B>>>,
    valid: Arc<dyn DataLoader<ImageBatch<B::InnerBackend>>>,
}

fn fit<B, O>(
    mut model:    AutoEncoder<B>,
    mut optim:    O,
    cfg:          &TrainConfig,
    loaders:      &Loaders<B>,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<(AutoEncoder<B>, TrainingHistory)>
where
    B: AutodiffBackend,
    O: Optimizer<AutoEncoder<B>, B>,
{
    let lr          = cfg.learning_rate();
    let mut best    = BestCheckpoint::new();
    let mut history = TrainingHistory::new(cfg.loss, cfg.metric);

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss   = RunningMean::default();
        let mut train_metric = MetricMean::new(cfg.metric);

        for batch in loaders.train.iter() {
            let batch_size     = batch.images.dims()[0];
            let reconstruction = model.forward(batch.images.clone());

            train_metric.update(reconstruction.clone().detach(), batch.images.clone());

            let loss = reconstruction_loss(cfg.loss, reconstruction, batch.images);
            train_loss.update(loss.clone().into_scalar().elem::<f64>(), batch_size);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid    = model.valid();
        let mut val_loss   = RunningMean::default();
        let mut val_metric = MetricMean::new(cfg.metric);

        for batch in loaders.valid.iter() {
            let batch_size     = batch.images.dims()[0];
            let reconstruction = model_valid.forward(batch.images.clone());

            val_metric.update(reconstruction.clone(), batch.images.clone());
            let loss = reconstruction_loss(cfg.loss, reconstruction, batch.images);
            val_loss.update(loss.into_scalar().elem::<f64>(), batch_size);
        }

        // ── Best-model checkpoint ─────────────────────────────────────────────
        let checkpointed = best.observe(val_loss.value());
        if checkpointed {
            ckpt_manager.save_best(&model)?;
            tracing::info!(
                "Epoch {}: val_loss improved to {:.6}, checkpoint saved",
                epoch, best.best().unwrap_or(f64::NAN),
            );
        }

        let m = EpochMetrics {
            epoch,
            train_loss:   train_loss.value().context("Training set produced no batches")?,
            train_metric: train_metric.value().context("Training set produced no batches")?,
            val_loss:     val_loss.value(),
            val_metric:   val_metric.value(),
            checkpointed,
        };

        let val = match (m.val_loss, m.val_metric) {
            (Some(loss), Some(metric)) => {
                format!(" | val_loss={:.6} | val_{}={:.6}", loss, cfg.metric, metric)
            }
            _ => String::new(),
        };
        println!(
            "Epoch {:>3}/{} | loss={:.6} | {}={:.6}{}",
            epoch, cfg.epochs, m.train_loss, cfg.metric, m.train_metric, val,
        );

        metrics.log(&m)?;
        history.epochs.push(m);
    }

    tracing::info!("Average training loss: {:.6}", history.average_train_loss());

    ckpt_manager.save_final(&model)?;
    metrics.write_history(&history)?;
    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());

    Ok((model, history))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use burn::data::{dataloader::batcher::Batcher, dataset::Dataset};

    use crate::data::synthetic::SyntheticImages;
    use crate::domain::hyperparams::LossKind;
    use crate::domain::image::Image;
    use crate::domain::traits::ImageSource;
    use crate::infra::checkpoint::Snapshot;

    type TestBackend = Autodiff<NdArray>;

    fn toy_datasets(train: usize, valid: usize) -> (ImageDataset, ImageDataset) {
        let images = SyntheticImages::new(train + valid, 11).images().unwrap();
        let (t, v) = images.split_at(train);
        (ImageDataset::new(t.to_vec()), ImageDataset::new(v.to_vec()))
    }

    fn toy_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            latent_dim:    8,
            epochs,
            batch_size:    4,
            learning_rate: Some(3e-3),
            num_workers:   1,
            ..TrainConfig::default()
        }
    }

    struct Outputs {
        _root:   tempfile::TempDir,
        ckpt:    CheckpointManager,
        metrics: MetricsLogger,
    }

    fn outputs() -> Outputs {
        let root    = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(root.path().join("models")).unwrap();
        let metrics = MetricsLogger::new(root.path().join("logs/run")).unwrap();
        Outputs { _root: root, ckpt, metrics }
    }

    #[test]
    fn test_training_reduces_loss_on_toy_data() {
        let out = outputs();
        let (train, valid) = toy_datasets(8, 4);
        let cfg = toy_config(6);

        let (_, history) = train_loop::<TestBackend>(
            &cfg, train, valid, &out.ckpt, &out.metrics, Default::default(),
        ).unwrap();

        assert_eq!(history.epochs.len(), 6);
        let first = history.epochs.first().unwrap().train_loss;
        let last  = history.epochs.last().unwrap().train_loss;
        assert!(last < first, "loss did not fall: first={first}, last={last}");
    }

    /// Validation loss of a restored snapshot on the toy validation images.
    fn snapshot_val_loss(ckpt: &CheckpointManager, snapshot: Snapshot, valid: &[Image]) -> f64 {
        let device = Default::default();
        let model  = AutoEncoderConfig::new(8).init::<NdArray>(&device);
        let model  = ckpt.load_autoencoder(model, snapshot, &device).unwrap();

        let batch  = ImageBatcher::<NdArray>::new(device).batch(valid.to_vec());
        let recon  = model.forward(batch.images.clone());
        reconstruction_loss(LossKind::Mse, recon, batch.images)
            .into_scalar()
            .elem::<f64>()
    }

    #[test]
    fn test_checkpoint_written_only_on_val_improvement() {
        let out = outputs();
        let (train, valid) = toy_datasets(8, 4);
        let valid_images: Vec<Image> = (0..valid.len()).filter_map(|i| valid.get(i)).collect();
        let cfg = toy_config(4);

        let (_, history) = train_loop::<TestBackend>(
            &cfg, train, valid, &out.ckpt, &out.metrics, Default::default(),
        ).unwrap();

        // The first finite val_loss always improves on "nothing yet"
        assert!(history.epochs[0].checkpointed);
        assert!(out.ckpt.has_snapshot(Snapshot::Best));
        assert!(out.ckpt.has_snapshot(Snapshot::Final));

        // The record on disk is the model of the last improving epoch,
        // untouched by any later epoch that did not improve.
        let best      = history.best_val_loss().unwrap();
        let last_best = history.epochs.iter().rev().find(|m| m.checkpointed).unwrap();
        assert_eq!(last_best.val_loss, Some(best));

        let restored = snapshot_val_loss(&out.ckpt, Snapshot::Best, &valid_images);
        assert!((restored - best).abs() < 1e-5, "restored={restored}, best={best}");

        let last = history.epochs.last().unwrap();
        if !last.checkpointed {
            let final_loss = snapshot_val_loss(&out.ckpt, Snapshot::Final, &valid_images);
            assert!((final_loss - last.val_loss.unwrap()).abs() < 1e-5);
        }

        let csv = std::fs::read_to_string(out.metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1 + 4);
    }

    #[test]
    fn test_no_validation_data_never_checkpoints() {
        let out = outputs();
        let (train, valid) = toy_datasets(4, 0);
        let cfg = toy_config(2);

        let (_, history) = train_loop::<TestBackend>(
            &cfg, train, valid, &out.ckpt, &out.metrics, Default::default(),
        ).unwrap();

        assert!(history.epochs.iter().all(|m| m.val_loss.is_none() && !m.checkpointed));
        assert!(!out.ckpt.has_snapshot(Snapshot::Best));
        // Final models are still persisted
        assert!(out.ckpt.has_snapshot(Snapshot::Final));
    }

    #[test]
    fn test_every_optimizer_runs() {
        for optimizer in [OptimizerKind::Adam, OptimizerKind::AdamW, OptimizerKind::Sgd, OptimizerKind::RmsProp] {
            let out = outputs();
            let (train, valid) = toy_datasets(4, 2);
            let cfg = TrainConfig { optimizer, learning_rate: None, ..toy_config(1) };

            let (_, history) = train_loop::<TestBackend>(
                &cfg, train, valid, &out.ckpt, &out.metrics, Default::default(),
            ).unwrap();
            assert!(history.epochs[0].train_loss.is_finite(), "{optimizer}");
        }
    }

    #[test]
    fn test_trained_model_keeps_shapes() {
        let out = outputs();
        let (train, valid) = toy_datasets(4, 2);
        let cfg = toy_config(1);

        let (model, _) = train_loop::<TestBackend>(
            &cfg, train, valid, &out.ckpt, &out.metrics, Default::default(),
        ).unwrap();

        let images = Tensor::<TestBackend, 4>::zeros([3, 32, 32, 3], &Default::default());
        assert_eq!(model.encode(images.clone()).dims(), [3, 8]);
        assert_eq!(model.forward(images).dims(), [3, 32, 32, 3]);
    }
}
