// ============================================================
// Layer 5 — Reconstruction Loss and Metric
// ============================================================
// Every loss here compares a reconstruction with its input
// pixel by pixel and reduces by mean, so the value does not
// depend on batch size:
//
//   mse   = mean((y - x)²)
//   mae   = mean(|y - x|)
//   huber = mean(0.5·d²        if |d| ≤ δ
//                δ·(|d| - δ/2)  otherwise),  d = y - x, δ = 1
//
// The loss keeps its autodiff graph; the metric is read back
// as a plain f64 for logging only. Metrics are reduced over the
// whole epoch, not averaged per batch (see MetricMean).

use burn::prelude::*;

use crate::domain::hyperparams::{LossKind, MetricKind};

const HUBER_DELTA: f64 = 1.0;

/// Reduced reconstruction loss, shape [1]
pub fn reconstruction_loss<B: Backend>(
    kind:           LossKind,
    reconstruction: Tensor<B, 4>,
    target:         Tensor<B, 4>,
) -> Tensor<B, 1> {
    let diff = reconstruction - target;
    match kind {
        LossKind::Mse   => diff.powf_scalar(2.0).mean(),
        LossKind::Mae   => diff.abs().mean(),
        LossKind::Huber => {
            let abs       = diff.clone().abs();
            let quadratic = diff.powf_scalar(2.0).mul_scalar(0.5);
            let linear    = abs.clone().sub_scalar(0.5 * HUBER_DELTA).mul_scalar(HUBER_DELTA);
            let small     = abs.lower_equal_elem(HUBER_DELTA);
            linear.mask_where(small, quadratic).mean()
        }
    }
}

/// Epoch-level metric accumulator.
///
/// mae and mse are plain sample-weighted means of the batch values.
/// rmse accumulates squared error over the whole epoch and takes
/// the root once in `value`, so it is not a mean of batch roots.
#[derive(Debug, Clone, Copy)]
pub struct MetricMean {
    kind: MetricKind,
    mean: RunningMean,
}

impl MetricMean {
    pub fn new(kind: MetricKind) -> Self {
        Self { kind, mean: RunningMean::default() }
    }

    pub fn update<B: Backend>(&mut self, reconstruction: Tensor<B, 4>, target: Tensor<B, 4>) {
        let batch_size = target.dims()[0];
        let diff = reconstruction - target;
        let batch = match self.kind {
            MetricKind::Mae                    => diff.abs().mean(),
            MetricKind::Mse | MetricKind::Rmse => diff.powf_scalar(2.0).mean(),
        };
        self.mean.update(batch.into_scalar().elem::<f64>(), batch_size);
    }

    /// None when no batch was seen
    pub fn value(&self) -> Option<f64> {
        let mean = self.mean.value()?;
        Some(match self.kind {
            MetricKind::Rmse => mean.sqrt(),
            _                => mean,
        })
    }
}

/// Sample-weighted running mean of per-batch values across an epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningMean {
    weighted_sum: f64,
    count:        usize,
}

impl RunningMean {
    pub fn update(&mut self, value: f64, batch_size: usize) {
        self.weighted_sum += value * batch_size as f64;
        self.count        += batch_size;
    }

    /// None when nothing was recorded
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.weighted_sum / self.count as f64)
    }
}
