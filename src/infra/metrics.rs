// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics for every epoch of a run.
//
// Each run gets its own log directory named after the moment
// the logger was created:
//
//   logs/
//     20261016-142503/
//       metrics.csv    ← one row per epoch, appended as training runs
//       history.json   ← full TrainingHistory, written at the end
//
// Example CSV output:
//   epoch,train_loss,train_metric,val_loss,val_metric,checkpointed
//   1,0.081234,0.231200,0.064100,0.201000,true
//   2,0.052100,0.180900,0.066300,0.204400,false
//   ...
//
// Without validation data the val_* columns are left empty.
//
// How to read the metrics:
//   - Loss should decrease each epoch (model is learning)
//   - If val_loss increases while train_loss decreases → overfitting
//   - checkpointed=true marks the epochs that overwrote the
//     best-model checkpoint

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::hyperparams::{LossKind, MetricKind};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average loss over all training samples
    pub train_loss: f64,

    /// Average metric over all training samples
    pub train_metric: f64,

    /// Average loss on the validation set, None without validation data
    pub val_loss: Option<f64>,

    /// Metric on the validation set
    pub val_metric: Option<f64>,

    /// Whether this epoch overwrote the best-model checkpoint
    pub checkpointed: bool,
}

/// Everything a training run produced, epoch by epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss:   LossKind,
    pub metric: MetricKind,
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn new(loss: LossKind, metric: MetricKind) -> Self {
        Self { loss, metric, epochs: Vec::new() }
    }

    /// Mean of the per-epoch training losses; NaN for an empty history
    pub fn average_train_loss(&self) -> f64 {
        if self.epochs.is_empty() {
            return f64::NAN;
        }
        self.epochs.iter().map(|m| m.train_loss).sum::<f64>() / self.epochs.len() as f64
    }

    /// Lowest validation loss among checkpointed epochs
    pub fn best_val_loss(&self) -> Option<f64> {
        self.epochs
            .iter()
            .filter(|m| m.checkpointed)
            .filter_map(|m| m.val_loss)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.min(v))))
    }
}

/// Logs epoch metrics into a per-run directory.
pub struct MetricsLogger {
    run_dir:  PathBuf,
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `log_root/<YYYYmmdd-HHMMSS>/` and log into it.
    pub fn timestamped(log_root: impl AsRef<Path>) -> Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        Self::new(log_root.as_ref().join(stamp))
    }

    /// Log into `run_dir`, writing the CSV header if the file is new.
    pub fn new(run_dir: impl Into<PathBuf>) -> Result<Self> {
        let run_dir = run_dir.into();
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create log directory '{}'", run_dir.display()))?;

        let csv_path = run_dir.join("metrics.csv");

        // Appending keeps earlier rows if two runs start within the same second
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,train_metric,val_loss,val_metric,checkpointed")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { run_dir, csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{},{},{}",
            m.epoch,
            m.train_loss,
            m.train_metric,
            csv_field(m.val_loss),
            csv_field(m.val_metric),
            m.checkpointed,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:?}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    /// Write the whole run as history.json
    pub fn write_history(&self, history: &TrainingHistory) -> Result<()> {
        let path = self.run_dir.join("history.json");
        fs::write(&path, serde_json::to_string_pretty(history)?)
            .with_context(|| format!("Cannot write history to '{}'", path.display()))?;
        Ok(())
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

fn csv_field(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(epoch: usize, train_loss: f64, val_loss: f64, checkpointed: bool) -> EpochMetrics {
        EpochMetrics {
            epoch,
            train_loss,
            train_metric: 0.0,
            val_loss:     Some(val_loss),
            val_metric:   Some(0.0),
            checkpointed,
        }
    }

    fn unvalidated(epoch: usize, train_loss: f64) -> EpochMetrics {
        EpochMetrics {
            val_loss:   None,
            val_metric: None,
            ..metrics(epoch, train_loss, 0.0, false)
        }
    }

    #[test]
    fn test_average_train_loss() {
        let mut history = TrainingHistory::new(LossKind::Mse, MetricKind::Mae);
        assert!(history.average_train_loss().is_nan());
        history.epochs.push(metrics(1, 1.0, 0.9, true));
        history.epochs.push(metrics(2, 0.5, 1.1, false));
        assert!((history.average_train_loss() - 0.75).abs() < 1e-12);
        assert_eq!(history.best_val_loss(), Some(0.9));
    }

    #[test]
    fn test_timestamped_dir_and_csv_rows() {
        let root   = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::timestamped(root.path()).unwrap();

        let name = logger.run_dir().file_name().unwrap().to_string_lossy().to_string();
        // YYYYmmdd-HHMMSS
        assert_eq!(name.len(), 15);
        assert_eq!(&name[8..9], "-");

        logger.log(&metrics(1, 0.5, 0.4, true)).unwrap();
        logger.log(&metrics(2, 0.3, 0.45, false)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_metric,val_loss,val_metric,checkpointed");
        assert!(lines[1].starts_with("1,0.500000"));
        assert!(lines[2].ends_with("false"));
    }

    #[test]
    fn test_write_history() {
        let root   = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(root.path().join("run")).unwrap();
        let mut history = TrainingHistory::new(LossKind::Huber, MetricKind::Rmse);
        history.epochs.push(metrics(1, 0.2, 0.1, true));
        logger.write_history(&history).unwrap();

        let json = fs::read_to_string(logger.run_dir().join("history.json")).unwrap();
        let back: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.epochs.len(), 1);
        assert_eq!(back.loss, LossKind::Huber);
    }

    #[test]
    fn test_history_without_validation_reads_back() {
        let root   = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(root.path().join("run")).unwrap();
        let mut history = TrainingHistory::new(LossKind::Mse, MetricKind::Rmse);
        history.epochs.push(unvalidated(1, 0.3));
        history.epochs.push(unvalidated(2, 0.2));
        logger.write_history(&history).unwrap();

        let json = fs::read_to_string(logger.run_dir().join("history.json")).unwrap();
        let back: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.epochs.len(), 2);
        assert!(back.epochs.iter().all(|m| m.val_loss.is_none() && m.val_metric.is_none()));
        assert_eq!(back.best_val_loss(), None);
    }

    #[test]
    fn test_csv_leaves_missing_validation_empty() {
        let root   = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(root.path().join("run")).unwrap();
        logger.log(&unvalidated(1, 0.5)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().nth(1), Some("1,0.500000,0.000000,,,false"));
    }
}
