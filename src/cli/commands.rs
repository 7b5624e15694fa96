// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `summary`, and all
// their configurable flags.
//
// Optimizer / loss / metric flags parse through the domain
// enums' FromStr impls, so `--optimizer rmsprop` is validated
// by clap before any work starts.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::hyperparams::{LossKind, MetricKind, OptimizerKind};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the autoencoder on a synthetic toy dataset
    Train(TrainArgs),

    /// Print the per-layer architecture summary
    Summary(SummaryArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Size of the latent vector the encoder produces
    #[arg(long, default_value_t = 16)]
    pub latent_dim: usize,

    /// adam, adamw, sgd or rmsprop
    #[arg(long, default_value = "adam")]
    pub optimizer: OptimizerKind,

    /// Learning rate; defaults to the optimizer's usual value
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// mse, mae or huber
    #[arg(long, default_value = "mse")]
    pub loss: LossKind,

    /// mae, mse or rmse
    #[arg(long, default_value = "mae")]
    pub metric: MetricKind,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Number of images processed together in one step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Seed for data generation, splitting and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Dataloader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Root directory for timestamped run logs
    #[arg(long, default_value = "logs")]
    pub log_dir: String,

    /// Directory for checkpoints, final models and the saved config
    #[arg(long, default_value = "models")]
    pub model_dir: String,

    /// Number of synthetic images to generate
    #[arg(long, default_value_t = 1024)]
    pub samples: usize,

    /// Fraction of images used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            latent_dim:     a.latent_dim,
            optimizer:      a.optimizer,
            learning_rate:  a.learning_rate,
            loss:           a.loss,
            metric:         a.metric,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            seed:           a.seed,
            num_workers:    a.num_workers,
            log_dir:        a.log_dir,
            model_dir:      a.model_dir,
            samples:        a.samples,
            train_fraction: a.train_fraction,
        }
    }
}

/// All arguments for the `summary` command
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Latent size to describe (ignored with --model-dir)
    #[arg(long, default_value_t = 16)]
    pub latent_dim: usize,

    /// Restore and describe the model trained into this directory
    #[arg(long)]
    pub model_dir: Option<String>,
}
