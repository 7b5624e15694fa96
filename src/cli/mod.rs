// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates every piece of work to Layer 2.
//
// Two commands are supported:
//   1. `train`   — fits the autoencoder and saves the models
//   2. `summary` — prints the layer table, optionally for a
//                  trained model directory

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SummaryArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "conv-autoencoder",
    version = "0.1.0",
    about = "Train a convolutional autoencoder on 32x32x3 images."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Summary(args) => run_summary(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training: latent_dim={}, epochs={}", args.latent_dim, args.epochs);

    let use_case = TrainUseCase::new(args.into());
    let history  = use_case.execute()?;

    println!(
        "Training complete. Average training loss: {:.6}",
        history.average_train_loss()
    );
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    use crate::application::summary_use_case::{SummaryTarget, SummaryUseCase};

    let target = match args.model_dir {
        Some(dir) => SummaryTarget::ModelDir(dir),
        None      => SummaryTarget::LatentDim(args.latent_dim),
    };
    println!("{}", SummaryUseCase::new(target).execute()?);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::domain::hyperparams::{LossKind, OptimizerKind};

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["conv-autoencoder", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.latent_dim, 16);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.loss, LossKind::Mse);
        assert_eq!(cfg.learning_rate, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "conv-autoencoder", "train",
            "--latent-dim", "8",
            "--optimizer", "rmsprop",
            "--loss", "huber",
            "--learning-rate", "0.0005",
            "--epochs", "3",
        ]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.latent_dim, 8);
        assert_eq!(cfg.optimizer, OptimizerKind::RmsProp);
        assert_eq!(cfg.loss, LossKind::Huber);
        assert_eq!(cfg.learning_rate, Some(0.0005));
        assert_eq!(cfg.epochs, 3);
    }

    #[test]
    fn test_unknown_optimizer_rejected() {
        assert!(Cli::try_parse_from(["conv-autoencoder", "train", "--optimizer", "lbfgs"]).is_err());
    }

    #[test]
    fn test_summary_args() {
        let cli = Cli::try_parse_from(["conv-autoencoder", "summary", "--model-dir", "out"]).unwrap();
        let Commands::Summary(args) = cli.command else { panic!("expected summary") };
        assert_eq!(args.model_dir.as_deref(), Some("out"));
    }
}
