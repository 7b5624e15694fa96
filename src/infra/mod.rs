// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the file-system side of a training run:
//
//   checkpoint.rs      — Saving and loading model weights
//                        Best-val-loss checkpoint, final encoder
//                        and autoencoder records, and the
//                        TrainConfig as JSON so a saved model can
//                        be rebuilt with the right latent_dim.
//
//   metrics.rs         — Training metrics logging
//                        Per-run timestamped log directory with
//                        an epoch CSV and the full history as JSON.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV / JSON logger
pub mod metrics;
