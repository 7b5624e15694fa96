// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the model, the loss and the training
// loop: everything that does tensor math.
//
// What's in this layer:
//
//   model.rs     — The convolutional autoencoder
//                  • Encoder: 5 × (conv 3×3 + ReLU + max-pool 2×2),
//                    flatten, dense 32, dense latent_dim
//                  • Decoder: dense 27 → 3×3×3, 4 × (conv 2×2 + ReLU
//                    + 2× upsample), flatten, dense 64, dense 3072
//                    → 32×32×3
//                  • Static per-layer summary table
//
//   loss.rs      — Reconstruction losses (mse / mae / huber) and
//                  metrics (mae / mse / rmse)
//
//   trainer.rs   — The training loop
//                  Forward pass, loss, backward pass, optimiser
//                  step, validation, best-model checkpointing,
//                  final model persistence
//
//   inspect.rs   — Rebuild a saved autoencoder from its model
//                  directory
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional autoencoder architecture
pub mod model;

/// Reconstruction loss and metric
pub mod loss;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Restores a trained model from disk
pub mod inspect;
