// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer takes ready-made images all the way to
// device-ready tensor batches.
//
// The pipeline flows in this order:
//
//   ImageSource (e.g. SyntheticImages)
//       │
//       ▼
//   split_train_val   → seeded shuffle, train / validation split
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks images into [N, 32, 32, 3] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Decoding image files is deliberately absent: images arrive as
// in-memory arrays.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Toy dataset of smooth gradient images
pub mod synthetic;

/// Implements Burn's Dataset trait for images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
