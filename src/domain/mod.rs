// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with: images, hyperparameter choices, and the
// sources that images come from.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Keeping it framework-free means the hyperparameter parsing
// and image validation are testable without a device.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A single 32×32×3 image in channels-last order
pub mod image;

// Optimizer / loss / metric choices
pub mod hyperparams;

// Core abstractions (traits) that other layers implement
pub mod traits;
