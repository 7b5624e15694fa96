// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training workflow only needs "some images". Loading real
// datasets is outside this crate, so the application layer
// programs against ImageSource and the synthetic generator is
// the implementation it ships with. A caller embedding the
// crate can hand in any other source of ready-made arrays.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::image::Image;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a batch of 32×32×3 images.
///
/// Implementations:
///   - SyntheticImages → smooth gradient images from a seeded RNG
pub trait ImageSource {
    /// Produce every image this source holds
    fn images(&self) -> Result<Vec<Image>>;
}
