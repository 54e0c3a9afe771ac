//! Seeded sampling for the accurate storage search.
//!
//! The accurate search keeps scanning a group for a small random share of its
//! cells after the first acceptable one.  Resolving the same item twice with
//! the same settings must scan the same share, so each search seeds a fresh
//! `SmallRng` from the settings seed and the item:
//!
//!   seed = settings_seed XOR (item_id * GOLDEN)
//!
//! `GOLDEN` is the 64-bit fractional golden ratio, which keeps neighbouring
//! item ids far apart in seed space.

use std::ops::Range;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ItemId;

const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-item sampler; build one per storage search.
pub struct PlannerRng(SmallRng);

impl PlannerRng {
    pub fn for_item(seed: u64, item: ItemId) -> Self {
        PlannerRng(SmallRng::seed_from_u64(seed ^ u64::from(item.0).wrapping_mul(GOLDEN)))
    }

    /// Draw a fraction from `share` and return that many of `len` cells,
    /// rounded down.
    pub fn sample_len(&mut self, len: usize, share: Range<f32>) -> usize {
        let frac = if share.is_empty() { share.start } else { self.0.gen_range(share) };
        (len as f32 * frac).floor() as usize
    }
}
