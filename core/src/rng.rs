//! Deterministic random number generation for fixture data.
//!
//! RULE: nothing in this crate may call a platform RNG. All randomness
//! flows through FixtureRng streams derived from one master seed, so a
//! seed fully determines every generated chapter.
//!
//! Each concern gets its own stream, seeded from (master_seed XOR
//! stream_index). Adding a new stream never perturbs existing ones.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct FixtureRng {
    inner: Pcg64Mcg,
}

impl FixtureRng {
    /// Derive a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream: FixtureStream) -> Self {
        let derived = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution. Heavy-tailed,
    /// which is what closed-business amounts look like in practice.
    /// x_min: minimum value, alpha: shape (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments. NEVER reorder or remove entries, only
/// append: reordering reseeds every stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum FixtureStream {
    Membership = 0,
    Names = 1,
    Referrals = 2,
    Meetings = 3,
    Financials = 4,
    // Append new streams here.
}
