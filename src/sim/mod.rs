// sim/ - Particle simulation
//
// Two field variants, each in its own module:
// - constellation: flat drifting particles, Structure-of-Arrays
// - nebula: fixed spherical shell cloud plus the central body's motion

mod constellation;
mod nebula;

pub use constellation::Constellation;
pub use nebula::{Body, ShellCloud, field_yaw};

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

/// Random source for field generation.
pub type FieldRng = SmallRng;

/// Seeded generator, so a given seed reproduces the same field.
pub fn field_rng(seed: u64) -> FieldRng {
    SmallRng::seed_from_u64(seed)
}

/// Uniform sample in [0, 1).
#[inline]
pub(crate) fn unit(rng: &mut impl Rng) -> f32 {
    rng.gen_range(0.0..1.0)
}

/// Seed for when the embedder does not pin one.
#[cfg(target_arch = "wasm32")]
pub fn entropy_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Seed for when the embedder does not pin one.
#[cfg(not(target_arch = "wasm32"))]
pub fn entropy_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}
