// render/ - Draw simulation state into the output surface
//
// Renderers read the field and never mutate it. A zero-sized surface makes
// every draw a no-op.

mod constellation;
mod nebula;
mod surface;

pub use constellation::{ConstellationStyle, draw_constellation};
pub use nebula::{Camera, NebulaStyle, draw_nebula};
pub use surface::Surface;
