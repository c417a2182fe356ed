// scene/ - What the controller animates
//
// A scene owns its field and everything it needs to draw a frame. The
// controller only tells it when the extent changes and when to draw.

mod constellation;
mod nebula;

pub use constellation::ConstellationScene;
pub use nebula::NebulaScene;

use crate::render::Surface;

pub trait Scene {
    /// Rebuild extent-dependent state. A degenerate extent is logged and
    /// renders nothing until the next resize.
    fn regenerate(&mut self, w: u32, h: u32);

    /// Advance one frame and draw it. `t` is elapsed seconds.
    fn frame(&mut self, t: f32, surface: &mut Surface);
}
