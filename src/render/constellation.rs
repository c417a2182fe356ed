// constellation.rs - Flat proximity graph
//
// Discs pulse out of phase (phase keyed by particle index) with a soft glow;
// edges are thin lines whose alpha is the edge intensity.

use crate::config::{EngineConfig, Rgba};
use crate::graph::Edge;
use crate::render::Surface;
use crate::sim::Constellation;

const PULSE_MEAN: f32 = 0.4;
const PULSE_SWING: f32 = 0.2;
const GLOW_BLUR: f32 = 6.0;
const GLOW_FACTOR: f32 = 0.6;
const LINE_WIDTH: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstellationStyle {
    pub particle: Rgba,
    pub line: Rgba,
    pub line_width: f32,
    pub glow_blur: f32,
}

impl From<&EngineConfig> for ConstellationStyle {
    fn from(config: &EngineConfig) -> Self {
        Self {
            particle: config.particle_color,
            line: config.line_color,
            line_width: LINE_WIDTH,
            glow_blur: GLOW_BLUR,
        }
    }
}

/// Pulse term for particle `i` at time `t` seconds.
#[inline]
pub fn pulse(t: f32, i: usize) -> f32 {
    PULSE_MEAN + (t + i as f32).sin() * PULSE_SWING
}

/// Clear the surface and draw one frame: particles, then edges.
pub fn draw_constellation(
    surface: &mut Surface,
    field: &Constellation,
    edges: impl Iterator<Item = Edge>,
    style: &ConstellationStyle,
    t: f32,
) {
    surface.clear();
    if surface.is_empty() { return; }

    for i in 0..field.len() {
        let (x, y, r) = (field.x[i], field.y[i], field.radius[i]);
        if !(x.is_finite() && y.is_finite()) { continue; }

        let alpha = (field.opacity[i] * pulse(t, i)).clamp(0.0, 1.0);
        let color = style.particle.with_alpha(alpha);

        surface.glow(x, y, r, style.glow_blur, color.with_alpha(alpha * GLOW_FACTOR), 1.0);
        surface.fill_disc(x, y, r, color, 1.0);
    }

    for e in edges {
        let color = style.line.with_alpha(e.intensity);
        surface.line(field.x[e.i], field.y[e.i], field.x[e.j], field.y[e.j], style.line_width, color, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_edges;

    fn two_particles() -> Constellation {
        let mut f = Constellation::empty(64, 32);
        f.push(8.5, 16.5, 0.0, 0.0, 2.0, 0.8);
        f.push(56.5, 16.5, 0.0, 0.0, 2.0, 0.8);
        f
    }

    #[test]
    fn pulse_stays_in_band_and_desyncs() {
        for i in 0..50 {
            let p = pulse(1.7, i);
            assert!((0.2..=0.6).contains(&p));
        }
        assert_ne!(pulse(0.0, 0), pulse(0.0, 1));
    }

    #[test]
    fn draws_particles_and_connecting_line() {
        let field = two_particles();
        let style = ConstellationStyle::from(&EngineConfig::default());
        let mut s = Surface::new(64, 32);
        draw_constellation(&mut s, &field, build_edges(&field, 180.0), &style, 0.0);

        assert!(s.pixel(8, 16).unwrap()[3] > 0);
        assert!(s.pixel(56, 16).unwrap()[3] > 0);
        // Midpoint is only reachable by the edge
        assert!(s.pixel(32, 16).unwrap()[3] > 0);
        assert_eq!(s.pixel(32, 2).unwrap()[3], 0);
    }

    #[test]
    fn disc_alpha_follows_the_pulse() {
        let mut field = Constellation::empty(32, 32);
        field.push(16.5, 16.5, 0.0, 0.0, 2.0, 0.8);
        let style = ConstellationStyle::from(&EngineConfig::default());

        let center_alpha = |t: f32| {
            let mut s = Surface::new(32, 32);
            draw_constellation(&mut s, &field, std::iter::empty(), &style, t);
            s.pixel(16, 16).unwrap()[3]
        };
        let peak = center_alpha(std::f32::consts::FRAC_PI_2);
        let near_peak = center_alpha(0.6);
        let mean = center_alpha(0.0);
        assert!(peak > near_peak, "{peak} vs {near_peak}");
        assert!(near_peak > mean, "{near_peak} vs {mean}");
        assert!(peak < 255);
    }

    #[test]
    fn no_edge_no_line() {
        let field = two_particles();
        let style = ConstellationStyle::from(&EngineConfig::default());
        let mut s = Surface::new(64, 32);
        draw_constellation(&mut s, &field, build_edges(&field, 10.0), &style, 0.0);
        assert_eq!(s.pixel(32, 16).unwrap()[3], 0);
    }

    #[test]
    fn render_does_not_touch_field() {
        let field = two_particles();
        let before = (field.x.clone(), field.y.clone());
        let mut s = Surface::new(64, 32);
        let style = ConstellationStyle::from(&EngineConfig::default());
        draw_constellation(&mut s, &field, build_edges(&field, 180.0), &style, 3.0);
        assert_eq!((field.x.clone(), field.y.clone()), before);
    }

    #[test]
    fn zero_sized_surface_is_a_no_op() {
        let field = two_particles();
        let mut s = Surface::new(0, 0);
        let style = ConstellationStyle::from(&EngineConfig::default());
        draw_constellation(&mut s, &field, build_edges(&field, 180.0), &style, 0.0);
        assert!(s.is_empty());
    }
}
