// constellation.rs - Flat drifting particle field
//
// Structure-of-Arrays layout for cache-friendly iteration. The field is
// regenerated wholesale on resize, never patched.

use log::warn;
use rand::Rng;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::sim::unit;

// Scatter ranges
const RADIUS_MIN: f32 = 1.0;
const RADIUS_SPAN: f32 = 1.5;
const OPACITY_MIN: f32 = 0.5;
const OPACITY_SPAN: f32 = 0.3;

#[derive(Clone, Debug, Default)]
pub struct Constellation {
    // Position
    pub x: Vec<f32>,
    pub y: Vec<f32>,

    // Velocity, pixels per tick
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,

    // Appearance
    pub radius: Vec<f32>,
    pub opacity: Vec<f32>,

    // Surface extent the field wraps around
    w: f32,
    h: f32,
}

impl Constellation {
    /// Field with no particles, used while the surface is degenerate.
    pub fn empty(w: u32, h: u32) -> Self {
        Self { w: w as f32, h: h as f32, ..Self::default() }
    }

    /// Scatter `config.particle_count` particles uniformly over the surface.
    pub fn generate(w: u32, h: u32, config: &EngineConfig, rng: &mut impl Rng) -> Result<Self> {
        if w == 0 || h == 0 {
            return Err(EngineError::DegenerateSurface { width: w, height: h });
        }

        let n = config.particle_count;
        let mut field = Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            vx: Vec::with_capacity(n),
            vy: Vec::with_capacity(n),
            radius: Vec::with_capacity(n),
            opacity: Vec::with_capacity(n),
            w: w as f32,
            h: h as f32,
        };

        for _ in 0..n {
            field.push(
                rng.gen_range(0.0..field.w),
                rng.gen_range(0.0..field.h),
                (unit(rng) - 0.5) * config.speed,
                (unit(rng) - 0.5) * config.speed,
                RADIUS_MIN + unit(rng) * RADIUS_SPAN,
                OPACITY_MIN + unit(rng) * OPACITY_SPAN,
            );
        }

        Ok(field)
    }

    /// Like [`generate`](Self::generate), but a degenerate surface logs and
    /// yields an empty field instead of failing.
    pub fn generate_or_empty(w: u32, h: u32, config: &EngineConfig, rng: &mut impl Rng) -> Self {
        match Self::generate(w, h, config, rng) {
            Ok(field) => field,
            Err(e) => {
                warn!("constellation: {e}, rendering nothing until next resize");
                Self::empty(w, h)
            }
        }
    }

    /// Append one particle. Positions are expected inside the surface.
    pub fn push(&mut self, x: f32, y: f32, vx: f32, vy: f32, radius: f32, opacity: f32) {
        self.x.push(x);
        self.y.push(y);
        self.vx.push(vx);
        self.vy.push(vy);
        self.radius.push(radius);
        self.opacity.push(opacity);
    }

    /// One fixed step of drift, wrapping each axis toroidally.
    pub fn advance(&mut self) {
        let (w, h) = (self.w, self.h);
        for i in 0..self.x.len() {
            self.x[i] = wrap(self.x[i] + self.vx[i], w);
            self.y[i] = wrap(self.y[i] + self.vy[i], h);
        }
    }

    #[inline]
    pub fn len(&self) -> usize { self.x.len() }
    #[inline]
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
    pub fn width(&self) -> f32 { self.w }
    pub fn height(&self) -> f32 { self.h }
}

/// Wrap into [0, extent). Non-finite input lands on the origin edge.
#[inline]
fn wrap(v: f32, extent: f32) -> f32 {
    let r = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if r.is_finite() && r < extent { r } else { 0.0 }
}
