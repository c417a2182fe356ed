// config.rs - Construction parameters
//
// Both variants take an immutable config at construction. Field names follow
// the camelCase props the embedding page passes, so a JSON object built in
// JS deserializes directly.

use serde::Deserialize;

use crate::error::{EngineError, Result};

// ============================================================================
// Colors
// ============================================================================

/// Straight (non-premultiplied) color with an embedded alpha channel.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Accepts `rgba(r, g, b, a)`, `rgb(r, g, b)` and `#rrggbb`.
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || EngineError::InvalidColor(s.to_string());
        let t = s.trim();

        if let Some(hex) = t.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() { return Err(bad()); }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, 1.0));
        }

        let (body, expect_alpha) = if let Some(rest) = t.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = t.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(bad());
        };
        let body = body.strip_suffix(')').ok_or_else(bad)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let arity = if expect_alpha { 4 } else { 3 };
        if parts.len() != arity { return Err(bad()); }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| bad());
        let a = if expect_alpha {
            let a = parts[3].parse::<f32>().map_err(|_| bad())?;
            if !(0.0..=1.0).contains(&a) { return Err(bad()); }
            a
        } else {
            1.0
        };

        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }

    /// Same color with its alpha replaced.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Channels as floats in [0, 1] (alpha dropped).
    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0]
    }

    #[inline]
    pub fn from_rgb(rgb: [f32; 3], a: f32) -> Self {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        Self::new(c(rgb[0]), c(rgb[1]), c(rgb[2]), a)
    }

    /// Linear mix of the color channels, keeping `self`'s alpha.
    pub fn mix(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let (a, b) = (self.rgb(), other.rgb());
        Self::from_rgb(
            [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t],
            self.a,
        )
    }
}

impl TryFrom<String> for Rgba {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        Rgba::parse(&s)
    }
}

// ============================================================================
// Constellation (planar) config
// ============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Density/perf tradeoff.
    pub particle_count: usize,
    pub particle_color: Rgba,
    pub line_color: Rgba,
    /// Edge-formation radius in pixels.
    pub max_distance: f32,
    /// Drift magnitude per tick in pixels.
    pub speed: f32,
    /// Seed for the particle scatter. Random when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            particle_color: Rgba::new(96, 165, 250, 0.8),
            line_color: Rgba::new(96, 165, 250, 0.2),
            max_distance: 180.0,
            speed: 0.3,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "maxDistance must be a positive number, got {}",
                self.max_distance
            )));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "speed must be a non-negative number, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Nebula (volumetric) config
// ============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NebulaConfig {
    pub particle_count: usize,
    pub shell_min: f32,
    pub shell_max: f32,
    /// Field yaw in radians per second.
    pub rotation_speed: f32,
    pub point_color: Rgba,
    /// Point diameter in world units.
    pub point_size: f32,
    pub background: Rgba,
    pub body_color: Rgba,
    pub body_emissive: Rgba,
    pub body_radius: f32,
    pub fov_degrees: f32,
    /// Fraction of the remaining camera offset closed each frame.
    pub camera_damping: f32,
    pub fog_near: f32,
    pub fog_far: f32,
    pub seed: Option<u64>,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            shell_min: 6.0,
            shell_max: 12.0,
            rotation_speed: 0.02,
            point_color: Rgba::new(0x6b, 0x72, 0x80, 0.3),
            point_size: 0.04,
            background: Rgba::new(0x05, 0x0b, 0x16, 1.0),
            body_color: Rgba::new(0x1f, 0x29, 0x37, 1.0),
            body_emissive: Rgba::new(0x37, 0x41, 0x51, 1.0),
            body_radius: 2.0,
            fov_degrees: 55.0,
            camera_damping: 0.05,
            fog_near: 12.0,
            fog_far: 22.0,
            seed: None,
        }
    }
}

impl NebulaConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if !(self.shell_min >= 0.0 && self.shell_min <= self.shell_max && self.shell_max.is_finite()) {
            return invalid(format!(
                "shell radii must satisfy 0 <= shellMin <= shellMax, got [{}, {}]",
                self.shell_min, self.shell_max
            ));
        }
        if !(self.camera_damping > 0.0 && self.camera_damping <= 1.0) {
            return invalid(format!("cameraDamping must be in (0, 1], got {}", self.camera_damping));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid(format!("fovDegrees must be in (0, 180), got {}", self.fov_degrees));
        }
        if !(self.fog_near < self.fog_far) {
            return invalid(format!("fogNear must be below fogFar, got [{}, {}]", self.fog_near, self.fog_far));
        }
        if !self.rotation_speed.is_finite() || !self.body_radius.is_finite() || self.body_radius < 0.0 {
            return invalid("rotationSpeed and bodyRadius must be finite".to_string());
        }
        Ok(())
    }
}
