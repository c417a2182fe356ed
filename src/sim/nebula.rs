// nebula.rs - Volumetric point cloud and the central body
//
// The cloud is scattered once and never mutated. All visible motion is
// derived from elapsed time: the whole cloud yaws, the body tumbles, bobs
// and breathes its distortion amplitude.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::sim::unit;

// Body motion
const TUMBLE_X: f32 = 0.002; // rad per frame
const TUMBLE_Y: f32 = 0.003;
const BOB_Y: (f32, f32) = (0.25, 0.6); // (amplitude, rad/s)
const BOB_X: (f32, f32) = (0.15, 0.3);
const DISTORT_BASE: f32 = 0.32;
const DISTORT_SWING: (f32, f32) = (0.05, 0.5);

/// Points on shells of random radius, uniformly distributed over the sphere.
#[derive(Clone, Debug)]
pub struct ShellCloud {
    points: Vec<Vec3>,
}

impl ShellCloud {
    /// Inverse-transform sampling: uniform azimuth, polar angle `acos(2u - 1)`.
    /// Sampling the polar angle directly would crowd the poles.
    pub fn generate(count: usize, r_min: f32, r_max: f32, rng: &mut impl Rng) -> Self {
        let points = (0..count)
            .map(|_| {
                let radius = r_min + unit(rng) * (r_max - r_min);
                let theta = rng.gen_range(0.0..TAU);
                let phi = (2.0 * unit(rng) - 1.0).acos();
                Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                )
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Vec3] { &self.points }
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// Whole-cloud yaw at elapsed time `t` seconds.
#[inline]
pub fn field_yaw(t: f32, rotation_speed: f32) -> f32 {
    t * rotation_speed
}

/// Pose of the deformable central body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Accumulated tumble (x, y) in radians.
    pub rotation: Vec2,
    /// Offset of the body's center from the origin.
    pub offset: Vec3,
    /// Current distortion amplitude for the surface material.
    pub distortion: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self { rotation: Vec2::ZERO, offset: Vec3::ZERO, distortion: DISTORT_BASE }
    }
}

impl Body {
    /// One frame of motion. Tumble accumulates per frame, the rest follows `t`.
    pub fn advance(&mut self, t: f32) {
        self.rotation += Vec2::new(TUMBLE_X, TUMBLE_Y);
        self.offset = Vec3::new(
            (t * BOB_X.1).cos() * BOB_X.0,
            (t * BOB_Y.1).sin() * BOB_Y.0,
            0.0,
        );
        self.distortion = DISTORT_BASE + (t * DISTORT_SWING.1).sin() * DISTORT_SWING.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field_rng;

    #[test]
    fn shell_radii_within_bounds() {
        let cloud = ShellCloud::generate(2_000, 6.0, 12.0, &mut field_rng(5));
        assert_eq!(cloud.len(), 2_000);
        for p in cloud.points() {
            let r = p.length();
            assert!(r >= 6.0 - 1e-3 && r <= 12.0 + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn polar_bands_are_uniform() {
        // Equal-area zones: uniform on the sphere means uniform in cos(polar).
        const BINS: usize = 10;
        const N: usize = 10_000;
        let cloud = ShellCloud::generate(N, 6.0, 12.0, &mut field_rng(42));

        let mut counts = [0usize; BINS];
        for p in cloud.points() {
            let cos_phi = (p.z / p.length()).clamp(-1.0, 1.0);
            let bin = (((cos_phi + 1.0) * 0.5 * BINS as f32) as usize).min(BINS - 1);
            counts[bin] += 1;
        }

        let expected = N as f32 / BINS as f32;
        let chi2: f32 = counts.iter().map(|&c| (c as f32 - expected).powi(2) / expected).sum();
        // 9 degrees of freedom, p = 0.001
        assert!(chi2 < 27.88, "chi2 = {chi2}, counts = {counts:?}");
    }

    #[test]
    fn naive_latitude_sampling_fails_the_same_test() {
        const BINS: usize = 10;
        const N: usize = 10_000;
        let mut rng = field_rng(42);

        let mut counts = [0usize; BINS];
        for _ in 0..N {
            let phi: f32 = rng.gen_range(0.0..std::f32::consts::PI);
            let bin = (((phi.cos() + 1.0) * 0.5 * BINS as f32) as usize).min(BINS - 1);
            counts[bin] += 1;
        }

        let expected = N as f32 / BINS as f32;
        let chi2: f32 = counts.iter().map(|&c| (c as f32 - expected).powi(2) / expected).sum();
        assert!(chi2 > 100.0, "chi2 = {chi2}");
    }

    #[test]
    fn body_tumbles_per_frame_and_breathes_with_time() {
        let mut body = Body::default();
        body.advance(0.0);
        body.advance(0.0);
        assert!((body.rotation.x - 0.004).abs() < 1e-6);
        assert!((body.rotation.y - 0.006).abs() < 1e-6);
        assert_eq!(body.distortion, DISTORT_BASE);

        body.advance(std::f32::consts::PI); // sin(0.5 * PI) = 1
        assert!((body.distortion - 0.37).abs() < 1e-5);
        assert!(body.distortion >= 0.27 && body.distortion <= 0.37 + 1e-6);
    }

    #[test]
    fn yaw_is_linear_in_time() {
        assert_eq!(field_yaw(0.0, 0.02), 0.0);
        assert!((field_yaw(50.0, 0.02) - 1.0).abs() < 1e-6);
    }
}
