// nebula.rs - Camera-driven volumetric cloud with a distorting body
//
// Points are projected through a perspective camera that eases toward a
// scroll-derived target. The body is drawn as a lit, fogged silhouette whose
// radius is displaced by an animated angular noise scaled by its distortion
// amplitude. Points behind the body are painted first, the rest after it.

use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::{NebulaConfig, Rgba};
use crate::render::Surface;
use crate::sim::{Body, ShellCloud};

// Camera
const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 8.0);
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

// Body lighting
const AMBIENT: f32 = 0.3;
const KEY_LIGHT_DIR: Vec3 = Vec3::new(4.0, 5.0, 6.0);
const KEY_LIGHT_COLOR: Rgba = Rgba::new(0x6b, 0x72, 0x80, 1.0);
const KEY_LIGHT_INTENSITY: f32 = 2.0;
const EMISSIVE_INTENSITY: f32 = 0.5;
// (position, color, intensity), no distance falloff
const POINT_LIGHTS: [(Vec3, Rgba, f32); 2] = [
    (Vec3::new(-6.0, -3.0, -4.0), Rgba::new(0x4b, 0x55, 0x63, 1.0), 0.8),
    (Vec3::new(2.0, -1.0, 5.0), Rgba::new(0x37, 0x41, 0x51, 1.0), 0.6),
];
const DISTORT_SPEED: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    fov_y: f32,
    damping: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, damping: f32) -> Self {
        Self { position: CAMERA_START, fov_y: fov_degrees.to_radians(), damping }
    }

    /// Where the camera wants to be for a scroll progress in [0, 1].
    pub fn target(scroll: f32) -> Vec3 {
        let p = if scroll.is_finite() { scroll.clamp(0.0, 1.0) } else { 0.0 };
        Vec3::new((p * PI).sin() * 0.8, -0.4 + p * 1.2, 8.0 - p * 3.0)
    }

    /// Close a fixed fraction of the gap to the scroll target.
    pub fn follow(&mut self, scroll: f32) {
        self.position = self.position.lerp(Self::target(scroll), self.damping);
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NebulaStyle {
    pub point_color: Rgba,
    pub point_size: f32,
    pub background: Rgba,
    pub body_color: Rgba,
    pub body_emissive: Rgba,
    pub body_radius: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl From<&NebulaConfig> for NebulaStyle {
    fn from(c: &NebulaConfig) -> Self {
        Self {
            point_color: c.point_color,
            point_size: c.point_size,
            background: c.background,
            body_color: c.body_color,
            body_emissive: c.body_emissive,
            body_radius: c.body_radius,
            fog_near: c.fog_near,
            fog_far: c.fog_far,
        }
    }
}

impl NebulaStyle {
    #[inline]
    fn fog(&self, depth: f32) -> f32 {
        ((depth - self.fog_near) / (self.fog_far - self.fog_near)).clamp(0.0, 1.0)
    }
}

/// World to screen mapping for one frame.
struct Projector {
    view: Mat4,
    view_proj: Mat4,
    w: f32,
    h: f32,
    /// Pixels per world unit at unit depth.
    focal: f32,
}

impl Projector {
    fn new(camera: &Camera, w: u32, h: u32) -> Self {
        let (w, h) = (w as f32, h as f32);
        let proj = Mat4::perspective_rh(camera.fov_y, w / h, NEAR_PLANE, FAR_PLANE);
        let view = camera.view();
        Self {
            view,
            view_proj: proj * view,
            w,
            h,
            focal: (h * 0.5) / (camera.fov_y * 0.5).tan(),
        }
    }

    /// Screen position and view depth, or None behind the camera.
    fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj * p.extend(1.0);
        if !(clip.w > NEAR_PLANE) { return None; }
        let ndc = clip.truncate() / clip.w;
        let screen = Vec2::new((ndc.x * 0.5 + 0.5) * self.w, (0.5 - ndc.y * 0.5) * self.h);
        screen.is_finite().then_some((screen, clip.w))
    }
}

/// Fill the background and draw one frame of the cloud and body.
pub fn draw_nebula(
    surface: &mut Surface,
    camera: &Camera,
    cloud: &ShellCloud,
    yaw: f32,
    body: &Body,
    t: f32,
    style: &NebulaStyle,
) {
    if surface.is_empty() { return; }
    surface.fill(style.background);

    let projector = Projector::new(camera, surface.width(), surface.height());
    let body_depth = projector.project(body.offset).map(|(_, d)| d).unwrap_or(f32::INFINITY);

    let spin = Quat::from_rotation_y(yaw);
    let points: Vec<(Vec2, f32)> = cloud
        .points()
        .iter()
        .filter_map(|&p| projector.project(spin * p))
        .collect();

    for &(at, depth) in points.iter().filter(|(_, d)| *d >= body_depth) {
        draw_point(surface, &projector, at, depth, style);
    }
    draw_body(surface, &projector, body, t, style);
    for &(at, depth) in points.iter().filter(|(_, d)| *d < body_depth) {
        draw_point(surface, &projector, at, depth, style);
    }
}

fn draw_point(surface: &mut Surface, projector: &Projector, at: Vec2, depth: f32, style: &NebulaStyle) {
    // Size attenuates with depth
    let radius = (style.point_size * projector.focal / depth * 0.5).max(0.5);
    let color = style.point_color.mix(style.background, style.fog(depth));
    surface.fill_disc(at.x, at.y, radius, color, 1.0);
}

/// Key and point lights moved into view space for one frame.
struct LightRig {
    key_dir: Vec3,
    key_rgb: [f32; 3],
    points: [(Vec3, [f32; 3], f32); 2],
}

impl LightRig {
    fn new(view: Mat4) -> Self {
        Self {
            key_dir: view.transform_vector3(KEY_LIGHT_DIR).normalize(),
            key_rgb: KEY_LIGHT_COLOR.rgb(),
            points: POINT_LIGHTS.map(|(pos, color, intensity)| (view.transform_point3(pos), color.rgb(), intensity)),
        }
    }

    /// Diffuse light reaching a surface point `at` with unit `normal`, both in view space.
    fn irradiance(&self, normal: Vec3, at: Vec3) -> [f32; 3] {
        let key = normal.dot(self.key_dir).max(0.0) * KEY_LIGHT_INTENSITY;
        let mut rgb = self.key_rgb.map(|c| c * key);
        for &(pos, color, intensity) in &self.points {
            let lambert = normal.dot((pos - at).normalize_or_zero()).max(0.0) * intensity;
            for c in 0..3 {
                rgb[c] += color[c] * lambert;
            }
        }
        rgb
    }
}

/// Angular displacement in [-1, 1], animated by time and the body's tumble.
#[inline]
fn displacement(theta: f32, rotation: Vec2, t: f32) -> f32 {
    let phase = t * DISTORT_SPEED;
    0.6 * (3.0 * theta + rotation.y * 8.0 + phase).sin()
        + 0.4 * (5.0 * theta - rotation.x * 12.0 + phase * 1.3).sin()
}

fn draw_body(surface: &mut Surface, projector: &Projector, body: &Body, t: f32, style: &NebulaStyle) {
    let Some((center, depth)) = projector.project(body.offset) else { return };
    let radius = style.body_radius * projector.focal / depth;
    if !(radius > 0.0) { return; }

    let reach = radius * (1.0 + body.distortion.abs()) + 1.0;
    let rig = LightRig::new(projector.view);
    let center_view = projector.view.transform_point3(body.offset);
    let base = style.body_color.rgb();
    let emissive = style.body_emissive.rgb();
    let fog = style.fog(depth);

    let x0 = ((center.x - reach).floor() as i32).max(0);
    let x1 = ((center.x + reach).ceil() as i32).min(surface.width() as i32 - 1);
    let y0 = ((center.y - reach).floor() as i32).max(0);
    let y1 = ((center.y + reach).ceil() as i32).min(surface.height() as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            let dist = d.length();
            let edge = radius * (1.0 + body.distortion * displacement(d.y.atan2(d.x), body.rotation, t));
            let coverage = (edge + 0.5 - dist).clamp(0.0, 1.0);
            if coverage <= 0.0 { continue; }

            // Sphere normal in view space, screen y points down
            let u = (dist / edge).min(1.0);
            let normal = Vec3::new(d.x / edge, -d.y / edge, (1.0 - u * u).max(0.0).sqrt()).normalize_or_zero();
            let light = rig.irradiance(normal, center_view + normal * style.body_radius);

            let lit = [0, 1, 2].map(|c| {
                base[c] * (AMBIENT + light[c]) + emissive[c] * EMISSIVE_INTENSITY
            });
            let color = Rgba::from_rgb(lit, 1.0).mix(style.background, fog);
            surface.blend(x, y, color, coverage);
        }
    }
}
