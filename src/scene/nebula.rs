// nebula.rs - Rotating shell cloud around a breathing body
//
// The cloud is scattered once at construction. Resizing only changes the
// surface the camera projects onto.

use log::debug;

use crate::config::NebulaConfig;
use crate::error::Result;
use crate::render::{Camera, NebulaStyle, Surface, draw_nebula};
use crate::scene::Scene;
use crate::sim::{Body, ShellCloud, entropy_seed, field_rng, field_yaw};

pub struct NebulaScene {
    config: NebulaConfig,
    style: NebulaStyle,
    cloud: ShellCloud,
    body: Body,
    camera: Camera,
    scroll: f32,
}

impl NebulaScene {
    pub fn new(config: NebulaConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = field_rng(config.seed.unwrap_or_else(entropy_seed));
        Ok(Self {
            style: NebulaStyle::from(&config),
            cloud: ShellCloud::generate(config.particle_count, config.shell_min, config.shell_max, &mut rng),
            body: Body::default(),
            camera: Camera::new(config.fov_degrees, config.camera_damping),
            scroll: 0.0,
            config,
        })
    }

    /// Scroll progress in [0, 1]; the camera eases toward it over frames.
    pub fn set_scroll_progress(&mut self, progress: f32) {
        if progress.is_finite() {
            self.scroll = progress.clamp(0.0, 1.0);
        }
    }

    pub fn scroll_progress(&self) -> f32 { self.scroll }
    pub fn cloud(&self) -> &ShellCloud { &self.cloud }
    pub fn body(&self) -> &Body { &self.body }
    pub fn camera(&self) -> &Camera { &self.camera }
}

impl Scene for NebulaScene {
    fn regenerate(&mut self, w: u32, h: u32) {
        debug!("nebula: projecting {} points onto {w}x{h}", self.cloud.len());
    }

    fn frame(&mut self, t: f32, surface: &mut Surface) {
        self.body.advance(t);
        self.camera.follow(self.scroll);
        let yaw = field_yaw(t, self.config.rotation_speed);
        draw_nebula(surface, &self.camera, &self.cloud, yaw, &self.body, t, &self.style);
    }
}
