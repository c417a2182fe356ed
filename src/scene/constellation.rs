// constellation.rs - Drifting particles joined by proximity edges

use log::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::{EdgeStrategy, build_edges_with};
use crate::render::{ConstellationStyle, Surface, draw_constellation};
use crate::scene::Scene;
use crate::sim::{Constellation, FieldRng, entropy_seed, field_rng};

pub struct ConstellationScene {
    config: EngineConfig,
    style: ConstellationStyle,
    strategy: EdgeStrategy,
    rng: FieldRng,
    field: Constellation,
}

impl ConstellationScene {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(entropy_seed);
        Ok(Self {
            style: ConstellationStyle::from(&config),
            strategy: EdgeStrategy::default(),
            rng: field_rng(seed),
            field: Constellation::empty(0, 0),
            config,
        })
    }

    pub fn with_strategy(mut self, strategy: EdgeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn field(&self) -> &Constellation { &self.field }
}

impl Scene for ConstellationScene {
    fn regenerate(&mut self, w: u32, h: u32) {
        self.field = Constellation::generate_or_empty(w, h, &self.config, &mut self.rng);
        debug!("constellation: {} particles over {w}x{h}", self.field.len());
    }

    fn frame(&mut self, t: f32, surface: &mut Surface) {
        self.field.advance();
        let edges = build_edges_with(&self.field, self.config.max_distance, self.strategy);
        draw_constellation(surface, &self.field, edges, &self.style, t);
    }
}
