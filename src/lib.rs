// ============================================================================
// CONSTELLATION ENGINE - Particle visual fields for canvas backgrounds
// ============================================================================
//
// Two variants share one lifecycle:
//   constellation - flat drifting particles joined by a proximity graph
//   nebula        - shell cloud around a distorting body, seen through a
//                   scroll-driven camera
//
// The engine renders into an owned RGBA surface. In the browser `web` binds
// it to a canvas and requestAnimationFrame; natively the `snapshot` binary
// drives the same controller headlessly.

pub mod clock;
pub mod config;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod render;
pub mod scene;
pub mod sim;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{EngineConfig, NebulaConfig, Rgba};
pub use error::{EngineError, Result};
pub use graph::{Edge, EdgeStrategy};
pub use lifecycle::{ActivationGate, Controller, FrameHandle, FrameScheduler, Presenter, State};
pub use render::Surface;
pub use scene::{ConstellationScene, NebulaScene, Scene};
