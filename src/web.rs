// web.rs - Browser bindings
//
// The engine owns its frame clock: requestAnimationFrame callbacks are
// scheduled and revoked from Rust, and every frame is blitted onto the
// canvas with putImageData. JS only forwards activation, resize, scroll and
// teardown signals.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, Window};

use crate::config::{EngineConfig, NebulaConfig};
use crate::error::{EngineError, Result};
use crate::lifecycle::{ActivationGate, Controller, FrameHandle, FrameScheduler, Presenter};
use crate::render::Surface;
use crate::scene::{ConstellationScene, NebulaScene, Scene};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

// ============================================================================
// Host adapters
// ============================================================================

struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
    // Id of the most recent request, read back when the callback fires
    requested: Rc<Cell<i32>>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let callback = self.callback.as_ref()?;
        match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.requested.set(id);
                Some(FrameHandle(id))
            }
            Err(e) => {
                error!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            warn!("cancelAnimationFrame failed: {e:?}");
        }
    }
}

struct CanvasPresenter {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
}

impl Presenter for CanvasPresenter {
    fn acquire(&mut self) -> Result<()> {
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| EngineError::MissingDrawingContext("canvas has no 2d context".into()))?;
        self.ctx = Some(ctx);
        Ok(())
    }

    /// The canvas fills its parent, so the parent decides the extent.
    fn extent(&self) -> (u32, u32) {
        match self.canvas.parent_element() {
            Some(parent) => (parent.client_width().max(0) as u32, parent.client_height().max(0) as u32),
            None => (self.canvas.width(), self.canvas.height()),
        }
    }

    fn present(&mut self, surface: &Surface) {
        let Some(ctx) = &self.ctx else { return };
        if surface.is_empty() { return; }

        if self.canvas.width() != surface.width() { self.canvas.set_width(surface.width()); }
        if self.canvas.height() != surface.height() { self.canvas.set_height(surface.height()); }

        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(surface.as_bytes()),
            surface.width(),
            surface.height(),
        );
        match image {
            Ok(image) => {
                if let Err(e) = ctx.put_image_data(&image, 0.0, 0.0) {
                    warn!("putImageData failed: {e:?}");
                }
            }
            Err(e) => warn!("ImageData rejected frame: {e:?}"),
        }
    }
}

// ============================================================================
// Mounting
// ============================================================================

type Shared<S> = Rc<RefCell<Controller<S, RafScheduler, CanvasPresenter>>>;

/// A scene bound to a canvas and the browser's frame clock.
struct Mounted<S: Scene + 'static> {
    inner: Shared<S>,
    gate: ActivationGate,
}

impl<S: Scene + 'static> Mounted<S> {
    fn new(canvas: HtmlCanvasElement, scene: S) -> std::result::Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no global window"))?;
        let requested = Rc::new(Cell::new(0));
        let scheduler = RafScheduler { window, callback: None, requested: requested.clone() };
        let presenter = CanvasPresenter { canvas, ctx: None };
        let inner: Shared<S> = Rc::new(RefCell::new(Controller::new(scene, scheduler, presenter)));

        // Weak, so dropping the binding frees the controller and this closure
        let weak = Rc::downgrade(&inner);
        let tick = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().on_frame(FrameHandle(requested.get()), now);
            }
        });
        inner.borrow_mut().scheduler_mut().callback = Some(tick);

        Ok(Self { inner, gate: ActivationGate::default() })
    }

    fn activate(&self) -> std::result::Result<(), JsError> {
        self.inner.borrow_mut().activate()?;
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> std::result::Result<(), JsError> {
        if self.gate.observe(visible) {
            self.activate()?;
        }
        Ok(())
    }

    fn resize(&self, width: u32, height: u32) {
        self.inner.borrow_mut().resize(width, height);
    }

    fn teardown(&self) {
        self.inner.borrow_mut().teardown();
    }
}

impl<S: Scene + 'static> Drop for Mounted<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ============================================================================
// Exports
// ============================================================================

/// Flat constellation overlay.
#[wasm_bindgen]
pub struct ConstellationOverlay {
    mounted: Mounted<ConstellationScene>,
}

#[wasm_bindgen]
impl ConstellationOverlay {
    /// `config` is an optional JSON object of camelCase options.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> std::result::Result<ConstellationOverlay, JsError> {
        let config = match config {
            Some(json) => EngineConfig::from_json(&json)?,
            None => EngineConfig::default(),
        };
        let scene = ConstellationScene::new(config)?;
        Ok(Self { mounted: Mounted::new(canvas, scene)? })
    }

    /// Feed visibility reports; the first visible one starts the engine.
    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, visible: bool) -> std::result::Result<(), JsError> {
        self.mounted.set_visible(visible)
    }

    pub fn activate(&self) -> std::result::Result<(), JsError> {
        self.mounted.activate()
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.mounted.resize(width, height);
    }

    pub fn teardown(&self) {
        self.mounted.teardown();
    }
}

/// Volumetric hero background.
#[wasm_bindgen]
pub struct HeroBackground {
    mounted: Mounted<NebulaScene>,
}

#[wasm_bindgen]
impl HeroBackground {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> std::result::Result<HeroBackground, JsError> {
        let config = match config {
            Some(json) => NebulaConfig::from_json(&json)?,
            None => NebulaConfig::default(),
        };
        let scene = NebulaScene::new(config)?;
        Ok(Self { mounted: Mounted::new(canvas, scene)? })
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, visible: bool) -> std::result::Result<(), JsError> {
        self.mounted.set_visible(visible)
    }

    pub fn activate(&self) -> std::result::Result<(), JsError> {
        self.mounted.activate()
    }

    /// Scroll progress in [0, 1], consumed on the next frame.
    #[wasm_bindgen(js_name = setScrollProgress)]
    pub fn set_scroll_progress(&self, progress: f32) {
        self.mounted.inner.borrow_mut().scene_mut().set_scroll_progress(progress);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.mounted.resize(width, height);
    }

    pub fn teardown(&self) {
        self.mounted.teardown();
    }
}
