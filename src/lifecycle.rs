// lifecycle.rs - Surface lifecycle controller
//
//   Idle --activate--> Sizing --field ready--> Running --teardown--> Stopped
//                        ^                        |
//                        +--------resize----------+
//
// Exactly one frame is pending at a time. Resize cancels it before
// regenerating and schedules a fresh one; teardown cancels it for good.
// A refused frame request parks the engine in Sizing until the next resize.
// Stopped is terminal.

use log::{debug, error, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::render::Surface;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Sizing,
    Running,
    Stopped,
}

/// Host token for one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Schedules one callback per display refresh.
pub trait FrameScheduler {
    /// Request the next frame. `None` means the host refused.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    /// Revoke a pending request so its callback never runs.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// The host drawing surface the rendered buffer is shown on.
pub trait Presenter {
    /// Bind a drawable context. Fails with `MissingDrawingContext`.
    fn acquire(&mut self) -> Result<()>;
    /// Current extent in surface pixels.
    fn extent(&self) -> (u32, u32);
    fn present(&mut self, surface: &Surface);
}

/// Turns repeated visibility reports into a single "became visible" edge.
/// Later visibility loss does not pause the loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivationGate {
    fired: bool,
}

impl ActivationGate {
    /// True exactly once, on the first visible report.
    pub fn observe(&mut self, visible: bool) -> bool {
        if visible && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn has_fired(&self) -> bool { self.fired }
}

pub struct Controller<S, F, P> {
    state: State,
    scene: S,
    scheduler: F,
    presenter: P,
    surface: Surface,
    clock: Option<Clock>,
    pending: Option<FrameHandle>,
}

impl<S: Scene, F: FrameScheduler, P: Presenter> Controller<S, F, P> {
    pub fn new(scene: S, scheduler: F, presenter: P) -> Self {
        Self {
            state: State::Idle,
            scene,
            scheduler,
            presenter,
            surface: Surface::new(0, 0),
            clock: None,
            pending: None,
        }
    }

    /// Start the engine. Without a drawing context it stays Idle and the
    /// error is returned for the embedder to surface.
    pub fn activate(&mut self) -> Result<()> {
        if self.state != State::Idle {
            debug!("activate ignored in {:?}", self.state);
            return Ok(());
        }

        if let Err(e) = self.presenter.acquire() {
            error!("engine stays idle: {e}");
            return Err(e);
        }

        self.state = State::Sizing;
        let (w, h) = self.presenter.extent();
        self.size(w, h);
        self.clock = Some(Clock::new());
        self.start();
        info!("engine running at {w}x{h}");
        Ok(())
    }

    /// Regenerate for a new extent. Only meaningful once activated.
    pub fn resize(&mut self, w: u32, h: u32) {
        if !matches!(self.state, State::Running | State::Sizing) {
            debug!("resize to {w}x{h} ignored in {:?}", self.state);
            return;
        }

        self.cancel_pending();
        self.state = State::Sizing;
        self.size(w, h);
        self.start();
        debug!("resized to {w}x{h}");
    }

    /// Frame callback. Runs the frame only if `handle` is the pending one,
    /// so revoked or stale callbacks are inert. Returns whether it ran.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> bool {
        if self.state != State::Running || self.pending != Some(handle) {
            return false;
        }
        self.pending = None;

        let t = self.clock.as_mut().map_or(0.0, |c| c.tick(now_ms));
        self.scene.frame(t, &mut self.surface);
        self.presenter.present(&self.surface);
        self.schedule();
        true
    }

    /// Cancel the pending frame and release the clock. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == State::Stopped {
            return;
        }
        self.cancel_pending();
        match self.clock.take() {
            Some(clock) => info!("engine stopped after {} frames", clock.frame()),
            None => info!("engine stopped"),
        }
        self.state = State::Stopped;
    }

    fn size(&mut self, w: u32, h: u32) {
        self.surface.resize(w, h);
        self.scene.regenerate(w, h);
    }

    fn start(&mut self) {
        self.state = State::Running;
        self.schedule();
    }

    /// Without a pending frame the engine is not Running. It parks in
    /// Sizing so the next resize retries.
    fn schedule(&mut self) {
        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            error!("host refused to schedule a frame, waiting for resize");
            self.state = State::Sizing;
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    pub fn state(&self) -> State { self.state }
    pub fn pending(&self) -> Option<FrameHandle> { self.pending }
    pub fn clock(&self) -> Option<&Clock> { self.clock.as_ref() }
    pub fn surface(&self) -> &Surface { &self.surface }
    pub fn scene(&self) -> &S { &self.scene }
    pub fn scene_mut(&mut self) -> &mut S { &mut self.scene }
    pub fn scheduler(&self) -> &F { &self.scheduler }
    pub fn scheduler_mut(&mut self) -> &mut F { &mut self.scheduler }
    pub fn presenter(&self) -> &P { &self.presenter }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[derive(Default)]
    struct Frames {
        next: i32,
        live: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
        refuse: bool,
    }

    impl FrameScheduler for Frames {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refuse { return None; }
            self.next += 1;
            let h = FrameHandle(self.next);
            self.live.push(h);
            Some(h)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.live.retain(|&h| h != handle);
            self.cancelled.push(handle);
        }
    }

    struct Canvas {
        extent: (u32, u32),
        has_context: bool,
        presented: usize,
    }

    impl Canvas {
        fn new(w: u32, h: u32) -> Self {
            Self { extent: (w, h), has_context: true, presented: 0 }
        }
    }

    impl Presenter for Canvas {
        fn acquire(&mut self) -> Result<()> {
            if self.has_context { Ok(()) } else { Err(EngineError::MissingDrawingContext("2d".into())) }
        }
        fn extent(&self) -> (u32, u32) { self.extent }
        fn present(&mut self, _surface: &Surface) { self.presented += 1; }
    }

    #[derive(Default)]
    struct Probe {
        sizes: Vec<(u32, u32)>,
        times: Vec<f32>,
    }

    impl Scene for Probe {
        fn regenerate(&mut self, w: u32, h: u32) { self.sizes.push((w, h)); }
        fn frame(&mut self, t: f32, _surface: &mut Surface) { self.times.push(t); }
    }

    fn controller() -> Controller<Probe, Frames, Canvas> {
        Controller::new(Probe::default(), Frames::default(), Canvas::new(320, 200))
    }

    /// Fire whatever frame is pending, as the host would.
    fn pump(c: &mut Controller<Probe, Frames, Canvas>, now_ms: f64) -> bool {
        match c.pending() {
            Some(h) => {
                c.scheduler_mut().live.retain(|&x| x != h);
                c.on_frame(h, now_ms)
            }
            None => false,
        }
    }

    #[test]
    fn starts_idle_and_schedules_nothing() {
        let c = controller();
        assert_eq!(c.state(), State::Idle);
        assert!(c.scheduler().live.is_empty());
    }

    #[test]
    fn activate_sizes_then_runs() {
        let mut c = controller();
        c.activate().unwrap();
        assert_eq!(c.state(), State::Running);
        assert_eq!(c.scene().sizes, vec![(320, 200)]);
        assert_eq!((c.surface().width(), c.surface().height()), (320, 200));
        assert_eq!(c.scheduler().live.len(), 1);
    }

    #[test]
    fn missing_context_stays_idle() {
        let mut c = Controller::new(
            Probe::default(),
            Frames::default(),
            Canvas { has_context: false, ..Canvas::new(10, 10) },
        );
        assert!(matches!(c.activate(), Err(EngineError::MissingDrawingContext(_))));
        assert_eq!(c.state(), State::Idle);
        assert!(c.scheduler().live.is_empty());
        assert!(c.scene().sizes.is_empty());
    }

    #[test]
    fn frames_are_sequential_and_timed_from_first_tick() {
        let mut c = controller();
        c.activate().unwrap();
        assert!(pump(&mut c, 1_000.0));
        assert!(pump(&mut c, 1_016.0));
        assert!(pump(&mut c, 1_500.0));
        assert_eq!(c.scene().times.len(), 3);
        assert_eq!(c.scene().times[0], 0.0);
        assert!((c.scene().times[2] - 0.5).abs() < 1e-6);
        assert_eq!(c.presenter().presented, 3);
        assert_eq!(c.scheduler().live.len(), 1);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut c = controller();
        c.activate().unwrap();
        let first = c.pending().unwrap();
        assert!(c.on_frame(first, 0.0));
        assert!(!c.on_frame(first, 16.0));
        assert_eq!(c.scene().times.len(), 1);
    }

    #[test]
    fn resize_revokes_and_reschedules() {
        let mut c = controller();
        c.activate().unwrap();
        let before = c.pending().unwrap();
        c.resize(640, 480);

        assert_eq!(c.state(), State::Running);
        assert_eq!(c.scheduler().cancelled, vec![before]);
        assert!(!c.on_frame(before, 0.0));
        assert_ne!(c.pending(), Some(before));
        assert_eq!(c.scene().sizes, vec![(320, 200), (640, 480)]);
        assert!(pump(&mut c, 0.0));
    }

    #[test]
    fn resize_before_activation_is_ignored() {
        let mut c = controller();
        c.resize(10, 10);
        assert_eq!(c.state(), State::Idle);
        assert!(c.scene().sizes.is_empty());
    }

    #[test]
    fn teardown_is_idempotent_and_final() {
        let mut c = controller();
        c.activate().unwrap();
        pump(&mut c, 0.0);
        let pending = c.pending().unwrap();

        c.teardown();
        c.teardown();
        assert_eq!(c.state(), State::Stopped);
        assert!(c.clock().is_none());
        assert!(c.scheduler().live.is_empty());
        assert_eq!(c.scheduler().cancelled, vec![pending]);

        let frames = c.scene().times.len();
        assert!(!c.on_frame(pending, 100.0));
        c.resize(100, 100);
        c.activate().unwrap();
        assert_eq!(c.state(), State::Stopped);
        assert_eq!(c.scene().times.len(), frames);
        assert!(c.scheduler().live.is_empty());
    }

    #[test]
    fn teardown_from_idle() {
        let mut c = controller();
        c.teardown();
        assert_eq!(c.state(), State::Stopped);
        assert!(c.scheduler().cancelled.is_empty());
    }

    #[test]
    fn refused_schedule_leaves_nothing_pending() {
        let mut c = Controller::new(
            Probe::default(),
            Frames { refuse: true, ..Frames::default() },
            Canvas::new(8, 8),
        );
        c.activate().unwrap();
        assert_eq!(c.state(), State::Sizing);
        assert!(c.pending().is_none());

        c.scheduler_mut().refuse = false;
        c.resize(8, 8);
        assert_eq!(c.state(), State::Running);
        assert!(pump(&mut c, 0.0));
    }

    #[test]
    fn refusal_mid_run_stops_advertising_running() {
        let mut c = controller();
        c.activate().unwrap();
        c.scheduler_mut().refuse = true;
        let handle = c.pending().unwrap();
        assert!(c.on_frame(handle, 0.0));
        assert_eq!(c.state(), State::Sizing);
        assert!(c.pending().is_none());
    }

    #[test]
    fn gate_fires_once() {
        let mut gate = ActivationGate::default();
        assert!(!gate.observe(false));
        assert!(gate.observe(true));
        assert!(!gate.observe(true));
        assert!(!gate.observe(false));
        assert!(!gate.observe(true));
        assert!(gate.has_fired());
    }
}
