// host.rs - Headless stand-ins for the browser frame clock and canvas

use constellation_engine::{FrameHandle, FrameScheduler, Presenter, Result, Surface};

/// Hands out sequential frame ids. The driver fires them itself.
#[derive(Default)]
pub struct ImmediateScheduler {
    next: i32,
}

impl FrameScheduler for ImmediateScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next += 1;
        Some(FrameHandle(self.next))
    }

    // Nothing fires unless the driver fires it
    fn cancel_frame(&mut self, _handle: FrameHandle) {}
}

/// Keeps a copy of the last presented frame.
pub struct BufferPresenter {
    extent: (u32, u32),
    pub frame: Vec<u8>,
    pub presented: u64,
}

impl BufferPresenter {
    pub fn new(w: u32, h: u32) -> Self {
        Self { extent: (w, h), frame: Vec::new(), presented: 0 }
    }
}

impl Presenter for BufferPresenter {
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn extent(&self) -> (u32, u32) {
        self.extent
    }

    fn present(&mut self, surface: &Surface) {
        self.frame.clear();
        self.frame.extend_from_slice(surface.as_bytes());
        self.presented += 1;
    }
}
