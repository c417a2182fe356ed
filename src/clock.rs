// clock.rs - Per-instance animation clock
//
// Driven by host timestamps in milliseconds (requestAnimationFrame's
// argument on the web). The first tick after a reset becomes the origin, so
// the clock never mixes time bases between activation and the first frame.

#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    origin: Option<f64>,
    elapsed: f32,
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a host timestamp, returning elapsed seconds since the first tick.
    /// Never runs backwards, even if the host timestamp does.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        self.frame += 1;
        if self.origin.is_none() && now_ms.is_finite() {
            self.origin = Some(now_ms);
        }
        if let Some(origin) = self.origin {
            let secs = ((now_ms - origin) / 1000.0) as f32;
            if secs.is_finite() && secs > self.elapsed {
                self.elapsed = secs;
            }
        }
        self.elapsed
    }

    #[inline]
    pub fn elapsed(&self) -> f32 { self.elapsed }
    #[inline]
    pub fn frame(&self) -> u64 { self.frame }
}
