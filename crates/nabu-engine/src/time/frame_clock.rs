use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock was created or last reset. Not clamped.
    pub elapsed: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Produces one [`FrameTime`] per rendered frame.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// hand animation code a multi-second step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts the baseline. The frame counter keeps counting.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.origin = now;
        self.last = now;
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.origin).as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
