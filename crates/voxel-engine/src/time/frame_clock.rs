use std::time::{Duration, Instant};

/// Number of recent frame deltas averaged by [`FrameClock::fps`].
const FPS_WINDOW: usize = 10;

/// Frame timing snapshot handed to collaborators.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Time elapsed between the two most recent ticks, in seconds.
    pub dt: f32,

    /// Time elapsed since the clock's start instant, in seconds.
    pub elapsed: f32,

    /// Number of ticks so far.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta and elapsed time start at zero and are recomputed on every `tick()`.
/// The clock also keeps a short history of deltas for a smoothed frame-rate
/// estimate, and can optionally cap the frame rate by sleeping inside `tick()`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_index: u64,

    recent: [Duration; FPS_WINDOW],
    recent_len: usize,
    recent_pos: usize,

    min_frame: Option<Duration>,
}

impl FrameClock {
    /// Creates a clock whose elapsed time is measured from now.
    pub fn new() -> Self {
        Self::since(Instant::now())
    }

    /// Creates a clock whose elapsed time is measured from `start`.
    ///
    /// The first delta is measured from the moment of construction.
    pub fn since(start: Instant) -> Self {
        Self {
            start,
            last: Instant::now().max(start),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_index: 0,
            recent: [Duration::ZERO; FPS_WINDOW],
            recent_len: 0,
            recent_pos: 0,
            min_frame: None,
        }
    }

    /// Caps the frame rate at `max_fps`. `None` or `Some(0)` leaves it uncapped.
    pub fn with_max_fps(mut self, max_fps: Option<u32>) -> Self {
        self.min_frame = max_fps
            .filter(|fps| *fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64));
        self
    }

    /// Advances the clock and returns a new `FrameTime`.
    ///
    /// With a frame cap configured, sleeps until the minimum frame duration has
    /// passed since the previous tick. This is the only blocking point of the
    /// frame loop.
    pub fn tick(&mut self) -> FrameTime {
        if let Some(min_frame) = self.min_frame {
            let spent = self.last.elapsed();
            if spent < min_frame {
                std::thread::sleep(min_frame - spent);
            }
        }
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> FrameTime {
        self.delta = now.saturating_duration_since(self.last);
        self.elapsed = now.saturating_duration_since(self.start);
        self.last = now;

        self.recent[self.recent_pos] = self.delta;
        self.recent_pos = (self.recent_pos + 1) % FPS_WINDOW;
        self.recent_len = (self.recent_len + 1).min(FPS_WINDOW);

        self.frame_index = self.frame_index.wrapping_add(1);

        self.snapshot()
    }

    /// Returns the timing state as of the most recent tick.
    pub fn snapshot(&self) -> FrameTime {
        FrameTime {
            dt: self.delta.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            frame_index: self.frame_index,
        }
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Frames per second averaged over the last few ticks; `0.0` before the
    /// first tick.
    pub fn fps(&self) -> f32 {
        if self.recent_len == 0 {
            return 0.0;
        }

        let total: Duration = self.recent[..self.recent_len].iter().sum();
        if total.is_zero() {
            return 0.0;
        }

        self.recent_len as f32 / total.as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
