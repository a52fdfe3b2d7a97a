//! Frame clock with a variable timestep

use std::time::Instant;

/// Where frame durations come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSource {
    /// Measured wall-clock time
    Wall,
    /// Every frame lasts exactly this many seconds (headless runs, tests)
    Simulated(f32),
}

/// Tracks how long the previous frame took to render.
///
/// `delta` is the raw measured time between `start_frame` and `end_frame` of
/// the last completed frame. It is neither clamped nor accumulated into
/// fixed steps.
pub struct FrameClock {
    source: TimeSource,
    /// Duration of the previous frame in seconds
    delta: f32,
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Completed frames
    pub frame_count: u64,
    /// Start of the frame in progress
    frame_start: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TimeSource::Wall)
    }
}

impl FrameClock {
    pub fn new(source: TimeSource) -> Self {
        Self {
            source,
            delta: 0.0,
            total_time: 0.0,
            frame_count: 0,
            frame_start: Instant::now(),
        }
    }

    /// Fixed-duration clock
    pub fn simulated(frame_seconds: f32) -> Self {
        Self::new(TimeSource::Simulated(frame_seconds))
    }

    /// Mark the beginning of a frame.
    ///
    /// Until the first frame ends the delta is 0.
    pub fn start_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Mark the end of a frame and measure its duration
    pub fn end_frame(&mut self) {
        self.delta = match self.source {
            TimeSource::Wall => self.frame_start.elapsed().as_secs_f32(),
            TimeSource::Simulated(seconds) => seconds,
        };
        self.total_time += self.delta as f64;
        self.frame_count += 1;
        log::trace!("frame {} took {:.4}s", self.frame_count, self.delta);
    }

    /// Duration of the previous frame in seconds
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn source(&self) -> TimeSource {
        self.source
    }
}
