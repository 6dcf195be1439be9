// Frame timing
//
// The host's main loop advances one `FrameClock` per process, once per
// frame. Everything that renders within that frame sees the same
// `FrameTimestamp`, which is what per-frame caches key on.

use std::fmt;
use std::time::{Duration, Instant};

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Milliseconds since the clock started, distinct for every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTimestamp(i64);

impl FrameTimestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for FrameTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Process-wide frame clock
pub struct FrameClock {
    /// Time when the clock started
    start_time: Instant,

    /// Time of last frame
    last_frame_time: Instant,

    /// Timestamp of the current frame
    now: FrameTimestamp,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame_time: now,
            now: FrameTimestamp::default(),
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame and return its timestamp.
    ///
    /// Two frames never share a timestamp, even when they start within the
    /// same millisecond.
    pub fn begin_frame(&mut self) -> FrameTimestamp {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        let elapsed = now.duration_since(self.start_time).as_millis() as i64;
        self.advance_to(elapsed, frame_time)
    }

    /// Begin a new frame at an explicit time, for hosts that drive their own
    /// clock (replays, tests).
    pub fn begin_frame_at(&mut self, millis: i64) -> FrameTimestamp {
        let delta = millis.saturating_sub(self.now.0).max(0) as u64;
        self.advance_to(millis, Duration::from_millis(delta))
    }

    fn advance_to(&mut self, millis: i64, frame_time: Duration) -> FrameTimestamp {
        self.frame_count += 1;

        let floor = if self.frame_count == 1 { 0 } else { self.now.0 + 1 };
        self.now = FrameTimestamp(millis.max(floor));

        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        self.now
    }

    /// Timestamp of the current frame
    pub fn now(&self) -> FrameTimestamp {
        self.now
    }

    /// Get total number of frames begun
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_creation() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.now(), FrameTimestamp::from_millis(0));
    }

    #[test]
    fn test_frame_counting() {
        let mut clock = FrameClock::new();
        clock.begin_frame();
        assert_eq!(clock.frame_count(), 1);
        clock.begin_frame();
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_back_to_back_frames_are_distinct() {
        let mut clock = FrameClock::new();
        let first = clock.begin_frame();
        let second = clock.begin_frame();
        let third = clock.begin_frame();
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn test_timestamp_tracks_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.begin_frame();
        thread::sleep(Duration::from_millis(20));
        let now = clock.begin_frame();
        assert!(now.as_millis() >= 20);
    }

    #[test]
    fn test_explicit_frame_times() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.begin_frame_at(100), FrameTimestamp::from_millis(100));
        assert_eq!(clock.begin_frame_at(116), FrameTimestamp::from_millis(116));
        // Time going backwards still yields a fresh timestamp
        assert_eq!(clock.begin_frame_at(50), FrameTimestamp::from_millis(117));
    }

    #[test]
    fn test_fps_updates_every_ten_frames() {
        let mut clock = FrameClock::new();
        for i in 1..=10 {
            clock.begin_frame_at(i * 10);
        }
        assert!((clock.fps() - 100.0).abs() < 0.01);
    }
}
