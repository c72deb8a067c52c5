//! Frame timing and the fixed physics timestep.
//!
//! Provides a single source of truth for time-related values across the demo.
//! Rendering runs at whatever rate the display drives the event loop; physics
//! advances in fixed 1/60 s steps drained from an accumulator, so simulation
//! speed does not depend on the frame rate.
//!
//! # Example
//!
//! ```ignore
//! use holobox::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In the frame loop:
//! time.update();
//! for _ in 0..time.take_fixed_steps() {
//!     physics.step();
//! }
//! ```

use std::time::{Duration, Instant};

/// Physics timestep in seconds.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Upper bound on frame delta, so a stalled process (debugger, suspend)
/// does not dump seconds of simulation into one frame.
const MAX_DELTA: f32 = 0.25;

/// Most fixed steps drained per frame; any remainder past this is dropped.
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Time tracking for the frame loop.
///
/// Tracks elapsed time, per-frame delta, frame count, FPS, and the fixed-step
/// accumulator that paces the physics world.
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds, clamped to `MAX_DELTA`.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Unconsumed simulation time in seconds.
    accumulator: f32,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update the FPS calculation.
    fps_update_interval: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            accumulator: 0.0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw_delta.min(MAX_DELTA);
        self.last_frame = now;

        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;
        self.accumulator += self.delta_secs;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Drain the accumulator, returning how many fixed steps to simulate
    /// this frame.
    ///
    /// At most `MAX_STEPS_PER_FRAME` steps are returned per call; time past
    /// that is discarded rather than snowballing into ever-longer frames.
    pub fn take_fixed_steps(&mut self) -> u32 {
        let steps = (self.accumulator / FIXED_DT) as u32;
        if steps > MAX_STEPS_PER_FRAME {
            self.accumulator = 0.0;
            return MAX_STEPS_PER_FRAME;
        }
        self.accumulator -= steps as f32 * FIXED_DT;
        steps
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.delta(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_fixed_steps_drain_accumulator() {
        let mut time = Time::new();
        time.accumulator = FIXED_DT * 2.5;

        assert_eq!(time.take_fixed_steps(), 2);
        // Half a step of time remains for the next frame.
        assert!((time.accumulator - FIXED_DT * 0.5).abs() < 1e-6);
        assert_eq!(time.take_fixed_steps(), 0);
    }

    #[test]
    fn test_fixed_steps_capped_after_stall() {
        let mut time = Time::new();
        time.accumulator = 10.0;

        assert_eq!(time.take_fixed_steps(), MAX_STEPS_PER_FRAME);
        // Excess time is dropped, not carried over.
        assert_eq!(time.take_fixed_steps(), 0);
    }

    #[test]
    fn test_delta_clamped() {
        let mut time = Time::new();
        time.last_frame = Instant::now() - Duration::from_secs(5);
        let (_, delta) = time.update();
        assert!(delta <= MAX_DELTA + 1e-6);
    }
}
