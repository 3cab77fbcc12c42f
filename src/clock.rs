//! Frame timing clock
//!
//! Tracks per-frame timing for a device: delta time, frame count,
//! instantaneous and averaged frame rates, and an optional frame rate
//! cap. The clock only advances when the device presents a frame to the
//! window; rendering to an off-screen canvas never ticks it.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Default number of samples used for the average frame rate
const DEFAULT_AVG_SAMPLES: usize = 120;

/// A frame timing clock
///
/// All methods take `&self`; the clock is safe to read from any thread
/// while the render thread ticks it.
pub struct Clock {
    state: Mutex<ClockState>,
}

struct ClockState {
    last_tick: Option<Instant>,
    delta: Duration,
    frame_count: u64,
    samples: VecDeque<Duration>,
    avg_samples: usize,
    max_frame_rate: f64,
}

impl Clock {
    /// Create a new clock with no frames ticked yet
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClockState {
                last_tick: None,
                delta: Duration::ZERO,
                frame_count: 0,
                samples: VecDeque::with_capacity(DEFAULT_AVG_SAMPLES),
                avg_samples: DEFAULT_AVG_SAMPLES,
                max_frame_rate: 0.0,
            }),
        }
    }

    /// Mark the end of a frame
    ///
    /// Updates the delta time and frame counter. When a maximum frame
    /// rate is set and the frame finished early, this sleeps off the
    /// remaining time before recording the delta.
    pub fn tick(&self) {
        // The pacing sleep happens with the lock released; readers on
        // other threads must not stall behind the frame cap.
        let remaining = {
            let s = self.state.lock().unwrap();
            match s.last_tick {
                Some(last) if s.max_frame_rate > 0.0 => {
                    let target = Duration::from_secs_f64(1.0 / s.max_frame_rate);
                    target.saturating_sub(last.elapsed())
                }
                _ => Duration::ZERO,
            }
        };
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        let mut s = self.state.lock().unwrap();
        if let Some(last) = s.last_tick {
            let delta = last.elapsed();
            s.delta = delta;
            if s.samples.len() >= s.avg_samples {
                s.samples.pop_front();
            }
            s.samples.push_back(delta);
            s.last_tick = Some(last + delta);
        } else {
            s.last_tick = Some(Instant::now());
        }
        s.frame_count += 1;
    }

    /// Duration of the last completed frame
    pub fn delta(&self) -> Duration {
        self.state.lock().unwrap().delta
    }

    /// Total number of frames ticked
    pub fn frame_count(&self) -> u64 {
        self.state.lock().unwrap().frame_count
    }

    /// Instantaneous frame rate in frames per second
    ///
    /// Returns 0 before the second tick, and 0 again once the time since
    /// the last tick dwarfs the recorded delta (a stalled renderer must
    /// not report its old frame rate as current).
    pub fn frame_rate(&self) -> f64 {
        let s = self.state.lock().unwrap();
        let last = match s.last_tick {
            Some(last) => last,
            None => return 0.0,
        };
        if s.delta.is_zero() {
            return 0.0;
        }
        let since = last.elapsed();
        if since > s.delta * 2 && since > Duration::from_millis(250) {
            return 0.0;
        }
        1.0 / s.delta.as_secs_f64()
    }

    /// Frame rate averaged over the last `avg_samples()` frames
    pub fn avg_frame_rate(&self) -> f64 {
        let s = self.state.lock().unwrap();
        if s.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = s
            .samples
            .iter()
            .filter(|d| !d.is_zero())
            .map(|d| 1.0 / d.as_secs_f64())
            .sum();
        sum / s.samples.len() as f64
    }

    /// Number of samples the average frame rate is computed over
    pub fn avg_samples(&self) -> usize {
        self.state.lock().unwrap().avg_samples
    }

    /// Set the number of samples for the average frame rate
    pub fn set_avg_samples(&self, samples: usize) {
        let mut s = self.state.lock().unwrap();
        s.avg_samples = samples.max(1);
        while s.samples.len() > s.avg_samples {
            s.samples.pop_front();
        }
    }

    /// Maximum frame rate cap, 0 means uncapped
    pub fn max_frame_rate(&self) -> f64 {
        self.state.lock().unwrap().max_frame_rate
    }

    /// Cap the frame rate; `tick()` sleeps to enforce it
    pub fn set_max_frame_rate(&self, rate: f64) {
        self.state.lock().unwrap().max_frame_rate = rate.max(0.0);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
