//! Rate limiting for landmark inference.
//!
//! Inference runs at its own rate, decoupled from rendering.  A cycle only
//! starts when the interval has elapsed *and* the previous cycle has
//! finished; otherwise it is dropped, never queued.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DetectionThrottle {
    interval: Duration,
    last:     Option<Instant>,
    busy:     bool,
    active:   bool,
    dropped:  u64,
}

impl DetectionThrottle {
    /// Throttle to `fps` detections per second.  Starts inactive.
    pub fn new(fps: f32) -> Self {
        DetectionThrottle {
            interval: Duration::from_secs_f32(1.0 / fps.max(f32::EPSILON)),
            last:     None,
            busy:     false,
            active:   false,
            dropped:  0,
        }
    }

    /// Global tracking switch.  Turning it off does not cancel an in-flight
    /// cycle; it only stops new ones.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool { self.active }
    pub fn is_busy(&self)   -> bool { self.busy }
    pub fn interval(&self)  -> Duration { self.interval }
    /// Cycles that were due but skipped because the previous one was busy.
    pub fn dropped(&self)   -> u64 { self.dropped }

    /// Returns true if a detection should start now, marking it in flight.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        let due = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None       => true,
        };
        if !due {
            return false;
        }
        if self.busy {
            self.dropped += 1;
            log::trace!("detection cycle dropped (previous still running)");
            return false;
        }
        self.last = Some(now);
        self.busy = true;
        true
    }

    /// Mark the in-flight detection as complete.
    pub fn finish(&mut self) {
        self.busy = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
