//! The pinch-drawn "ink" trail particles flow toward.
//!
//! A bounded FIFO of timestamped points.  Grows while a pinch is held and
//! the hand keeps moving; shrinks one point per frame once the pinch ends.

use std::collections::VecDeque;

use glam::Vec3;

pub const TRAIL_CAPACITY: usize = 500;

/// Minimum per-axis movement (world units) before a new point is recorded.
pub const TRAIL_MIN_MOVE: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    /// Simulation time at which the point was recorded.
    pub time:     f32,
}

#[derive(Clone, Debug)]
pub struct DrawingTrail {
    points:   VecDeque<TrailPoint>,
    last:     Option<Vec3>,
    drawing:  bool,
    capacity: usize,
}

impl Default for DrawingTrail {
    fn default() -> Self {
        Self::with_capacity(TRAIL_CAPACITY)
    }
}

impl DrawingTrail {
    pub fn with_capacity(capacity: usize) -> Self {
        DrawingTrail {
            points:   VecDeque::with_capacity(capacity + 1),
            last:     None,
            drawing:  false,
            capacity,
        }
    }

    /// Record the pinching hand's position for this frame.
    ///
    /// The first point of a stroke is always kept; after that, only moves of
    /// more than [`TRAIL_MIN_MOVE`] along x or y.  Returns true if a point was
    /// appended.
    pub fn record(&mut self, position: Vec3, time: f32) -> bool {
        let moved = match self.last {
            Some(last) if self.drawing => {
                (position.x - last.x).abs() > TRAIL_MIN_MOVE
                    || (position.y - last.y).abs() > TRAIL_MIN_MOVE
            }
            _ => true,
        };
        if moved {
            self.points.push_back(TrailPoint { position, time });
            self.last = Some(position);
            self.drawing = true;
        }
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        moved
    }

    /// Called on frames without a pinch: ends the stroke and drops the
    /// oldest point.
    pub fn fade(&mut self) {
        self.drawing = false;
        self.points.pop_front();
    }

    /// Target for particle `index`; particles wrap around the trail.
    pub fn point_for(&self, index: usize) -> Option<&TrailPoint> {
        if self.points.is_empty() {
            return None;
        }
        self.points.get(index % self.points.len())
    }

    pub fn len(&self)        -> usize { self.points.len() }
    pub fn is_empty(&self)   -> bool  { self.points.is_empty() }
    pub fn is_drawing(&self) -> bool  { self.drawing }
    pub fn capacity(&self)   -> usize { self.capacity }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(x: f32, y: f32) -> Vec3 { Vec3::new(x, y, 0.0) }

    #[test]
    fn first_point_always_recorded() {
        let mut t = DrawingTrail::default();
        assert!(t.record(at(0.0, 0.0), 0.0));
        assert_eq!(t.len(), 1);
        assert!(t.is_drawing());
    }

    #[test]
    fn small_moves_ignored_while_drawing() {
        let mut t = DrawingTrail::default();
        t.record(at(0.0, 0.0), 0.0);
        assert!(!t.record(at(4.0, -5.0), 0.1));
        assert!(t.record(at(5.5, 0.0), 0.2));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn new_stroke_records_even_without_moving() {
        let mut t = DrawingTrail::default();
        t.record(at(0.0, 0.0), 0.0);
        t.record(at(10.0, 0.0), 0.0);
        t.fade();
        assert!(t.record(at(10.0, 0.0), 1.0));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn fade_removes_one_point_per_frame() {
        let mut t = DrawingTrail::default();
        for i in 0..20 { t.record(at(i as f32 * 10.0, 0.0), 0.0); }
        for expected in (0..20).rev() {
            t.fade();
            assert_eq!(t.len(), expected);
        }
        t.fade();
        assert!(t.is_empty());
    }

    #[test]
    fn point_for_wraps() {
        let mut t = DrawingTrail::default();
        assert!(t.point_for(3).is_none());
        for i in 0..3 { t.record(at(i as f32 * 10.0, 0.0), 0.0); }
        assert_eq!(t.point_for(4).unwrap().position, at(10.0, 0.0));
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut t = DrawingTrail::default();
        for i in 0..(TRAIL_CAPACITY + 50) {
            t.record(at(i as f32 * 6.0, 0.0), i as f32);
        }
        assert_eq!(t.len(), TRAIL_CAPACITY);
        assert_eq!(t.iter().next().unwrap().time, 50.0);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(steps in prop::collection::vec((-50f32..50.0, -50f32..50.0, any::<bool>()), 0..1500)) {
            let mut t = DrawingTrail::default();
            let mut pos = Vec3::ZERO;
            for (dx, dy, pinching) in steps {
                pos += Vec3::new(dx, dy, 0.0);
                if pinching { t.record(pos, 0.0); } else { t.fade(); }
                prop_assert!(t.len() <= TRAIL_CAPACITY);
            }
        }
    }
}
