//! Per-hand observations and the two-hand tracker.
//!
//! The tracker is written once per completed inference result and read once
//! per render frame.  Smoothed positions survive a hand disappearing; the
//! gesture does not.

use glam::Vec3;

use crate::gesture::{classify, combine, CombinedGesture, Gesture};
use crate::landmarks::{to_world, HandLandmarks};

/// Hands tracked at once.
pub const MAX_HANDS: usize = 2;

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandObservation {
    /// `None` while the hand is not detected.
    pub landmarks: Option<HandLandmarks>,
    /// Exponentially smoothed palm position in world units.
    pub position:  Vec3,
    pub gesture:   Gesture,
}

impl HandObservation {
    /// A detected hand at a fixed world position.  Handy for driving the
    /// simulation without landmark geometry.
    pub fn present(position: Vec3, gesture: Gesture, landmarks: HandLandmarks) -> Self {
        HandObservation { landmarks: Some(landmarks), position, gesture }
    }

    pub fn is_present(&self) -> bool {
        self.landmarks.is_some()
    }

    fn observe(&mut self, hand: &HandLandmarks, smoothing: f32) {
        let target = to_world(&hand.palm_center());
        self.position += (target - self.position) * smoothing;
        self.gesture = classify(hand);
        self.landmarks = Some(*hand);
    }

    fn lose(&mut self) {
        self.landmarks = None;
        self.gesture = Gesture::None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct HandTracker {
    hands:     [HandObservation; MAX_HANDS],
    distance:  f32,
    combined:  CombinedGesture,
    smoothing: f32,
}

impl HandTracker {
    pub fn new(smoothing: f32) -> Self {
        HandTracker {
            hands:    Default::default(),
            distance: 0.0,
            combined: CombinedGesture::None,
            smoothing,
        }
    }

    /// Build a tracker from ready-made observations; the distance and the
    /// combined gesture are derived as if an inference result had arrived.
    pub fn from_observations(hands: [HandObservation; MAX_HANDS], smoothing: f32) -> Self {
        let mut t = HandTracker { hands, distance: 0.0, combined: CombinedGesture::None, smoothing };
        t.refresh();
        t
    }

    /// Apply one inference result: zero to two hands, extras ignored.
    pub fn apply(&mut self, detected: &[HandLandmarks]) {
        for (slot, hand) in self.hands.iter_mut().enumerate() {
            match detected.get(slot) {
                Some(lm) => hand.observe(lm, self.smoothing),
                None     => hand.lose(),
            }
        }
        if detected.len() > MAX_HANDS {
            log::trace!("ignoring {} extra hands", detected.len() - MAX_HANDS);
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        let [h0, h1] = &self.hands;
        if h0.is_present() && h1.is_present() {
            let d = h0.position - h1.position;
            self.distance = (d.x * d.x + d.y * d.y).sqrt();
        }
        let previous = self.combined;
        self.combined = combine(
            h0.gesture, h0.is_present(),
            h1.gesture, h1.is_present(),
            self.distance,
        );
        if previous != self.combined {
            log::debug!("combined gesture {:?} -> {:?}", previous, self.combined);
        }
    }

    pub fn hands(&self)    -> &[HandObservation; MAX_HANDS] { &self.hands }
    pub fn combined(&self) -> CombinedGesture                { self.combined }
    /// Planar distance between the hands at the last time both were seen.
    pub fn distance(&self) -> f32                            { self.distance }

    pub fn present_count(&self) -> usize {
        self.hands.iter().filter(|h| h.is_present()).count()
    }

    /// True when any hand currently shows `gesture`.
    pub fn any(&self, gesture: Gesture) -> bool {
        self.hands.iter().any(|h| h.gesture == gesture)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
