//! Gesture classification: one hand's landmarks to a discrete symbol, and
//! two hands' symbols to one combined gesture.

use crate::landmarks::{HandLandmarks, FINGER_TIPS, INDEX_TIP, THUMB_TIP};

/// Thumb-tip to index-tip planar distance below which a hand pinches.
pub const PINCH_THRESHOLD: f32 = 0.06;

/// Inter-hand planar distance (world units) below which two fists are "close".
pub const HANDS_CLOSE_DISTANCE: f32 = 350.0;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// A single hand's pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    /// Zero or one counted finger up.
    Fist,
    /// Open palm.  Not produced by [`classify`], which tops out at four
    /// counted fingers.
    Open,
    TwoFingers,
    ThreeFingers,
    FourFingers,
    /// Thumb tip touching the index tip; pre-empts finger counting.
    Pinch,
    /// Single pointing finger.  Not produced by [`classify`].
    Point,
}

impl Gesture {
    /// On-screen caption.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None         => "show your hands",
            Gesture::Fist         => "fist - attract",
            Gesture::Open         => "open - repel",
            Gesture::TwoFingers   => "2 fingers - waves",
            Gesture::ThreeFingers => "3 fingers - text",
            Gesture::FourFingers  => "4 fingers - explode",
            Gesture::Pinch        => "pinch - draw",
            Gesture::Point        => "point - beam",
        }
    }
}

/// Classify one hand.
///
/// Pinch is checked first; otherwise the index, middle, ring and pinky
/// fingers count as up when the tip sits above (smaller `y`) its knuckle.
pub fn classify(hand: &HandLandmarks) -> Gesture {
    let pinch = hand.point(THUMB_TIP).planar_distance(hand.point(INDEX_TIP));
    if pinch < PINCH_THRESHOLD {
        return Gesture::Pinch;
    }

    let up = FINGER_TIPS
        .iter()
        .filter(|&&(tip, mcp)| hand.point(tip).y < hand.point(mcp).y)
        .count();

    match up {
        0 | 1 => Gesture::Fist,
        2     => Gesture::TwoFingers,
        3     => Gesture::ThreeFingers,
        _     => Gesture::FourFingers,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CombinedGesture
// ════════════════════════════════════════════════════════════════════════════

/// Both hands taken together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CombinedGesture {
    #[default]
    None,
    /// One hand's gesture stands for the pair.  Never wraps `Gesture::None`.
    Single(Gesture),
    BothOpen,
    HandsClose,
    HandsFar,
}

impl CombinedGesture {
    fn from_single(g: Gesture) -> Self {
        match g {
            Gesture::None => CombinedGesture::None,
            g             => CombinedGesture::Single(g),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CombinedGesture::None       => Gesture::None.label(),
            CombinedGesture::Single(g)  => g.label(),
            CombinedGesture::BothOpen   => "both open - explode",
            CombinedGesture::HandsClose => "fists close - gather",
            CombinedGesture::HandsFar   => "hands apart - spread",
        }
    }
}

/// Combine two hands' gestures.
///
/// `distance` is only consulted when both hands are present and both fists.
/// With two hands and mismatched gestures, the first non-`None` wins.
pub fn combine(
    g0: Gesture, present0: bool,
    g1: Gesture, present1: bool,
    distance: f32,
) -> CombinedGesture {
    if present0 && present1 {
        match (g0, g1) {
            (Gesture::Open, Gesture::Open) => return CombinedGesture::BothOpen,
            (Gesture::Fist, Gesture::Fist) => {
                return if distance < HANDS_CLOSE_DISTANCE {
                    CombinedGesture::HandsClose
                } else {
                    CombinedGesture::HandsFar
                };
            }
            _ => {}
        }
        if g0 != Gesture::None { return CombinedGesture::Single(g0); }
        if g1 != Gesture::None { return CombinedGesture::Single(g1); }
    }

    if present0 { return CombinedGesture::from_single(g0); }
    if present1 { return CombinedGesture::from_single(g1); }
    CombinedGesture::None
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::landmarks::*;
    use proptest::prelude::*;
    use test_case::test_case;

    /// Upright hand centered at (cx, cy): knuckles at cy, extended tips 0.1
    /// above, curled tips 0.05 below.  Thumb parked well away from the index.
    pub(crate) fn posed(cx: f32, cy: f32, up: [bool; 4], pinch: bool) -> HandLandmarks {
        let mut p = [Landmark::new(cx, cy, 0.0); LANDMARK_COUNT];
        p[WRIST] = Landmark::new(cx, cy + 0.15, 0.0);
        for (f, &(tip, mcp)) in FINGER_TIPS.iter().enumerate() {
            let x = cx - 0.045 + f as f32 * 0.03;
            p[mcp] = Landmark::new(x, cy, 0.0);
            p[mcp + 1] = Landmark::new(x, cy - 0.03, 0.0);
            p[mcp + 2] = Landmark::new(x, cy - 0.06, 0.0);
            p[tip] = Landmark::new(x, if up[f] { cy - 0.1 } else { cy + 0.05 }, 0.0);
        }
        p[THUMB_CMC] = Landmark::new(cx + 0.06, cy + 0.1, 0.0);
        p[THUMB_MCP] = Landmark::new(cx + 0.09, cy + 0.07, 0.0);
        p[THUMB_IP]  = Landmark::new(cx + 0.11, cy + 0.04, 0.0);
        p[THUMB_TIP] = if pinch {
            p[INDEX_TIP]
        } else {
            Landmark::new(cx + 0.13, cy + 0.01, 0.0)
        };
        HandLandmarks::new(p)
    }

    #[test_case([false, false, false, false] => Gesture::Fist;         "no fingers")]
    #[test_case([true,  false, false, false] => Gesture::Fist;         "one finger")]
    #[test_case([true,  true,  false, false] => Gesture::TwoFingers;   "two fingers")]
    #[test_case([false, true,  false, true ] => Gesture::TwoFingers;   "any two fingers")]
    #[test_case([true,  true,  true,  false] => Gesture::ThreeFingers; "three fingers")]
    #[test_case([true,  true,  true,  true ] => Gesture::FourFingers;  "four fingers")]
    fn finger_count(up: [bool; 4]) -> Gesture {
        classify(&posed(0.5, 0.5, up, false))
    }

    #[test]
    fn open_hand_maps_to_four_fingers_consistently() {
        for i in 0..10 {
            let c = 0.3 + i as f32 * 0.04;
            assert_eq!(classify(&posed(c, c, [true; 4], false)), Gesture::FourFingers);
        }
    }

    #[test]
    fn pinch_boundary_is_strict() {
        let mut hand = posed(0.5, 0.5, [false; 4], false);
        let index = *hand.point(INDEX_TIP);
        hand.0[THUMB_TIP] = Landmark::new(index.x + 0.059, index.y, 0.0);
        assert_eq!(classify(&hand), Gesture::Pinch);
        hand.0[THUMB_TIP] = Landmark::new(index.x + 0.0601, index.y, 0.0);
        assert_eq!(classify(&hand), Gesture::Fist);
    }

    #[test]
    fn pinch_ignores_depth() {
        let mut hand = posed(0.5, 0.5, [true; 4], true);
        hand.0[THUMB_TIP].z = 5.0;
        assert_eq!(classify(&hand), Gesture::Pinch);
    }

    proptest! {
        #[test]
        fn pinch_preempts_finger_count(
            up in prop::array::uniform4(any::<bool>()),
            dx in -0.04f32..0.04,
            dy in -0.04f32..0.04,
        ) {
            let mut hand = posed(0.5, 0.5, up, false);
            let index = *hand.point(INDEX_TIP);
            hand.0[THUMB_TIP] = Landmark::new(index.x + dx, index.y + dy, 0.3);
            prop_assert_eq!(classify(&hand), Gesture::Pinch);
        }
    }

    #[test_case(349.0 => CombinedGesture::HandsClose; "just inside")]
    #[test_case(350.0 => CombinedGesture::HandsFar;   "boundary is far")]
    #[test_case(351.0 => CombinedGesture::HandsFar;   "just outside")]
    fn two_fists_by_distance(d: f32) -> CombinedGesture {
        combine(Gesture::Fist, true, Gesture::Fist, true, d)
    }

    #[test]
    fn both_open() {
        assert_eq!(
            combine(Gesture::Open, true, Gesture::Open, true, 10.0),
            CombinedGesture::BothOpen
        );
    }

    #[test]
    fn mismatched_pair_prefers_first_hand() {
        assert_eq!(
            combine(Gesture::Pinch, true, Gesture::TwoFingers, true, 0.0),
            CombinedGesture::Single(Gesture::Pinch)
        );
        assert_eq!(
            combine(Gesture::None, true, Gesture::TwoFingers, true, 0.0),
            CombinedGesture::Single(Gesture::TwoFingers)
        );
    }

    #[test]
    fn single_hand_reports_its_gesture() {
        assert_eq!(
            combine(Gesture::None, false, Gesture::ThreeFingers, true, 0.0),
            CombinedGesture::Single(Gesture::ThreeFingers)
        );
        assert_eq!(
            combine(Gesture::Fist, true, Gesture::None, false, 0.0),
            CombinedGesture::Single(Gesture::Fist)
        );
    }

    #[test]
    fn fists_with_one_hand_missing_are_not_combined() {
        assert_eq!(
            combine(Gesture::Fist, true, Gesture::Fist, false, 0.0),
            CombinedGesture::Single(Gesture::Fist)
        );
    }

    #[test]
    fn no_hands_is_none() {
        assert_eq!(
            combine(Gesture::Fist, false, Gesture::Open, false, 0.0),
            CombinedGesture::None
        );
        assert_eq!(
            combine(Gesture::None, true, Gesture::None, true, 0.0),
            CombinedGesture::None
        );
    }
}
