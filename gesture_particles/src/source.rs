//! Landmark sources: keyboard/mouse simulation and LeapMotion hardware.
//!
//! A source runs on its own thread.  The app talks to it with
//! [`SourceMsg`]s and gets [`HandFrame`]s back, one per `Detect` request.
//! Consumers don't need to know whether the landmarks came from real
//! hardware or from synthesized poses.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use particle_field::gesture::Gesture;
use particle_field::landmarks::*;

// ════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════

/// App → source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceMsg {
    /// Window input for the simulated hands.  Hardware sources ignore it.
    Input(SimInput),
    /// Run one inference and answer with a [`HandFrame`].
    Detect,
    Quit,
}

/// Source → app: the result of one inference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandFrame {
    /// Zero to two hands, in detection order.
    pub hands:   Vec<HandLandmarks>,
    pub latency: Duration,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

pub trait LandmarkSource: Send + 'static {
    fn name(&self) -> &'static str;
    fn run(self: Box<Self>, rx: Receiver<SourceMsg>, tx: Sender<HandFrame>);
}

/// Both ends of a running source.
pub struct SourceHandle {
    pub name: &'static str,
    pub tx:   Sender<SourceMsg>,
    pub rx:   Receiver<HandFrame>,
}

impl SourceHandle {
    /// False once the source thread has gone away.
    pub fn send(&self, msg: SourceMsg) -> bool {
        self.tx.send(msg).is_ok()
    }
}

/// Spawn a landmark source on its own thread.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> SourceHandle {
    let (msg_tx, msg_rx) = mpsc::channel();
    let (frame_tx, frame_rx) = mpsc::channel();
    let name = source.name();
    log::info!("starting {name} landmark source");
    thread::spawn(move || Box::new(source).run(msg_rx, frame_tx));
    SourceHandle { name, tx: msg_tx, rx: frame_rx }
}

// ════════════════════════════════════════════════════════════════════════════
// Simulated hands
// ════════════════════════════════════════════════════════════════════════════

/// Poses the keyboard can put a simulated hand into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    #[default]
    Hidden,
    Fist,
    TwoFingers,
    ThreeFingers,
    FourFingers,
    Pinch,
}

impl SimPose {
    /// What the classifier should read from the synthesized landmarks.
    pub fn gesture(self) -> Gesture {
        match self {
            SimPose::Hidden       => Gesture::None,
            SimPose::Fist         => Gesture::Fist,
            SimPose::TwoFingers   => Gesture::TwoFingers,
            SimPose::ThreeFingers => Gesture::ThreeFingers,
            SimPose::FourFingers  => Gesture::FourFingers,
            SimPose::Pinch        => Gesture::Pinch,
        }
    }

    fn fingers_up(self) -> [bool; 4] {
        match self {
            SimPose::TwoFingers   => [true, true, false, false],
            SimPose::ThreeFingers => [true, true, true, false],
            SimPose::FourFingers  => [true; 4],
            _                     => [false; 4],
        }
    }
}

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pose { hand: usize, pose: SimPose },
    /// Mouse position as a fraction of the window, `(0, 0)` top left.
    /// Hand 0 follows it; hand 1 mirrors it across the vertical center line.
    Pointer { x: f32, y: f32 },
}

/// The state behind the simulated camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHands {
    pub poses:   [SimPose; 2],
    pub pointer: (f32, f32),
}

impl Default for SimHands {
    fn default() -> Self {
        SimHands { poses: [SimPose::Hidden; 2], pointer: (0.3, 0.5) }
    }
}

impl SimHands {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pose { hand, pose } => {
                if let Some(slot) = self.poses.get_mut(hand) {
                    *slot = pose;
                }
            }
            SimInput::Pointer { x, y } => {
                self.pointer = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
            }
        }
    }

    /// Screen-space palm position of `hand` as a window fraction.
    pub fn screen_position(&self, hand: usize) -> (f32, f32) {
        let (x, y) = self.pointer;
        if hand == 0 { (x, y) } else { (1.0 - x, y) }
    }

    /// Landmarks for every visible hand.  The camera image is mirrored, so
    /// landmark `x` runs opposite to screen `x`.
    pub fn landmarks(&self) -> Vec<HandLandmarks> {
        self.poses
            .iter()
            .enumerate()
            .filter(|(_, &p)| p != SimPose::Hidden)
            .map(|(h, &p)| {
                let (sx, sy) = self.screen_position(h);
                synthesize(p, 1.0 - sx, sy)
            })
            .collect()
    }
}

/// Build a plausible upright hand around `(cx, cy)` in normalized image space.
pub fn synthesize(pose: SimPose, cx: f32, cy: f32) -> HandLandmarks {
    let up = pose.fingers_up();
    let mut p = [Landmark::new(cx, cy, 0.0); LANDMARK_COUNT];
    p[WRIST] = Landmark::new(cx, cy + 0.15, 0.0);

    for (f, &(tip, mcp)) in FINGER_TIPS.iter().enumerate() {
        let x = cx - 0.045 + f as f32 * 0.03;
        // Raised fingers fan out a little
        let fan = if up[f] { (f as f32 - 1.5) * 0.01 } else { 0.0 };
        p[mcp]     = Landmark::new(x, cy, 0.0);
        p[mcp + 1] = Landmark::new(x + fan * 0.4, if up[f] { cy - 0.04 } else { cy - 0.02 }, 0.0);
        p[mcp + 2] = Landmark::new(x + fan * 0.7, if up[f] { cy - 0.07 } else { cy + 0.01 }, -0.01);
        p[tip]     = Landmark::new(x + fan, if up[f] { cy - 0.1 } else { cy + 0.04 }, -0.02);
    }

    p[THUMB_CMC] = Landmark::new(cx + 0.05, cy + 0.11, 0.0);
    p[THUMB_MCP] = Landmark::new(cx + 0.08, cy + 0.07, 0.0);
    p[THUMB_IP]  = Landmark::new(cx + 0.1, cy + 0.035, 0.0);
    p[THUMB_TIP] = if pose == SimPose::Pinch {
        let index = p[INDEX_TIP];
        Landmark::new(index.x + 0.01, index.y + 0.01, index.z)
    } else {
        Landmark::new(cx + 0.12, cy + 0.0, 0.0)
    };

    HandLandmarks::new(p)
}

/// Landmark source driven by [`SimInput`] events from the visualizer.
#[derive(Clone, Debug, Default)]
pub struct SimLandmarkSource {
    pub hands:   SimHands,
    /// Pretend inference time; keeps the detection throttle honest.
    pub latency: Duration,
}

impl SimLandmarkSource {
    pub fn new(latency: Duration) -> Self {
        SimLandmarkSource { hands: SimHands::default(), latency }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn name(&self) -> &'static str { "simulated" }

    fn run(self: Box<Self>, rx: Receiver<SourceMsg>, tx: Sender<HandFrame>) {
        let mut hands = self.hands;
        for msg in rx {
            match msg {
                SourceMsg::Input(input) => hands.apply(input),
                SourceMsg::Detect => {
                    let start = Instant::now();
                    if !self.latency.is_zero() {
                        thread::sleep(self.latency);
                    }
                    let frame = HandFrame { hands: hands.landmarks(), latency: start.elapsed() };
                    if tx.send(frame).is_err() { return; }
                }
                SourceMsg::Quit => return,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Leap reports joints in millimetres above the device.  Each digit's bone
/// joints map onto the 21-point layout (MCP, PIP, DIP, tip; the thumb's
/// CMC, MCP, IP, tip), the wrist is the midpoint of the index and pinky
/// metacarpal bases, and the interaction box below is squeezed into the
/// normalized, mirrored image space the classifier expects.
#[cfg(feature = "leap")]
#[derive(Clone, Debug, Default)]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LeapLandmarkSource {
    /// Interaction box, in mm: `x` in ±HALF_WIDTH, `y` from FLOOR up HEIGHT.
    const HALF_WIDTH: f32 = 200.0;
    const FLOOR:      f32 = 100.0;
    const HEIGHT:     f32 = 400.0;

    fn normalize(x: f32, y: f32, z: f32) -> Landmark {
        Landmark::new(
            0.5 - x / (2.0 * Self::HALF_WIDTH),
            1.0 - (y - Self::FLOOR) / Self::HEIGHT,
            z / Self::HEIGHT,
        )
    }

    fn hand_landmarks(hand: &leaprs::Hand) -> Option<HandLandmarks> {
        macro_rules! joint {
            ($j:expr) => {{ let j = $j; Self::normalize(j.x, j.y, j.z) }};
        }

        let digits: Vec<_> = hand.digits().collect();
        if digits.len() < 5 { return None; }

        let mut p = [Landmark::default(); LANDMARK_COUNT];
        let base = [THUMB_CMC, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
        for (digit, &first) in digits.iter().zip(&base) {
            p[first]     = joint!(digit.proximal().prev_joint());
            p[first + 1] = joint!(digit.intermediate().prev_joint());
            p[first + 2] = joint!(digit.distal().prev_joint());
            p[first + 3] = joint!(digit.distal().next_joint());
        }
        let index_base = joint!(digits[1].metacarpal().prev_joint());
        let pinky_base = joint!(digits[4].metacarpal().prev_joint());
        p[WRIST] = index_base.midpoint(&pinky_base);
        Some(HandLandmarks::new(p))
    }
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn name(&self) -> &'static str { "leapmotion" }

    fn run(self: Box<Self>, rx: Receiver<SourceMsg>, tx: Sender<HandFrame>) {
        use leaprs::*;
        use std::sync::mpsc::TryRecvError;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("cannot create LeapC connection: {e:?}");
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("cannot open LeapMotion device: {e:?}");
            return;
        }

        let mut latest: Vec<HandLandmarks> = Vec::new();
        let mut pending = false;
        let mut requested = Instant::now();

        loop {
            loop {
                match rx.try_recv() {
                    Ok(SourceMsg::Detect) => {
                        pending = true;
                        requested = Instant::now();
                    }
                    Ok(SourceMsg::Input(_))            => {}
                    Ok(SourceMsg::Quit)
                    | Err(TryRecvError::Disconnected) => return,
                    Err(TryRecvError::Empty)          => break,
                }
            }

            if let Ok(msg) = connection.poll(10) {
                if let Event::Tracking(frame) = msg.event() {
                    latest = frame.hands().filter_map(|h| Self::hand_landmarks(&h)).take(2).collect();
                }
            }

            if pending {
                pending = false;
                let frame = HandFrame { hands: latest.clone(), latency: requested.elapsed() };
                if tx.send(frame).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
