//! Top-level application state.
//!
//! `AppState` owns the hand tracker, the detection throttle and the
//! particle simulation.  It consumes [`HandFrame`]s from the landmark
//! source and window commands, and hands a [`SceneView`] to the
//! visualizer each frame.

use std::io::{self, Write};
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use anyhow::Context;

use particle_field::{
    CombinedGesture, ConfigError, DetectionThrottle, FieldConfig, Gesture, HandTracker,
    ParticleCounts, Simulation, StepReport,
};

use crate::source::{spawn_landmark_source, HandFrame, SimLandmarkSource, SourceHandle, SourceMsg};
use crate::visualizer::{SceneRotation, SceneView, UiCommand, Visualizer};

const PARTICLE_STEP: usize = 1000;
const MIN_PARTICLES: usize = 1000;
const MAX_PARTICLES: usize = 20000;
const STRENGTH_STEP: f32   = 5.0;
const MAX_STRENGTH:  f32   = 100.0;
/// Frame time above this is treated as a stall, not simulated time.
const MAX_DT:        f32   = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub field:       FieldConfig,
    /// Initial text for the three-finger formation.
    pub text:        String,
    /// Simulated inference time for the keyboard source.
    pub sim_latency: Duration,
    /// Try LeapMotion hardware first (needs the `leap` feature).
    pub use_leap:    bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:       FieldConfig::default(),
            text:        "HELLO".to_string(),
            sim_latency: Duration::from_millis(12),
            use_leap:    cfg!(feature = "leap"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsCounter
// ════════════════════════════════════════════════════════════════════════════

/// Frames counted over one-second windows.
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsCounter {
    frames:  u32,
    elapsed: f32,
    fps:     u32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.elapsed -= 1.0;
        }
    }

    pub fn fps(&self) -> u32 { self.fps }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    tracker:  HandTracker,
    throttle: DetectionThrottle,
    sim:      Simulation,
    rotation: SceneRotation,
    fps:      FpsCounter,
    last:     Option<StepReport>,
    status:   String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self, ConfigError> {
        let tracker = HandTracker::new(cfg.field.hand.smoothing);
        let throttle = DetectionThrottle::new(cfg.field.hand.detection_fps);
        let mut sim = Simulation::new(cfg.field)?;
        if !sim.set_text(&cfg.text) {
            log::warn!("initial text is blank; three-finger formation disabled until set");
        }
        Ok(AppState {
            tracker,
            throttle,
            sim,
            rotation: SceneRotation::default(),
            fps:      FpsCounter::default(),
            last:     None,
            status:   String::new(),
        })
    }

    // ── detection cycle ───────────────────────────────────────────────────

    /// Start or stop issuing detection requests.
    pub fn set_tracking(&mut self, active: bool) {
        self.throttle.set_active(active);
    }

    /// True when a detection request should go out now.
    pub fn should_detect(&mut self, now: Instant) -> bool {
        self.throttle.try_begin(now)
    }

    /// Apply one inference result and close the cycle.
    pub fn handle_frame(&mut self, frame: HandFrame) {
        log::trace!("{} hands in {:?}", frame.hands.len(), frame.latency);
        self.tracker.apply(&frame.hands);
        self.throttle.finish();
    }

    /// The source went away mid-cycle: drop the hands and unblock.
    pub fn source_lost(&mut self) {
        self.tracker.apply(&[]);
        self.throttle.finish();
    }

    // ── window commands ───────────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::MoreParticles => self.resize_by(PARTICLE_STEP as isize),
            UiCommand::FewerParticles => self.resize_by(-(PARTICLE_STEP as isize)),
            UiCommand::Stronger => self.adjust_strength(STRENGTH_STEP),
            UiCommand::Weaker => self.adjust_strength(-STRENGTH_STEP),
            UiCommand::Sim(_) | UiCommand::PromptText | UiCommand::Quit => { /* handled in run loop */ }
        }
    }

    pub fn set_text(&mut self, text: &str) {
        if self.sim.set_text(text) {
            self.status = format!("text \"{}\" ({} points)", self.sim.text().text(), self.sim.text().len());
        }
    }

    fn resize_by(&mut self, delta: isize) {
        let total = self.sim.field().len() as isize + delta;
        let total = (total.max(0) as usize).clamp(MIN_PARTICLES, MAX_PARTICLES);
        if total == self.sim.field().len() {
            return;
        }
        self.sim.rebuild(ParticleCounts::from_total(total));
        self.status = format!("{} particles", self.sim.field().len());
    }

    fn adjust_strength(&mut self, delta: f32) {
        let s = (self.sim.config().forces.strength + delta).clamp(0.0, MAX_STRENGTH);
        self.sim.set_strength(s);
        self.status = format!("force {s:.0}");
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32) -> StepReport {
        let dt = dt.clamp(0.0, MAX_DT);
        let report = self.sim.step(dt, &self.tracker);
        self.rotation.update(self.tracker.any(Gesture::ThreeFingers), self.sim.time());
        self.fps.tick(dt);
        self.last = Some(report);
        report
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn tracker(&self)    -> &HandTracker     { &self.tracker }
    pub fn simulation(&self) -> &Simulation      { &self.sim }
    pub fn rotation(&self)   -> SceneRotation    { self.rotation }
    pub fn fps(&self)        -> u32              { self.fps.fps() }
    pub fn throttle(&self)   -> &DetectionThrottle { &self.throttle }

    pub fn caption(&self) -> &'static str {
        self.last.map_or(CombinedGesture::None, |r| r.combined).label()
    }

    pub fn status_line(&self) -> String {
        let mode = self.last.map_or_else(|| "-".to_string(), |r| format!("{:?}", r.mode));
        let mut line = format!(
            "hands {}  mode {}  particles {}  fps {}",
            self.tracker.present_count(),
            mode.to_lowercase(),
            self.sim.field().len(),
            self.fps.fps(),
        );
        if !self.status.is_empty() {
            line.push_str("  ");
            line.push_str(&self.status);
        }
        line
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn hardware_source() -> Option<SourceHandle> {
    Some(spawn_landmark_source(crate::source::LeapLandmarkSource))
}

#[cfg(not(feature = "leap"))]
fn hardware_source() -> Option<SourceHandle> {
    log::warn!("built without the `leap` feature; using simulated hands");
    None
}

fn start_source(cfg: &AppConfig) -> SourceHandle {
    if cfg.use_leap {
        if let Some(handle) = hardware_source() {
            return handle;
        }
    }
    spawn_landmark_source(SimLandmarkSource::new(cfg.sim_latency))
}

/// Prompt for a new text string on stdout/stdin.
fn prompt_text() -> String {
    print!("\n  Text: ");
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the window,
/// starts the landmark source (simulation by default, hardware with
/// `--features leap`), and drives detection and rendering at ~60 fps.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let mut source = start_source(&cfg);
    let sim_latency = cfg.sim_latency;
    let mut vis = Visualizer::new().context("opening visualizer window")?;
    let mut app = AppState::new(cfg).context("building particle field")?;
    app.set_tracking(true);

    let mut last = Instant::now();
    while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            match cmd {
                UiCommand::Quit => {
                    source.send(SourceMsg::Quit);
                    return Ok(());
                }
                UiCommand::Sim(input) => { source.send(SourceMsg::Input(input)); }
                UiCommand::PromptText => {
                    let text = prompt_text();
                    app.set_text(&text);
                }
                other => app.handle_command(other),
            }
        }

        // 2. Drain inference results
        loop {
            match source.rx.try_recv() {
                Ok(frame) => app.handle_frame(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("{} landmark source stopped; falling back to simulated hands", source.name);
                    app.source_lost();
                    source = spawn_landmark_source(SimLandmarkSource::new(sim_latency));
                    break;
                }
            }
        }

        // 3. Detection request
        let now = Instant::now();
        if app.should_detect(now) && !source.send(SourceMsg::Detect) {
            app.source_lost();
        }

        // 4. Simulate
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        let report = app.tick(dt);

        // 5. Render
        let status = app.status_line();
        vis.render(&SceneView {
            field:    app.simulation().field(),
            hands:    app.tracker().hands(),
            shake:    report.camera_shake,
            rotation: app.rotation(),
            time:     app.simulation().time(),
            caption:  app.caption(),
            status:   &status,
        });
    }

    source.send(SourceMsg::Quit);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{synthesize, SimPose};
    use particle_field::ForceMode;
    use pretty_assertions::assert_eq;

    fn make_app() -> AppState {
        let mut cfg = AppConfig::default();
        cfg.field.particles.sphere_count = 670;
        cfg.field.particles.ring_count = 330;
        cfg.field.particles.seed = Some(11);
        AppState::new(cfg).expect("valid config")
    }

    fn frame(hands: &[(SimPose, f32)]) -> HandFrame {
        HandFrame {
            hands:   hands.iter().map(|&(p, x)| synthesize(p, x, 0.5)).collect(),
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn initial_text_is_rasterized() {
        let app = make_app();
        assert_eq!(app.simulation().text().text(), "HELLO");
        assert!(!app.simulation().text().is_empty());
    }

    #[test]
    fn detection_waits_for_tracking_and_result() {
        let mut app = make_app();
        let t0 = Instant::now();
        assert!(!app.should_detect(t0));
        app.set_tracking(true);
        assert!(app.should_detect(t0));
        let later = t0 + Duration::from_secs(1);
        assert!(!app.should_detect(later));
        assert_eq!(app.throttle().dropped(), 1);
        app.handle_frame(frame(&[]));
        assert!(app.should_detect(later + Duration::from_secs(1)));
    }

    #[test]
    fn frame_drives_tracker_and_mode() {
        let mut app = make_app();
        app.handle_frame(frame(&[(SimPose::FourFingers, 0.5)]));
        assert_eq!(app.tracker().present_count(), 1);
        assert_eq!(app.tick(0.016).mode, ForceMode::Explosion);

        app.handle_frame(frame(&[(SimPose::ThreeFingers, 0.5)]));
        assert_eq!(app.tick(0.016).mode, ForceMode::Text);

        app.handle_frame(frame(&[]));
        assert_eq!(app.tick(0.016).mode, ForceMode::Ambient);
        assert_eq!(app.caption(), Gesture::None.label());
    }

    #[test]
    fn two_fists_far_apart() {
        let mut app = make_app();
        let f = frame(&[(SimPose::Fist, 0.05), (SimPose::Fist, 0.95)]);
        for _ in 0..30 { app.handle_frame(f.clone()); }
        assert_eq!(app.tick(0.016).combined, CombinedGesture::HandsFar);
    }

    #[test]
    fn source_lost_clears_hands() {
        let mut app = make_app();
        app.handle_frame(frame(&[(SimPose::Fist, 0.5)]));
        app.source_lost();
        assert_eq!(app.tracker().present_count(), 0);
        assert!(!app.throttle().is_busy());
    }

    #[test]
    fn particle_count_steps_and_clamps() {
        let mut app = make_app();
        app.handle_command(UiCommand::MoreParticles);
        assert_eq!(app.simulation().field().len(), 1340 + 660);
        app.handle_command(UiCommand::FewerParticles);
        app.handle_command(UiCommand::FewerParticles);
        app.handle_command(UiCommand::FewerParticles);
        assert_eq!(app.simulation().field().len(), 670 + 330);
    }

    #[test]
    fn strength_clamps() {
        let mut app = make_app();
        for _ in 0..30 { app.handle_command(UiCommand::Stronger); }
        assert_eq!(app.simulation().config().forces.strength, MAX_STRENGTH);
        for _ in 0..30 { app.handle_command(UiCommand::Weaker); }
        assert_eq!(app.simulation().config().forces.strength, 0.0);
    }

    #[test]
    fn blank_text_keeps_previous() {
        let mut app = make_app();
        app.set_text("  ");
        assert_eq!(app.simulation().text().text(), "HELLO");
        app.set_text("RUST");
        assert_eq!(app.simulation().text().text(), "RUST");
        assert!(app.status_line().contains("RUST"));
    }

    #[test]
    fn fps_counts_per_second() {
        let mut f = FpsCounter::default();
        for _ in 0..61 { f.tick(1.0 / 60.0); }
        assert!(f.fps() >= 59 && f.fps() <= 61);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut app = make_app();
        let r = app.tick(5.0);
        assert!((r.time - MAX_DT).abs() < 1e-6);
    }
}
