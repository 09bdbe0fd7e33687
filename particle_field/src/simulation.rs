//! The per-frame force field.
//!
//! [`Simulation`] is the explicit context for one running field: the
//! particle buffers, both formation targets, the smoothed ring-scale and
//! compression scalars, camera shake and the RNG.  The render loop calls
//! [`Simulation::step`] once per frame with the current [`HandTracker`].
//!
//! ## Step outline
//!
//! 1. Advance time and the smoothed scalars.
//! 2. Grow or fade the drawing trail.
//! 3. Pick one [`ForceMode`] for the whole frame.
//! 4. Per particle: apply the mode's forcing, integrate, rescale the ring,
//!    spring back to rest, damp, and relax color/size.
//! 5. Update camera shake.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, FieldConfig};
use crate::field::{ParticleCounts, ParticleField};
use crate::gesture::{CombinedGesture, Gesture};
use crate::hand::{HandObservation, HandTracker};
use crate::math::{blend_toward, lerp, safe_normalize};
use crate::text::{BitmapFont, TextCloud, TextRaster};
use crate::trail::DrawingTrail;

// ── palette ──────────────────────────────────────────────────────────────────
const FIERY:         Vec3 = Vec3::new(1.0, 0.4, 0.1);
const SPARK:         Vec3 = Vec3::new(1.0, 1.0, 0.8);
const TEXT_GOLD:     Vec3 = Vec3::new(1.0, 0.95, 0.4);
const TEXT_FADED:    Vec3 = Vec3::new(0.3, 0.5, 0.8);
const WAVE_CYAN:     Vec3 = Vec3::new(0.3, 0.7, 1.0);
const DRAW_CYAN:     Vec3 = Vec3::new(0.2, 0.9, 1.0);
const ATTRACT_GREEN: Vec3 = Vec3::new(0.2, 1.0, 0.5);
const REPEL_RED:     Vec3 = Vec3::new(1.0, 0.2, 0.2);
const BEAM_YELLOW:   Vec3 = Vec3::new(1.0, 1.0, 0.3);

// ── forcing constants ────────────────────────────────────────────────────────
const EXPLOSION_FORCE:   f32 = 2.5;
const EXPLOSION_JITTER:  f32 = 1.5;
const SURGE_FORCE:       f32 = 4.0;
const SURGE_JITTER:      f32 = 2.5;
const GATHER_PULL:       f32 = 0.03;
const TEXT_LERP:         f32 = 0.12;
/// Every 7th particle stays out of the text as background sparkle.
const TEXT_BACKGROUND_EVERY: usize = 7;
const WAVE_LERP:         f32 = 0.1;
const WAVE_AMPLITUDE:    f32 = 20.0;
const TRAIL_PULL_PLANAR: f32 = 0.03;
const TRAIL_PULL_DEPTH:  f32 = 0.01;
const HAND_PUSH:         f32 = 0.02;
const BEAM_PUSH:         f32 = 0.025;
const COMPRESSION_PULL:  f32 = 0.015;
const RING_LERP:         f32 = 0.02;
const DAMPING_CALM:      f32 = 0.92;
const DAMPING_EXPLOSIVE: f32 = 0.96;
const RELAX_COLOR:       f32 = 0.01;
const RELAX_SIZE:        f32 = 0.02;

// ── smoothed targets ─────────────────────────────────────────────────────────
const RING_SCALE_REST:   f32 = 1.0;
const RING_SCALE_FAR:    f32 = 1.2;
const RING_SCALE_SURGE:  f32 = 2.5;
const COMPRESSION_CLOSE: f32 = 0.8;

// ── camera shake multipliers ─────────────────────────────────────────────────
const SHAKE_EXPLOSION: f32 = 1.5;
const SHAKE_SURGE:     f32 = 2.5;
const SHAKE_FAR:       f32 = 0.8;
const SHAKE_CLOSE:     f32 = 0.5;
const SHAKE_FIST:      f32 = 0.3;
const SHAKE_DECAY:     f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// ForceMode
// ════════════════════════════════════════════════════════════════════════════

/// Which forcing runs this frame.  Exactly one, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Four fingers on either hand.
    Explosion,
    /// Three fingers on either hand, with a non-empty text cloud.
    Text,
    /// Two fingers on either hand.
    Wave,
    /// Trail attraction + two-hand effect + per-hand forces.
    Ambient,
}

impl ForceMode {
    pub fn select(hands: &HandTracker, has_text: bool) -> Self {
        if hands.any(Gesture::FourFingers) {
            ForceMode::Explosion
        } else if hands.any(Gesture::ThreeFingers) && has_text {
            ForceMode::Text
        } else if hands.any(Gesture::TwoFingers) {
            ForceMode::Wave
        } else {
            ForceMode::Ambient
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Smoothed scalar / camera shake / step report
// ════════════════════════════════════════════════════════════════════════════

/// A scalar that eases toward its target a fixed fraction per step.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Smoothed {
    current: f32,
    target:  f32,
}

impl Smoothed {
    fn new(v: f32) -> Self { Smoothed { current: v, target: v } }
    fn track(&mut self, rate: f32) { self.current = lerp(self.current, self.target, rate); }
}

/// Screen-space camera offset requested by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraShake {
    pub x: f32,
    pub y: f32,
}

/// What happened in one step, for the UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub mode:         ForceMode,
    pub combined:     CombinedGesture,
    pub camera_shake: CameraShake,
    pub trail_len:    usize,
    pub time:         f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation
// ════════════════════════════════════════════════════════════════════════════

pub struct Simulation {
    cfg:         FieldConfig,
    field:       ParticleField,
    trail:       DrawingTrail,
    text:        TextCloud,
    raster:      Box<dyn TextRaster>,
    rng:         StdRng,
    time:        f32,
    ring_scale:  Smoothed,
    compression: Smoothed,
    shake:       CameraShake,
}

impl Simulation {
    /// Validate `cfg` and build the field from it.
    pub fn new(cfg: FieldConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut rng = match cfg.particles.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_os_rng(),
        };
        let field = ParticleField::new(&cfg.particles, &mut rng);
        Ok(Simulation {
            cfg,
            field,
            trail:       DrawingTrail::default(),
            text:        TextCloud::default(),
            raster:      Box::new(BitmapFont::default()),
            rng,
            time:        0.0,
            ring_scale:  Smoothed::new(RING_SCALE_REST),
            compression: Smoothed::new(0.0),
            shake:       CameraShake::default(),
        })
    }

    /// Swap the text rasterizer.  The current text is re-rasterized.
    pub fn with_raster(mut self, raster: Box<dyn TextRaster>) -> Self {
        self.raster = raster;
        if !self.text.text().is_empty() {
            let text = self.text.text().to_string();
            self.text = TextCloud::generate(&text, self.raster.as_ref(), &mut self.rng);
        }
        self
    }

    /// Regenerate the text cloud.  Blank input is ignored (returns false).
    pub fn set_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.text = TextCloud::generate(text, self.raster.as_ref(), &mut self.rng);
        true
    }

    /// Install a prepared cloud, e.g. from an external rasterizer.
    pub fn set_text_cloud(&mut self, cloud: TextCloud) {
        self.text = cloud;
    }

    /// Reallocate every particle buffer with new counts.
    pub fn rebuild(&mut self, counts: ParticleCounts) {
        self.cfg.particles.sphere_count = counts.sphere;
        self.cfg.particles.ring_count = counts.ring;
        self.field = ParticleField::new(&self.cfg.particles, &mut self.rng);
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.cfg.forces.strength = strength;
    }

    pub fn config(&self)       -> &FieldConfig   { &self.cfg }
    pub fn field(&self)        -> &ParticleField { &self.field }
    pub fn trail(&self)        -> &DrawingTrail  { &self.trail }
    pub fn text(&self)         -> &TextCloud     { &self.text }
    pub fn time(&self)         -> f32            { self.time }
    pub fn ring_scale(&self)   -> f32            { self.ring_scale.current }
    pub fn compression(&self)  -> f32            { self.compression.current }
    pub fn camera_shake(&self) -> CameraShake    { self.shake }

    // ── one frame ─────────────────────────────────────────────────────────

    pub fn step(&mut self, dt: f32, hands: &HandTracker) -> StepReport {
        self.time += dt * self.cfg.effects.time_scale;
        let rate = self.cfg.effects.transition_speed;
        self.ring_scale.track(rate);
        self.compression.track(rate * 0.5);

        let pinching = hands.any(Gesture::Pinch);
        self.update_trail(hands.hands(), pinching);

        let combined = hands.combined();
        let mode = ForceMode::select(hands, !self.text.is_empty());

        if mode == ForceMode::Ambient {
            match combined {
                CombinedGesture::HandsClose => self.compression.target = COMPRESSION_CLOSE,
                CombinedGesture::BothOpen   => self.ring_scale.target = RING_SCALE_SURGE,
                CombinedGesture::HandsFar   => self.ring_scale.target = RING_SCALE_FAR,
                _ => {
                    self.ring_scale.target = RING_SCALE_REST;
                    self.compression.target = 0.0;
                }
            }
        }

        let surge  = mode == ForceMode::Ambient && combined == CombinedGesture::BothOpen;
        let gather = mode == ForceMode::Ambient && combined == CombinedGesture::HandsClose;
        let explosive = mode == ForceMode::Explosion || surge;
        let spring = !matches!(mode, ForceMode::Explosion | ForceMode::Wave | ForceMode::Text)
            && !surge && !gather;
        let relax = mode == ForceMode::Ambient && combined == CombinedGesture::None && !pinching;
        let damping = if explosive { DAMPING_EXPLOSIVE } else { DAMPING_CALM };

        let intensity = self.cfg.effects.camera_shake_intensity;
        if mode == ForceMode::Explosion {
            self.shake = random_shake(&mut self.rng, intensity * SHAKE_EXPLOSION);
        } else if surge {
            self.shake = random_shake(&mut self.rng, intensity * SHAKE_SURGE);
        }

        let t = self.time;
        let ring_scale  = self.ring_scale.current;
        let compression = self.compression.current;
        let forces      = self.cfg.forces.clone();
        let return_speed = self.cfg.particles.return_speed;
        let Simulation { field, trail, text, rng, .. } = &mut *self;
        let beam_size = field.point_size() * 2.0;

        for i in 0..field.len() {
            let mut p = field.positions[i];
            let mut v = field.velocities[i];
            let mut color = field.colors[i];
            let mut size = field.sizes[i];

            match mode {
                ForceMode::Explosion => {
                    v += safe_normalize(p) * EXPLOSION_FORCE + jitter(rng, EXPLOSION_JITTER);
                    blend_toward(&mut color, FIERY, 0.12);
                }

                ForceMode::Text => {
                    if i % TEXT_BACKGROUND_EVERY == 0 {
                        let fi = i as f32;
                        v.x += (t * 0.5 + fi * 0.1).sin() * 0.5;
                        v.y += (t * 0.4 + fi * 0.15).cos() * 0.3;
                        blend_toward(&mut color, TEXT_FADED, 0.05);
                    } else if let Some(target) = text.point_for(i) {
                        p = p.lerp(target, TEXT_LERP);
                        v = Vec3::ZERO;
                        blend_toward(&mut color, TEXT_GOLD, 0.15);
                    }
                }

                ForceMode::Wave => {
                    let o = field.original()[i];
                    let target = Vec3::new(
                        o.x + (t * 2.0 + o.y * 0.02).sin() * WAVE_AMPLITUDE,
                        o.y + (t * 1.5 + o.x * 0.02).cos() * WAVE_AMPLITUDE,
                        o.z,
                    );
                    p = p.lerp(target, WAVE_LERP);
                    v = Vec3::ZERO;
                    blend_toward(&mut color, WAVE_CYAN, 0.08);
                }

                ForceMode::Ambient => {
                    if pinching {
                        if let Some(tp) = trail.point_for(i) {
                            let d = tp.position - p;
                            v += Vec3::new(
                                d.x * TRAIL_PULL_PLANAR,
                                d.y * TRAIL_PULL_PLANAR,
                                d.z * TRAIL_PULL_DEPTH,
                            );
                            blend_toward(&mut color, DRAW_CYAN, 0.1);
                        }
                    }

                    match combined {
                        CombinedGesture::HandsClose => {
                            v -= p * GATHER_PULL;
                            let pulse = (t * 5.0).sin() * 0.2 + 0.8;
                            blend_toward(&mut color, Vec3::new(0.2 * pulse, 0.8 * pulse, 1.0), 0.1);
                        }
                        CombinedGesture::BothOpen => {
                            v += safe_normalize(p) * SURGE_FORCE + jitter(rng, SURGE_JITTER);
                            if rng.random::<f32>() > 0.7 {
                                blend_toward(&mut color, SPARK, 0.8);
                            } else {
                                blend_toward(&mut color, FIERY, 0.15);
                            }
                        }
                        _ => {}
                    }

                    for hand in hands.hands().iter().filter(|h| h.is_present()) {
                        hand_force(hand, p, &mut v, &mut color, &mut size, beam_size,
                                   forces.strength, forces.attract_radius);
                    }
                }
            }

            // Integrate
            if mode != ForceMode::Text {
                let before = p;
                p += v;
                if field.is_ring(i) {
                    p.y -= before.y * compression * COMPRESSION_PULL;
                }
            }

            // Ring rescale on the equatorial plane, toward the scaled rest radius
            if field.is_ring(i) && mode != ForceMode::Text {
                let r = planar_radius(p);
                if r > 0.0 {
                    let goal = planar_radius(field.original()[i]) * ring_scale;
                    let k = lerp(r, goal, RING_LERP) / r;
                    p.x *= k;
                    p.z *= k;
                }
            }

            if spring {
                p += (field.original()[i] - p) * return_speed;
            }

            field.positions[i] = p;
            field.velocities[i] = v * damping;
            field.colors[i] = color;
            field.sizes[i] = size;

            if relax {
                let base = field.base_color(i);
                blend_toward(&mut field.colors[i], base, RELAX_COLOR);
                let size = field.base_size(i);
                field.sizes[i] = lerp(field.sizes[i], size, RELAX_SIZE);
            }
        }

        self.update_camera_shake(hands, combined);

        StepReport {
            mode,
            combined,
            camera_shake: self.shake,
            trail_len:    self.trail.len(),
            time:         self.time,
        }
    }

    fn update_trail(&mut self, hands: &[HandObservation], pinching: bool) {
        if !pinching {
            self.trail.fade();
            return;
        }
        for hand in hands.iter().filter(|h| h.is_present() && h.gesture == Gesture::Pinch) {
            self.trail.record(hand.position, self.time);
        }
    }

    fn update_camera_shake(&mut self, hands: &HandTracker, combined: CombinedGesture) {
        let k = match combined {
            CombinedGesture::HandsFar   => SHAKE_FAR,
            CombinedGesture::HandsClose => SHAKE_CLOSE,
            _ if hands.any(Gesture::Fist) => SHAKE_FIST,
            _ => 0.0,
        };
        if k > 0.0 {
            self.shake = random_shake(&mut self.rng, self.cfg.effects.camera_shake_intensity * k);
        } else {
            self.shake.x = lerp(self.shake.x, 0.0, SHAKE_DECAY);
            self.shake.y = lerp(self.shake.y, 0.0, SHAKE_DECAY);
        }
    }
}

/// Proximity-weighted single-hand force: linear falloff to zero at `radius`.
#[allow(clippy::too_many_arguments)]
fn hand_force(
    hand:     &HandObservation,
    p:        Vec3,
    v:        &mut Vec3,
    color:    &mut Vec3,
    size:     &mut f32,
    beam_size: f32,
    strength: f32,
    radius:   f32,
) {
    let d = hand.position - p;
    let dist = d.length();
    if dist >= radius {
        return;
    }
    let force = (1.0 - dist / radius) * strength;
    match hand.gesture {
        Gesture::Fist => {
            *v += d * force * HAND_PUSH;
            blend_toward(color, ATTRACT_GREEN, 0.08);
        }
        Gesture::Open => {
            *v -= d * force * HAND_PUSH;
            blend_toward(color, REPEL_RED, 0.06);
        }
        Gesture::Point => {
            v.x += d.x * force * BEAM_PUSH;
            v.y += d.y * force * BEAM_PUSH;
            blend_toward(color, BEAM_YELLOW, 0.08);
            *size = lerp(*size, beam_size, 0.1);
        }
        Gesture::None
        | Gesture::TwoFingers
        | Gesture::ThreeFingers
        | Gesture::FourFingers
        | Gesture::Pinch => {}
    }
}

fn planar_radius(p: Vec3) -> f32 {
    (p.x * p.x + p.z * p.z).sqrt()
}

/// Uniform jitter in `[-spread/2, spread/2)` on each axis.
fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
    )
}

fn random_shake<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> CameraShake {
    CameraShake {
        x: (rng.random::<f32>() - 0.5) * amount,
        y: (rng.random::<f32>() - 0.5) * amount,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::posed;
    use crate::hand::HandObservation;
    use pretty_assertions::assert_eq;

    fn seeded(sphere: usize, ring: usize) -> Simulation {
        let mut cfg = FieldConfig::default();
        cfg.particles.sphere_count = sphere;
        cfg.particles.ring_count = ring;
        cfg.particles.seed = Some(7);
        Simulation::new(cfg).unwrap()
    }

    fn one_hand(pos: Vec3, g: Gesture) -> HandTracker {
        let lm = posed(0.5, 0.5, [false; 4], false);
        HandTracker::from_observations(
            [HandObservation::present(pos, g, lm), HandObservation::default()],
            0.18,
        )
    }

    fn two_hands(a: Vec3, ga: Gesture, b: Vec3, gb: Gesture) -> HandTracker {
        let lm = posed(0.5, 0.5, [false; 4], false);
        HandTracker::from_observations(
            [HandObservation::present(a, ga, lm), HandObservation::present(b, gb, lm)],
            0.18,
        )
    }

    fn idle() -> HandTracker { HandTracker::new(0.18) }

    #[test]
    fn rejects_empty_ring_annulus() {
        let mut cfg = FieldConfig::default();
        cfg.particles.shape = crate::config::ParticleShape::Saturn;
        cfg.particles.ring_inner_radius = 600.0;
        cfg.particles.ring_outer_radius = 600.0;
        let err = Simulation::new(cfg).err().expect("config should be rejected");
        assert!(matches!(err, ConfigError::Invalid { field: "particles.ring_outer_radius", .. }));
    }

    // ── mode selection ────────────────────────────────────────────────────

    #[test]
    fn four_fingers_beats_everything() {
        let t = two_hands(Vec3::ZERO, Gesture::FourFingers, Vec3::X, Gesture::ThreeFingers);
        assert_eq!(ForceMode::select(&t, true), ForceMode::Explosion);
    }

    #[test]
    fn three_fingers_needs_text() {
        let t = one_hand(Vec3::ZERO, Gesture::ThreeFingers);
        assert_eq!(ForceMode::select(&t, true), ForceMode::Text);
        assert_eq!(ForceMode::select(&t, false), ForceMode::Ambient);
    }

    #[test]
    fn two_fingers_is_wave() {
        let t = two_hands(Vec3::ZERO, Gesture::Fist, Vec3::X, Gesture::TwoFingers);
        assert_eq!(ForceMode::select(&t, false), ForceMode::Wave);
    }

    #[test]
    fn no_hands_is_ambient() {
        assert_eq!(ForceMode::select(&idle(), true), ForceMode::Ambient);
    }

    // ── forcing ───────────────────────────────────────────────────────────

    #[test]
    fn explosion_pushes_outward_and_shakes() {
        let mut sim = seeded(200, 100);
        let before: Vec<f32> = sim.field().positions().iter().map(|p| p.length()).collect();
        let report = sim.step(0.016, &one_hand(Vec3::ZERO, Gesture::FourFingers));
        assert_eq!(report.mode, ForceMode::Explosion);
        let grown = sim.field().positions().iter().zip(&before)
            .filter(|(p, &b)| p.length() > b)
            .count();
        assert!(grown > sim.field().len() * 9 / 10);
        // Set by the explosion, decayed once by the post-pass.
        let s = report.camera_shake;
        let limit = 6.0 * 1.5 * 0.5;
        assert!(s.x.abs() <= limit && s.y.abs() <= limit);
    }

    #[test]
    fn fist_attracts_and_tints_green() {
        let mut sim = seeded(300, 0);
        let hand = Vec3::new(50.0, 0.0, 0.0);
        let t = one_hand(hand, Gesture::Fist);
        let i = sim.field().positions().iter()
            .position(|p| p.distance(hand) < 200.0)
            .expect("some particle near the hand");
        let d0 = sim.field().positions()[i].distance(hand);
        let c0 = sim.field().colors()[i];
        sim.step(0.016, &t);
        assert!(sim.field().positions()[i].distance(hand) < d0);
        assert!(sim.field().colors()[i].distance(ATTRACT_GREEN) < c0.distance(ATTRACT_GREEN));
    }

    #[test]
    fn open_hand_repels() {
        let mut sim = seeded(300, 0);
        let hand = Vec3::new(-40.0, 20.0, 0.0);
        let i = sim.field().positions().iter()
            .position(|p| p.distance(hand) < 200.0)
            .expect("some particle near the hand");
        let d0 = sim.field().positions()[i].distance(hand);
        sim.step(0.016, &one_hand(hand, Gesture::Open));
        assert!(sim.field().positions()[i].distance(hand) > d0);
    }

    #[test]
    fn far_particles_feel_no_hand() {
        let mut sim = seeded(50, 0);
        let far = one_hand(Vec3::new(10_000.0, 0.0, 0.0), Gesture::Fist);
        sim.step(0.016, &far);
        assert!(sim.field().velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn point_grows_particles() {
        let mut sim = seeded(300, 0);
        let hand = Vec3::ZERO;
        let i = sim.field().positions().iter()
            .position(|p| p.length() < 150.0)
            .expect("some particle near the origin");
        let s0 = sim.field().sizes()[i];
        sim.step(0.016, &one_hand(hand, Gesture::Point));
        assert!(sim.field().sizes()[i] > s0);
    }

    #[test]
    fn wave_freezes_velocity_and_follows_offset() {
        let mut sim = seeded(100, 50);
        let t = one_hand(Vec3::ZERO, Gesture::TwoFingers);
        for _ in 0..5 {
            let r = sim.step(0.016, &t);
            assert_eq!(r.mode, ForceMode::Wave);
        }
        assert!(sim.field().velocities().iter().all(|v| *v == Vec3::ZERO));
        let off = sim.field().positions().iter().zip(sim.field().original())
            .map(|(p, o)| p.distance(*o))
            .fold(0.0f32, f32::max);
        assert!(off > 0.0);
        assert!(off < 2.0 * WAVE_AMPLITUDE);
    }

    #[test]
    fn text_mode_keeps_background_particles_fixed() {
        let mut sim = seeded(70, 0);
        sim.set_text_cloud(TextCloud::from_points("X", vec![Vec3::new(5.0, 5.0, 0.0)]));
        let bg0 = sim.field().positions()[14];
        let t = one_hand(Vec3::ZERO, Gesture::ThreeFingers);
        for _ in 0..150 { sim.step(0.016, &t); }
        assert_eq!(sim.field().positions()[14], bg0);
        assert!(sim.field().positions()[15].distance(Vec3::new(5.0, 5.0, 0.0)) < 0.1);
        assert_eq!(sim.field().velocities()[15], Vec3::ZERO);
    }

    #[test]
    fn hands_close_compresses_and_blocks_spring() {
        let mut sim = seeded(50, 50);
        let t = two_hands(
            Vec3::new(-50.0, 0.0, 0.0), Gesture::Fist,
            Vec3::new(50.0, 0.0, 0.0),  Gesture::Fist,
        );
        let r = sim.step(0.016, &t);
        assert_eq!(r.combined, CombinedGesture::HandsClose);
        for _ in 0..100 { sim.step(0.016, &t); }
        assert!(sim.compression() > 0.5);
        let mean: f32 = sim.field().positions().iter().map(|p| p.length()).sum::<f32>()
            / sim.field().len() as f32;
        let mean0: f32 = sim.field().original().iter().map(|p| p.length()).sum::<f32>()
            / sim.field().len() as f32;
        assert!(mean < mean0);
    }

    #[test]
    fn both_open_raises_ring_scale() {
        let mut sim = seeded(10, 10);
        let t = two_hands(
            Vec3::new(-100.0, 0.0, 0.0), Gesture::Open,
            Vec3::new(100.0, 0.0, 0.0),  Gesture::Open,
        );
        for _ in 0..50 { sim.step(0.016, &t); }
        assert!(sim.ring_scale() > 1.5);
        for _ in 0..300 { sim.step(0.016, &idle()); }
        assert!((sim.ring_scale() - 1.0).abs() < 0.01);
    }

    #[test]
    fn sustained_both_open_levels_off() {
        let mut sim = seeded(50, 50);
        let t = two_hands(
            Vec3::new(-100.0, 0.0, 0.0), Gesture::Open,
            Vec3::new(100.0, 0.0, 0.0),  Gesture::Open,
        );
        for step in 0..6000 {
            sim.step(0.016, &t);
            if step % 500 == 0 || step == 5999 {
                assert!(
                    sim.field().positions().iter().all(|p| p.is_finite()),
                    "non-finite position at step {step}"
                );
            }
        }
        let widest = (50..100)
            .map(|i| planar_radius(sim.field().positions()[i]))
            .fold(0.0f32, f32::max);
        assert!(widest < 10_000.0, "ring kept spreading: {widest}");
    }

    #[test]
    fn ring_rescale_leaves_sphere_alone() {
        let mut sim = seeded(100, 100);
        let t = two_hands(
            Vec3::new(-5000.0, 0.0, 0.0), Gesture::Fist,
            Vec3::new(5000.0, 0.0, 0.0),  Gesture::Fist,
        );
        assert_eq!(sim.step(0.016, &t).combined, CombinedGesture::HandsFar);
        for _ in 0..2000 { sim.step(0.016, &t); }
        assert!((sim.ring_scale() - RING_SCALE_FAR).abs() < 1e-3);

        let f = sim.field();
        assert_eq!(&f.positions()[..100], &f.original()[..100]);
        for i in 100..200 {
            let r0 = planar_radius(f.original()[i]);
            if r0 < 1.0 {
                continue;
            }
            // Spring return holds the ring short of the full scaled radius.
            let ratio = planar_radius(f.positions()[i]) / r0;
            assert!(ratio > 1.1 && ratio < RING_SCALE_FAR, "particle {i}: {ratio}");
            assert_eq!(f.positions()[i].y, f.original()[i].y);
        }
    }

    #[test]
    fn compression_flattens_only_the_ring() {
        let mut sim = seeded(100, 100);
        sim.compression = Smoothed::new(COMPRESSION_CLOSE);
        let t = two_hands(
            Vec3::new(0.0, 5000.0, 0.0),   Gesture::Fist,
            Vec3::new(100.0, 5000.0, 0.0), Gesture::Fist,
        );
        let before: Vec<f32> = sim.field().positions().iter().map(|p| p.y).collect();
        assert_eq!(sim.step(0.016, &t).combined, CombinedGesture::HandsClose);

        let gathered = 1.0 - GATHER_PULL;
        let squeezed = gathered - COMPRESSION_CLOSE * COMPRESSION_PULL;
        for (i, (p, y0)) in sim.field().positions().iter().zip(&before).enumerate() {
            let want = if i < 100 { y0 * gathered } else { y0 * squeezed };
            assert!((p.y - want).abs() < 1e-3, "particle {i}: {} vs {want}", p.y);
        }
    }

    // ── spring + relax ────────────────────────────────────────────────────

    #[test]
    fn idle_field_returns_home() {
        let mut sim = seeded(100, 50);
        sim.step(0.016, &one_hand(Vec3::ZERO, Gesture::FourFingers));
        for _ in 0..600 { sim.step(0.016, &idle()); }
        for (p, o) in sim.field().positions().iter().zip(sim.field().original()) {
            assert!(p.distance(*o) < 1.0, "{p:?} vs {o:?}");
        }
    }

    #[test]
    fn idle_colors_relax_to_base() {
        let mut sim = seeded(20, 20);
        for _ in 0..2000 { sim.step(0.016, &idle()); }
        for i in 0..sim.field().len() {
            assert!(sim.field().colors()[i].distance(sim.field().base_color(i)) < 0.01);
            assert!((sim.field().sizes()[i] - sim.field().base_size(i)).abs() < 0.01);
        }
    }

    // ── trail + camera ────────────────────────────────────────────────────

    #[test]
    fn pinch_draws_then_fades() {
        let mut sim = seeded(10, 0);
        for k in 0..20 {
            let t = one_hand(Vec3::new(k as f32 * 10.0, 0.0, 0.0), Gesture::Pinch);
            sim.step(0.016, &t);
        }
        assert_eq!(sim.trail().len(), 20);
        assert!(sim.trail().is_drawing());
        let r = sim.step(0.016, &idle());
        assert_eq!(r.trail_len, 19);
        assert!(!sim.trail().is_drawing());
    }

    #[test]
    fn shake_decays_without_trigger() {
        let mut sim = seeded(10, 0);
        sim.step(0.016, &one_hand(Vec3::ZERO, Gesture::Fist));
        for _ in 0..200 { sim.step(0.016, &idle()); }
        let s = sim.camera_shake();
        assert!(s.x.abs() < 1e-3 && s.y.abs() < 1e-3);
    }

    // ── text + rebuild ────────────────────────────────────────────────────

    #[test]
    fn set_text_ignores_blank() {
        let mut sim = seeded(10, 0);
        assert!(sim.set_text("HI"));
        let n = sim.text().len();
        assert!(n > 0);
        assert!(!sim.set_text("   "));
        assert_eq!(sim.text().text(), "HI");
        assert_eq!(sim.text().len(), n);
    }

    #[test]
    fn rebuild_resizes_buffers() {
        let mut sim = seeded(10, 5);
        sim.rebuild(ParticleCounts::from_total(300));
        assert_eq!(sim.field().sphere_count(), 201);
        assert_eq!(sim.field().ring_count(), 99);
        assert_eq!(sim.field().velocities().len(), 300);
        assert_eq!(sim.config().particles.sphere_count, 201);
    }

    #[test]
    fn time_scales() {
        let mut sim = seeded(1, 0);
        sim.step(0.5, &idle());
        sim.step(0.5, &idle());
        assert!((sim.time() - 1.0).abs() < 1e-6);
    }
}
