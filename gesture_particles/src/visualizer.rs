//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │         additive particle splats, perspective from (0,100,700)   │
//! │         hand skeletons overlaid in mirrored image space          │
//! │                                                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  gesture caption   hands   mode   particles   fps                │
//! │  key legend                                                      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use glam::{EulerRot, Mat3, Mat4, Vec3};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use particle_field::hand::{HandObservation, MAX_HANDS};
use particle_field::landmarks::{HAND_CONNECTIONS, FINGER_TIPS, THUMB_TIP};
use particle_field::math::pack_argb;
use particle_field::text::glyph;
use particle_field::{CameraShake, HandLandmarks, ParticleField};

use crate::source::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 1280;
pub const WIN_H:      usize = 720;
const STATUS_H:       usize = 34;
const SCENE_H:        usize = WIN_H - STATUS_H;
const BG:             Vec3  = Vec3::new(0.012, 0.012, 0.035);
const STATUS_BG:      u32   = 0xFF0B0B1A;
const LABEL_SCALE:    usize = 2;

pub const CAMERA_BASE: Vec3 = Vec3::new(0.0, 100.0, 700.0);
const FOV_Y_DEG:      f32   = 60.0;
const NEAR:           f32   = 1.0;
const FAR:            f32   = 2000.0;
/// Point size attenuation numerator: pixels = size * ATTENUATION / depth.
const ATTENUATION:    f32   = 400.0;
const SPLAT_GAIN:     f32   = 0.55;
const MAX_SPLAT_R:    f32   = 10.0;

const HAND_COLORS:    [u32; MAX_HANDS] = [0xFF00CCFF, 0xFFFF00CC];
const TIP_COLOR:      u32   = 0xFFFFFFFF;

// ════════════════════════════════════════════════════════════════════════════
// UiCommand
// ════════════════════════════════════════════════════════════════════════════

/// What the window asks of the app this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiCommand {
    /// Forward to the simulated landmark source.
    Sim(SimInput),
    /// Read a new text string from the terminal.
    PromptText,
    MoreParticles,
    FewerParticles,
    Stronger,
    Weaker,
    Quit,
}

/// Pose keys: `F` fist, `2`/`3`/`4` fingers, `P` pinch, `N` hide.
fn pose_for_key(key: Key) -> Option<SimPose> {
    match key {
        Key::F    => Some(SimPose::Fist),
        Key::Key2 => Some(SimPose::TwoFingers),
        Key::Key3 => Some(SimPose::ThreeFingers),
        Key::Key4 => Some(SimPose::FourFingers),
        Key::P    => Some(SimPose::Pinch),
        Key::N    => Some(SimPose::Hidden),
        _         => None,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Pinhole camera that keeps its initial viewing direction while shaking.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    view:   Mat4,
    focal:  f32,
    center: (f32, f32),
}

impl Projection {
    pub fn new(shake: CameraShake, width: usize, height: usize) -> Self {
        let eye = CAMERA_BASE + Vec3::new(shake.x, shake.y, 0.0);
        let forward = (-CAMERA_BASE).normalize();
        Projection {
            view:   Mat4::look_to_rh(eye, forward, Vec3::Y),
            focal:  (height as f32 * 0.5) / (FOV_Y_DEG.to_radians() * 0.5).tan(),
            center: (width as f32 * 0.5, height as f32 * 0.5),
        }
    }

    /// Screen position and view depth, or `None` outside the clip range.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let v = self.view.transform_point3(p);
        let depth = -v.z;
        if !(NEAR..FAR).contains(&depth) {
            return None;
        }
        Some((
            self.center.0 + v.x / depth * self.focal,
            self.center.1 - v.y / depth * self.focal,
            depth,
        ))
    }
}

/// Whole-field rotation, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneRotation {
    pub x: f32,
    pub y: f32,
}

impl SceneRotation {
    /// Slow spin with a breathing tilt; faces the camera while text shows.
    pub fn update(&mut self, showing_text: bool, time: f32) {
        if showing_text {
            self.y += (0.0 - self.y) * 0.05;
            self.x += (0.0 - self.x) * 0.05;
        } else {
            self.y += 0.002;
            self.x = (time * 0.15).sin() * 0.05 + 0.18;
        }
    }

    pub fn matrix(&self) -> Mat3 {
        Mat3::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas: pixel buffer + drawing primitives, no window
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    light:      Vec<Vec3>,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            light: vec![BG; width * height],
            buf:   vec![pack_argb(BG); width * height],
        }
    }

    pub fn clear(&mut self) {
        self.light.fill(BG);
    }

    /// Additive round splat with a soft falloff, clipped to `max_y`.
    pub fn splat(&mut self, x: f32, y: f32, radius: f32, color: Vec3, max_y: usize) {
        let r = radius.clamp(0.5, MAX_SPLAT_R);
        let x0 = (x - r).floor().max(0.0) as usize;
        let y0 = (y - r).floor().max(0.0) as usize;
        let x1 = ((x + r).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((y + r).ceil().max(0.0) as usize).min(max_y.min(self.height));
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let d2 = (dx * dx + dy * dy) / (r * r);
                if d2 < 1.0 {
                    let k = (1.0 - d2) * (1.0 - d2);
                    self.light[py * self.width + px] += color * (k * SPLAT_GAIN);
                }
            }
        }
    }

    /// Resolve accumulated light into the ARGB buffer.
    pub fn resolve(&mut self) {
        for (dst, &src) in self.buf.iter_mut().zip(&self.light) {
            *dst = pack_argb(src);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil() as i64;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 <= r * r {
                    let (x, y) = (cx as i64 + dx, cy as i64 + dy);
                    if x >= 0 && y >= 0 {
                        self.set_pixel(x as usize, y as usize, color);
                    }
                }
            }
        }
    }

    /// DDA line, `thickness` pixels wide.
    pub fn draw_line(&mut self, a: (f32, f32), b: (f32, f32), thickness: usize, color: u32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.0 + dx * t;
            let y = a.1 + dy * t;
            for o in 0..thickness {
                let (px, py) = (x as i64 + o as i64, y as i64);
                if px >= 0 && py >= 0 {
                    self.set_pixel(px as usize, py as usize, color);
                }
            }
        }
    }

    /// 3×5 bitmap text, scaled up by `scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene snapshot handed over by the app
// ════════════════════════════════════════════════════════════════════════════

pub struct SceneView<'a> {
    pub field:    &'a ParticleField,
    pub hands:    &'a [HandObservation; MAX_HANDS],
    pub shake:    CameraShake,
    pub rotation: SceneRotation,
    pub time:     f32,
    pub caption:  &'a str,
    pub status:   &'a str,
}

/// Draw a full frame into `canvas`.
pub fn draw_scene(canvas: &mut Canvas, scene: &SceneView<'_>) {
    canvas.clear();

    let proj = Projection::new(scene.shake, canvas.width, SCENE_H.min(canvas.height));
    let rot = scene.rotation.matrix();
    let f = scene.field;
    for i in 0..f.len() {
        let p = rot * f.positions()[i];
        if let Some((sx, sy, depth)) = proj.project(p) {
            let pulse = 1.0 + (scene.time * 1.5 + p.x * 0.01).sin() * 0.1;
            let px = f.sizes()[i] * pulse * ATTENUATION / depth;
            canvas.splat(sx, sy, px * 0.5, f.colors()[i], SCENE_H);
        }
    }
    canvas.resolve();

    for (h, hand) in scene.hands.iter().enumerate() {
        if let Some(lm) = &hand.landmarks {
            draw_hand(canvas, lm, HAND_COLORS[h]);
        }
    }

    let (w, h) = (canvas.width, canvas.height);
    canvas.fill_rect(0, SCENE_H, w, h.saturating_sub(SCENE_H), STATUS_BG);
    canvas.draw_label(scene.caption, 10, SCENE_H + 4, LABEL_SCALE, 0xFFFFD700);
    canvas.draw_label(scene.status, 10 + 24 * 4 * LABEL_SCALE, SCENE_H + 4, LABEL_SCALE, 0xFFEEEEEE);
    canvas.draw_label(
        "mouse=move  F/2/3/4/P/N=pose (shift: 2nd hand)  T=text  +/-=particles  [/]=force  Q=quit",
        10, SCENE_H + 22, 1, 0xFF888888,
    );
}

/// Hand skeleton in mirrored image space.
fn draw_hand(canvas: &mut Canvas, lm: &HandLandmarks, color: u32) {
    let (w, h) = (canvas.width as f32, SCENE_H as f32);
    let at = |i: usize| {
        let p = lm.point(i);
        ((1.0 - p.x) * w, p.y * h)
    };
    for &(a, b) in HAND_CONNECTIONS.iter() {
        canvas.draw_line(at(a), at(b), 2, color);
    }
    for i in 0..lm.points().len() {
        let tip = i == THUMB_TIP || FINGER_TIPS.iter().any(|&(t, _)| t == i);
        let (x, y) = at(i);
        if tip {
            canvas.fill_disc(x, y, 4.0, TIP_COLOR);
        } else {
            canvas.fill_disc(x, y, 2.0, color);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    pointer: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new() -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Gesture Particles",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            canvas:  Canvas::new(WIN_W, WIN_H),
            pointer: None,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse and translate to commands.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut out = Vec::new();
        if !self.window.is_open() {
            out.push(UiCommand::Quit);
            return out;
        }

        let shift = self.window.is_key_down(Key::LeftShift)
                 || self.window.is_key_down(Key::RightShift);
        let hand = usize::from(shift);

        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            let cmd = match key {
                Key::Q | Key::Escape          => UiCommand::Quit,
                Key::T                        => UiCommand::PromptText,
                Key::Equal | Key::NumPadPlus  => UiCommand::MoreParticles,
                Key::Minus | Key::NumPadMinus => UiCommand::FewerParticles,
                Key::RightBracket             => UiCommand::Stronger,
                Key::LeftBracket              => UiCommand::Weaker,
                k => match pose_for_key(k) {
                    Some(pose) => UiCommand::Sim(SimInput::Pose { hand, pose }),
                    None       => continue,
                },
            };
            out.push(cmd);
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let p = (mx / WIN_W as f32, my / SCENE_H as f32);
            if self.pointer != Some(p) {
                self.pointer = Some(p);
                out.push(UiCommand::Sim(SimInput::Pointer { x: p.0, y: p.1 }));
            }
        }

        out
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &SceneView<'_>) {
        draw_scene(&mut self.canvas, scene);
        if let Err(e) = self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H) {
            log::warn!("frame not presented: {e}");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
