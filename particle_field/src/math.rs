//! Scalar helpers shared by the simulation and the renderer.

use glam::Vec3;

/// Linear interpolation. `t` = 0.0 → `a`, `t` = 1.0 → `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hash-style pseudo-noise in `(-1, 1)`.
///
/// The remainder keeps the sign of the scaled sine, so negative inputs give
/// negative noise.  Deterministic for the same coordinates.
pub fn noise(x: f32, y: f32, z: f32) -> f32 {
    let p = x * 12.9898 + y * 78.233 + z * 37.719;
    (p.sin() * 43758.5453) % 1.0
}

/// Noise interpolated along x between the two neighbouring lattice points.
pub fn smooth_noise(x: f32, y: f32, z: f32) -> f32 {
    let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
    let n1 = noise(fx, fy, fz);
    let n2 = noise(fx + 1.0, fy, fz);
    lerp(n1, n2, x - fx)
}

/// Unit vector along `v`; a zero-length vector is divided by 1 instead.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    v / if len == 0.0 { 1.0 } else { len }
}

/// Move every channel of `color` toward `target` by `t`.
#[inline]
pub fn blend_toward(color: &mut Vec3, target: Vec3, t: f32) {
    *color = color.lerp(target, t);
}

/// HSL (all components 0.0–1.0) → linear RGB triple.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Float RGB → packed ARGB (0xAARRGGBB, A=0xFF).  Channels are clamped.
pub fn pack_argb(rgb: Vec3) -> u32 {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u32;
    0xFF00_0000 | (c(rgb.x) << 16) | (c(rgb.y) << 8) | c(rgb.z)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
