//! Particle buffers.
//!
//! Struct-of-arrays layout so the renderer can upload positions, colors and
//! sizes directly.  Particles `0..sphere_count` form the sphere subset and
//! `sphere_count..` the ring subset.  The simulation is the only writer.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{ParticleConfig, ParticleShape};
use crate::math::hsl_to_rgb;

const RING_BASE_COLOR:   Vec3 = Vec3::new(0.85, 0.92, 1.0);
const SPHERE_BASE_COLOR: Vec3 = Vec3::new(1.0, 0.85, 0.65);
const RING_SIZE_FACTOR:   f32 = 0.35;
const SPHERE_SIZE_FACTOR: f32 = 0.6;

/// Half-extents of the scatter box.
const SCATTER_EXTENT: Vec3 = Vec3::new(500.0, 300.0, 300.0);

// ════════════════════════════════════════════════════════════════════════════
// ParticleCounts
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleCounts {
    pub sphere: usize,
    pub ring:   usize,
}

impl ParticleCounts {
    /// Split a total two-thirds / one-third between sphere and ring.  The
    /// ring takes the remainder, so the parts always add up to `total`.
    pub fn from_total(total: usize) -> Self {
        let sphere = (total as f64 * 0.67).floor() as usize;
        ParticleCounts { sphere, ring: total - sphere }
    }

    pub fn total(&self) -> usize { self.sphere + self.ring }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ParticleField {
    pub(crate) positions:  Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) colors:     Vec<Vec3>,
    pub(crate) sizes:      Vec<f32>,
    /// Rest shape; written only here, at creation.
    original:     Vec<Vec3>,
    sphere_count: usize,
    base_size:    f32,
}

impl ParticleField {
    /// `cfg` must already be validated: an empty ring annulus panics.
    pub fn new<R: Rng + ?Sized>(cfg: &ParticleConfig, rng: &mut R) -> Self {
        let counts = ParticleCounts { sphere: cfg.sphere_count, ring: cfg.ring_count };
        let total = counts.total();

        let mut original = Vec::with_capacity(total);
        let mut colors   = Vec::with_capacity(total);
        let mut sizes    = Vec::with_capacity(total);

        for i in 0..total {
            let ring = i >= counts.sphere;
            original.push(match cfg.shape {
                ParticleShape::Scatter => scatter_point(rng),
                ParticleShape::Saturn if ring => ring_point(cfg, rng),
                ParticleShape::Saturn => sphere_point(cfg.sphere_radius, rng),
            });
            sizes.push(cfg.size * (0.5 + rng.random::<f32>() * 0.7));
            colors.push(hsl_to_rgb(
                rng.random_range(0.5..0.8),
                rng.random_range(0.3..0.7),
                rng.random_range(0.7..1.0),
            ));
        }

        log::info!(
            "particle field built: {} sphere + {} ring ({:?})",
            counts.sphere, counts.ring, cfg.shape
        );

        ParticleField {
            positions:    original.clone(),
            velocities:   vec![Vec3::ZERO; total],
            colors,
            sizes,
            original,
            sphere_count: counts.sphere,
            base_size:    cfg.size,
        }
    }

    pub fn len(&self)          -> usize { self.positions.len() }
    pub fn is_empty(&self)     -> bool  { self.positions.is_empty() }
    pub fn sphere_count(&self) -> usize { self.sphere_count }
    pub fn ring_count(&self)   -> usize { self.len() - self.sphere_count }

    pub fn counts(&self) -> ParticleCounts {
        ParticleCounts { sphere: self.sphere_count, ring: self.ring_count() }
    }

    #[inline]
    pub fn is_ring(&self, i: usize) -> bool { i >= self.sphere_count }

    /// Color the particle relaxes back to when no gesture is active.
    pub fn base_color(&self, i: usize) -> Vec3 {
        if self.is_ring(i) { RING_BASE_COLOR } else { SPHERE_BASE_COLOR }
    }

    /// Size the particle relaxes back to when no gesture is active.
    pub fn base_size(&self, i: usize) -> f32 {
        self.base_size * if self.is_ring(i) { RING_SIZE_FACTOR } else { SPHERE_SIZE_FACTOR }
    }

    pub fn point_size(&self) -> f32 { self.base_size }

    // ── read-only views for the renderer ─────────────────────────────────

    pub fn positions(&self)  -> &[Vec3] { &self.positions }
    pub fn velocities(&self) -> &[Vec3] { &self.velocities }
    pub fn colors(&self)     -> &[Vec3] { &self.colors }
    pub fn sizes(&self)      -> &[f32]  { &self.sizes }
    pub fn original(&self)   -> &[Vec3] { &self.original }
}

fn scatter_point<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * 2.0 * SCATTER_EXTENT.x,
        (rng.random::<f32>() - 0.5) * 2.0 * SCATTER_EXTENT.y,
        (rng.random::<f32>() - 0.5) * 2.0 * SCATTER_EXTENT.z,
    )
}

/// Uniform point inside a ball.
fn sphere_point<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let cos_phi: f32 = rng.random_range(-1.0..1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
    let r = radius * rng.random::<f32>().cbrt();
    Vec3::new(r * sin_phi * theta.cos(), r * cos_phi, r * sin_phi * theta.sin())
}

/// Point on the equatorial annulus, with a little vertical thickness.
fn ring_point<R: Rng + ?Sized>(cfg: &ParticleConfig, rng: &mut R) -> Vec3 {
    let angle = rng.random::<f32>() * TAU;
    let r = rng.random_range(cfg.ring_inner_radius..cfg.ring_outer_radius);
    let y = (rng.random::<f32>() - 0.5) * 10.0;
    Vec3::new(r * angle.cos(), y, r * angle.sin())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
