//! Tunable constants for the particle field, loadable from JSON.
//!
//! Every section has a `Default` matching the stock look of the demo, and
//! every field is optional in a config file (`#[serde(default)]`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// ConfigError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Initial layout of the rest positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    /// Uniform scatter through a 1000 × 600 × 600 box.
    #[default]
    Scatter,
    /// Sphere of `sphere_radius` plus a flat ring between the ring radii.
    Saturn,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub sphere_count:      usize,
    pub ring_count:        usize,
    /// Base point size; per-particle sizes are scaled from this.
    pub size:              f32,
    pub sphere_radius:     f32,
    pub ring_inner_radius: f32,
    pub ring_outer_radius: f32,
    /// Spring-return blend per step toward the rest position.
    pub return_speed:      f32,
    pub shape:             ParticleShape,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed:              Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            sphere_count:      5000,
            ring_count:        3000,
            size:              10.0,
            sphere_radius:     350.0,
            ring_inner_radius: 400.0,
            ring_outer_radius: 600.0,
            return_speed:      0.012,
            shape:             ParticleShape::Scatter,
            seed:              None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Peak single-hand force at zero distance.
    pub strength:       f32,
    /// Single-hand influence radius in world units.
    pub attract_radius: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        ForceConfig { strength: 20.0, attract_radius: 300.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Exponential smoothing factor for hand positions, per inference result.
    pub smoothing:     f32,
    /// Landmark inference rate, independent of the render rate.
    pub detection_fps: f32,
}

impl Default for HandConfig {
    fn default() -> Self {
        HandConfig { smoothing: 0.18, detection_fps: 24.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Blend rate of the ring scale toward its target; compression uses half.
    pub transition_speed:       f32,
    pub camera_shake_intensity: f32,
    pub time_scale:             f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        EffectsConfig {
            transition_speed:       0.04,
            camera_shake_intensity: 6.0,
            time_scale:             1.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particles: ParticleConfig,
    pub forces:    ForceConfig,
    pub hand:      HandConfig,
    pub effects:   EffectsConfig,
}

impl FieldConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let cfg: FieldConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        if p.sphere_count + p.ring_count == 0 {
            return Err(invalid("particles", "sphere_count + ring_count must be > 0"));
        }
        positive("particles.size", p.size)?;
        positive("particles.sphere_radius", p.sphere_radius)?;
        positive("particles.ring_inner_radius", p.ring_inner_radius)?;
        if p.ring_outer_radius <= p.ring_inner_radius {
            return Err(invalid(
                "particles.ring_outer_radius",
                format!("{} must exceed ring_inner_radius {}", p.ring_outer_radius, p.ring_inner_radius),
            ));
        }
        unit_rate("particles.return_speed", p.return_speed)?;
        positive("forces.attract_radius", self.forces.attract_radius)?;
        if !self.forces.strength.is_finite() {
            return Err(invalid("forces.strength", "must be finite"));
        }
        unit_rate("hand.smoothing", self.hand.smoothing)?;
        positive("hand.detection_fps", self.hand.detection_fps)?;
        unit_rate("effects.transition_speed", self.effects.transition_speed)?;
        if self.effects.camera_shake_intensity < 0.0 {
            return Err(invalid("effects.camera_shake_intensity", "must be >= 0"));
        }
        positive("effects.time_scale", self.effects.time_scale)?;
        Ok(())
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be a positive number", v)))
    }
}

/// Blend rates live in (0, 1].
fn unit_rate(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be in (0, 1]", v)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        FieldConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FieldConfig =
            serde_json::from_str(r#"{ "forces": { "strength": 35 }, "particles": { "shape": "saturn" } }"#)
                .unwrap();
        assert_eq!(cfg.forces.strength, 35.0);
        assert_eq!(cfg.forces.attract_radius, 300.0);
        assert_eq!(cfg.particles.shape, ParticleShape::Saturn);
        assert_eq!(cfg.particles.sphere_count, 5000);
        assert_eq!(cfg.hand, HandConfig::default());
    }

    #[test]
    fn zero_particles_rejected() {
        let mut cfg = FieldConfig::default();
        cfg.particles.sphere_count = 0;
        cfg.particles.ring_count = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { field: "particles", .. })));
    }

    #[test]
    fn inverted_ring_radii_rejected() {
        let mut cfg = FieldConfig::default();
        cfg.particles.ring_outer_radius = 100.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "particles.ring_outer_radius", .. })
        ));
    }

    #[test]
    fn smoothing_out_of_range_rejected() {
        let mut cfg = FieldConfig::default();
        cfg.hand.smoothing = 1.5;
        assert!(cfg.validate().is_err());
        cfg.hand.smoothing = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "particles": {{ "sphere_count": 10, "ring_count": 5, "seed": 7 }} }}"#).unwrap();
        let cfg = FieldConfig::load(f.path()).unwrap();
        assert_eq!(cfg.particles.sphere_count, 10);
        assert_eq!(cfg.particles.seed, Some(7));
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(matches!(FieldConfig::load(f.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = FieldConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
