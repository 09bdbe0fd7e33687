//! # particle_field
//!
//! Hand-gesture driven particle simulation.  Hand-landmark inference happens
//! elsewhere; this crate takes the 21 landmark points per hand, classifies
//! them into discrete gestures, and advances a few thousand particles one
//! frame at a time in response.
//!
//! ## Gesture → Effect mapping
//!
//! | Gesture | Hand | Effect |
//! |---|---|---|
//! | Four fingers | Either | Explosion: radial impulse, fiery colors, camera shake |
//! | Three fingers | Either | Particles form the current text string |
//! | Two fingers | Either | Deterministic wave around the rest shape |
//! | Pinch | Either | Draw a trail; particles flow along it |
//! | Fist | One | Attract particles near the hand |
//! | Open | One | Repel particles near the hand |
//! | Point | One | Lateral beam, particles grow |
//! | Fists close together | Both | Gather to the center and compress |
//! | Fists far apart | Both | Ring expands |
//! | Both open | Both | Massive explosion, sparks, ring blows out |
//!
//! ## Layers
//!
//! * [`math`]: scalar helpers and pseudo-noise.
//! * [`landmarks`] / [`gesture`]: landmark geometry and classification.
//! * [`hand`]: smoothed per-hand observations and the combined gesture.
//! * [`schedule`]: detection throttle with a busy flag.
//! * [`trail`] / [`text`]: formation targets.
//! * [`field`]: the particle buffers.
//! * [`simulation`]: the per-frame force field over all of the above.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use particle_field::{FieldConfig, HandTracker, Simulation};
//!
//! # fn main() -> Result<(), particle_field::ConfigError> {
//! let cfg = FieldConfig::default();
//! let mut tracker = HandTracker::new(cfg.hand.smoothing);
//! let mut sim = Simulation::new(cfg)?;
//! sim.set_text("HELLO");
//!
//! // Each inference result:  tracker.apply(&hands);
//! // Each render frame:
//! let report = sim.step(0.016, &tracker);
//! let _positions = sim.field().positions();
//! # let _ = report;
//! # tracker.apply(&[]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod field;
pub mod gesture;
pub mod hand;
pub mod landmarks;
pub mod math;
pub mod schedule;
pub mod simulation;
pub mod text;
pub mod trail;

pub use config::{ConfigError, FieldConfig, ParticleShape};
pub use field::{ParticleCounts, ParticleField};
pub use gesture::{classify, combine, CombinedGesture, Gesture};
pub use hand::{HandObservation, HandTracker};
pub use landmarks::{HandLandmarks, Landmark};
pub use schedule::DetectionThrottle;
pub use simulation::{CameraShake, ForceMode, Simulation, StepReport};
pub use text::{BitmapFont, TextCloud, TextRaster};
pub use trail::{DrawingTrail, TrailPoint};
