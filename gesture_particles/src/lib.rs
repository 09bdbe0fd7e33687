//! # gesture_particles
//!
//! Interactive shell around [`particle_field`]: a landmark source feeds hand
//! poses to the tracker, the simulation advances every frame, and a
//! software visualizer draws the particles with the hand skeletons on top.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard and mouse drive two
//!   synthetic hands whose landmarks go through the real classifier.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC
//!   and converts its joints to the 21-point landmark layout.  Falls back to
//!   simulation if the device cannot be opened.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Move hand 1; hand 2 mirrors it across the center line |
//! | `F` | Fist |
//! | `2` / `3` / `4` | Two, three, four fingers |
//! | `P` | Pinch |
//! | `N` | Hide the hand |
//! | `Shift` + pose key | Same, for the second hand |
//! | `T` | Type a new text string in the terminal |
//! | `+` / `-` | More / fewer particles |
//! | `]` / `[` | Stronger / weaker single-hand force |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod cli;
pub mod source;
pub mod visualizer;
