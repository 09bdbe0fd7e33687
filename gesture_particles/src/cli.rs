//! Command line options and how they fold into [`AppConfig`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use env_logger::Env;

use particle_field::{FieldConfig, ParticleCounts, ParticleShape};

use crate::app::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_particles", version, about = "Hand-gesture driven particle field")]
pub struct Cli {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Particles in the sphere subset
    #[arg(long)]
    pub sphere_count: Option<usize>,

    /// Particles in the ring subset
    #[arg(long)]
    pub ring_count: Option<usize>,

    /// Total particles, split two-thirds sphere / one-third ring
    #[arg(long, conflicts_with_all = ["sphere_count", "ring_count"])]
    pub total: Option<usize>,

    /// Single-hand force strength
    #[arg(long)]
    pub strength: Option<f32>,

    /// Text shown by the three-finger gesture
    #[arg(long, default_value = "HELLO")]
    pub text: String,

    /// Rest layout
    #[arg(long, value_enum)]
    pub shape: Option<ShapeArg>,

    /// Fixed RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use simulated hands even when built with LeapMotion support
    #[arg(long)]
    pub sim: bool,

    /// Simulated inference time in milliseconds
    #[arg(long, default_value_t = 12)]
    pub latency_ms: u64,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    Scatter,
    Saturn,
}

impl From<ShapeArg> for ParticleShape {
    fn from(s: ShapeArg) -> Self {
        match s {
            ShapeArg::Scatter => ParticleShape::Scatter,
            ShapeArg::Saturn  => ParticleShape::Saturn,
        }
    }
}

impl Cli {
    /// Load the config file (if any), apply overrides and validate.
    pub fn to_app_config(&self) -> anyhow::Result<AppConfig> {
        let mut field = match &self.config {
            Some(path) => FieldConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => FieldConfig::default(),
        };

        let p = &mut field.particles;
        if let Some(total) = self.total {
            let counts = ParticleCounts::from_total(total);
            p.sphere_count = counts.sphere;
            p.ring_count = counts.ring;
        }
        if let Some(n) = self.sphere_count { p.sphere_count = n; }
        if let Some(n) = self.ring_count   { p.ring_count = n; }
        if let Some(s) = self.shape        { p.shape = s.into(); }
        if let Some(s) = self.seed         { p.seed = Some(s); }
        if let Some(s) = self.strength     { field.forces.strength = s; }

        field.validate().context("invalid configuration")?;

        Ok(AppConfig {
            field,
            text:        self.text.clone(),
            sim_latency: Duration::from_millis(self.latency_ms),
            use_leap:    cfg!(feature = "leap") && !self.sim,
        })
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        if self.verbose > 0 {
            Some(match self.verbose {
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            })
        } else if self.quiet {
            Some(log::LevelFilter::Error)
        } else {
            None
        }
    }

    /// Logger honouring `RUST_LOG` (default `warn`), with `-v`/`-q` on top.
    pub fn logger(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
        if let Some(level) = self.log_level() {
            builder.filter_level(level);
        }
        builder
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

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gesture_particles").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn defaults() {
        let cfg = parse(&[]).to_app_config().expect("config");
        assert_eq!(cfg.field, FieldConfig::default());
        assert_eq!(cfg.text, "HELLO");
        assert_eq!(cfg.sim_latency, Duration::from_millis(12));
    }

    #[test]
    fn total_splits_counts() {
        let cfg = parse(&["--total", "3000"]).to_app_config().expect("config");
        assert_eq!(cfg.field.particles.sphere_count, 2010);
        assert_eq!(cfg.field.particles.ring_count, 990);
    }

    #[test]
    fn total_conflicts_with_counts() {
        let r = Cli::try_parse_from(["gesture_particles", "--total", "10", "--ring-count", "4"]);
        assert!(r.is_err());
    }

    #[test]
    fn overrides_apply() {
        let cli = parse(&["--shape", "saturn", "--seed", "9", "--strength", "35", "--text", "HI"]);
        let cfg = cli.to_app_config().expect("config");
        assert_eq!(cfg.field.particles.shape, ParticleShape::Saturn);
        assert_eq!(cfg.field.particles.seed, Some(9));
        assert_eq!(cfg.field.forces.strength, 35.0);
        assert_eq!(cfg.text, "HI");
    }

    #[test]
    fn zero_particles_rejected() {
        let cli = parse(&["--sphere-count", "0", "--ring-count", "0"]);
        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn config_file_then_flags() {
        let mut f = tempfile::NamedTempFile::new().expect("tmp");
        write!(f, r#"{{"particles": {{"sphere_count": 100, "ring_count": 50}}}}"#).expect("write");
        let path = f.path().to_str().expect("utf8").to_string();
        let cfg = parse(&["--config", &path, "--ring-count", "70"]).to_app_config().expect("config");
        assert_eq!(cfg.field.particles.sphere_count, 100);
        assert_eq!(cfg.field.particles.ring_count, 70);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = parse(&["--config", "/nonexistent/field.json"]);
        let err = cli.to_app_config().expect_err("missing file");
        assert!(format!("{err:#}").contains("loading config"));
    }

    #[test]
    fn verbosity() {
        assert_eq!(parse(&[]).log_level(), None);
        assert_eq!(parse(&["-v"]).log_level(), Some(log::LevelFilter::Info));
        assert_eq!(parse(&["-vvv"]).log_level(), Some(log::LevelFilter::Trace));
        assert_eq!(parse(&["-q"]).log_level(), Some(log::LevelFilter::Error));
    }

    #[test]
    fn verbosity_reaches_the_logger() {
        use log::Log;

        let at = |level| log::Metadata::builder().level(level).target("gesture_particles::app").build();

        let loud = parse(&["-vv"]).logger().build();
        assert!(loud.enabled(&at(log::Level::Info)));
        assert!(loud.enabled(&at(log::Level::Debug)));
        assert!(!loud.enabled(&at(log::Level::Trace)));

        let quiet = parse(&["-q"]).logger().build();
        assert!(quiet.enabled(&at(log::Level::Error)));
        assert!(!quiet.enabled(&at(log::Level::Warn)));
    }
}
