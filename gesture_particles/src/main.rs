//! gesture_particles: interactive entry point.

use clap::Parser;

use gesture_particles::app::run;
use gesture_particles::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.logger().init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Particles — hand-driven particle field        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = cli.to_app_config()?;

    if cfg.use_leap {
        println!("  Mode: LeapMotion hardware");
    } else if cfg!(feature = "leap") {
        println!("  Mode: Keyboard simulation  (--sim)");
    } else {
        println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    }
    let p = &cfg.field.particles;
    println!("  Particles: {} sphere + {} ring, {:?} layout", p.sphere_count, p.ring_count, p.shape);
    println!("  Text: \"{}\"", cfg.text);
    println!();
    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}
