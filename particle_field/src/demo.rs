//! Headless walk through every gesture effect, printing field statistics.
//!
//! ```text
//! cargo run -p particle_field --bin field_demo [config.json]
//! RUST_LOG=debug cargo run -p particle_field --bin field_demo
//! ```

use env_logger::Env;
use glam::Vec3;
use particle_field::landmarks::LANDMARK_COUNT;
use particle_field::{
    FieldConfig, Gesture, HandLandmarks, HandObservation, HandTracker, Landmark, Simulation,
};

const DT: f32 = 1.0 / 60.0;

fn tracker(hands: &[(Vec3, Gesture)], smoothing: f32) -> HandTracker {
    let lm = HandLandmarks::new([Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT]);
    let mut obs: [HandObservation; 2] = Default::default();
    for (slot, &(pos, g)) in obs.iter_mut().zip(hands) {
        *slot = HandObservation::present(pos, g, lm);
    }
    HandTracker::from_observations(obs, smoothing)
}

fn stats(label: &str, sim: &Simulation) {
    let f = sim.field();
    let n = f.len().max(1) as f32;
    let mean_r: f32 = f.positions().iter().map(|p| p.length()).sum::<f32>() / n;
    let mean_v: f32 = f.velocities().iter().map(|v| v.length()).sum::<f32>() / n;
    let mean_c: Vec3 = f.colors().iter().copied().sum::<Vec3>() / n;
    let drift: f32 = f.positions().iter().zip(f.original())
        .map(|(p, o)| p.distance(*o))
        .sum::<f32>() / n;
    println!(
        "   {:<28} |p| {:>7.1}  |v| {:>6.2}  drift {:>6.1}  rgb ({:.2}, {:.2}, {:.2})  ring×{:.2}  comp {:.2}",
        label, mean_r, mean_v, drift, mean_c.x, mean_c.y, mean_c.z,
        sim.ring_scale(), sim.compression(),
    );
}

fn run(sim: &mut Simulation, label: &str, t: &HandTracker, frames: usize) {
    let mut report = None;
    for _ in 0..frames {
        report = Some(sim.step(DT, t));
    }
    if let Some(r) = report {
        println!("   mode {:?}, combined {}, shake ({:.2}, {:.2}), trail {}",
                 r.mode, r.combined.label(), r.camera_shake.x, r.camera_shake.y, r.trail_len);
    }
    stats(label, sim);
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut cfg = match std::env::args().nth(1) {
        Some(path) => match FieldConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{path}: {e}");
                std::process::exit(1);
            }
        },
        None => FieldConfig::default(),
    };
    cfg.particles.seed.get_or_insert(42);
    let smoothing = cfg.hand.smoothing;
    let mut sim = match Simulation::new(cfg) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("invalid config: {e}");
            std::process::exit(1);
        }
    };

    println!("\n=== Gesture Particle Field Demo ===\n");
    println!("   {} particles ({} sphere, {} ring)\n",
             sim.field().len(), sim.field().sphere_count(), sim.field().ring_count());

    let idle = HandTracker::new(smoothing);
    let left  = Vec3::new(-150.0, 0.0, 0.0);
    let right = Vec3::new(150.0, 0.0, 0.0);

    // ── 1. Rest ───────────────────────────────────────────────────────────
    println!("1. Idle");
    run(&mut sim, "rest", &idle, 30);
    println!();

    // ── 2. Single-hand forces ─────────────────────────────────────────────
    println!("2. Single hand");
    run(&mut sim, "fist (attract)", &tracker(&[(left, Gesture::Fist)], smoothing), 60);
    run(&mut sim, "open (repel)",   &tracker(&[(left, Gesture::Open)], smoothing), 60);
    run(&mut sim, "point (beam)",   &tracker(&[(left, Gesture::Point)], smoothing), 60);
    run(&mut sim, "release",        &idle, 240);
    println!();

    // ── 3. Formations ─────────────────────────────────────────────────────
    println!("3. Formations");
    sim.set_text("HELLO");
    println!("   text cloud \"{}\": {} points", sim.text().text(), sim.text().len());
    run(&mut sim, "three fingers (text)", &tracker(&[(left, Gesture::ThreeFingers)], smoothing), 120);
    run(&mut sim, "two fingers (wave)",   &tracker(&[(left, Gesture::TwoFingers)], smoothing), 120);
    run(&mut sim, "release",              &idle, 240);
    println!();

    // ── 4. Drawing ────────────────────────────────────────────────────────
    println!("4. Pinch drawing");
    for k in 0..90 {
        let a = k as f32 * 0.07;
        let pos = Vec3::new(a.cos() * 250.0, a.sin() * 150.0, 0.0);
        sim.step(DT, &tracker(&[(pos, Gesture::Pinch)], smoothing));
    }
    stats("circle drawn", &sim);
    run(&mut sim, "trail fading", &idle, 120);
    println!();

    // ── 5. Two-hand effects ───────────────────────────────────────────────
    println!("5. Two hands");
    let close = tracker(&[(Vec3::new(-60.0, 0.0, 0.0), Gesture::Fist),
                          (Vec3::new(60.0, 0.0, 0.0), Gesture::Fist)], smoothing);
    let far   = tracker(&[(Vec3::new(-500.0, 0.0, 0.0), Gesture::Fist),
                          (Vec3::new(500.0, 0.0, 0.0), Gesture::Fist)], smoothing);
    let open  = tracker(&[(left, Gesture::Open), (right, Gesture::Open)], smoothing);
    run(&mut sim, "fists close (gather)", &close, 90);
    run(&mut sim, "fists far (ring out)", &far, 90);
    run(&mut sim, "both open (surge)",    &open, 30);
    run(&mut sim, "release",              &idle, 300);
    println!();

    // ── 6. Explosion ──────────────────────────────────────────────────────
    println!("6. Four fingers");
    run(&mut sim, "explosion", &tracker(&[(left, Gesture::FourFingers)], smoothing), 20);
    run(&mut sim, "recovery",  &idle, 600);
    println!();
}
