//! # 2D Active Swimmers
//!
//! A flat system of self-propelled particles whose headings random-walk in
//! the plane. Prints the mean heading drift every 1000 steps.
//!
//! Run with: `cargo run --example active_2d --release`

use abpe::prelude::*;

fn main() {
    env_logger::init();

    let n = 10_000;
    let steps = 5_000;

    let mut sim = Simulation::new(n)
        .with_dimensions(Dimensions::Two)
        .with_spawner(7, |ctx| {
            let tag = ctx.tag;
            let angle = ctx.random_angle();
            let r = ctx.random_range(0.0, 20.0);
            Particle::at(tag, DVec3::new(r * angle.cos(), r * angle.sin(), 0.0))
        });

    let active = ActiveForce::builder(Group::all(n), 13)
        .uniform_force(DVec3::new(2.0, 0.0, 0.0))
        .rotation_diff(3.0)
        .build()
        .expect("valid active force configuration");
    let id = sim.add_force(active).expect("group fits the system");

    println!("=== ABPE 2D swimmers ===");
    println!("Particles: {}   D_r: 3.0   dt: {}", n, sim.dt());

    for block in 0..(steps / 1000) {
        sim.run(1000).expect("step failed");

        let mean: DVec3 = sim
            .member_forces(id)
            .expect("live handle")
            .iter()
            .copied()
            .sum::<DVec3>()
            / n as f64;
        println!(
            "step {:>5}  mean force ({:+.4}, {:+.4})  avg step {:.3} ms",
            (block + 1) * 1000,
            mean.x,
            mean.y,
            sim.average_step_ms()
        );
    }
}
