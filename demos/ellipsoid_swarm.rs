//! # Ellipsoid Swarm
//!
//! Active particles confined to the surface of a 3:4:5 ellipsoid. Their
//! propulsion directions diffuse but are projected back into the local
//! tangent plane every step.
//!
//! Run with: `cargo run --example ellipsoid_swarm --release`

use abpe::prelude::*;

fn main() {
    env_logger::init();

    let n = 2_000;
    let surface = ConstraintSurface::ellipsoid(DVec3::ZERO, 3.0, 4.0, 5.0)
        .expect("positive semi-axes");

    // spawn on the surface, away from the poles
    let mut sim = Simulation::new(n).with_spawner(3, |ctx| {
        let theta = ctx.random_angle();
        let z = ctx.random_range(-0.8, 0.8);
        let r = (1.0f64 - z * z).sqrt();
        Particle::at(
            ctx.tag,
            DVec3::new(3.0 * r * theta.cos(), 4.0 * r * theta.sin(), 5.0 * z),
        )
    });

    let active = ActiveForce::builder(Group::all(n), 7)
        .uniform_force(DVec3::new(1.0, 2.0, 3.0))
        .rotation_diff(100.0)
        .constraint(surface.clone())
        .build()
        .expect("valid active force configuration");
    let id = sim.add_force(active).expect("group fits the system");

    println!("=== ABPE ellipsoid swarm ===");
    println!("Particles: {}   surface: ellipsoid (3, 4, 5)", n);

    sim.run(2_000).expect("step failed");

    // report the worst normal leakage across the swarm
    let mut worst: f64 = 0.0;
    for (slot, f) in sim.member_forces(id).expect("live handle").iter().enumerate() {
        let pos = sim.particles().get(slot as u32).position;
        let leak = f.dot(surface.normal_at(pos)).abs();
        worst = worst.max(leak);
    }
    println!("steps: {}   max |f . n|: {:.3e}", sim.timestep(), worst);
    println!("avg step: {:.3} ms", sim.average_step_ms());

    let ms = sim.benchmark(id, 100).expect("live handle");
    println!("benchmark: {:.4} ms per compute", ms);
}
