//! # Constant Push
//!
//! The simpler engine in the family: a constant force on a group, retargeted
//! mid-run with `force_mut` + `set_group_force`, plus enable/disable toggling
//! and a periodic action reporting the accumulated net force.
//!
//! Run with: `cargo run --example constant_push --release`

use abpe::prelude::*;

struct Report;

impl Action for Report {
    fn act(&mut self, timestep: u64, particles: &mut ParticleData) {
        let total: DVec3 = particles.net_forces().iter().copied().sum();
        println!("step {:>4}  net force total {:?}", timestep, total);
    }
}

fn main() {
    env_logger::init();

    let n = 8;
    let mut sim = Simulation::new(n);
    sim.add_action(Trigger::periodic(100), Report);

    let constant =
        ConstantForce::new(Group::all(n), DVec3::new(0.4, 1.0, 0.5)).expect("non-empty group");
    let id = sim.add_force(constant).expect("group fits the system");

    sim.run(125).expect("step failed");

    // retarget the live engine: the back half now gets pushed the other way
    let back = Group::new((n as u32 / 2..n as u32).collect(), n).expect("valid tags");
    sim.force_mut::<ConstantForce>(id)
        .expect("live constant-force handle")
        .set_group_force(&back, DVec3::new(-0.4, -1.0, -0.5))
        .expect("subset of the engine group");

    sim.run(125).expect("step failed");

    println!("disabling {}", sim.force_name(id).expect("live handle"));
    sim.disable(id, false).expect("live handle");
    sim.run(250).expect("step failed");

    println!("re-enabling");
    sim.enable(id).expect("live handle");
    sim.run(250).expect("step failed");
}
