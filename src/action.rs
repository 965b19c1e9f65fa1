//! Custom actions bound to step triggers.
//!
//! An action is a user-supplied object the simulation invokes at selected
//! step boundaries, before the force engines run. Actions get mutable access
//! to the particle data, so they can serve as tuners, steppers of external
//! state, or measurement hooks.
//!
//! The lifecycle is attach / act / detach: `attach` fires once when the
//! action is registered, `act` at every triggered step, and `detach` when
//! the action is removed from the simulation.
//!
//! # Example
//!
//! ```
//! use abpe::prelude::*;
//!
//! struct Recenter;
//!
//! impl Action for Recenter {
//!     fn act(&mut self, _timestep: u64, particles: &mut ParticleData) {
//!         let n = particles.len() as f64;
//!         let com: DVec3 = particles.particles().iter().map(|p| p.position).sum::<DVec3>() / n;
//!         for p in particles.particles_mut() {
//!             p.position -= com;
//!         }
//!     }
//! }
//!
//! let mut sim = Simulation::new(10);
//! sim.add_action(Trigger::periodic(100), Recenter);
//! ```

use crate::particle::ParticleData;

/// A user-defined operation invoked at triggered step boundaries.
pub trait Action: Send {
    /// Called once when the action is registered with a simulation.
    fn attach(&mut self, _particles: &ParticleData) {}

    /// Called at every step the trigger selects, before forces run.
    fn act(&mut self, timestep: u64, particles: &mut ParticleData);

    /// Called when the action is removed from the simulation.
    fn detach(&mut self) {}
}

/// Decides at which timesteps an action runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Every step.
    Always,
    /// Every `period` steps, starting at step `phase`.
    Periodic {
        /// Number of steps between firings. Zero never fires.
        period: u64,
        /// First step at which the trigger fires.
        phase: u64,
    },
}

impl Trigger {
    /// A periodic trigger with phase zero.
    pub fn periodic(period: u64) -> Self {
        Trigger::Periodic { period, phase: 0 }
    }

    /// True if the trigger selects `timestep`.
    pub fn fires_at(&self, timestep: u64) -> bool {
        match *self {
            Trigger::Always => true,
            Trigger::Periodic { period, phase } => {
                period != 0 && timestep >= phase && (timestep - phase) % period == 0
            }
        }
    }
}
