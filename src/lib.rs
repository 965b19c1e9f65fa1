//! # ABPE - Active Brownian Particle Engine
//!
//! Deterministic active-matter force computation with a simple, declarative API.
//!
//! ABPE computes self-propulsion forces for groups of particles: each particle
//! carries a constant-magnitude force along a persistent orientation that
//! evolves by rotational Brownian motion. All randomness comes from
//! per-(particle, step) counter-based streams, so trajectories are
//! bit-reproducible regardless of thread count or execution order.
//!
//! ## Quick Start
//!
//! ```
//! use abpe::prelude::*;
//!
//! let n = 100;
//! let mut sim = Simulation::new(n).with_spawner(1, |ctx| {
//!     let tag = ctx.tag;
//!     Particle::at(tag, ctx.random_in_sphere(5.0))
//! });
//!
//! let active = ActiveForce::builder(Group::all(n), 13)
//!     .uniform_force(DVec3::new(3.0, 0.0, 0.0))
//!     .rotation_diff(1.0)
//!     .build()
//!     .unwrap();
//! let id = sim.add_force(active).unwrap();
//!
//! sim.run(100).unwrap();
//! println!("net force on 0: {:?}", sim.net_force(0));
//! println!("avg step: {:.3} ms", sim.average_step_ms());
//! # let _ = id;
//! ```
//!
//! ## Core Concepts
//!
//! ### Force engines
//!
//! A [`Simulation`] owns an ordered collection of force engines. Each step,
//! every enabled engine refreshes its per-member force buffer and the
//! simulation adds those buffers into the shared net-force accumulator. Two
//! engines ship with the crate:
//!
//! - [`ActiveForce`] - self-propulsion with rotational diffusion, optional
//!   orientation link and ellipsoid constraint
//! - [`ConstantForce`] - a fixed vector per group member, with
//!   [`set_force`](forces::ConstantForce::set_force) /
//!   [`set_group_force`](forces::ConstantForce::set_group_force) mutators
//!   reachable mid-run through
//!   [`force_mut`](simulation::Simulation::force_mut)
//!
//! Engines can be disabled without losing their configuration, either
//! completely or in a "keep logging" mode that retains their force and
//! energy bookkeeping while removing them from the dynamics.
//!
//! ### Groups
//!
//! A [`Group`] is an ordered, stable set of particle tags. Engines act on
//! groups, so different subsets of the system can carry different forces.
//!
//! ### Determinism
//!
//! Every random draw is keyed by `(engine seed, particle tag, timestep)`.
//! There is no shared generator state, which makes the per-particle update
//! embarrassingly parallel: the engine uses rayon internally and produces
//! bit-identical results at any thread count.
//!
//! ### Custom actions
//!
//! User-defined [`Action`] objects can be attached to the simulation and run
//! at trigger-selected step boundaries, before forces are computed - useful
//! for tuners and measurement hooks.
//!
//! ## Feature Overview
//!
//! | Category | Types |
//! |----------|-------|
//! | Forces | [`ActiveForce`], [`ConstantForce`] |
//! | Geometry | [`ConstraintSurface`] (ellipsoid, plane) |
//! | Ownership | [`Simulation`], [`Group`], [`ParticleData`] |
//! | Hooks | [`Action`], [`Trigger`] |
//! | Randomness | [`rng::ParticleStream`], [`SpawnContext`] |

pub mod action;
pub mod active;
pub mod clock;
pub mod constraint;
pub mod error;
pub mod forces;
pub mod group;
pub mod particle;
pub mod rng;
pub mod simulation;
pub mod spawn;

pub use action::{Action, Trigger};
pub use active::{ActiveForce, ActiveForceBuilder};
pub use clock::StepClock;
pub use constraint::ConstraintSurface;
pub use error::{ConfigError, SimulationError};
pub use forces::{ConstantForce, Dimensions, ForceCompute, StepContext};
pub use glam::{DQuat, DVec3};
pub use group::Group;
pub use particle::{Particle, ParticleData};
pub use simulation::{ActionId, ForceId, Simulation};
pub use spawn::SpawnContext;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```
/// use abpe::prelude::*;
/// ```
///
/// This imports the simulation builder, both force engines, groups,
/// constraint surfaces, actions, and the glam `DVec3`/`DQuat` math types.
pub mod prelude {
    pub use crate::action::{Action, Trigger};
    pub use crate::active::ActiveForce;
    pub use crate::constraint::ConstraintSurface;
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::forces::{ConstantForce, Dimensions, ForceCompute, StepContext};
    pub use crate::group::Group;
    pub use crate::particle::{Particle, ParticleData};
    pub use crate::simulation::{ActionId, ForceId, Simulation};
    pub use crate::spawn::SpawnContext;
    pub use crate::{DQuat, DVec3};
}
