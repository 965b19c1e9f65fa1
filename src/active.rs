//! Active force engine: self-propulsion with rotational diffusion.
//!
//! Each member of the engine's group carries a constant-magnitude force along
//! a persistent unit direction. Every step the direction takes one increment
//! of rotational Brownian motion: the angular displacement has zero mean and
//! variance `2 * D_r * dt`, where `D_r` is the rotational diffusion constant.
//! In 2D the direction angle is rotated by `sqrt(2 * D_r * dt) * G` with `G`
//! a unit-variance Gaussian sample; in 3D the direction is rotated by the
//! same angle about an axis orthogonal to both the current direction and an
//! independently drawn uniform random unit vector, which keeps the update
//! norm-preserving. The persistence length of a member's path is `v0 / D_r`.
//!
//! With the orientation link enabled, the direction is instead slaved to the
//! particle's rigid-body orientation quaternion and no stochastic step runs.
//! With an ellipsoid constraint, the updated direction is projected onto the
//! tangent plane of the surface at the particle's current position.
//!
//! All randomness is drawn from per-(particle, step) streams keyed by the
//! engine seed, so trajectories are bit-identical across runs and across any
//! parallel decomposition.
//!
//! # Example
//!
//! ```
//! use abpe::prelude::*;
//!
//! let group = Group::all(100);
//! let active = ActiveForce::builder(group, 13)
//!     .uniform_force(DVec3::new(3.0, 0.0, 0.0))
//!     .rotation_diff(1.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(active.rotation_diff(), 1.0);
//! ```

use crate::constraint::ConstraintSurface;
use crate::error::{ConfigError, SimulationError};
use crate::forces::{Dimensions, ForceCompute, StepContext};
use crate::group::Group;
use crate::particle::ParticleData;
use crate::rng::ParticleStream;
use glam::{DQuat, DVec3};
use rayon::prelude::*;

/// Directions shorter than this after a tangent projection are treated as
/// degenerate geometry (orientation parallel to the surface normal).
const MIN_DIRECTION_NORM: f64 = 1e-12;

/// Builder for [`ActiveForce`]. All validation happens in
/// [`build`](ActiveForceBuilder::build).
pub struct ActiveForceBuilder {
    group: Group,
    seed: u64,
    force_list: Vec<DVec3>,
    rotation_diff: f64,
    orientation_link: bool,
    constraint: Option<ConstraintSurface>,
}

impl ActiveForceBuilder {
    /// One force vector per group member, in group order. Magnitudes and
    /// initial directions are both taken from these vectors.
    pub fn force_list(mut self, forces: &[DVec3]) -> Self {
        self.force_list = forces.to_vec();
        self
    }

    /// The same force vector for every group member.
    pub fn uniform_force(mut self, force: DVec3) -> Self {
        self.force_list = vec![force; self.group.len()];
        self
    }

    /// Rotational diffusion constant `D_r`. Zero (the default) disables the
    /// stochastic update entirely.
    pub fn rotation_diff(mut self, rotation_diff: f64) -> Self {
        self.rotation_diff = rotation_diff;
        self
    }

    /// Couple the force direction to each particle's rigid-body orientation
    /// instead of diffusing it. Only meaningful for anisotropic particles.
    pub fn orientation_link(mut self, link: bool) -> Self {
        self.orientation_link = link;
        self
    }

    /// Confine force directions to the tangent plane of a surface. Only
    /// ellipsoids are accepted.
    pub fn constraint(mut self, surface: ConstraintSurface) -> Self {
        self.constraint = Some(surface);
        self
    }

    /// Validate the configuration and construct the engine.
    pub fn build(self) -> Result<ActiveForce, ConfigError> {
        if self.group.is_empty() {
            return Err(ConfigError::EmptyGroup);
        }
        if self.rotation_diff < 0.0 || !self.rotation_diff.is_finite() {
            return Err(ConfigError::NegativeDiffusion(self.rotation_diff));
        }
        if let Some(surface) = &self.constraint {
            if !matches!(surface, ConstraintSurface::Ellipsoid { .. }) {
                return Err(ConfigError::UnsupportedConstraint(surface.kind()));
            }
        }
        if self.force_list.len() != self.group.len() {
            return Err(ConfigError::ForceListMismatch {
                expected: self.group.len(),
                got: self.force_list.len(),
            });
        }

        let mut magnitudes = Vec::with_capacity(self.force_list.len());
        let mut directions = Vec::with_capacity(self.force_list.len());
        for (slot, f) in self.force_list.iter().enumerate() {
            let magnitude = f.length();
            if magnitude < MIN_DIRECTION_NORM || !magnitude.is_finite() {
                return Err(ConfigError::ZeroForceVector {
                    tag: self.group.tags()[slot],
                });
            }
            magnitudes.push(magnitude);
            directions.push(*f / magnitude);
        }

        let count = directions.len();
        Ok(ActiveForce {
            group: self.group,
            seed: self.seed,
            rotation_diff: self.rotation_diff,
            orientation_link: self.orientation_link,
            constraint: self.constraint,
            body_directions: directions.clone(),
            directions,
            magnitudes,
            forces: vec![DVec3::ZERO; count],
        })
    }
}

/// Self-propulsion force with rotational diffusion.
///
/// Per-member state lives in the engine: the constant magnitude, the current
/// unit direction, and the force buffer read by the simulation. Directions
/// are created when the engine is built and evolve once per step; particle
/// quaternions are never written, only read (for the orientation link).
#[derive(Debug)]
pub struct ActiveForce {
    group: Group,
    seed: u64,
    rotation_diff: f64,
    orientation_link: bool,
    constraint: Option<ConstraintSurface>,
    /// Initial unit directions, fixed at construction. Interpreted as
    /// body-frame directions when the orientation link is active.
    body_directions: Vec<DVec3>,
    /// Current unit directions, one per member.
    directions: Vec<DVec3>,
    /// Constant force magnitudes, one per member.
    magnitudes: Vec<f64>,
    /// Per-member force buffer refreshed each step.
    forces: Vec<DVec3>,
}

impl ActiveForce {
    /// Start building an active force for `group` under `seed`.
    pub fn builder(group: Group, seed: u64) -> ActiveForceBuilder {
        ActiveForceBuilder {
            group,
            seed,
            force_list: Vec::new(),
            rotation_diff: 0.0,
            orientation_link: false,
            constraint: None,
        }
    }

    /// The engine's random seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rotational diffusion constant `D_r`.
    pub fn rotation_diff(&self) -> f64 {
        self.rotation_diff
    }

    /// True if the force direction is slaved to particle orientations.
    pub fn is_orientation_linked(&self) -> bool {
        self.orientation_link
    }

    /// The constraint surface, if any.
    pub fn constraint(&self) -> Option<&ConstraintSurface> {
        self.constraint.as_ref()
    }

    /// Current unit directions, one per member in group order.
    pub fn directions(&self) -> &[DVec3] {
        &self.directions
    }

    /// Constant force magnitudes, one per member in group order.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// One member's diffusion update. Pure: reads the old direction, returns
    /// the new one. `slot` is the member's position in group order.
    fn update_member(
        &self,
        slot: usize,
        tag: u32,
        particles: &ParticleData,
        ctx: &StepContext,
    ) -> Result<DVec3, SimulationError> {
        let particle = particles.get(tag);

        if self.orientation_link {
            // slaved to the rigid body: no stochastic step, no projection
            let dir = particle.orientation * self.body_directions[slot];
            return Ok(dir.normalize());
        }

        let mut dir = self.directions[slot];
        if self.rotation_diff > 0.0 {
            let mut stream = ParticleStream::new(self.seed, tag, ctx.timestep);
            let theta = (2.0 * self.rotation_diff * ctx.dt).sqrt();
            dir = match ctx.dimensions {
                Dimensions::Two => {
                    let delta = theta * stream.standard_normal();
                    rotate_in_plane(dir, delta)
                }
                Dimensions::Three => {
                    // draw order is fixed: auxiliary vector, then Gaussian
                    let aux = stream.unit_vector();
                    let delta = theta * stream.standard_normal();
                    rotate_about_random_axis(dir, aux, delta)
                }
            };
        }

        if let Some(surface) = &self.constraint {
            let tangent = surface.project_tangent(particle.position, dir);
            let length = tangent.length();
            if length < MIN_DIRECTION_NORM {
                return Err(SimulationError::Compute {
                    timestep: ctx.timestep,
                    detail: format!(
                        "orientation of particle {} is parallel to the constraint normal",
                        tag
                    ),
                });
            }
            dir = tangent / length;
        }

        // drift correction
        Ok(dir.normalize())
    }
}

/// Rotate the xy-components of `dir` by `delta` radians, preserving z.
fn rotate_in_plane(dir: DVec3, delta: f64) -> DVec3 {
    let (sin, cos) = delta.sin_cos();
    DVec3::new(dir.x * cos - dir.y * sin, dir.x * sin + dir.y * cos, dir.z)
}

/// Rotate `dir` by `delta` radians about the unit axis orthogonal to both
/// `dir` and `aux`. Degenerate when `dir` and `aux` are (anti)parallel, in
/// which case `dir` is returned unchanged for this step.
fn rotate_about_random_axis(dir: DVec3, aux: DVec3, delta: f64) -> DVec3 {
    let axis = dir.cross(aux);
    let length = axis.length();
    if length < MIN_DIRECTION_NORM {
        return dir;
    }
    DQuat::from_axis_angle(axis / length, delta) * dir
}

impl ForceCompute for ActiveForce {
    fn group(&self) -> &Group {
        &self.group
    }

    fn compute(
        &mut self,
        particles: &mut ParticleData,
        ctx: &StepContext,
    ) -> Result<(), SimulationError> {
        let particles = &*particles;

        // Embarrassingly parallel: members are updated into disjoint slots
        // and every member draws from its own (seed, tag, timestep) stream,
        // so the result does not depend on the decomposition.
        let updated: Vec<Result<DVec3, SimulationError>> = self
            .group
            .tags()
            .par_iter()
            .enumerate()
            .map(|(slot, &tag)| self.update_member(slot, tag, particles, ctx))
            .collect();

        // surface the first error (in group order) before mutating any state
        let mut directions = Vec::with_capacity(updated.len());
        for result in updated {
            directions.push(result?);
        }

        for (slot, dir) in directions.into_iter().enumerate() {
            self.directions[slot] = dir;
            self.forces[slot] = dir * self.magnitudes[slot];
        }
        Ok(())
    }

    fn member_forces(&self) -> &[DVec3] {
        &self.forces
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
