//! Force engines and their per-step contract.
//!
//! A force engine computes one force vector per member of its group every
//! step and keeps those vectors in its own buffer. The owning
//! [`Simulation`](crate::simulation::Simulation) decides what happens to the
//! buffer: an enabled engine's forces are accumulated into the shared
//! net-force array, a disabled engine kept in log mode still refreshes its
//! buffer for bookkeeping, and a fully disabled engine is skipped.
//!
//! Engines may mutate only the per-particle fields they own (the active force
//! engine owns orientations) plus their own buffers; the net-force
//! accumulator is written exclusively by the simulation.

use crate::error::{ConfigError, SimulationError};
use crate::group::Group;
use crate::particle::ParticleData;
use glam::DVec3;
use std::any::Any;

/// System dimensionality. Selects the 2D (in-plane angle) or 3D (unit
/// vector on the sphere) form of the rotational diffusion update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Dimensions {
    /// Particles live in the xy-plane.
    Two,
    /// Full 3D.
    #[default]
    Three,
}

/// Per-step inputs shared by every force engine.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    /// Current timestep index.
    pub timestep: u64,
    /// Integration timestep size.
    pub dt: f64,
    /// System dimensionality.
    pub dimensions: Dimensions,
}

/// A force engine: computes per-member forces for its group each step.
pub trait ForceCompute: Send {
    /// The group this engine acts on.
    fn group(&self) -> &Group;

    /// Run the per-step computation, refreshing the per-member force buffer.
    ///
    /// Called once per timestep with positions and orientations already
    /// finalized for the current step. Errors are fatal to the run.
    fn compute(
        &mut self,
        particles: &mut ParticleData,
        ctx: &StepContext,
    ) -> Result<(), SimulationError>;

    /// Per-member forces from the last `compute` call, in group order.
    fn member_forces(&self) -> &[DVec3];

    /// Potential energy bookkeeping. Zero for engines with no potential,
    /// which is every engine in this crate.
    fn potential_energy(&self) -> f64 {
        0.0
    }

    /// Concrete-type access for
    /// [`Simulation::force_mut`](crate::simulation::Simulation::force_mut).
    /// Implementations return `self`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A constant force applied to every member of a group.
///
/// The direction and magnitude never evolve; the vector can be changed
/// between steps with [`set_force`](ConstantForce::set_force) or, for a
/// subset of members, [`set_group_force`](ConstantForce::set_group_force).
/// Once the engine is registered, reach the mutators through
/// [`Simulation::force_mut`](crate::simulation::Simulation::force_mut).
///
/// # Example
///
/// ```
/// use abpe::prelude::*;
///
/// let group = Group::all(10);
/// let mut push = ConstantForce::new(group, DVec3::new(0.4, 1.0, 0.5)).unwrap();
/// push.set_force(DVec3::new(0.2, 0.1, -0.5));
/// ```
#[derive(Debug)]
pub struct ConstantForce {
    group: Group,
    forces: Vec<DVec3>,
}

impl ConstantForce {
    /// Create a constant force acting on `group` with the given vector for
    /// every member.
    pub fn new(group: Group, force: DVec3) -> Result<Self, ConfigError> {
        if group.is_empty() {
            return Err(ConfigError::EmptyGroup);
        }
        let forces = vec![force; group.len()];
        Ok(Self { group, forces })
    }

    /// Set the force vector for every member of the group.
    pub fn set_force(&mut self, force: DVec3) {
        for f in &mut self.forces {
            *f = force;
        }
    }

    /// Set the force vector for the members of `subgroup` only.
    ///
    /// Every tag in `subgroup` must be a member of this engine's group.
    pub fn set_group_force(&mut self, subgroup: &Group, force: DVec3) -> Result<(), ConfigError> {
        // validate before mutating anything
        let mut slots = Vec::with_capacity(subgroup.len());
        for &tag in subgroup.tags() {
            match self.group.position_of(tag) {
                Some(slot) => slots.push(slot),
                None => return Err(ConfigError::NotAMember(tag)),
            }
        }
        for slot in slots {
            self.forces[slot] = force;
        }
        Ok(())
    }
}

impl ForceCompute for ConstantForce {
    fn group(&self) -> &Group {
        &self.group
    }

    fn compute(
        &mut self,
        _particles: &mut ParticleData,
        _ctx: &StepContext,
    ) -> Result<(), SimulationError> {
        // buffer already holds the constant vectors
        Ok(())
    }

    fn member_forces(&self) -> &[DVec3] {
        &self.forces
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_force_fills_group() {
        let group = Group::all(3);
        let f = ConstantForce::new(group, DVec3::X).unwrap();
        assert_eq!(f.member_forces(), &[DVec3::X, DVec3::X, DVec3::X]);
        assert_eq!(f.potential_energy(), 0.0);
    }

    #[test]
    fn test_rejects_empty_group() {
        let group = Group::new(vec![], 3).unwrap();
        assert_eq!(
            ConstantForce::new(group, DVec3::X).unwrap_err(),
            ConfigError::EmptyGroup
        );
    }

    #[test]
    fn test_set_force_overwrites_all_members() {
        let group = Group::all(2);
        let mut f = ConstantForce::new(group, DVec3::X).unwrap();
        f.set_force(DVec3::new(0.0, 2.0, 0.0));
        assert_eq!(
            f.member_forces(),
            &[DVec3::new(0.0, 2.0, 0.0), DVec3::new(0.0, 2.0, 0.0)]
        );
    }

    #[test]
    fn test_set_group_force_overrides_subset() {
        let group = Group::new(vec![0, 1, 2], 3).unwrap();
        let mut f = ConstantForce::new(group, DVec3::X).unwrap();

        let subgroup = Group::new(vec![2], 3).unwrap();
        f.set_group_force(&subgroup, DVec3::Z).unwrap();
        assert_eq!(f.member_forces(), &[DVec3::X, DVec3::X, DVec3::Z]);
    }

    #[test]
    fn test_set_group_force_rejects_non_member() {
        let group = Group::new(vec![0, 1], 4).unwrap();
        let mut f = ConstantForce::new(group, DVec3::X).unwrap();

        let outsider = Group::new(vec![1, 3], 4).unwrap();
        let err = f.set_group_force(&outsider, DVec3::Z).unwrap_err();
        assert_eq!(err, ConfigError::NotAMember(3));
        // nothing was mutated
        assert_eq!(f.member_forces(), &[DVec3::X, DVec3::X]);
    }
}
