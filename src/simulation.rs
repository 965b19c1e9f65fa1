//! Simulation builder and step loop.
//!
//! A [`Simulation`] owns the particle data, an ordered collection of force
//! engines, and any custom actions. Each step it zeroes the net-force
//! accumulator, fires due actions, runs every engine in registration order,
//! and accumulates the enabled engines' forces. There is no ambient global
//! state: everything an engine touches flows through the simulation.
//!
//! # Example
//!
//! ```
//! use abpe::prelude::*;
//!
//! let mut sim = Simulation::new(50);
//! let active = ActiveForce::builder(Group::all(50), 13)
//!     .uniform_force(DVec3::new(3.0, 0.0, 0.0))
//!     .rotation_diff(1.0)
//!     .build()
//!     .unwrap();
//! let id = sim.add_force(active).unwrap();
//!
//! sim.run(100).unwrap();
//! assert_eq!(sim.timestep(), 100);
//!
//! // pull the engine out of the dynamics but keep its bookkeeping
//! sim.disable(id, true).unwrap();
//! ```

use crate::action::{Action, Trigger};
use crate::clock::StepClock;
pub use crate::clock::DEFAULT_DT;
use crate::error::{ConfigError, SimulationError};
use crate::forces::{Dimensions, ForceCompute, StepContext};
use crate::particle::{Particle, ParticleData};
use crate::spawn::{spawn_particles, SpawnContext};
use glam::DVec3;
use std::time::Instant;

/// Handle to a force registered with a [`Simulation`].
///
/// Handles are only meaningful for the simulation that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ForceId(pub(crate) usize);

/// Handle to an action registered with a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub(crate) usize);

struct ForceEntry {
    /// Stable name, assigned at registration ("force0", "force1", ...).
    name: String,
    compute: Box<dyn ForceCompute>,
    /// Enabled engines contribute to the net force.
    enabled: bool,
    /// Disabled engines with `log` set still run for bookkeeping.
    log: bool,
}

struct ActionEntry {
    trigger: Trigger,
    action: Box<dyn Action>,
}

/// A particle simulation: particle data plus an ordered set of force engines.
pub struct Simulation {
    particles: ParticleData,
    forces: Vec<ForceEntry>,
    /// `None` marks a removed action; indices stay stable for live handles.
    actions: Vec<Option<ActionEntry>>,
    clock: StepClock,
    dimensions: Dimensions,
}

impl Simulation {
    /// Create a simulation of `count` particles at the origin, 3D, with
    /// timestep size [`DEFAULT_DT`].
    pub fn new(count: usize) -> Self {
        Self {
            particles: ParticleData::with_count(count),
            forces: Vec::new(),
            actions: Vec::new(),
            clock: StepClock::default(),
            dimensions: Dimensions::Three,
        }
    }

    /// Set the integration timestep size.
    pub fn with_dt(mut self, dt: f64) -> Result<Self, ConfigError> {
        self.clock = StepClock::new(dt)?;
        Ok(self)
    }

    /// Set the system dimensionality.
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Initialize particles by calling `spawner` once per tag, deterministically
    /// under `seed`. Replaces all particle positions and orientations.
    pub fn with_spawner<F>(mut self, seed: u64, spawner: F) -> Self
    where
        F: Fn(&mut SpawnContext) -> Particle,
    {
        let count = self.particles.len() as u32;
        self.particles = ParticleData::from_particles(spawn_particles(seed, count, spawner));
        self
    }

    // ========== Force lifecycle ==========

    /// Register a force engine. Engines run in registration order and start
    /// enabled.
    ///
    /// The engine's group must fit this simulation: a group built against a
    /// larger system is rejected here rather than failing inside a step.
    pub fn add_force(
        &mut self,
        force: impl ForceCompute + 'static,
    ) -> Result<ForceId, SimulationError> {
        let system_size = self.particles.len();
        if let Some(&tag) = force
            .group()
            .tags()
            .iter()
            .find(|&&tag| tag as usize >= system_size)
        {
            return Err(ConfigError::TagOutOfRange { tag, system_size }.into());
        }
        let id = ForceId(self.forces.len());
        let name = format!("force{}", id.0);
        log::debug!(
            "registered {} acting on {} particles",
            name,
            force.group().len()
        );
        self.forces.push(ForceEntry {
            name,
            compute: Box::new(force),
            enabled: true,
            log: true,
        });
        Ok(id)
    }

    /// Concrete-type access to a registered engine, for engines with
    /// post-registration mutators such as
    /// [`ConstantForce::set_force`](crate::forces::ConstantForce::set_force).
    ///
    /// Fails if `id` is stale or names an engine of a different type.
    pub fn force_mut<T: ForceCompute + 'static>(
        &mut self,
        id: ForceId,
    ) -> Result<&mut T, SimulationError> {
        Self::entry_mut(&mut self.forces, id)?
            .compute
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(SimulationError::ForceTypeMismatch { index: id.0 })
    }

    /// Re-enable a disabled force. Enabling an already enabled force warns
    /// and does nothing.
    pub fn enable(&mut self, id: ForceId) -> Result<(), SimulationError> {
        let entry = Self::entry_mut(&mut self.forces, id)?;
        if entry.enabled {
            log::warn!("ignoring command to enable {}: already enabled", entry.name);
            return Ok(());
        }
        entry.enabled = true;
        entry.log = true;
        log::debug!("enabled {}", entry.name);
        Ok(())
    }

    /// Disable a force.
    ///
    /// With `keep_log` set, the engine keeps computing each step so its
    /// member forces and potential energy stay current, but nothing is added
    /// to the net force. Without it the engine is skipped entirely.
    /// Disabling an already disabled force warns and does nothing.
    pub fn disable(&mut self, id: ForceId, keep_log: bool) -> Result<(), SimulationError> {
        let entry = Self::entry_mut(&mut self.forces, id)?;
        if !entry.enabled {
            log::warn!(
                "ignoring command to disable {}: already disabled",
                entry.name
            );
            return Ok(());
        }
        entry.enabled = false;
        entry.log = keep_log;
        log::debug!("disabled {} (log: {})", entry.name, keep_log);
        Ok(())
    }

    /// True if the force currently contributes to the dynamics.
    pub fn is_enabled(&self, id: ForceId) -> Result<bool, SimulationError> {
        Ok(Self::entry(&self.forces, id)?.enabled)
    }

    /// The stable name assigned to a force at registration.
    pub fn force_name(&self, id: ForceId) -> Result<&str, SimulationError> {
        Ok(Self::entry(&self.forces, id)?.name.as_str())
    }

    /// One engine's per-member forces from its last compute, in group order.
    pub fn member_forces(&self, id: ForceId) -> Result<&[DVec3], SimulationError> {
        Ok(Self::entry(&self.forces, id)?.compute.member_forces())
    }

    /// One engine's potential energy bookkeeping.
    pub fn potential_energy(&self, id: ForceId) -> Result<f64, SimulationError> {
        Ok(Self::entry(&self.forces, id)?.compute.potential_energy())
    }

    // ========== Actions ==========

    /// Register a custom action. `attach` is called immediately.
    pub fn add_action(&mut self, trigger: Trigger, mut action: impl Action + 'static) -> ActionId {
        action.attach(&self.particles);
        let id = ActionId(self.actions.len());
        self.actions.push(Some(ActionEntry {
            trigger,
            action: Box::new(action),
        }));
        id
    }

    /// Remove an action. `detach` is called on the action before it is
    /// dropped. Live handles for other actions stay valid.
    pub fn remove_action(&mut self, id: ActionId) -> Result<(), SimulationError> {
        let slot = self
            .actions
            .get_mut(id.0)
            .ok_or(SimulationError::UnknownAction { index: id.0 })?;
        match slot.take() {
            Some(mut entry) => {
                entry.action.detach();
                Ok(())
            }
            None => Err(SimulationError::UnknownAction { index: id.0 }),
        }
    }

    // ========== Stepping ==========

    /// Advance the simulation by one timestep.
    ///
    /// Fires due actions (which still see the previous step's net forces),
    /// zeroes the net-force accumulator, runs each force engine per its
    /// lifecycle flags, and accumulates enabled engines into the net force.
    /// Any engine error aborts the step.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let started = Instant::now();
        let timestep = self.clock.timestep();

        for slot in self.actions.iter_mut().flatten() {
            if slot.trigger.fires_at(timestep) {
                slot.action.act(timestep, &mut self.particles);
            }
        }

        self.particles.clear_net_forces();

        let ctx = StepContext {
            timestep,
            dt: self.clock.dt(),
            dimensions: self.dimensions,
        };
        for entry in &mut self.forces {
            if !entry.enabled && !entry.log {
                continue;
            }
            entry.compute.compute(&mut self.particles, &ctx)?;
            if entry.enabled {
                let forces = entry.compute.member_forces();
                for (slot, &tag) in entry.compute.group().tags().iter().enumerate() {
                    self.particles.accumulate(tag, forces[slot]);
                }
            }
        }

        self.clock.advance();
        self.clock.record(started.elapsed());
        Ok(())
    }

    /// Advance the simulation by `steps` timesteps.
    pub fn run(&mut self, steps: u64) -> Result<(), SimulationError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Benchmark one engine: run its compute `iterations` times on the
    /// current state and return the average wall time per call in
    /// milliseconds.
    ///
    /// The calls are real computes, so stochastic engines advance their
    /// direction state. Run the benchmark before or after a measurement run,
    /// not in the middle of one.
    pub fn benchmark(&mut self, id: ForceId, iterations: u32) -> Result<f64, SimulationError> {
        if id.0 >= self.forces.len() {
            return Err(SimulationError::UnknownForce { index: id.0 });
        }
        if iterations == 0 {
            return Ok(0.0);
        }
        let ctx = StepContext {
            timestep: self.clock.timestep(),
            dt: self.clock.dt(),
            dimensions: self.dimensions,
        };
        let entry = &mut self.forces[id.0];
        let started = Instant::now();
        for _ in 0..iterations {
            entry.compute.compute(&mut self.particles, &ctx)?;
        }
        let avg_ms = started.elapsed().as_secs_f64() * 1e3 / f64::from(iterations);
        log::debug!("benchmark {}: {:.4} ms/call", entry.name, avg_ms);
        Ok(avg_ms)
    }

    // ========== Accessors ==========

    /// Current timestep index.
    pub fn timestep(&self) -> u64 {
        self.clock.timestep()
    }

    /// Integration timestep size.
    pub fn dt(&self) -> f64 {
        self.clock.dt()
    }

    /// System dimensionality.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The particle data.
    pub fn particles(&self) -> &ParticleData {
        &self.particles
    }

    /// Mutable particle data, for setting positions and orientations between
    /// steps.
    pub fn particles_mut(&mut self) -> &mut ParticleData {
        &mut self.particles
    }

    /// Net force on one particle from the last completed step.
    pub fn net_force(&self, tag: u32) -> DVec3 {
        self.particles.net_force(tag)
    }

    /// Average wall time per completed step, in milliseconds.
    pub fn average_step_ms(&self) -> f64 {
        self.clock.average_step_ms()
    }

    fn entry(forces: &[ForceEntry], id: ForceId) -> Result<&ForceEntry, SimulationError> {
        forces
            .get(id.0)
            .ok_or(SimulationError::UnknownForce { index: id.0 })
    }

    fn entry_mut(
        forces: &mut [ForceEntry],
        id: ForceId,
    ) -> Result<&mut ForceEntry, SimulationError> {
        forces
            .get_mut(id.0)
            .ok_or(SimulationError::UnknownForce { index: id.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::ConstantForce;
    use crate::group::Group;

    #[test]
    fn test_step_advances_clock() {
        let mut sim = Simulation::new(1);
        sim.run(3).unwrap();
        assert_eq!(sim.timestep(), 3);
    }

    #[test]
    fn test_bad_dt_rejected() {
        assert!(Simulation::new(1).with_dt(-0.1).is_err());
        assert!(Simulation::new(1).with_dt(0.002).is_ok());
    }

    #[test]
    fn test_net_force_accumulates_across_engines() {
        let mut sim = Simulation::new(2);
        sim.add_force(ConstantForce::new(Group::all(2), DVec3::X).unwrap()).unwrap();
        sim.add_force(ConstantForce::new(Group::new(vec![1], 2).unwrap(), DVec3::Y).unwrap())
            .unwrap();

        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::X);
        assert_eq!(sim.net_force(1), DVec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_disable_removes_contribution() {
        let mut sim = Simulation::new(1);
        let id = sim.add_force(ConstantForce::new(Group::all(1), DVec3::X).unwrap()).unwrap();

        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::X);

        sim.disable(id, false).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::ZERO);

        sim.enable(id).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::X);
    }

    #[test]
    fn test_disable_with_log_keeps_bookkeeping() {
        let mut sim = Simulation::new(1);
        let id = sim.add_force(ConstantForce::new(Group::all(1), DVec3::X).unwrap()).unwrap();

        sim.disable(id, true).unwrap();
        sim.step().unwrap();
        // no dynamics contribution...
        assert_eq!(sim.net_force(0), DVec3::ZERO);
        // ...but the buffer is still current
        assert_eq!(sim.member_forces(id).unwrap(), &[DVec3::X]);
        assert!(!sim.is_enabled(id).unwrap());
    }

    #[test]
    fn test_redundant_toggles_are_no_ops() {
        let mut sim = Simulation::new(1);
        let id = sim.add_force(ConstantForce::new(Group::all(1), DVec3::X).unwrap()).unwrap();

        sim.enable(id).unwrap(); // already enabled: warn + no-op
        assert!(sim.is_enabled(id).unwrap());
        sim.disable(id, false).unwrap();
        sim.disable(id, false).unwrap(); // already disabled: warn + no-op
        assert!(!sim.is_enabled(id).unwrap());
    }

    #[test]
    fn test_add_force_rejects_group_larger_than_system() {
        let mut sim = Simulation::new(5);
        let err = sim
            .add_force(ConstantForce::new(Group::all(10), DVec3::X).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Config(ConfigError::TagOutOfRange {
                tag: 5,
                system_size: 5,
            })
        ));
        // nothing was registered, so the first would-be handle is stale
        assert!(sim.is_enabled(ForceId(0)).is_err());
    }

    #[test]
    fn test_force_mut_retargets_registered_engine() {
        let mut sim = Simulation::new(2);
        let id = sim
            .add_force(ConstantForce::new(Group::all(2), DVec3::X).unwrap())
            .unwrap();

        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::X);

        sim.force_mut::<ConstantForce>(id)
            .unwrap()
            .set_force(DVec3::Y);
        sim.step().unwrap();
        assert_eq!(sim.net_force(0), DVec3::Y);
        assert_eq!(sim.net_force(1), DVec3::Y);
    }

    #[test]
    fn test_force_mut_checks_handle_and_type() {
        use crate::active::ActiveForce;

        let mut sim = Simulation::new(1);
        let id = sim
            .add_force(ConstantForce::new(Group::all(1), DVec3::X).unwrap())
            .unwrap();

        let err = sim.force_mut::<ActiveForce>(id).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::ForceTypeMismatch { index: 0 }
        ));
        let err = sim.force_mut::<ConstantForce>(ForceId(9)).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownForce { index: 9 }));
    }

    #[test]
    fn test_unknown_force_handle() {
        let mut sim = Simulation::new(1);
        let err = sim.enable(ForceId(5)).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownForce { index: 5 }));
        assert!(sim.benchmark(ForceId(0), 10).is_err());
    }

    #[test]
    fn test_force_names_are_sequential() {
        let mut sim = Simulation::new(1);
        let a = sim.add_force(ConstantForce::new(Group::all(1), DVec3::X).unwrap()).unwrap();
        let b = sim.add_force(ConstantForce::new(Group::all(1), DVec3::Y).unwrap()).unwrap();
        assert_eq!(sim.force_name(a).unwrap(), "force0");
        assert_eq!(sim.force_name(b).unwrap(), "force1");
    }

    #[test]
    fn test_benchmark_returns_average() {
        let mut sim = Simulation::new(10);
        let id = sim.add_force(ConstantForce::new(Group::all(10), DVec3::X).unwrap()).unwrap();
        let ms = sim.benchmark(id, 100).unwrap();
        assert!(ms >= 0.0);
        assert_eq!(sim.benchmark(id, 0).unwrap(), 0.0);
    }

    struct CountingAction {
        fired: std::sync::Arc<std::sync::atomic::AtomicU64>,
        attached: bool,
    }

    impl Action for CountingAction {
        fn attach(&mut self, _particles: &ParticleData) {
            self.attached = true;
        }
        fn act(&mut self, _timestep: u64, _particles: &mut ParticleData) {
            assert!(self.attached, "act called before attach");
            self.fired
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    #[test]
    fn test_actions_fire_on_trigger() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;

        let fired = Arc::new(AtomicU64::new(0));
        let mut sim = Simulation::new(1);
        let id = sim.add_action(
            Trigger::periodic(5),
            CountingAction {
                fired: fired.clone(),
                attached: false,
            },
        );

        sim.run(11).unwrap(); // steps 0..=10: fires at 0, 5, 10
        assert_eq!(fired.load(Ordering::Relaxed), 3);

        sim.remove_action(id).unwrap();
        sim.run(5).unwrap();
        assert_eq!(fired.load(Ordering::Relaxed), 3);

        let err = sim.remove_action(id).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownAction { index: 0 }));
    }
}
