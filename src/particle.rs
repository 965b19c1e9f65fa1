//! Particle storage and the shared net-force accumulator.
//!
//! Particles are stored in tag order: the particle with tag `i` lives at
//! index `i`. Tags are stable for the lifetime of a simulation, so force
//! engines and groups can hold them across steps.
//!
//! The net-force accumulator is the one piece of state shared between force
//! engines. Engines only ever add to it; it is zeroed by the simulation at
//! the start of every step and read by the caller (or an external
//! integrator) after all engines have run.

use glam::{DQuat, DVec3};

/// A single particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Stable identifier, equal to the particle's index in tag order.
    pub tag: u32,
    /// Position in simulation units.
    pub position: DVec3,
    /// Rigid-body orientation. Identity for point-like particles.
    pub orientation: DQuat,
}

impl Particle {
    /// A particle at `position` with identity orientation.
    pub fn at(tag: u32, position: DVec3) -> Self {
        Self {
            tag,
            position,
            orientation: DQuat::IDENTITY,
        }
    }

    /// A particle with an explicit rigid-body orientation.
    pub fn oriented(tag: u32, position: DVec3, orientation: DQuat) -> Self {
        Self {
            tag,
            position,
            orientation,
        }
    }
}

/// System-wide particle storage plus the net-force accumulator.
pub struct ParticleData {
    particles: Vec<Particle>,
    net_force: Vec<DVec3>,
}

impl ParticleData {
    /// Create storage for `count` particles, all at the origin with identity
    /// orientation.
    pub fn with_count(count: usize) -> Self {
        let particles = (0..count)
            .map(|tag| Particle::at(tag as u32, DVec3::ZERO))
            .collect();
        Self {
            particles,
            net_force: vec![DVec3::ZERO; count],
        }
    }

    /// Create storage from explicit particles.
    ///
    /// Tags are rewritten to index order; callers supply positions and
    /// orientations, the container owns identity.
    pub fn from_particles(mut particles: Vec<Particle>) -> Self {
        for (i, p) in particles.iter_mut().enumerate() {
            p.tag = i as u32;
        }
        let count = particles.len();
        Self {
            particles,
            net_force: vec![DVec3::ZERO; count],
        }
    }

    /// Number of particles in the system.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the system holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// The particle with the given tag.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is out of range. Groups validate tags at
    /// construction, so in-engine lookups are always in range.
    pub fn get(&self, tag: u32) -> &Particle {
        &self.particles[tag as usize]
    }

    /// Mutable access to the particle with the given tag.
    pub fn get_mut(&mut self, tag: u32) -> &mut Particle {
        &mut self.particles[tag as usize]
    }

    /// All particles in tag order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to all particles in tag order.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Net force accumulated on one particle this step.
    pub fn net_force(&self, tag: u32) -> DVec3 {
        self.net_force[tag as usize]
    }

    /// The whole net-force accumulator in tag order.
    pub fn net_forces(&self) -> &[DVec3] {
        &self.net_force
    }

    /// Zero the accumulator. Called once at the start of each step.
    pub fn clear_net_forces(&mut self) {
        for f in &mut self.net_force {
            *f = DVec3::ZERO;
        }
    }

    /// Add `force` to one particle's net force. Additive only; engines never
    /// overwrite each other's contributions.
    pub fn accumulate(&mut self, tag: u32, force: DVec3) {
        self.net_force[tag as usize] += force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_count_tags_in_order() {
        let data = ParticleData::with_count(4);
        assert_eq!(data.len(), 4);
        for (i, p) in data.particles().iter().enumerate() {
            assert_eq!(p.tag, i as u32);
            assert_eq!(p.position, DVec3::ZERO);
            assert_eq!(p.orientation, DQuat::IDENTITY);
        }
    }

    #[test]
    fn test_from_particles_rewrites_tags() {
        let data = ParticleData::from_particles(vec![
            Particle::at(9, DVec3::X),
            Particle::at(9, DVec3::Y),
        ]);
        assert_eq!(data.get(0).position, DVec3::X);
        assert_eq!(data.get(1).position, DVec3::Y);
        assert_eq!(data.get(1).tag, 1);
    }

    #[test]
    fn test_accumulate_is_additive() {
        let mut data = ParticleData::with_count(2);
        data.accumulate(1, DVec3::new(1.0, 0.0, 0.0));
        data.accumulate(1, DVec3::new(0.5, 2.0, 0.0));
        assert_eq!(data.net_force(1), DVec3::new(1.5, 2.0, 0.0));
        assert_eq!(data.net_force(0), DVec3::ZERO);

        data.clear_net_forces();
        assert_eq!(data.net_force(1), DVec3::ZERO);
    }
}
