//! Error types for ABPE.
//!
//! Two families of failure exist: bad construction arguments, caught before a
//! force engine ever runs ([`ConfigError`]), and failures surfaced while a
//! simulation is stepping ([`SimulationError`]). There are no automatic
//! retries anywhere; a deterministic kernel that retried a step would no
//! longer be reproducible.

use std::fmt;

/// Errors raised while constructing simulation objects.
///
/// These abort setup and are never recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The rotational diffusion constant was negative.
    NegativeDiffusion(f64),
    /// The target group has no members.
    EmptyGroup,
    /// The per-particle force list length does not match the group size.
    ForceListMismatch {
        /// Number of group members.
        expected: usize,
        /// Number of force vectors supplied.
        got: usize,
    },
    /// An initial force vector has zero magnitude, so its direction is undefined.
    ZeroForceVector {
        /// Tag of the offending particle.
        tag: u32,
    },
    /// The supplied constraint surface kind is not accepted by this engine.
    UnsupportedConstraint(&'static str),
    /// An ellipsoid semi-axis is not strictly positive and finite.
    BadSemiAxis {
        /// Which semi-axis (`'x'`, `'y'`, or `'z'`).
        axis: char,
        /// The offending value.
        value: f64,
    },
    /// A plane normal with zero length was supplied.
    ZeroNormal,
    /// A group tag does not exist in the system.
    TagOutOfRange {
        /// The offending tag.
        tag: u32,
        /// Number of particles in the system.
        system_size: usize,
    },
    /// A group contains the same tag twice.
    DuplicateTag(u32),
    /// A tag is not a member of the engine's group.
    NotAMember(u32),
    /// The integration timestep size is not strictly positive and finite.
    BadTimestep(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NegativeDiffusion(d) => {
                write!(f, "rotational diffusion constant must be >= 0, got {}", d)
            }
            ConfigError::EmptyGroup => write!(f, "force group has no members"),
            ConfigError::ForceListMismatch { expected, got } => write!(
                f,
                "force list has {} entries but the group has {} members",
                got, expected
            ),
            ConfigError::ZeroForceVector { tag } => write!(
                f,
                "initial force vector for particle {} has zero magnitude",
                tag
            ),
            ConfigError::UnsupportedConstraint(kind) => write!(
                f,
                "constraint surface '{}' is not accepted (only ellipsoids are)",
                kind
            ),
            ConfigError::BadSemiAxis { axis, value } => write!(
                f,
                "ellipsoid semi-axis r{} must be positive and finite, got {}",
                axis, value
            ),
            ConfigError::ZeroNormal => write!(f, "plane normal must have nonzero length"),
            ConfigError::TagOutOfRange { tag, system_size } => write!(
                f,
                "particle tag {} is out of range for a system of {} particles",
                tag, system_size
            ),
            ConfigError::DuplicateTag(tag) => {
                write!(f, "particle tag {} appears twice in the group", tag)
            }
            ConfigError::NotAMember(tag) => {
                write!(f, "particle tag {} is not a member of the force's group", tag)
            }
            ConfigError::BadTimestep(dt) => {
                write!(f, "timestep size must be positive and finite, got {}", dt)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while running or controlling a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// A control call named a force that is not registered with this simulation.
    UnknownForce {
        /// Raw index carried by the stale handle.
        index: usize,
    },
    /// A control call named an action that is not (or no longer) registered.
    UnknownAction {
        /// Raw index carried by the stale handle.
        index: usize,
    },
    /// A typed access named a force of a different concrete type.
    ForceTypeMismatch {
        /// Raw index carried by the handle.
        index: usize,
    },
    /// The numerical kernel hit invalid geometry during a step. Fatal to the run.
    Compute {
        /// Timestep at which the failure occurred.
        timestep: u64,
        /// Human-readable description of the failure.
        detail: String,
    },
    /// Invalid configuration surfaced after setup.
    Config(ConfigError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownForce { index } => {
                write!(f, "no force registered with id {}", index)
            }
            SimulationError::UnknownAction { index } => {
                write!(f, "no action registered with id {}", index)
            }
            SimulationError::ForceTypeMismatch { index } => {
                write!(f, "force {} is not of the requested concrete type", index)
            }
            SimulationError::Compute { timestep, detail } => {
                write!(f, "compute error at timestep {}: {}", timestep, detail)
            }
            SimulationError::Config(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}
