//! Step clock: timestep bookkeeping and wall-time statistics.
//!
//! The clock is the simulation's source of truth for the current timestep
//! index and the integration timestep size. It also keeps cheap wall-time
//! statistics over the steps it has seen, which back the benchmark and
//! profiling accessors on [`Simulation`](crate::simulation::Simulation).

use crate::error::ConfigError;
use std::time::Duration;

/// Default integration timestep size.
pub const DEFAULT_DT: f64 = 0.005;

/// Timestep counter plus wall-time statistics.
#[derive(Debug, Clone)]
pub struct StepClock {
    /// Current timestep index.
    timestep: u64,
    /// Integration timestep size.
    dt: f64,
    /// Number of steps timed so far.
    steps_timed: u64,
    /// Total wall time across timed steps.
    total: Duration,
    /// Wall time of the most recent step.
    last: Duration,
}

impl StepClock {
    /// Create a clock at timestep zero. `dt` must be positive and finite.
    pub fn new(dt: f64) -> Result<Self, ConfigError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::BadTimestep(dt));
        }
        Ok(Self {
            timestep: 0,
            dt,
            steps_timed: 0,
            total: Duration::ZERO,
            last: Duration::ZERO,
        })
    }

    /// Current timestep index.
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Integration timestep size.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advance to the next timestep.
    pub fn advance(&mut self) {
        self.timestep += 1;
    }

    /// Record the wall time of one completed step.
    pub fn record(&mut self, elapsed: Duration) {
        self.steps_timed += 1;
        self.total += elapsed;
        self.last = elapsed;
    }

    /// Wall time of the most recent step, in milliseconds.
    pub fn last_step_ms(&self) -> f64 {
        self.last.as_secs_f64() * 1e3
    }

    /// Average wall time per step so far, in milliseconds. Zero before the
    /// first step completes.
    pub fn average_step_ms(&self) -> f64 {
        if self.steps_timed == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1e3 / self.steps_timed as f64
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self {
            timestep: 0,
            dt: DEFAULT_DT,
            steps_timed: 0,
            total: Duration::ZERO,
            last: Duration::ZERO,
        }
    }
}
