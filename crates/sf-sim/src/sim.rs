//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::IntegratorType;
use crate::model::TransientModel;

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-2,
            t_end: 10.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }

    /// Number of steps needed to reach `t_end`, capped by `max_steps`.
    pub(crate) fn step_count(&self) -> usize {
        let exact = self.t_end / self.dt;
        // Absorb round-off so 1.0 / 0.1 counts as 10 steps, not 11.
        let steps = (exact - 1e-9).ceil().max(0.0) as usize;
        steps.min(self.max_steps)
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

/// Run a transient simulation with a fixed step.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;

    let steps = opts.step_count();
    tracing::debug!(dt = opts.dt, steps, integrator = ?opts.integrator, "starting simulation");

    let mut t = 0.0;
    let mut x = model.initial_state();

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    for step in 1..=steps {
        let next = opts.integrator.step(model, t, &x, opts.dt)?;
        x = model.constrain(next);
        // Multiply rather than accumulate to keep the grid exact.
        t = step as f64 * opts.dt;

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    // Always record final state
    if steps % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    tracing::debug!(t_end = t, records = t_record.len(), "simulation finished");

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
