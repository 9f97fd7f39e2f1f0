//! The intersection process model.

use std::fmt;
use std::sync::Arc;

use crate::direction::Direction;
use crate::error::{ModelError, ModelResult};
use crate::observer::{ModelObserver, TracingObserver};
use crate::params::IntersectionParams;
use sf_core::{Real, Segments, clamp_non_negative, ensure_finite, to_segments};

/// Density dynamics of one four-way intersection.
///
/// Holds the immutable parameters and the last state the derivative was
/// evaluated at. It keeps no history; callers that need a trajectory record
/// it themselves.
///
/// One instance serves one simulation. Evaluations must arrive in
/// non-decreasing time order since the cached state reflects only the most
/// recent call.
#[derive(Clone)]
pub struct IntersectionModel {
    params: IntersectionParams,
    /// Last evaluated (clamped) state. Only `evaluate_derivative` and the
    /// initializers write it.
    state: Segments,
    observer: Arc<dyn ModelObserver>,
}

impl IntersectionModel {
    /// Create a model from validated parameters and an initial density state.
    ///
    /// # Errors
    ///
    /// * `InvalidDimension` if `initial_state` does not have four entries
    /// * `InvalidState` if any initial density is negative
    /// * `InvalidParameter` if `params` fails validation
    pub fn new(params: IntersectionParams, initial_state: &[Real]) -> ModelResult<Self> {
        Self::with_observer(params, initial_state, Arc::new(TracingObserver))
    }

    /// Same as [`IntersectionModel::new`] with an explicit observer hook.
    pub fn with_observer(
        params: IntersectionParams,
        initial_state: &[Real],
        observer: Arc<dyn ModelObserver>,
    ) -> ModelResult<Self> {
        params.validate()?;
        let state = checked_state(initial_state, "initial_state")?;
        observer.on_construct(&params, &state);
        Ok(Self {
            params,
            state,
            observer,
        })
    }

    /// Replace the current state. Same validation as construction.
    pub fn set_initial_state(&mut self, state: &[Real]) -> ModelResult<()> {
        self.state = checked_state(state, "initial_state")?;
        Ok(())
    }

    pub fn params(&self) -> &IntersectionParams {
        &self.params
    }

    /// Current density state.
    pub fn get_state(&self) -> Segments {
        self.state
    }

    /// Density of a single segment.
    pub fn density(&self, direction: Direction) -> Real {
        self.state[direction.index()]
    }

    /// Per-segment measurement: state scaled by the rate coefficients (and the
    /// characteristic velocity when one is configured).
    pub fn sensor(&self) -> Segments {
        let gain = self.params.sensor_gain();
        let reading = std::array::from_fn(|i| self.state[i] * gain[i]);
        self.observer.on_sensor(&reading);
        reading
    }

    /// Controlled output. The full sensor vector.
    pub fn output(&self) -> Segments {
        self.sensor()
    }

    /// Outflow per segment for a given state and control split.
    ///
    /// Pure: the state is used as given and nothing is cached.
    pub fn outflow(&self, state: &Segments, control: Real) -> ModelResult<Segments> {
        check_control(control)?;
        let alpha = &self.params.rate_coefficients;
        Ok(Direction::ALL.map(|dir| {
            let i = dir.index();
            dir.phase().weight(control) * state[i] * alpha[i]
        }))
    }

    /// Right-hand side of the density ODE.
    ///
    /// `t` is accepted for integrator compatibility; the dynamics are
    /// time-invariant. Negative densities in `state` are clamped to zero and
    /// the clamped state is stored as the current state.
    ///
    /// # Errors
    ///
    /// * `InvalidDimension` if `state` or `external_inflow` is not length 4
    /// * `InvalidControl` if `control` is outside `[0, 1]`
    /// * `NonFinite` if `state` or `external_inflow` holds NaN or infinity
    pub fn evaluate_derivative(
        &mut self,
        t: Real,
        state: &[Real],
        control: Real,
        external_inflow: &[Real],
    ) -> ModelResult<Segments> {
        let raw = to_segments(state, "state")?;
        let inflow = to_segments(external_inflow, "external_inflow")?;
        check_control(control)?;
        for &p in &raw {
            ensure_finite(p, "state")?;
        }
        for &d in &inflow {
            ensure_finite(d, "external_inflow")?;
        }

        let clamped = clamp_non_negative(&raw);
        if clamped != raw {
            self.observer.on_clamp(t, &raw, &clamped);
        }
        self.state = clamped;

        let outflow = self.outflow(&self.state, control)?;
        Ok(std::array::from_fn(|i| inflow[i] - outflow[i]))
    }
}

impl fmt::Debug for IntersectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionModel")
            .field("params", &self.params)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn check_control(control: Real) -> ModelResult<()> {
    // Written so NaN fails too.
    if (0.0..=1.0).contains(&control) {
        Ok(())
    } else {
        Err(ModelError::InvalidControl { value: control })
    }
}

fn checked_state(values: &[Real], what: &'static str) -> ModelResult<Segments> {
    let state = to_segments(values, what)?;
    for (index, &value) in state.iter().enumerate() {
        ensure_finite(value, what)?;
        if value < 0.0 {
            return Err(ModelError::InvalidState { what, index, value });
        }
    }
    Ok(state)
}
