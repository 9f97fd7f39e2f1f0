//! Open-loop adapter: the intersection model driven by a split schedule.

use sf_core::{Segments, clamp_non_negative};
use sf_model::IntersectionModel;

use crate::error::SimResult;
use crate::inputs::{InflowSource, SplitSchedule};
use crate::model::TransientModel;

/// Couples an [`IntersectionModel`] with time-dependent inflow and split
/// inputs so it can be handed to an [`Integrator`](crate::Integrator).
#[derive(Debug)]
pub struct OpenLoopIntersection<I, S> {
    model: IntersectionModel,
    initial: Segments,
    inflow: I,
    schedule: S,
}

impl<I: InflowSource, S: SplitSchedule> OpenLoopIntersection<I, S> {
    /// The model's current state becomes the initial state of the run.
    pub fn new(model: IntersectionModel, inflow: I, schedule: S) -> Self {
        let initial = model.get_state();
        Self {
            model,
            initial,
            inflow,
            schedule,
        }
    }

    pub fn model(&self) -> &IntersectionModel {
        &self.model
    }

    pub fn into_model(self) -> IntersectionModel {
        self.model
    }
}

impl<I: InflowSource, S: SplitSchedule> TransientModel for OpenLoopIntersection<I, S> {
    type State = Segments;

    fn initial_state(&self) -> Segments {
        self.initial
    }

    fn rhs(&mut self, t: f64, x: &Segments) -> SimResult<Segments> {
        let control = self.schedule.split(t);
        let inflow = self.inflow.inflow(t);
        Ok(self.model.evaluate_derivative(t, x, control, &inflow)?)
    }

    fn add(&self, a: &Segments, b: &Segments) -> Segments {
        std::array::from_fn(|i| a[i] + b[i])
    }

    fn scale(&self, a: &Segments, scale: f64) -> Segments {
        a.map(|v| v * scale)
    }

    fn constrain(&self, x: Segments) -> Segments {
        clamp_non_negative(&x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{ConstantInflow, ConstantSplit};
    use sf_model::{IntersectionParams, NoopObserver};
    use std::sync::Arc;

    fn open_loop(split: f64) -> OpenLoopIntersection<ConstantInflow, ConstantSplit> {
        let params = IntersectionParams::new([1.0; 4]).unwrap();
        let model =
            IntersectionModel::with_observer(params, &[10.0; 4], Arc::new(NoopObserver)).unwrap();
        OpenLoopIntersection::new(model, ConstantInflow([0.0; 4]), ConstantSplit(split))
    }

    #[test]
    fn rhs_delegates_to_model() {
        let mut sys = open_loop(0.5);
        let x = sys.initial_state();
        assert_eq!(sys.rhs(0.0, &x).unwrap(), [-5.0; 4]);
    }

    #[test]
    fn rhs_surfaces_invalid_control() {
        let mut sys = open_loop(1.5);
        let x = sys.initial_state();
        assert!(matches!(
            sys.rhs(0.0, &x),
            Err(crate::SimError::Model(sf_model::ModelError::InvalidControl { .. }))
        ));
    }

    #[test]
    fn constrain_clamps_negatives() {
        let sys = open_loop(0.5);
        assert_eq!(sys.constrain([-1.0, 1.0, -0.0, 2.0]), [0.0, 1.0, 0.0, 2.0]);
    }
}
