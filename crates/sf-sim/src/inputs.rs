//! Time-dependent inputs supplied by the caller: external inflow and control split.
//!
//! How inflow is generated (constant, scheduled, stochastic) is the caller's
//! choice; the process model only ever sees the resulting vector.

use sf_core::{Real, Segments};

/// Produces the external inflow vector at a given time.
pub trait InflowSource {
    fn inflow(&mut self, t: Real) -> Segments;
}

/// Open-loop control split as a function of time.
pub trait SplitSchedule {
    fn split(&mut self, t: Real) -> Real;
}

/// Time-invariant inflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantInflow(pub Segments);

impl InflowSource for ConstantInflow {
    fn inflow(&mut self, _t: Real) -> Segments {
        self.0
    }
}

impl<F> InflowSource for F
where
    F: FnMut(Real) -> Segments,
{
    fn inflow(&mut self, t: Real) -> Segments {
        self(t)
    }
}

/// Time-invariant split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSplit(pub Real);

impl SplitSchedule for ConstantSplit {
    fn split(&mut self, _t: Real) -> Real {
        self.0
    }
}

impl<F> SplitSchedule for F
where
    F: FnMut(Real) -> Real,
{
    fn split(&mut self, t: Real) -> Real {
        self(t)
    }
}
