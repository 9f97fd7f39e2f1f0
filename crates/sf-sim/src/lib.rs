//! Time integration for the intersection process model.
//!
//! Provides:
//! - the [`TransientModel`] right-hand-side abstraction
//! - fixed-step RK4 and forward Euler integrators
//! - open-loop runs driven by a split schedule
//! - closed-loop runs driven by a sensor-feedback split policy
//!
//! The runners own the time grid and the recorded trajectory. The process
//! model itself only ever sees one state at a time.

pub mod closed_loop;
pub mod error;
pub mod inputs;
pub mod integrator;
pub mod model;
pub mod open_loop;
pub mod sim;

pub use closed_loop::{
    ClosedLoopRecord, FeedbackSplit, FixedSplit, SplitPolicy, north_south_share, run_closed_loop,
};
pub use error::{SimError, SimResult};
pub use inputs::{ConstantInflow, ConstantSplit, InflowSource, SplitSchedule};
pub use integrator::{ForwardEuler, Integrator, IntegratorType, RK4};
pub use model::TransientModel;
pub use open_loop::OpenLoopIntersection;
pub use sim::{SimOptions, SimRecord, run_sim};
