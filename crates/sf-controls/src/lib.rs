//! Feedback controllers for signal-split experiments.
//!
//! Controllers are plain configuration values. Their memory (integral,
//! filtered error, previous output) lives in a separate state value that the
//! caller threads through successive `update` calls, so one configuration can
//! drive any number of independent loops.
//!
//! Controllers run in sampled mode: a [`SampleClock`] decides when the next
//! update is due and the output is held in between.

pub mod controller;
pub mod error;
pub mod sampled;

pub use controller::{
    Controller, PController, PControllerState, PIController, PIControllerState, PIDController,
    PIDControllerState,
};
pub use error::{ControlError, ControlResult};
pub use sampled::{SampleClock, SampleConfig};
