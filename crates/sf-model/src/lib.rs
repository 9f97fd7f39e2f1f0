//! Process model of traffic density at a single four-way intersection.
//!
//! The model is the right-hand side of a continuous-time ODE. An external
//! integrator drives it by calling [`IntersectionModel::evaluate_derivative`];
//! an external controller reads [`IntersectionModel::sensor`] and feeds back the
//! signal split.
//!
//! # Dynamics
//!
//! For segment `i` in N, E, S, W order with density `P[i]`, rate coefficient
//! `alpha[i]`, external inflow `d[i]` and control split `u`:
//!
//! ```text
//! dP[i]/dt = d[i] - w_i(u) * P[i] * alpha[i]
//! ```
//!
//! where `w_i(u) = 1 - u` for North/South and `w_i(u) = u` for East/West.
//!
//! # Numerical policy
//!
//! Densities are never negative. States handed to the derivative are clamped
//! to zero component-wise before use, and the clamped value becomes the
//! model's current state.

pub mod direction;
pub mod display;
pub mod error;
pub mod intersection;
pub mod observer;
pub mod params;

pub use direction::{Direction, Phase};
pub use display::topology_diagram;
pub use error::{ModelError, ModelResult};
pub use intersection::IntersectionModel;
pub use observer::{ModelObserver, NoopObserver, TracingObserver};
pub use params::{IntersectionParams, TurnRates};
pub use sf_core::{Real, SEGMENTS, Segments};
