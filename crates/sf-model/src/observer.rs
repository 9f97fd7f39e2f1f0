//! Observation hook for model events.
//!
//! The model never prints. Construction, clamping and sensor reads are handed
//! to a [`ModelObserver`], which by default forwards them to `tracing`.

use crate::params::IntersectionParams;
use sf_core::{Real, Segments};

/// Receives notifications from an [`IntersectionModel`](crate::IntersectionModel).
///
/// All methods default to doing nothing.
pub trait ModelObserver: Send + Sync {
    fn on_construct(&self, _params: &IntersectionParams, _initial_state: &Segments) {}

    /// A state handed to the derivative had negative components.
    fn on_clamp(&self, _t: Real, _raw: &Segments, _clamped: &Segments) {}

    fn on_sensor(&self, _reading: &Segments) {}
}

/// Emits model events as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ModelObserver for TracingObserver {
    fn on_construct(&self, params: &IntersectionParams, initial_state: &Segments) {
        tracing::debug!(
            rate_coefficients = ?params.rate_coefficients,
            velocity_mps = ?params.velocity_mps,
            initial_state = ?initial_state,
            "intersection model created"
        );
    }

    fn on_clamp(&self, t: Real, raw: &Segments, clamped: &Segments) {
        tracing::debug!(t, raw = ?raw, clamped = ?clamped, "negative density clamped to zero");
    }

    fn on_sensor(&self, reading: &Segments) {
        tracing::trace!(reading = ?reading, "sensor read");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ModelObserver for NoopObserver {}
