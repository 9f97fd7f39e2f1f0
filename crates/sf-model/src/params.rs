//! Validated parameter set for the intersection model.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use sf_core::{Real, Segments, Velocity, as_mps, to_segments};

/// Fixed parameters of one intersection.
///
/// Built once and never changed for the lifetime of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionParams {
    /// Outflow ease per segment (N, E, S, W). Must be finite and non-negative.
    pub rate_coefficients: Segments,
    /// Characteristic vehicle velocity (m/s). Scales the sensor reading when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_mps: Option<Real>,
    /// Turning behaviour. Shown in diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_rates: Option<TurnRates>,
}

/// Share of vehicles continuing straight versus turning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnRates {
    pub straight: Real,
    pub turn: Real,
}

impl IntersectionParams {
    /// Create a parameter set from per-segment rate coefficients.
    pub fn new(rate_coefficients: Segments) -> ModelResult<Self> {
        let params = Self {
            rate_coefficients,
            velocity_mps: None,
            turn_rates: None,
        };
        params.validate()?;
        Ok(params)
    }

    /// Same as [`IntersectionParams::new`], for coefficients of unchecked length.
    pub fn from_slice(rate_coefficients: &[Real]) -> ModelResult<Self> {
        Self::new(to_segments(rate_coefficients, "rate_coefficients")?)
    }

    /// Attach a characteristic velocity.
    pub fn with_velocity(mut self, velocity: Velocity) -> ModelResult<Self> {
        self.velocity_mps = Some(as_mps(velocity));
        self.validate()?;
        Ok(self)
    }

    pub fn with_turn_rates(mut self, straight: Real, turn: Real) -> ModelResult<Self> {
        self.turn_rates = Some(TurnRates { straight, turn });
        self.validate()?;
        Ok(self)
    }

    /// Check every field. Called by the model constructor, so deserialized
    /// parameter sets are rejected before use.
    pub fn validate(&self) -> ModelResult<()> {
        for &alpha in &self.rate_coefficients {
            if !alpha.is_finite() {
                return Err(ModelError::InvalidParameter {
                    what: "rate coefficients must be finite",
                });
            }
            if alpha < 0.0 {
                return Err(ModelError::InvalidParameter {
                    what: "rate coefficients must be non-negative",
                });
            }
        }
        if let Some(v) = self.velocity_mps {
            if !v.is_finite() || v <= 0.0 {
                return Err(ModelError::InvalidParameter {
                    what: "velocity must be finite and positive",
                });
            }
        }
        if let Some(rates) = self.turn_rates {
            let in_unit = |r: Real| (0.0..=1.0).contains(&r);
            if !in_unit(rates.straight) || !in_unit(rates.turn) {
                return Err(ModelError::InvalidParameter {
                    what: "turn rates must lie in [0, 1]",
                });
            }
        }
        Ok(())
    }

    /// Element-wise factor applied to a state to obtain the sensor reading.
    pub fn sensor_gain(&self) -> Segments {
        let v = self.velocity_mps.unwrap_or(1.0);
        self.rate_coefficients.map(|alpha| alpha * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::mps;

    #[test]
    fn accepts_valid_coefficients() {
        let params = IntersectionParams::new([1.0, 0.5, 0.0, 2.0]).unwrap();
        assert_eq!(params.rate_coefficients, [1.0, 0.5, 0.0, 2.0]);
        assert_eq!(params.velocity_mps, None);
    }

    #[test]
    fn rejects_bad_coefficients() {
        assert!(matches!(
            IntersectionParams::new([1.0, -0.5, 1.0, 1.0]),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            IntersectionParams::new([1.0, f64::NAN, 1.0, 1.0]),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn from_slice_checks_length() {
        let err = IntersectionParams::from_slice(&[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidDimension {
                what: "rate_coefficients",
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn velocity_scales_sensor_gain() {
        let params = IntersectionParams::new([1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_velocity(mps(2.0))
            .unwrap();
        assert_eq!(params.sensor_gain(), [2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn rejects_non_positive_velocity() {
        let params = IntersectionParams::new([1.0; 4]).unwrap();
        assert!(params.with_velocity(mps(0.0)).is_err());
    }

    #[test]
    fn rejects_turn_rates_outside_unit_interval() {
        let params = IntersectionParams::new([1.0; 4]).unwrap();
        assert!(params.clone().with_turn_rates(0.7, 0.3).is_ok());
        assert!(params.with_turn_rates(1.5, 0.3).is_err());
    }
}
