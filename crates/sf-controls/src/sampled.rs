//! Sampled execution primitives for digital controllers.
//!
//! Controllers operate in sampled/digital mode with a configured update period.
//! Between samples, controller outputs are held constant (zero-order hold).

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Sample configuration for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sample period in seconds.
    pub dt: f64,
}

impl SampleConfig {
    /// Create a new sample configuration. `dt` must be positive and finite.
    pub fn new(dt: f64) -> ControlResult<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "sample period must be positive",
            });
        }
        Ok(Self { dt })
    }

    /// Create a sample configuration from frequency in Hz.
    pub fn from_frequency(freq_hz: f64) -> ControlResult<Self> {
        if !(freq_hz.is_finite() && freq_hz > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "frequency must be positive",
            });
        }
        Self::new(1.0 / freq_hz)
    }

    pub fn frequency(&self) -> f64 {
        1.0 / self.dt
    }
}

/// Sample clock tracks when a controller should execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    pub config: SampleConfig,
    /// Time of next scheduled sample.
    pub next_sample_time: f64,
}

impl SampleClock {
    /// Clock whose first sample is one period after `initial_time`.
    pub fn new(config: SampleConfig, initial_time: f64) -> Self {
        Self {
            config,
            next_sample_time: initial_time + config.dt,
        }
    }

    /// Clock whose first sample is due at `initial_time`.
    pub fn immediate(config: SampleConfig, initial_time: f64) -> Self {
        Self {
            config,
            next_sample_time: initial_time,
        }
    }

    /// Returns `true` if `current_time >= next_sample_time`.
    pub fn should_sample(&self, current_time: f64) -> bool {
        // Tolerate accumulated round-off from summing fixed steps.
        current_time + 1e-9 * self.config.dt >= self.next_sample_time
    }

    /// Advance to the next sample time.
    pub fn advance(&mut self) {
        self.next_sample_time += self.config.dt;
    }

    pub fn reset(&mut self, current_time: f64) {
        self.next_sample_time = current_time + self.config.dt;
    }

    pub fn time_until_sample(&self, current_time: f64) -> f64 {
        (self.next_sample_time - current_time).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_creation() {
        let config = SampleConfig::new(0.1).unwrap();
        assert_eq!(config.dt, 0.1);
        assert!((config.frequency() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn sample_config_rejects_non_positive_period() {
        assert!(SampleConfig::new(0.0).is_err());
        assert!(SampleConfig::new(-1.0).is_err());
        assert!(SampleConfig::from_frequency(0.0).is_err());
    }

    #[test]
    fn sample_config_from_frequency() {
        let config = SampleConfig::from_frequency(10.0).unwrap();
        assert!((config.dt - 0.1).abs() < 1e-10);
    }

    #[test]
    fn sample_clock_basic() {
        let config = SampleConfig::new(0.1).unwrap();
        let mut clock = SampleClock::new(config, 0.0);

        assert!(!clock.should_sample(0.0));
        assert!(clock.should_sample(0.1));

        clock.advance();
        assert!(!clock.should_sample(0.1));
        assert!(clock.should_sample(0.2));
    }

    #[test]
    fn immediate_clock_samples_at_start() {
        let config = SampleConfig::new(0.5).unwrap();
        let mut clock = SampleClock::immediate(config, 2.0);
        assert!(clock.should_sample(2.0));
        clock.advance();
        assert!(!clock.should_sample(2.25));
        assert!(clock.should_sample(2.5));
    }

    #[test]
    fn sample_clock_tolerates_summed_steps() {
        let config = SampleConfig::new(0.3).unwrap();
        let mut clock = SampleClock::new(config, 0.0);
        let t = 0.1 + 0.1 + 0.1;
        assert!(clock.should_sample(t));
        clock.reset(t);
        assert!((clock.time_until_sample(t) - 0.3).abs() < 1e-12);
    }
}
