//! Controller block implementations.
//!
//! Provides standard controller types:
//! - **P (Proportional)**: incremental form, nudges the previous output
//! - **PI (Proportional-Integral)**: classic feedback controller
//! - **PID (Proportional-Integral-Derivative)**: adds filtered derivative action
//!
//! All controllers clamp their output. PI and PID also clamp the integral and
//! stop integrating while the output is saturated (anti-windup).

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Common interface over the controller types.
pub trait Controller {
    /// Memory carried between updates.
    type State: Clone + Default + std::fmt::Debug;

    /// Compute the next output from process variable `pv` and setpoint `sp`.
    fn update(&self, state: &Self::State, pv: f64, sp: f64, dt: f64) -> (Self::State, f64);

    /// `(out_min, out_max)`.
    fn output_limits(&self) -> (f64, f64);
}

fn check_gain(kp: f64) -> ControlResult<()> {
    if kp.is_finite() {
        Ok(())
    } else {
        Err(ControlError::InvalidArg {
            what: "kp must be finite",
        })
    }
}

fn check_limits(out_min: f64, out_max: f64) -> ControlResult<()> {
    if !(out_min.is_finite() && out_max.is_finite()) {
        return Err(ControlError::InvalidArg {
            what: "output limits must be finite",
        });
    }
    if out_min >= out_max {
        return Err(ControlError::InvalidArg {
            what: "out_min must be less than out_max",
        });
    }
    Ok(())
}

/// Incremental proportional controller: `u = clamp(u_prev + kp * (sp - pv))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PController {
    pub kp: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl PController {
    pub fn new(kp: f64, out_min: f64, out_max: f64) -> ControlResult<Self> {
        check_gain(kp)?;
        check_limits(out_min, out_max)?;
        Ok(Self {
            kp,
            out_min,
            out_max,
        })
    }

    pub fn update(&self, state: &PControllerState, pv: f64, sp: f64) -> (PControllerState, f64) {
        let output = (state.output + self.kp * (sp - pv)).clamp(self.out_min, self.out_max);
        (PControllerState { output }, output)
    }
}

impl Controller for PController {
    type State = PControllerState;

    fn update(&self, state: &Self::State, pv: f64, sp: f64, _dt: f64) -> (Self::State, f64) {
        PController::update(self, state, pv, sp)
    }

    fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }
}

/// P controller state: the previous output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PControllerState {
    pub output: f64,
}

impl PControllerState {
    pub fn starting_at(output: f64) -> Self {
        Self { output }
    }
}

/// PI controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral time constant (seconds). Larger values reduce integral action.
    pub ti: f64,
    /// Output when the error and integral are zero.
    #[serde(default)]
    pub bias: f64,
    pub out_min: f64,
    pub out_max: f64,
    /// Integral windup limit (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integral_limit: Option<f64>,
}

impl PIController {
    /// Create a new PI controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ti` - Integral time constant (seconds)
    /// * `out_min` - Minimum output
    /// * `out_max` - Maximum output
    pub fn new(kp: f64, ti: f64, out_min: f64, out_max: f64) -> ControlResult<Self> {
        check_gain(kp)?;
        if !(ti.is_finite() && ti > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "ti must be positive",
            });
        }
        check_limits(out_min, out_max)?;
        Ok(Self {
            kp,
            ti,
            bias: 0.0,
            out_min,
            out_max,
            integral_limit: None,
        })
    }

    /// Set integral windup limit.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit);
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Compute controller output given process variable and setpoint.
    ///
    /// Returns updated state and output value.
    pub fn update(
        &self,
        state: &PIControllerState,
        pv: f64,
        sp: f64,
        dt: f64,
    ) -> (PIControllerState, f64) {
        let error = sp - pv;
        let p_term = self.kp * error;

        let ki = self.kp / self.ti;
        let clamped_integral = clamp_integral(state.integral + error * dt, self.integral_limit);
        let i_term = ki * clamped_integral;

        let output_raw = self.bias + p_term + i_term;
        let output = output_raw.clamp(self.out_min, self.out_max);

        // Anti-windup: keep the old integral while saturated
        let final_integral = if output == output_raw {
            clamped_integral
        } else {
            state.integral
        };

        (
            PIControllerState {
                integral: final_integral,
            },
            output,
        )
    }
}

impl Controller for PIController {
    type State = PIControllerState;

    fn update(&self, state: &Self::State, pv: f64, sp: f64, dt: f64) -> (Self::State, f64) {
        PIController::update(self, state, pv, sp, dt)
    }

    fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }
}

/// PI controller state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PIControllerState {
    /// Integral accumulator.
    pub integral: f64,
}

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIDController {
    pub kp: f64,
    /// Integral time constant (seconds).
    pub ti: f64,
    /// Derivative time constant (seconds).
    pub td: f64,
    /// Derivative filter time constant (seconds). Prevents noise amplification.
    pub td_filter: f64,
    #[serde(default)]
    pub bias: f64,
    pub out_min: f64,
    pub out_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integral_limit: Option<f64>,
}

impl PIDController {
    /// Create a new PID controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ti` - Integral time constant (seconds)
    /// * `td` - Derivative time constant (seconds)
    /// * `td_filter` - Derivative filter time constant (seconds)
    /// * `out_min` - Minimum output
    /// * `out_max` - Maximum output
    pub fn new(
        kp: f64,
        ti: f64,
        td: f64,
        td_filter: f64,
        out_min: f64,
        out_max: f64,
    ) -> ControlResult<Self> {
        check_gain(kp)?;
        if !(ti.is_finite() && ti > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "ti must be positive",
            });
        }
        if !(td.is_finite() && td >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "td must be non-negative",
            });
        }
        if !(td_filter.is_finite() && td_filter > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "td_filter must be positive",
            });
        }
        check_limits(out_min, out_max)?;
        Ok(Self {
            kp,
            ti,
            td,
            td_filter,
            bias: 0.0,
            out_min,
            out_max,
            integral_limit: None,
        })
    }

    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit);
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Compute controller output.
    ///
    /// Uses filtered derivative to prevent noise amplification.
    pub fn update(
        &self,
        state: &PIDControllerState,
        pv: f64,
        sp: f64,
        dt: f64,
    ) -> (PIDControllerState, f64) {
        let error = sp - pv;
        let p_term = self.kp * error;

        let ki = self.kp / self.ti;
        let clamped_integral = clamp_integral(state.integral + error * dt, self.integral_limit);
        let i_term = ki * clamped_integral;

        // Discrete first-order filter: filt[n] = a * filt[n-1] + (1 - a) * error
        let alpha = self.td_filter / (self.td_filter + dt);
        let filtered_error = alpha * state.filtered_error + (1.0 - alpha) * error;
        let kd = self.kp * self.td;
        let d_term = if dt > 0.0 {
            kd * (filtered_error - state.filtered_error) / dt
        } else {
            0.0
        };

        let output_raw = self.bias + p_term + i_term + d_term;
        let output = output_raw.clamp(self.out_min, self.out_max);

        let final_integral = if output == output_raw {
            clamped_integral
        } else {
            state.integral
        };

        (
            PIDControllerState {
                integral: final_integral,
                filtered_error,
            },
            output,
        )
    }
}

impl Controller for PIDController {
    type State = PIDControllerState;

    fn update(&self, state: &Self::State, pv: f64, sp: f64, dt: f64) -> (Self::State, f64) {
        PIDController::update(self, state, pv, sp, dt)
    }

    fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }
}

/// PID controller state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PIDControllerState {
    /// Integral accumulator.
    pub integral: f64,
    /// Filtered error for derivative calculation.
    pub filtered_error: f64,
}

fn clamp_integral(integral: f64, limit: Option<f64>) -> f64 {
    match limit {
        Some(limit) => integral.clamp(-limit, limit),
        None => integral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_controller_accumulates_on_previous_output() {
        let p = PController::new(0.5, 0.0, 1.0).unwrap();
        let state = PControllerState::starting_at(0.2);

        let (state, output) = p.update(&state, 0.4, 0.6);
        assert!((output - 0.3).abs() < 1e-12);

        let (_, output) = p.update(&state, 0.4, 0.6);
        assert!((output - 0.4).abs() < 1e-12);
    }

    #[test]
    fn p_controller_clamps() {
        let p = PController::new(10.0, 0.0, 1.0).unwrap();
        let (state, output) = p.update(&PControllerState::default(), 0.0, 1.0);
        assert_eq!(output, 1.0);
        let (_, output) = p.update(&state, 5.0, 0.0);
        assert_eq!(output, 0.0);
    }

    #[test]
    fn pi_controller_creation() {
        let pi = PIController::new(1.0, 2.0, 0.0, 1.0).unwrap();
        assert_eq!(pi.kp, 1.0);
        assert_eq!(pi.ti, 2.0);
        assert_eq!(pi.bias, 0.0);
    }

    #[test]
    fn pi_controller_proportional_only() {
        let pi = PIController::new(2.0, 1000.0, 0.0, 1.0).unwrap(); // very large Ti ~ P-only
        let state = PIControllerState::default();

        let (_, output) = pi.update(&state, 0.5, 1.0, 0.1);
        // P = 2.0 * 0.5 = 1.0 plus a sliver of integral, clamped to max
        assert!((output - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pi_controller_integral_action() {
        let pi = PIController::new(1.0, 1.0, 0.0, 10.0).unwrap();
        let mut state = PIControllerState::default();

        for _ in 0..10 {
            let (new_state, _) = pi.update(&state, 0.0, 1.0, 0.1);
            state = new_state;
        }

        assert!(state.integral > 0.5);
    }

    #[test]
    fn pi_controller_anti_windup() {
        let pi = PIController::new(10.0, 1.0, 0.0, 1.0).unwrap();
        let mut state = PIControllerState::default();
        for _ in 0..50 {
            let (new_state, output) = pi.update(&state, 0.0, 10.0, 0.1);
            assert_eq!(output, 1.0);
            state = new_state;
        }
        // Saturated from the first step, so nothing accumulated
        assert_eq!(state.integral, 0.0);
    }

    #[test]
    fn pi_controller_bias_is_resting_output() {
        let pi = PIController::new(1.0, 1.0, 0.0, 1.0).unwrap().with_bias(0.5);
        let (_, output) = pi.update(&PIControllerState::default(), 0.3, 0.3, 0.1);
        assert_eq!(output, 0.5);
    }

    #[test]
    fn integral_limit_caps_accumulator() {
        let pi = PIController::new(0.01, 1.0, -100.0, 100.0)
            .unwrap()
            .with_integral_limit(0.25);
        let mut state = PIControllerState::default();
        for _ in 0..100 {
            state = pi.update(&state, 0.0, 1.0, 0.1).0;
        }
        assert_eq!(state.integral, 0.25);
    }

    #[test]
    fn pid_controller_creation() {
        let pid = PIDController::new(1.0, 2.0, 0.5, 0.1, 0.0, 1.0).unwrap();
        assert_eq!(pid.kp, 1.0);
        assert_eq!(pid.td, 0.5);
    }

    #[test]
    fn pid_controller_basic() {
        let pid = PIDController::new(1.0, 10.0, 0.1, 0.1, 0.0, 10.0).unwrap();
        let state = PIDControllerState::default();

        let (_, output) = pid.update(&state, 5.0, 10.0, 0.1);
        assert!(output > 0.0);
    }

    #[test]
    fn pid_derivative_opposes_falling_error() {
        let pid = PIDController::new(1.0, 1e6, 1.0, 0.01, -100.0, 100.0).unwrap();
        let (state, _) = pid.update(&PIDControllerState::default(), 0.0, 1.0, 0.1);
        // Error drops from 1.0 to 0.5: derivative term pulls output below P alone
        let (_, output) = pid.update(&state, 0.5, 1.0, 0.1);
        assert!(output < 0.5);
    }

    #[test]
    fn invalid_controller_params() {
        assert!(PController::new(f64::NAN, 0.0, 1.0).is_err());
        assert!(PController::new(1.0, 1.0, 1.0).is_err());
        // Negative Ti
        assert!(PIController::new(1.0, -1.0, 0.0, 1.0).is_err());
        // out_min >= out_max
        assert!(PIController::new(1.0, 1.0, 1.0, 0.0).is_err());
        // Negative Td
        assert!(PIDController::new(1.0, 1.0, -0.5, 0.1, 0.0, 1.0).is_err());
        assert!(PIDController::new(1.0, 1.0, 0.5, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn non_finite_gains_and_time_constants_are_rejected() {
        assert!(PIController::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(PIController::new(f64::INFINITY, 1.0, 0.0, 1.0).is_err());
        assert!(PIController::new(1.0, f64::NAN, 0.0, 1.0).is_err());
        assert!(PIController::new(1.0, f64::INFINITY, 0.0, 1.0).is_err());
        assert!(PIDController::new(f64::NAN, 1.0, 0.1, 0.1, 0.0, 1.0).is_err());
        assert!(PIDController::new(1.0, f64::NAN, 0.1, 0.1, 0.0, 1.0).is_err());
        assert!(PIDController::new(1.0, 1.0, f64::NAN, 0.1, 0.0, 1.0).is_err());
        assert!(PIDController::new(1.0, 1.0, 0.1, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn trait_dispatch_matches_inherent_update() {
        fn run<C: Controller>(c: &C) -> f64 {
            let (_, out) = c.update(&C::State::default(), 0.2, 0.7, 0.1);
            out
        }
        let pi = PIController::new(1.0, 2.0, -1.0, 1.0).unwrap();
        let (_, direct) = pi.update(&PIControllerState::default(), 0.2, 0.7, 0.1);
        assert_eq!(run(&pi), direct);
        assert_eq!(pi.output_limits(), (-1.0, 1.0));
    }
}
