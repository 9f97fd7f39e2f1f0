//! Scenario schema definitions.

use serde::{Deserialize, Serialize};
use sf_sim::IntegratorType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    pub model: ModelDef,
    /// Initial density per segment (N, E, S, W).
    pub initial_state: Vec<f64>,
    /// Constant external inflow per segment (N, E, S, W).
    pub inflow: Vec<f64>,
    pub control: ControlDef,
    #[serde(default)]
    pub run: RunDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    pub rate_coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_rates: Option<TurnRatesDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TurnRatesDef {
    pub straight: f64,
    pub turn: f64,
}

/// How the split is chosen. Feedback variants drive the North/South share of
/// the measured flow towards `setpoint`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControlDef {
    Fixed {
        split: f64,
    },
    P {
        kp: f64,
        #[serde(default = "default_limit_min")]
        out_min: f64,
        #[serde(default = "default_limit_max")]
        out_max: f64,
        #[serde(default = "default_half")]
        initial_output: f64,
        #[serde(default = "default_half")]
        setpoint: f64,
        sample_period_s: f64,
    },
    PI {
        kp: f64,
        ti_s: f64,
        #[serde(default = "default_half")]
        bias: f64,
        #[serde(default = "default_limit_min")]
        out_min: f64,
        #[serde(default = "default_limit_max")]
        out_max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        integral_limit: Option<f64>,
        #[serde(default = "default_half")]
        setpoint: f64,
        sample_period_s: f64,
    },
    PID {
        kp: f64,
        ti_s: f64,
        td_s: f64,
        td_filter_s: f64,
        #[serde(default = "default_half")]
        bias: f64,
        #[serde(default = "default_limit_min")]
        out_min: f64,
        #[serde(default = "default_limit_max")]
        out_max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        integral_limit: Option<f64>,
        #[serde(default = "default_half")]
        setpoint: f64,
        sample_period_s: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    #[serde(default = "default_t_end")]
    pub t_end_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub integrator: IntegratorType,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            dt_s: default_dt(),
            t_end_s: default_t_end(),
            record_every: default_record_every(),
            integrator: IntegratorType::default(),
        }
    }
}

fn default_half() -> f64 {
    0.5
}

fn default_limit_min() -> f64 {
    0.0
}

fn default_limit_max() -> f64 {
    1.0
}

fn default_dt() -> f64 {
    0.1
}

fn default_t_end() -> f64 {
    60.0
}

fn default_record_every() -> usize {
    10
}
