//! Scenario validation logic.

use crate::schema::{ControlDef, ModelDef, RunDef, Scenario};
use sf_core::SEGMENTS;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    validate_model(&scenario.model)?;
    validate_segments("initial_state", &scenario.initial_state, true)?;
    validate_segments("inflow", &scenario.inflow, false)?;
    validate_control(&scenario.control)?;
    validate_run(&scenario.run)?;
    Ok(())
}

fn validate_segments(field: &str, values: &[f64], non_negative: bool) -> Result<(), ValidationError> {
    if values.len() != SEGMENTS {
        return Err(invalid(
            field,
            format!("{values:?}"),
            "must have one entry per segment (N, E, S, W)",
        ));
    }
    for (i, v) in values.iter().enumerate() {
        let name = format!("{field}[{i}]");
        if !v.is_finite() {
            return Err(invalid(&name, v, "must be finite"));
        }
        if non_negative && *v < 0.0 {
            return Err(invalid(&name, v, "must be non-negative"));
        }
    }
    Ok(())
}

fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    validate_segments("model.rate_coefficients", &model.rate_coefficients, true)?;
    if let Some(v) = model.velocity_mps {
        if !(v.is_finite() && v > 0.0) {
            return Err(invalid("model.velocity_mps", v, "must be positive"));
        }
    }
    if let Some(rates) = model.turn_rates {
        for (field, r) in [
            ("model.turn_rates.straight", rates.straight),
            ("model.turn_rates.turn", rates.turn),
        ] {
            if !(0.0..=1.0).contains(&r) {
                return Err(invalid(field, r, "must lie in [0, 1]"));
            }
        }
    }
    Ok(())
}

fn check_unit(field: &str, v: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, v, "must lie in [0, 1]"))
    }
}

fn check_positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive"))
    }
}

fn check_limits(out_min: f64, out_max: f64) -> Result<(), ValidationError> {
    check_unit("control.out_min", out_min)?;
    check_unit("control.out_max", out_max)?;
    if out_min >= out_max {
        return Err(invalid(
            "control.out_min",
            out_min,
            "must be less than control.out_max",
        ));
    }
    Ok(())
}

fn validate_control(control: &ControlDef) -> Result<(), ValidationError> {
    match control {
        ControlDef::Fixed { split } => check_unit("control.split", *split),
        ControlDef::P {
            kp,
            out_min,
            out_max,
            initial_output,
            setpoint,
            sample_period_s,
        } => {
            if !kp.is_finite() {
                return Err(invalid("control.kp", kp, "must be finite"));
            }
            check_limits(*out_min, *out_max)?;
            check_unit("control.initial_output", *initial_output)?;
            check_unit("control.setpoint", *setpoint)?;
            check_positive("control.sample_period_s", *sample_period_s)
        }
        ControlDef::PI {
            ti_s,
            out_min,
            out_max,
            setpoint,
            sample_period_s,
            ..
        } => {
            check_positive("control.ti_s", *ti_s)?;
            check_limits(*out_min, *out_max)?;
            check_unit("control.setpoint", *setpoint)?;
            check_positive("control.sample_period_s", *sample_period_s)
        }
        ControlDef::PID {
            ti_s,
            td_s,
            td_filter_s,
            out_min,
            out_max,
            setpoint,
            sample_period_s,
            ..
        } => {
            check_positive("control.ti_s", *ti_s)?;
            if !(td_s.is_finite() && *td_s >= 0.0) {
                return Err(invalid("control.td_s", td_s, "must be non-negative"));
            }
            check_positive("control.td_filter_s", *td_filter_s)?;
            check_limits(*out_min, *out_max)?;
            check_unit("control.setpoint", *setpoint)?;
            check_positive("control.sample_period_s", *sample_period_s)
        }
    }
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    check_positive("run.dt_s", run.dt_s)?;
    if !(run.t_end_s.is_finite() && run.t_end_s >= 0.0) {
        return Err(invalid("run.t_end_s", run.t_end_s, "must be non-negative"));
    }
    if run.record_every == 0 {
        return Err(invalid("run.record_every", 0, "must be positive"));
    }
    Ok(())
}
