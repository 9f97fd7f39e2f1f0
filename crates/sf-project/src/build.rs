//! Turning a validated scenario into runnable parts.

use sf_controls::{PController, PControllerState, PIController, PIDController, SampleConfig};
use sf_model::{IntersectionModel, IntersectionParams, ModelError, TurnRates};
use sf_sim::{
    ClosedLoopRecord, ConstantInflow, FeedbackSplit, FixedSplit, SimOptions, SplitPolicy,
    run_closed_loop,
};

use crate::ProjectResult;
use crate::schema::{ControlDef, Scenario};
use crate::validate::validate_scenario;

impl Scenario {
    pub fn params(&self) -> ProjectResult<IntersectionParams> {
        let mut params = IntersectionParams::from_slice(&self.model.rate_coefficients)?;
        params.velocity_mps = self.model.velocity_mps;
        params.turn_rates = self.model.turn_rates.map(|r| TurnRates {
            straight: r.straight,
            turn: r.turn,
        });
        params.validate()?;
        Ok(params)
    }

    pub fn build_model(&self) -> ProjectResult<IntersectionModel> {
        Ok(IntersectionModel::new(self.params()?, &self.initial_state)?)
    }

    pub fn inflow_source(&self) -> ProjectResult<ConstantInflow> {
        let inflow = sf_core::to_segments(&self.inflow, "inflow").map_err(ModelError::from)?;
        Ok(ConstantInflow(inflow))
    }

    pub fn sim_options(&self) -> SimOptions {
        SimOptions {
            dt: self.run.dt_s,
            t_end: self.run.t_end_s,
            record_every: self.run.record_every,
            integrator: self.run.integrator,
            ..SimOptions::default()
        }
    }

    pub fn build_policy(&self) -> ProjectResult<Box<dyn SplitPolicy>> {
        let policy: Box<dyn SplitPolicy> = match self.control {
            ControlDef::Fixed { split } => Box::new(FixedSplit::new(split)?),
            ControlDef::P {
                kp,
                out_min,
                out_max,
                initial_output,
                setpoint,
                sample_period_s,
            } => {
                let controller = PController::new(kp, out_min, out_max)?;
                let sample = SampleConfig::new(sample_period_s)?;
                Box::new(
                    FeedbackSplit::new(controller, setpoint, sample)?
                        .with_state(PControllerState::starting_at(initial_output)),
                )
            }
            ControlDef::PI {
                kp,
                ti_s,
                bias,
                out_min,
                out_max,
                integral_limit,
                setpoint,
                sample_period_s,
            } => {
                let mut controller = PIController::new(kp, ti_s, out_min, out_max)?.with_bias(bias);
                controller.integral_limit = integral_limit;
                let sample = SampleConfig::new(sample_period_s)?;
                Box::new(FeedbackSplit::new(controller, setpoint, sample)?)
            }
            ControlDef::PID {
                kp,
                ti_s,
                td_s,
                td_filter_s,
                bias,
                out_min,
                out_max,
                integral_limit,
                setpoint,
                sample_period_s,
            } => {
                let mut controller =
                    PIDController::new(kp, ti_s, td_s, td_filter_s, out_min, out_max)?
                        .with_bias(bias);
                controller.integral_limit = integral_limit;
                let sample = SampleConfig::new(sample_period_s)?;
                Box::new(FeedbackSplit::new(controller, setpoint, sample)?)
            }
        };
        Ok(policy)
    }
}

/// Validate and run a scenario end to end.
pub fn run_scenario(scenario: &Scenario) -> ProjectResult<ClosedLoopRecord> {
    validate_scenario(scenario)?;
    let mut model = scenario.build_model()?;
    let mut inflow = scenario.inflow_source()?;
    let mut policy = scenario.build_policy()?;
    Ok(run_closed_loop(
        &mut model,
        &mut inflow,
        &mut policy,
        &scenario.sim_options(),
    )?)
}
