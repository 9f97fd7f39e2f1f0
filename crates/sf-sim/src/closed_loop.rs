//! Closed-loop runs: a split policy reads the sensor and sets the control.
//!
//! Each step the runner re-initializes the model at the accepted state, reads
//! `sensor()`, asks the policy for a split and holds that split constant while
//! the integrator advances one step (zero-order hold).

use std::io::{self, Write};

use sf_controls::{Controller, SampleClock, SampleConfig};
use sf_core::{Real, Segments, clamp_non_negative};
use sf_model::{Direction, IntersectionModel, Phase};

use crate::error::{SimError, SimResult};
use crate::inputs::InflowSource;
use crate::model::TransientModel;
use crate::sim::SimOptions;

/// Decides the control split from the current sensor reading.
pub trait SplitPolicy {
    fn split(&mut self, t: Real, sensor: &Segments) -> SimResult<Real>;
}

impl<P: SplitPolicy + ?Sized> SplitPolicy for Box<P> {
    fn split(&mut self, t: Real, sensor: &Segments) -> SimResult<Real> {
        (**self).split(t, sensor)
    }
}

/// Constant split regardless of traffic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSplit(Real);

impl FixedSplit {
    pub fn new(split: Real) -> SimResult<Self> {
        if !(0.0..=1.0).contains(&split) {
            return Err(SimError::InvalidArg {
                what: "split must lie in [0, 1]",
            });
        }
        Ok(Self(split))
    }

    pub fn value(&self) -> Real {
        self.0
    }
}

impl SplitPolicy for FixedSplit {
    fn split(&mut self, _t: Real, _sensor: &Segments) -> SimResult<Real> {
        Ok(self.0)
    }
}

/// Share of the measured flow on the North/South phase.
///
/// An idle intersection (zero total) reads as balanced.
pub fn north_south_share(sensor: &Segments) -> Real {
    let total: Real = sensor.iter().sum();
    if total <= 0.0 {
        return 0.5;
    }
    let ns: Real = Phase::NorthSouth
        .segments()
        .iter()
        .map(|d| sensor[d.index()])
        .sum();
    ns / total
}

/// Feedback policy built on a sampled controller.
///
/// The process variable is [`north_south_share`]. With the default setpoint of
/// 0.5 the controller grows the East/West split when East/West carries more
/// than half the flow, and shrinks it otherwise.
#[derive(Debug, Clone)]
pub struct FeedbackSplit<C: Controller> {
    controller: C,
    state: C::State,
    setpoint: Real,
    clock: SampleClock,
    last_sample: Option<Real>,
    held: Real,
}

impl<C: Controller> FeedbackSplit<C> {
    /// `controller` output limits must lie within `[0, 1]`.
    pub fn new(controller: C, setpoint: Real, sample: SampleConfig) -> SimResult<Self> {
        let (lo, hi) = controller.output_limits();
        if lo < 0.0 || hi > 1.0 {
            return Err(SimError::InvalidArg {
                what: "controller output limits must lie within [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&setpoint) {
            return Err(SimError::InvalidArg {
                what: "setpoint must lie in [0, 1]",
            });
        }
        Ok(Self {
            controller,
            state: C::State::default(),
            setpoint,
            clock: SampleClock::immediate(sample, 0.0),
            last_sample: None,
            held: 0.5_f64.clamp(lo, hi),
        })
    }

    /// Start from a given controller memory instead of the default.
    pub fn with_state(mut self, state: C::State) -> Self {
        self.state = state;
        self
    }

    pub fn controller_state(&self) -> &C::State {
        &self.state
    }
}

impl<C: Controller> SplitPolicy for FeedbackSplit<C> {
    fn split(&mut self, t: Real, sensor: &Segments) -> SimResult<Real> {
        if self.clock.should_sample(t) {
            let dt = match self.last_sample {
                Some(prev) => t - prev,
                None => self.clock.config.dt,
            };
            let pv = north_south_share(sensor);
            let (state, output) = self.controller.update(&self.state, pv, self.setpoint, dt);
            tracing::trace!(t, pv, output, "split controller sampled");
            self.state = state;
            self.held = output;
            self.last_sample = Some(t);
            self.clock.advance();
        }
        Ok(self.held)
    }
}

/// Trajectory of a closed-loop run.
///
/// Entry `k` holds the state and sensor reading at `t[k]` and the split
/// applied from `t[k]` onwards.
#[derive(Clone, Debug, Default)]
pub struct ClosedLoopRecord {
    pub t: Vec<Real>,
    pub x: Vec<Segments>,
    pub control: Vec<Real>,
    pub sensor: Vec<Segments>,
}

impl ClosedLoopRecord {
    fn push(&mut self, t: Real, x: Segments, control: Real, sensor: Segments) {
        self.t.push(t);
        self.x.push(x);
        self.control.push(control);
        self.sensor.push(sensor);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Density trace of one segment.
    pub fn density(&self, direction: Direction) -> Vec<Real> {
        self.x.iter().map(|x| x[direction.index()]).collect()
    }

    /// Write `t,p_n,p_e,p_s,p_w,control` rows with a header line.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "t,p_n,p_e,p_s,p_w,control")?;
        for k in 0..self.len() {
            let [n, e, s, w] = self.x[k];
            writeln!(out, "{},{},{},{},{},{}", self.t[k], n, e, s, w, self.control[k])?;
        }
        Ok(())
    }
}

/// One integration step with the split held fixed.
struct HeldSplit<'a, I> {
    model: &'a mut IntersectionModel,
    inflow: &'a mut I,
    control: Real,
}

impl<I: InflowSource> TransientModel for HeldSplit<'_, I> {
    type State = Segments;

    fn initial_state(&self) -> Segments {
        self.model.get_state()
    }

    fn rhs(&mut self, t: f64, x: &Segments) -> SimResult<Segments> {
        let inflow = self.inflow.inflow(t);
        Ok(self.model.evaluate_derivative(t, x, self.control, &inflow)?)
    }

    fn add(&self, a: &Segments, b: &Segments) -> Segments {
        std::array::from_fn(|i| a[i] + b[i])
    }

    fn scale(&self, a: &Segments, scale: f64) -> Segments {
        a.map(|v| v * scale)
    }

    fn constrain(&self, x: Segments) -> Segments {
        clamp_non_negative(&x)
    }
}

/// Simulate the intersection under sensor feedback.
///
/// Starts from the model's current state. On return the model holds the final
/// accepted state.
pub fn run_closed_loop<I, P>(
    model: &mut IntersectionModel,
    inflow: &mut I,
    policy: &mut P,
    opts: &SimOptions,
) -> SimResult<ClosedLoopRecord>
where
    I: InflowSource,
    P: SplitPolicy,
{
    opts.validate()?;
    let steps = opts.step_count();
    tracing::debug!(
        dt = opts.dt,
        steps,
        integrator = ?opts.integrator,
        "starting closed-loop simulation"
    );

    let mut record = ClosedLoopRecord::default();
    let mut x = model.get_state();
    let mut t = 0.0;
    let mut control = None;

    for step in 0..steps {
        model.set_initial_state(&x)?;
        let sensor = model.sensor();
        let split = sample_split(policy, t, &sensor)?;
        control = Some(split);

        if step % opts.record_every == 0 {
            record.push(t, x, split, sensor);
        }

        let mut held = HeldSplit {
            model: &mut *model,
            inflow: &mut *inflow,
            control: split,
        };
        let next = opts.integrator.step(&mut held, t, &x, opts.dt)?;
        x = held.constrain(next);
        t = (step + 1) as f64 * opts.dt;
    }

    model.set_initial_state(&x)?;
    let sensor = model.sensor();
    // With no steps taken the policy has not been asked yet.
    let control = match control {
        Some(split) => split,
        None => sample_split(policy, t, &sensor)?,
    };
    record.push(t, x, control, sensor);

    tracing::debug!(t_end = t, records = record.len(), "closed-loop simulation finished");
    Ok(record)
}

fn sample_split<P: SplitPolicy>(policy: &mut P, t: Real, sensor: &Segments) -> SimResult<Real> {
    let split = policy.split(t, sensor)?;
    if !(0.0..=1.0).contains(&split) {
        return Err(SimError::NonPhysical {
            what: "split policy returned a value outside [0, 1]",
        });
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_controls::PController;

    #[test]
    fn north_south_share_of_idle_intersection_is_balanced() {
        assert_eq!(north_south_share(&[0.0; 4]), 0.5);
        assert_eq!(north_south_share(&[3.0, 1.0, 1.0, 0.0]), 0.8);
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let mut record = ClosedLoopRecord::default();
        record.push(0.0, [1.0, 2.0, 3.0, 4.0], 0.5, [1.0, 2.0, 3.0, 4.0]);
        record.push(0.5, [0.5, 1.0, 1.5, 2.0], 0.25, [0.5, 1.0, 1.5, 2.0]);

        let mut buf = Vec::new();
        record.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "t,p_n,p_e,p_s,p_w,control");
        assert_eq!(lines[2], "0.5,0.5,1,1.5,2,0.25");
    }

    #[test]
    fn fixed_split_validates_range() {
        assert!(FixedSplit::new(0.3).is_ok());
        assert!(FixedSplit::new(-0.3).is_err());
        assert!(FixedSplit::new(1.3).is_err());
    }

    #[test]
    fn feedback_split_favours_busier_phase() {
        let p = PController::new(0.5, 0.0, 1.0).unwrap();
        let sample = SampleConfig::new(1.0).unwrap();
        let mut policy = FeedbackSplit::new(p, 0.5, sample)
            .unwrap()
            .with_state(sf_controls::PControllerState::starting_at(0.5));

        // East/West busier: North/South share 0.25, so the split grows
        let u = policy.split(0.0, &[1.0, 3.0, 1.0, 3.0]).unwrap();
        assert!(u > 0.5);
    }

    #[test]
    fn feedback_split_holds_between_samples() {
        let p = PController::new(1.0, 0.0, 1.0).unwrap();
        let sample = SampleConfig::new(1.0).unwrap();
        let mut policy = FeedbackSplit::new(p, 0.5, sample).unwrap();

        let first = policy.split(0.0, &[1.0, 3.0, 1.0, 3.0]).unwrap();
        let held = policy.split(0.5, &[9.0, 0.0, 9.0, 0.0]).unwrap();
        assert_eq!(first, held);
        let next = policy.split(1.0, &[9.0, 0.0, 9.0, 0.0]).unwrap();
        assert!(next < held);
    }

    #[test]
    fn feedback_split_rejects_wide_limits() {
        let p = PController::new(1.0, -1.0, 1.0).unwrap();
        let sample = SampleConfig::new(1.0).unwrap();
        assert!(FeedbackSplit::new(p, 0.5, sample).is_err());
    }
}
