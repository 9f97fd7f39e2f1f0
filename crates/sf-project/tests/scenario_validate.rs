use sf_project::{
    ControlDef, ModelDef, RunDef, Scenario, ValidationError, run_scenario, validate_scenario,
};

fn fixed_scenario() -> Scenario {
    Scenario {
        version: 1,
        name: "Fixed".to_string(),
        model: ModelDef {
            rate_coefficients: vec![1.0; 4],
            velocity_mps: None,
            turn_rates: None,
        },
        initial_state: vec![10.0; 4],
        inflow: vec![0.0; 4],
        control: ControlDef::Fixed { split: 0.5 },
        run: RunDef {
            dt_s: 0.1,
            t_end_s: 2.0,
            record_every: 10,
            ..RunDef::default()
        },
    }
}

fn field_of(err: ValidationError) -> String {
    match err {
        ValidationError::InvalidValue { field, .. } => field,
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn accepts_valid_scenario() {
    validate_scenario(&fixed_scenario()).unwrap();
}

#[test]
fn rejects_unsupported_version() {
    let mut scenario = fixed_scenario();
    scenario.version = 7;
    assert_eq!(
        validate_scenario(&scenario).unwrap_err(),
        ValidationError::UnsupportedVersion { version: 7 }
    );
}

#[test]
fn rejects_wrong_segment_count() {
    let mut scenario = fixed_scenario();
    scenario.initial_state = vec![1.0; 3];
    assert_eq!(field_of(validate_scenario(&scenario).unwrap_err()), "initial_state");

    let mut scenario = fixed_scenario();
    scenario.model.rate_coefficients = vec![1.0; 5];
    assert_eq!(
        field_of(validate_scenario(&scenario).unwrap_err()),
        "model.rate_coefficients"
    );
}

#[test]
fn rejects_negative_initial_density() {
    let mut scenario = fixed_scenario();
    scenario.initial_state = vec![1.0, -1.0, 1.0, 1.0];
    assert_eq!(
        field_of(validate_scenario(&scenario).unwrap_err()),
        "initial_state[1]"
    );
}

#[test]
fn rejects_split_outside_unit_interval() {
    let mut scenario = fixed_scenario();
    scenario.control = ControlDef::Fixed { split: 1.1 };
    assert_eq!(
        field_of(validate_scenario(&scenario).unwrap_err()),
        "control.split"
    );
}

#[test]
fn rejects_controller_limits_outside_unit_interval() {
    let mut scenario = fixed_scenario();
    scenario.control = ControlDef::P {
        kp: 1.0,
        out_min: -0.5,
        out_max: 1.0,
        initial_output: 0.5,
        setpoint: 0.5,
        sample_period_s: 1.0,
    };
    assert_eq!(
        field_of(validate_scenario(&scenario).unwrap_err()),
        "control.out_min"
    );
}

#[test]
fn rejects_non_positive_step() {
    let mut scenario = fixed_scenario();
    scenario.run.dt_s = 0.0;
    assert_eq!(field_of(validate_scenario(&scenario).unwrap_err()), "run.dt_s");
}

#[test]
fn runs_fixed_split_scenario() {
    let record = run_scenario(&fixed_scenario()).unwrap();
    let last = record.x.last().unwrap();
    let expected = 10.0 * (-1.0_f64).exp();
    for p in last {
        assert!((p - expected).abs() < 1e-5);
    }
}

#[test]
fn runs_p_controlled_scenario() {
    let mut scenario = fixed_scenario();
    scenario.inflow = vec![0.2, 0.6, 0.2, 0.6];
    scenario.initial_state = vec![0.0; 4];
    scenario.run.t_end_s = 30.0;
    scenario.control = ControlDef::P {
        kp: 0.05,
        out_min: 0.05,
        out_max: 0.95,
        initial_output: 0.5,
        setpoint: 0.5,
        sample_period_s: 0.5,
    };
    let record = run_scenario(&scenario).unwrap();
    // East/West is busier, so the split moves towards East/West green
    assert!(*record.control.last().unwrap() > 0.5);
}
