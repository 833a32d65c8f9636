use std::cell::Cell;

use lsoda::prelude::*;

mod common;
use common::{BlowUp, Counting, Decay, HarmonicOscillator};

/// y0' = -y0 with a second component that stays exactly zero.
struct DecayWithZero;

impl ODE for DecayWithZero {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -y[0];
        dydt[1] = 0.0;
    }
}

/// Only the first evaluation is finite; every later one is NaN.
struct BreaksAfterFirstCall {
    calls: Cell<usize>,
}

impl ODE for BreaksAfterFirstCall {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        self.calls.set(self.calls.get() + 1);
        dydt[0] = if self.calls.get() == 1 { -y[0] } else { f64::NAN };
    }
}

#[test]
fn decay_reaches_tout() {
    let mut solver = Lsoda::new(1e-6, 1e-10, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    let status = solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
    assert!(matches!(status, Status::Reached | Status::Interpolated));
    assert_eq!(t, 1.0);
    assert!((y[0] - (-1.0f64).exp()).abs() < 1e-5, "y = {}", y[0]);
    assert_eq!(solver.state(), CallState::Continue);
}

#[test]
fn tighter_tolerances_reduce_error() {
    let mut errors = Vec::new();
    for tol in [1e-4, 1e-6, 1e-8] {
        let mut solver = Lsoda::new(tol, tol, Settings::default());
        let mut y = [1.0, 0.0];
        let mut t = 0.0;
        solver.integrate(&HarmonicOscillator, &mut y, &mut t, 10.0).unwrap();
        let err = (y[0] - 10.0f64.cos()).abs().max((y[1] + 10.0f64.sin()).abs());
        assert!(err < 1e3 * tol, "tol = {tol}: error {err}");
        errors.push(err);
    }
    assert!(errors[2] < errors[0]);
}

#[test]
fn output_times_are_hit_exactly() {
    let mut solver = Lsoda::new(1e-8, 1e-8, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    let mut last_nst = 0;
    for i in 1..=20 {
        let tout = 0.5 * i as f64;
        solver.integrate(&HarmonicOscillator, &mut y, &mut t, tout).unwrap();
        assert_eq!(t, tout);
        assert!((y[0] - tout.cos()).abs() < 1e-5);
        let stats = solver.stats();
        assert!(stats.nst >= last_nst);
        assert!(stats.tcur >= tout);
        last_nst = stats.nst;
    }
}

#[test]
fn repeated_tout_does_not_step() {
    let mut solver = Lsoda::new(1e-6, 1e-6, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
    let (y1, nst) = (y[0], solver.stats().nst);
    solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
    assert_eq!(t, 1.0);
    assert_eq!(y[0], y1);
    assert_eq!(solver.stats().nst, nst);
}

#[test]
fn order_stays_within_limits() {
    let settings = Settings::builder().mxordn(4).mxords(4).build();
    let mut solver = Lsoda::new(1e-10, 1e-10, settings);
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    for i in 1..=10 {
        solver
            .integrate(&HarmonicOscillator, &mut y, &mut t, i as f64)
            .unwrap();
        let stats = solver.stats();
        assert!(stats.nqu >= 1 && stats.nqu <= 4, "nqu = {}", stats.nqu);
        assert!(stats.nqcur >= 1 && stats.nqcur <= 4, "nqcur = {}", stats.nqcur);
    }
}

#[test]
fn empty_state_is_rejected_without_evaluating() {
    let f = Counting::new(Decay);
    let mut solver = Lsoda::default();
    let mut y: [f64; 0] = [];
    let mut t = 0.0;
    let err = solver.integrate(&f, &mut y, &mut t, 1.0).unwrap_err();
    assert_eq!(err, Error::InvalidInput(InputError::EmptyState));
    assert_eq!(err.code(), -3);
    assert_eq!(f.rhs_calls.get(), 0);
    assert_eq!(solver.state(), CallState::Start);
}

#[test]
fn tolerance_length_is_checked() {
    let mut solver = Lsoda::new(vec![1e-6, 1e-6, 1e-6], 1e-6, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    let err = solver
        .integrate(&HarmonicOscillator, &mut y, &mut t, 1.0)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::ToleranceLength { name: "rtol", expected: 2, got: 3 })
    ));
}

#[test]
fn tout_equal_to_t_returns_immediately() {
    let f = Counting::new(Decay);
    let mut solver = Lsoda::default();
    let mut y = [1.0];
    let mut t = 0.0;
    let status = solver.integrate(&f, &mut y, &mut t, 0.0).unwrap();
    assert_eq!(status, Status::Reached);
    assert_eq!(y[0], 1.0);
    assert_eq!(f.rhs_calls.get(), 0);
}

#[test]
fn too_much_accuracy_is_reported() {
    let mut solver = Lsoda::new(1e-20, 1e-20, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    let err = solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap_err();
    assert!(matches!(err, Error::ToleranceTooTight { .. }));
    assert_eq!(err.code(), -2);
    assert!(solver.stats().tolsf > 1.0);
    assert_eq!(t, 0.0);
    assert_eq!(y[0], 1.0);
}

#[test]
fn step_limit_fails_then_reset_recovers() {
    let settings = Settings::builder().mxstep(5).build();
    let mut solver = Lsoda::new(1e-8, 1e-8, settings);
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    let err = solver
        .integrate(&HarmonicOscillator, &mut y, &mut t, 100.0)
        .unwrap_err();
    assert_eq!(err.code(), -1);
    assert!(t > 0.0 && t < 100.0);
    assert!((y[0] - t.cos()).abs() < 1e-6);
    assert_eq!(solver.state(), CallState::Failed(-1));

    let again = solver
        .integrate(&HarmonicOscillator, &mut y, &mut t, 100.0)
        .unwrap_err();
    assert_eq!(again, Error::Terminated(-1));

    solver.reset();
    solver.set_task(Task::OneStep);
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    let status = solver
        .integrate(&HarmonicOscillator, &mut y, &mut t, 100.0)
        .unwrap();
    assert_eq!(status, Status::Reached);
    assert!(t > 0.0);
    assert_eq!(solver.stats().nst, 1);
}

#[test]
fn one_step_task_returns_mesh_points() {
    let settings = Settings::builder().task(Task::OneStep).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    for expected_nst in 1..=10 {
        let status = solver.integrate(&Decay, &mut y, &mut t, 10.0).unwrap();
        assert_eq!(status, Status::Reached);
        let stats = solver.stats();
        assert_eq!(stats.nst, expected_nst);
        assert_eq!(t, stats.tcur);
    }
}

#[test]
fn mesh_point_task_stops_at_or_past_tout() {
    let settings = Settings::builder().task(Task::MeshPoint).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
    assert!(t >= 1.0);
    assert_eq!(t, solver.stats().tcur);
    assert!((y[0] - (-t).exp()).abs() < 1e-5);
}

#[test]
fn tcrit_is_never_passed() {
    let tcrit = 1.0;
    let settings = Settings::builder().task(Task::OneStepTcrit(tcrit)).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    while t < tcrit {
        solver.integrate(&Decay, &mut y, &mut t, tcrit).unwrap();
        assert!(t <= tcrit);
        assert!(solver.stats().tcur <= tcrit);
    }
    assert_eq!(t, tcrit);
    assert!((y[0] - (-1.0f64).exp()).abs() < 1e-5);
}

#[test]
fn normal_tcrit_interpolates_before_tcrit() {
    let settings = Settings::builder().task(Task::NormalTcrit(1.5)).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
    assert_eq!(t, 1.0);
    assert!(solver.stats().tcur <= 1.5);

    let err = solver.integrate(&Decay, &mut y, &mut t, 2.0).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(InputError::TcritBehindTout { .. })));
    assert_eq!(solver.state(), CallState::Continue);
}

#[test]
fn dense_output_gives_derivatives() {
    let mut solver = Lsoda::new(1e-8, 1e-10, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();

    let stats = solver.stats();
    let tm = stats.tcur - 0.5 * stats.hu;
    let mut dky = [0.0];
    solver.dense_output(tm, 0, &mut dky).unwrap();
    assert!((dky[0] - (-tm).exp()).abs() < 1e-6);
    solver.dense_output(tm, 1, &mut dky).unwrap();
    assert!((dky[0] + (-tm).exp()).abs() < 1e-4);

    let err = solver.dense_output(stats.tcur + 10.0, 0, &mut dky).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::InterpolationOutOfRange { .. })
    ));
    let err = solver
        .dense_output(tm, stats.nqcur + 1, &mut dky)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(InputError::DerivativeOrder { .. })));
}

#[test]
fn backward_integration() {
    let mut solver = Lsoda::new(1e-8, 1e-10, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    solver.integrate(&Decay, &mut y, &mut t, -1.0).unwrap();
    assert_eq!(t, -1.0);
    assert!((y[0] - 1.0f64.exp()).abs() < 1e-5, "y = {}", y[0]);
    assert!(solver.stats().hu < 0.0);
}

#[test]
fn input_errors_keep_the_integrator_usable() {
    let mut solver = Lsoda::new(1e-6, 1e-6, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    solver.integrate(&HarmonicOscillator, &mut y, &mut t, 1.0).unwrap();

    let mut short = [1.0];
    let err = solver.integrate(&Decay, &mut short, &mut t, 2.0).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::DimensionChanged { expected: 2, got: 1 })
    ));
    assert_eq!(solver.state(), CallState::Continue);

    let err = solver
        .integrate(&HarmonicOscillator, &mut y, &mut t, 0.0)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::ToutBehindLastStep { .. })
    ));

    solver.integrate(&HarmonicOscillator, &mut y, &mut t, 2.0).unwrap();
    assert_eq!(t, 2.0);
    assert!((y[0] - 2.0f64.cos()).abs() < 1e-4);
}

#[test]
fn changed_tolerances_apply_on_the_next_call() {
    let mut solver = Lsoda::new(1e-4, 1e-4, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    solver.integrate(&HarmonicOscillator, &mut y, &mut t, 1.0).unwrap();

    solver.set_tolerances(1e-10, 1e-10);
    assert_eq!(solver.state(), CallState::Restart);
    let before = solver.stats().nst;
    solver.integrate(&HarmonicOscillator, &mut y, &mut t, 2.0).unwrap();
    assert_eq!(solver.state(), CallState::Continue);
    assert!(solver.stats().nst > before);
    assert_eq!(t, 2.0);
}

#[test]
fn max_step_bounds_every_step() {
    let settings = Settings::builder().task(Task::OneStep).hmax(0.01).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    while t < 0.5 {
        let told = t;
        solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap();
        assert!(t - told <= 0.01 * (1.0 + 1e-12));
    }
}

#[test]
fn invalid_settings_are_reported() {
    let settings = Settings::builder().hmin(0.5).hmax(0.1).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    let err = solver.integrate(&Decay, &mut y, &mut t, 1.0).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::MinStepExceedsMaxStep { .. })
    ));
}

#[test]
fn blow_up_fails_at_minimum_step() {
    let settings = Settings::builder().hmin(1e-6).mxstep(100_000).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    let err = solver.integrate(&BlowUp, &mut y, &mut t, 2.0).unwrap_err();
    assert!(matches!(err, Error::ExcessStepReduction { .. }), "{err}");
    assert_eq!(err.code(), -4);
    assert_eq!(solver.state(), CallState::Failed(-4));
    assert_eq!(solver.stats().imxer, Some(0));
    assert!((t - 1.0).abs() < 1e-3, "t = {t}");
    assert_eq!(t, solver.stats().tcur);
    assert!(y[0] > 100.0, "y = {}", y[0]);
}

#[test]
fn blow_up_without_minimum_step_is_terminal() {
    let settings = Settings::builder().mxstep(100_000).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [1.0];
    let mut t = 0.0;
    let err = solver.integrate(&BlowUp, &mut y, &mut t, 2.0).unwrap_err();
    let code = err.code();
    assert!(code < 0 && code != -3, "{err}");
    assert_eq!(solver.state(), CallState::Failed(code));
    assert!((t - 1.0).abs() < 1e-3, "t = {t}");
    assert!(y[0] > 100.0, "y = {}", y[0]);
    assert!(solver.stats().hcur.abs() < 1e-3);

    let again = solver.integrate(&BlowUp, &mut y, &mut t, 2.0).unwrap_err();
    assert_eq!(again, Error::Terminated(code));
}

#[test]
fn diverging_corrector_is_reported() {
    let f = BreaksAfterFirstCall { calls: Cell::new(0) };
    let mut solver = Lsoda::new(1e-6, 1e-6, Settings::default());
    let mut y = [1.0];
    let mut t = 0.0;
    let err = solver.integrate(&f, &mut y, &mut t, 1.0).unwrap_err();
    assert!(matches!(err, Error::CorrectorFailure { .. }), "{err}");
    assert_eq!(err.code(), -5);
    assert_eq!(solver.state(), CallState::Failed(-5));
    assert_eq!(solver.stats().imxer, Some(0));
    assert_eq!(solver.stats().nst, 0);
    assert_eq!(t, 0.0);
    assert!((y[0] - 1.0).abs() < 1e-12, "y = {}", y[0]);
}

#[test]
fn zero_error_weight_is_reported() {
    let mut solver = Lsoda::new(1e-6, 1e-8, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    solver.integrate(&DecayWithZero, &mut y, &mut t, 1.0).unwrap();
    assert_eq!(y[1], 0.0);

    // Pure relative control on a component that is exactly zero.
    solver.set_tolerances(1e-6, 0.0);
    let err = solver.integrate(&DecayWithZero, &mut y, &mut t, 2.0).unwrap_err();
    assert!(matches!(err, Error::ZeroErrorWeight { index: 1, .. }), "{err}");
    assert_eq!(err.code(), -6);
    assert_eq!(solver.state(), CallState::Failed(-6));
    assert_eq!(t, solver.stats().tcur);
    assert!(t >= 1.0 && t < 2.0);
    assert!((y[0] - (-t).exp()).abs() < 1e-5);
}
