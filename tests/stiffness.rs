use lsoda::prelude::*;

mod common;
use common::{Counting, HarmonicOscillator, Robertson, StiffLinear, VanDerPol};

/// Hides the analytic Jacobian of the wrapped problem.
struct FiniteDifferences<F>(F);

impl<F: ODE> ODE for FiniteDifferences<F> {
    fn ode(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        self.0.ode(t, y, dydt);
    }
}

#[test]
fn van_der_pol_switches_to_bdf() {
    let vdp = VanDerPol { mu: 1000.0 };
    let settings = Settings::builder().mxstep(5000).build();
    let mut solver = Lsoda::new(1e-6, 1e-6, settings);
    let mut y = [2.0, 0.0];
    let mut t = 0.0;
    let mut prev = y[0];
    for i in 1..=50 {
        let tout = 10.0 * i as f64;
        solver.integrate(&vdp, &mut y, &mut t, tout).unwrap();
        assert_eq!(t, tout);
        // Still on the first slow branch of the limit cycle.
        assert!(y[0] < prev && y[0] > 1.0, "y0({tout}) = {}", y[0]);
        prev = y[0];
    }

    let stats = solver.stats();
    assert_eq!(solver.method(), Some(MethodFamily::Bdf));
    assert_eq!(stats.mused, Some(MethodFamily::Bdf));
    assert!(stats.tsw > 0.0 && stats.tsw < 500.0);
    assert!(stats.nqu <= 5);
    assert!(stats.nje > 0);
    assert!(stats.nst < 5000, "nst = {}", stats.nst);
}

#[test]
fn harmonic_oscillator_stays_on_adams() {
    let mut solver = Lsoda::new(1e-8, 1e-8, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;
    for i in 1..=20 {
        let tout = i as f64;
        solver.integrate(&HarmonicOscillator, &mut y, &mut t, tout).unwrap();
        assert_eq!(solver.method(), Some(MethodFamily::Adams));
        assert_eq!(solver.stats().mused, Some(MethodFamily::Adams));
        assert!((y[0] - tout.cos()).abs() < 1e-5);
    }
    assert_eq!(solver.stats().nje, 0);
    assert_eq!(solver.stats().tsw, 0.0);
}

#[test]
fn robertson_conserves_mass() {
    let mut solver = Lsoda::new(1e-4, vec![1e-8, 1e-14, 1e-6], Settings::default());
    let mut y = [1.0, 0.0, 0.0];
    let mut t = 0.0;
    for tout in [0.4, 4.0, 40.0] {
        solver.integrate(&Robertson, &mut y, &mut t, tout).unwrap();
        let mass: f64 = y.iter().sum();
        assert!((mass - 1.0).abs() < 1e-6, "mass at {tout} = {mass}");
    }
    assert!((y[0] - 0.7158).abs() < 1e-3, "y0 = {}", y[0]);
    assert!((y[1] - 9.185e-6).abs() < 1e-7, "y1 = {}", y[1]);
    assert!((y[2] - 0.2842).abs() < 1e-3, "y2 = {}", y[2]);
    assert_eq!(solver.stats().mused, Some(MethodFamily::Bdf));
}

#[test]
fn analytic_jacobian_is_used() {
    let f = Counting::new(StiffLinear);
    let mut solver = Lsoda::new(1e-8, 1e-10, Settings::default());
    let mut y = [1.0, 1.0];
    let mut t = 0.0;
    solver.integrate(&f, &mut y, &mut t, 10.0).unwrap();

    let exact = StiffLinear::exact(10.0);
    assert!((y[0] - exact[0]).abs() < 1e-7, "y0 = {}", y[0]);
    assert!((y[1] - exact[1]).abs() < 1e-7, "y1 = {}", y[1]);

    let stats = solver.stats();
    assert_eq!(stats.mused, Some(MethodFamily::Bdf));
    assert!(f.jac_calls.get() > 0);
    assert_eq!(stats.nje, f.jac_calls.get());
    assert_eq!(stats.nfe, f.rhs_calls.get());
}

#[test]
fn finite_difference_jacobian_matches_analytic() {
    let f = Counting::new(FiniteDifferences(StiffLinear));
    let mut solver = Lsoda::new(1e-8, 1e-10, Settings::default());
    let mut y = [1.0, 1.0];
    let mut t = 0.0;
    solver.integrate(&f, &mut y, &mut t, 10.0).unwrap();

    let exact = StiffLinear::exact(10.0);
    assert!((y[0] - exact[0]).abs() < 1e-7);
    assert!((y[1] - exact[1]).abs() < 1e-7);

    let stats = solver.stats();
    assert_eq!(f.jac_calls.get(), 0);
    assert!(stats.nje > 0);
    assert_eq!(stats.nfe, f.rhs_calls.get());
}
