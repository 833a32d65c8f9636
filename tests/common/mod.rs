#![allow(dead_code)]

use std::cell::Cell;

use lsoda::prelude::*;

/// y' = -y
pub struct Decay;

impl ODE for Decay {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -y[0];
    }
}

/// y0' = y1, y1' = -y0; exact solution (cos t, -sin t) from (1, 0).
pub struct HarmonicOscillator;

impl ODE for HarmonicOscillator {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = -y[0];
    }
}

/// y0'' = mu (1 - y0^2) y0' - y0; stiff for large `mu`.
pub struct VanDerPol {
    pub mu: f64,
}

impl ODE for VanDerPol {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0];
    }
}

/// y0' = -1000 y0 + y1, y1' = -y1 with an analytic Jacobian.
///
/// From (1, 1) the exact solution is y1 = e^-t and
/// y0 = (1 - 1/999) e^-1000t + e^-t / 999.
pub struct StiffLinear;

impl StiffLinear {
    pub fn exact(t: f64) -> [f64; 2] {
        let slow = (-t).exp();
        [(1.0 - 1.0 / 999.0) * (-1000.0 * t).exp() + slow / 999.0, slow]
    }
}

impl ODE for StiffLinear {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -1000.0 * y[0] + y[1];
        dydt[1] = -y[1];
    }

    fn jac(&self, _t: f64, _y: &[f64], dfdy: &mut Matrix) -> bool {
        dfdy[(0, 0)] = -1000.0;
        dfdy[(0, 1)] = 1.0;
        dfdy[(1, 1)] = -1.0;
        true
    }
}

/// y' = y^2; from y(0) = 1 the solution 1 / (1 - t) blows up at t = 1.
pub struct BlowUp;

impl ODE for BlowUp {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[0] * y[0];
    }
}

/// Robertson chemical kinetics.
pub struct Robertson;

impl ODE for Robertson {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -0.04 * y[0] + 1.0e4 * y[1] * y[2];
        dydt[2] = 3.0e7 * y[1] * y[1];
        dydt[1] = -dydt[0] - dydt[2];
    }
}

/// Counts right-hand side and Jacobian evaluations of the wrapped problem.
pub struct Counting<F> {
    pub inner: F,
    pub rhs_calls: Cell<usize>,
    pub jac_calls: Cell<usize>,
}

impl<F> Counting<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            rhs_calls: Cell::new(0),
            jac_calls: Cell::new(0),
        }
    }
}

impl<F: ODE> ODE for Counting<F> {
    fn ode(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        self.rhs_calls.set(self.rhs_calls.get() + 1);
        self.inner.ode(t, y, dydt);
    }

    fn jac(&self, t: f64, y: &[f64], dfdy: &mut Matrix) -> bool {
        let provided = self.inner.jac(t, y, dfdy);
        if provided {
            self.jac_calls.set(self.jac_calls.get() + 1);
        }
        provided
    }
}
