//! # Example: Robertson chemical kinetics
//!
//! The classic stiff test problem, advanced over decades of time with the
//! resumable integrator, per-component absolute tolerances and an analytic
//! Jacobian.
//!
//! Equations:
//! dy0/dt = -0.04 y0 + 1e4 y1 y2
//! dy1/dt = 0.04 y0 - 1e4 y1 y2 - 3e7 y1^2
//! dy2/dt = 3e7 y1^2
//!
//! Initial conditions: y = [1, 0, 0]
//!

use lsoda::prelude::*;

struct Robertson;

impl ODE for Robertson {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -0.04 * y[0] + 1.0e4 * y[1] * y[2];
        dydt[2] = 3.0e7 * y[1] * y[1];
        dydt[1] = -dydt[0] - dydt[2];
    }

    fn jac(&self, _t: f64, y: &[f64], dfdy: &mut Matrix) -> bool {
        dfdy[(0, 0)] = -0.04;
        dfdy[(0, 1)] = 1.0e4 * y[2];
        dfdy[(0, 2)] = 1.0e4 * y[1];
        dfdy[(2, 1)] = 6.0e7 * y[1];
        dfdy[(1, 0)] = 0.04;
        dfdy[(1, 1)] = -1.0e4 * y[2] - 6.0e7 * y[1];
        dfdy[(1, 2)] = -1.0e4 * y[1];
        true
    }
}

fn main() {
    let settings = Settings::builder().mxstep(5000).build();
    let mut solver = Lsoda::new(1e-4, vec![1e-8, 1e-14, 1e-6], settings);
    let mut y = [1.0, 0.0, 0.0];
    let mut t = 0.0;

    let mut tout = 0.4;
    for _ in 0..12 {
        match solver.integrate(&Robertson, &mut y, &mut t, tout) {
            Ok(_) => {
                let stats = solver.stats();
                println!(
                    "t = {:>9.3e}  y = [{:.6e}, {:.6e}, {:.6e}]  order {} {:?}",
                    t, y[0], y[1], y[2], stats.nqu, stats.mused
                );
            }
            Err(e) => {
                eprintln!("Integration failed with code {}: {}", e.code(), e);
                return;
            }
        }
        tout *= 10.0;
    }

    let stats = solver.stats();
    println!(
        "Steps: {}, f evaluations: {}, Jacobians: {}, method switched last at t = {:.4e}",
        stats.nst, stats.nfe, stats.nje, stats.tsw
    );
}
