//! # Example: Harmonic oscillator with the resumable integrator
//!
//! Advance [`Lsoda`] to a sequence of output times and report the order and
//! method family it settled on.
//!
//! Equations:
//! dy0/dt = y1
//! dy1/dt = -y0
//!
//! Initial conditions: y0(0) = 1.0, y1(0) = 0.0
//!

use lsoda::prelude::*;

struct HarmonicOscillator;

impl ODE for HarmonicOscillator {
    fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = -y[0];
    }
}

fn main() {
    let mut solver = Lsoda::new(1e-8, 1e-8, Settings::default());
    let mut y = [1.0, 0.0];
    let mut t = 0.0;

    for i in 1..=10 {
        let tout = i as f64;
        if let Err(e) = solver.integrate(&HarmonicOscillator, &mut y, &mut t, tout) {
            eprintln!("Integration failed at t = {}: {}", t, e);
            return;
        }
        let stats = solver.stats();
        println!(
            "t = {:>5.2}, y = [{:>10.7}, {:>10.7}], err = {:.2e}, order = {}, method = {:?}",
            t,
            y[0],
            y[1],
            (y[0] - t.cos()).abs(),
            stats.nqu,
            stats.mused
        );
    }

    let stats = solver.stats();
    println!("Steps: {}, f evaluations: {}, Jacobians: {}", stats.nst, stats.nfe, stats.nje);
}
