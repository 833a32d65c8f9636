//! # Example: Van der Pol oscillator
//!
//! Solve the stiff Van der Pol oscillator as a first-order system and watch
//! the integrator move from Adams to BDF.
//!
//! Equations:
//! dy0/dt = y1
//! dy1/dt = mu * (1 - y0^2) * y1 - y0
//!
//! Initial conditions: y0(0) = 2.0, y1(0) = 0.0
//!

use lsoda::prelude::*;

struct VanDerPol {
    mu: f64,
}

impl ODE for VanDerPol {
    fn ode(&self, _x: f64, y: &[f64], dydx: &mut [f64]) {
        dydx[0] = y[1];
        dydx[1] = self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0];
    }
}

fn main() {
    let van_der_pol = VanDerPol { mu: 1000.0 };
    let x0 = 0.0;
    let xend = 3000.0;
    let y0 = [2.0, 0.0];
    let t_eval = (0..=30).map(|i| i as f64 * 100.0).collect();
    let options = IVPOptions::builder()
        .rtol(1e-6)
        .atol(1e-8)
        .t_eval(t_eval)
        .build();

    match solve_ivp(&van_der_pol, x0, xend, &y0, options) {
        Ok(sol) => {
            println!("Finished status: {:?}", sol.status);
            if let (Some(&t_last), Some(y_last)) = (sol.t.last(), sol.y.last()) {
                println!("Final State: x = {:.5}, y = {:?}", t_last, y_last);
            }
            println!("Number of function evaluations: {}", sol.nfev);
            println!("Number of Jacobian evaluations: {}", sol.njev);
            println!("Number of steps taken: {}", sol.nstep);
            println!(
                "Last method switch at x = {:.4}, now using {:?}",
                sol.stats.tsw, sol.method
            );

            for (ti, yi) in sol.t.iter().zip(sol.y.iter()) {
                println!("x = {:>8.2}, y = {:?}", ti, yi);
            }
        }
        Err(e) => eprintln!("solve_ivp failed: {:?}", e),
    }
}
