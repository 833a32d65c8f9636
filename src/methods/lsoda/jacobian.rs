//! Iteration matrix `I - h l0 J` for the Newton corrector.

use log::debug;

use super::stepper::{Stepper, ETA};
use crate::{core::ode::ODE, matrix::SingularPivot, Float};

impl Stepper {
    /// Evaluates the Jacobian at `(tn, y)`, forms `wm = I - h l0 J` and
    /// factors it in place.
    ///
    /// Uses [`ODE::jac`] when the problem provides it, otherwise one forward
    /// difference of `f` per column around `savf = f(tn, y)`. `acor` is used
    /// as scratch. Also refreshes `pdnorm`, the weighted norm of `J`.
    pub(super) fn prja<F: ODE>(&mut self, f: &F) -> Result<(), SingularPivot> {
        self.nje += 1;
        self.jcur = true;
        let hl0 = self.h * self.el0;

        self.wm.fill(0.0);
        if f.jac(self.tn, &self.y, &mut self.wm) {
            self.wm.data.iter_mut().for_each(|v| *v *= -hl0);
        } else {
            let fac = self.vnorm(&self.savf);
            let mut r0 = 1000.0 * self.h.abs() * ETA * self.n as Float * fac;
            if r0 == 0.0 {
                r0 = 1.0;
            }
            let sqrteta = ETA.sqrt();
            for j in 0..self.n {
                let yj = self.y[j];
                let r = Float::max(sqrteta * yj.abs(), r0 / self.ewt[j]);
                self.y[j] += r;
                let fac = -hl0 / r;
                f.ode(self.tn, &self.y, &mut self.acor);
                for ((w, a), s) in self.wm.column_mut(j).iter_mut().zip(&self.acor).zip(&self.savf) {
                    *w = (a - s) * fac;
                }
                self.y[j] = yj;
            }
            self.nfe += self.n;
        }

        self.pdnorm = self.norm.matrix(&self.wm, &self.ewt) / hl0.abs();
        for i in 0..self.n {
            self.wm[(i, i)] += 1.0;
        }
        let factored = self.wm.lu_factor_mut(&mut self.ipvt);
        match factored {
            Ok(()) => debug!(
                "iteration matrix rebuilt at t = {} (h = {}, |J| = {})",
                self.tn, self.h, self.pdnorm
            ),
            Err(SingularPivot(k)) => debug!(
                "iteration matrix singular at t = {} (h = {}, zero pivot in column {})",
                self.tn, self.h, k
            ),
        }
        factored
    }
}
