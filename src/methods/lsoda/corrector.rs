//! Corrector iteration on the implicit multistep formula.

use super::{
    coefficients::MethodFamily,
    stepper::{Iteration, Stepper, ETA},
};
use crate::{core::ode::ODE, Float};

/// Corrector iterations per attempt.
const MAXCOR: usize = 3;
/// Corrector failures per step.
const MXNCF: usize = 10;

/// What made a corrector attempt fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FailureCause {
    /// The iteration diverged or did not converge within [`MAXCOR`] iterations.
    Diverged,
    /// The iteration matrix could not be factored.
    SingularMatrix,
}

/// Corrector converged.
pub(super) struct Converged {
    /// Norm of the last correction.
    pub del: Float,
    /// Iterations after the first one.
    pub iterations: usize,
}

/// Corrector did not converge; the prediction has been retracted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum CorrectorFailure {
    /// Retry the step with `h * rh`.
    Reduce { rh: Float, cause: FailureCause },
    /// Give up on the step.
    Exhausted(FailureCause),
}

impl Stepper {
    /// Iterates the predicted history towards the solution of the corrector
    /// equation, accumulating the correction in `acor`.
    pub(super) fn correct<F: ODE>(
        &mut self,
        f: &F,
        pnorm: Float,
        told: Float,
        ncf: &mut usize,
    ) -> Result<Converged, CorrectorFailure> {
        let mut m = 0;
        let mut rate: Float = 0.0;
        let mut del: Float;
        let mut delp: Float = 0.0;

        self.y.copy_from_slice(self.yh.col(0));
        self.eval_savf(f);

        loop {
            if m == 0 {
                if self.ipup {
                    let factored = self.prja(f);
                    self.ipup = false;
                    self.rc = 1.0;
                    self.nslp = self.nst;
                    self.conv_rate = 0.7;
                    if factored.is_err() {
                        return Err(self.failure(told, ncf, FailureCause::SingularMatrix));
                    }
                }
                self.acor.iter_mut().for_each(|a| *a = 0.0);
            }

            let h = self.h;
            let el0 = self.el[0];
            match self.iteration {
                Iteration::Functional => {
                    // y = yh0 + l0 * (h f - yh1)
                    for ((s, y), (yh1, a)) in self
                        .savf
                        .iter_mut()
                        .zip(self.y.iter_mut())
                        .zip(self.yh.col(1).iter().zip(&self.acor))
                    {
                        *s = h * *s - yh1;
                        *y = *s - a;
                    }
                    del = self.vnorm(&self.y);
                    for ((y, yh0), (a, s)) in self
                        .y
                        .iter_mut()
                        .zip(self.yh.col(0))
                        .zip(self.acor.iter_mut().zip(&self.savf))
                    {
                        *y = yh0 + el0 * s;
                        *a = *s;
                    }
                }
                Iteration::Newton => {
                    // Solve (I - h l0 J) dy = h f - (yh1 + acor).
                    for ((y, s), (yh1, a)) in self
                        .y
                        .iter_mut()
                        .zip(&self.savf)
                        .zip(self.yh.col(1).iter().zip(&self.acor))
                    {
                        *y = h * s - (yh1 + a);
                    }
                    self.wm.lu_solve_mut(&self.ipvt, &mut self.y);
                    del = self.vnorm(&self.y);
                    for ((y, yh0), a) in self
                        .y
                        .iter_mut()
                        .zip(self.yh.col(0))
                        .zip(self.acor.iter_mut())
                    {
                        *a += *y;
                        *y = yh0 + el0 * *a;
                    }
                }
            }

            // Convergence test, using the rate estimate once available.
            if del <= 100.0 * pnorm * ETA {
                break;
            }
            if m != 0 || self.meth != MethodFamily::Adams {
                if m != 0 {
                    let rm = if del <= 1024.0 * delp { del / delp } else { 1024.0 };
                    rate = rate.max(rm);
                    self.conv_rate = Float::max(0.2 * self.conv_rate, rm);
                }
                let tesco = self.tables.get(self.coeff_family).tesco[self.order()];
                let dcon = del * Float::min(1.0, 1.5 * self.conv_rate) / (tesco[1] * self.conit);
                if dcon <= 1.0 {
                    self.pdest = self.pdest.max(rate / (h * el0).abs());
                    if self.pdest != 0.0 {
                        self.pdlast = self.pdest;
                    }
                    break;
                }
            }

            m += 1;
            if m == MAXCOR || (m >= 2 && del > 2.0 * delp) {
                if self.iteration == Iteration::Functional || self.jcur {
                    return Err(self.failure(told, ncf, FailureCause::Diverged));
                }
                // Stale Jacobian: rebuild it and start over.
                self.ipup = true;
                m = 0;
                rate = 0.0;
                self.y.copy_from_slice(self.yh.col(0));
                self.eval_savf(f);
            } else {
                delp = del;
                self.eval_savf(f);
            }
        }
        Ok(Converged { del, iterations: m })
    }

    /// Retracts the prediction after a corrector failure and decides whether
    /// the step can be retried.
    fn failure(&mut self, told: Float, ncf: &mut usize, cause: FailureCause) -> CorrectorFailure {
        *ncf += 1;
        self.rmax = 2.0;
        self.tn = told;
        self.yh.retract();
        if self.h.abs() <= self.hmin * 1.00001 || *ncf == MXNCF {
            return CorrectorFailure::Exhausted(cause);
        }
        self.ipup = self.iteration == Iteration::Newton;
        CorrectorFailure::Reduce { rh: 0.25, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::settings::Settings;

    #[test]
    fn failure_at_minimum_step_is_exhausted() {
        let settings = Settings::builder().hmin(0.1).build();
        let mut st = Stepper::new(1, &settings, 0.0);
        st.h = 0.1;
        st.tn = 0.1;
        let mut ncf = 0;
        let outcome = st.failure(0.0, &mut ncf, FailureCause::SingularMatrix);
        assert_eq!(outcome, CorrectorFailure::Exhausted(FailureCause::SingularMatrix));
        assert_eq!(st.tn, 0.0);
        assert_eq!(ncf, 1);
    }

    #[test]
    fn repeated_failures_are_exhausted() {
        let mut st = Stepper::new(1, &Settings::default(), 0.0);
        st.h = 0.1;
        let mut ncf = 0;
        for _ in 1..MXNCF {
            let outcome = st.failure(0.0, &mut ncf, FailureCause::Diverged);
            assert_eq!(
                outcome,
                CorrectorFailure::Reduce {
                    rh: 0.25,
                    cause: FailureCause::Diverged
                }
            );
        }
        let outcome = st.failure(0.0, &mut ncf, FailureCause::Diverged);
        assert_eq!(outcome, CorrectorFailure::Exhausted(FailureCause::Diverged));
    }
}
