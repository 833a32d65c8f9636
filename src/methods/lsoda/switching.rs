//! Step size, order and method family selection.

use super::{
    coefficients::{MethodFamily, SM1},
    stepper::{Iteration, Stepper, ETA},
};
use crate::Float;

/// Outcome of an order/step-size decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum OrderChange {
    /// Keep order and step size. The ratio is the one that was rejected.
    Keep(Float),
    /// Same order, scale the step by the ratio.
    StepSize(Float),
    /// The order was changed; reload the coefficients and scale the step.
    Order(Float),
}

/// `1 / (bias * d^(1/exponent) + bias * 1e-6)`, the step ratio that would make
/// the error estimate `d` equal to 1/bias.
fn step_ratio(d: Float, exponent: Float, bias: Float) -> Float {
    1.0 / (bias * d.powf(exponent) + bias * 1e-6)
}

impl Stepper {
    /// Loads `el` for the current order from the active table and rescales `rc`.
    pub(super) fn reset_coefficients(&mut self) {
        let nq = self.order();
        let elco = &self.tables.get(self.coeff_family).elco[nq];
        self.el[..=nq].copy_from_slice(&elco[..=nq]);
        self.rc = self.rc * self.el[0] / self.el0;
        self.el0 = self.el[0];
        self.conit = 0.5 / (nq + 2) as Float;
    }

    /// Changes the step size to `rh * h`, bounded by `rmax`, `hmax` and, for
    /// Adams, the stability region.
    pub(super) fn rescale(&mut self, rh: Float) {
        let mut rh = rh.min(self.rmax);
        rh /= Float::max(1.0, self.h.abs() * self.hmxi * rh);
        if self.meth == MethodFamily::Adams {
            self.irflag = false;
            let pdh = Float::max(self.h.abs() * self.pdlast, 0.000001);
            let nq = self.order();
            if rh * pdh * 1.00001 >= SM1[nq] {
                rh = SM1[nq] / pdh;
                self.irflag = true;
            }
        }
        self.yh.rescale(rh);
        self.h *= rh;
        self.rc *= rh;
        self.ialth = self.order() + 1;
    }

    /// Chooses between orders q - 1, q and q + 1 from the error estimates.
    ///
    /// `rhup` is the ratio for order q + 1, zero when raising is not an option.
    pub(super) fn order_switch(&mut self, mut rhup: Float, dsm: Float) -> OrderChange {
        let nq = self.order();
        let l = nq + 1;
        let tesco = self.tables.get(self.coeff_family).tesco[nq];

        let mut rhsm = step_ratio(dsm, 1.0 / l as Float, 1.2);
        let mut rhdn = 0.0;
        if nq != 1 {
            let ddn = self.vnorm(self.yh.col(nq)) / tesco[0];
            rhdn = step_ratio(ddn, 1.0 / nq as Float, 1.3);
        }

        let mut pdh = 0.0;
        if self.meth == MethodFamily::Adams {
            pdh = Float::max(self.h.abs() * self.pdlast, 0.000001);
            if l < self.lmax {
                rhup = rhup.min(SM1[l] / pdh);
            }
            rhsm = rhsm.min(SM1[nq] / pdh);
            if nq > 1 {
                rhdn = rhdn.min(SM1[nq - 1] / pdh);
            }
            self.pdest = 0.0;
        }

        let (newq, mut rh) = if rhsm >= rhup {
            if rhsm >= rhdn {
                (nq, rhsm)
            } else {
                (nq - 1, self.lower_ratio(rhdn))
            }
        } else if rhup <= rhdn {
            (nq - 1, self.lower_ratio(rhdn))
        } else {
            if rhup < 1.1 {
                self.ialth = 3;
                return OrderChange::Keep(rhup);
            }
            // Raise the order; the new column comes from the last correction.
            let r = self.el[nq] / l as Float;
            self.yh.set_order(l);
            for (c, a) in self.yh.col_mut(l).iter_mut().zip(&self.acor) {
                *c = a * r;
            }
            return OrderChange::Order(rhup);
        };

        // Ignore changes below 10% unless Adams is held back by stability.
        let stability_bound =
            self.meth == MethodFamily::Adams && rh * pdh * 1.00001 >= SM1[newq];
        if !stability_bound && self.kflag == 0 && rh < 1.1 {
            self.ialth = 3;
            return OrderChange::Keep(rh);
        }
        if self.kflag <= -2 {
            rh = rh.min(0.2);
        }
        if newq == nq {
            return OrderChange::StepSize(rh);
        }
        self.yh.set_order(newq);
        OrderChange::Order(rh)
    }

    fn lower_ratio(&self, rhdn: Float) -> Float {
        if self.kflag < 0 && rhdn > 1.0 {
            1.0
        } else {
            rhdn
        }
    }

    /// Stiffness test run every 20 steps at a stable configuration.
    ///
    /// Compares the step the other family could take with the one the current
    /// family allows. On a switch the family, order and iteration are changed
    /// and the proposed step ratio is returned.
    pub(super) fn method_switch(&mut self, dsm: Float, pnorm: Float) -> Option<Float> {
        let nq = self.order();
        let l = nq + 1;
        let exsm = 1.0 / l as Float;
        let cm1 = self.tables.cm1;
        let cm2 = self.tables.cm2;

        let (rh, nqnew) = match self.meth {
            MethodFamily::Adams => {
                if nq > 5 {
                    return None;
                }
                if dsm <= 100.0 * pnorm * ETA || self.pdest == 0.0 {
                    // Error polluted by roundoff: switch only when stability restricted.
                    if !self.irflag {
                        return None;
                    }
                    (2.0, nq.min(self.mxords))
                } else {
                    let mut rh1 = step_ratio(dsm, exsm, 1.2);
                    let mut rh1it = 2.0 * rh1;
                    let pdh = self.pdlast * self.h.abs();
                    if pdh * rh1 > 0.00001 {
                        rh1it = SM1[nq] / pdh;
                    }
                    rh1 = rh1.min(rh1it);

                    let (rh2, nqm2) = if nq > self.mxords {
                        let lm2 = self.mxords + 1;
                        let dm2 = self.vnorm(self.yh.col(lm2)) / cm2[self.mxords];
                        (step_ratio(dm2, 1.0 / lm2 as Float, 1.2), self.mxords)
                    } else {
                        let dm2 = dsm * (cm1[nq] / cm2[nq]);
                        (step_ratio(dm2, exsm, 1.2), nq)
                    };
                    if rh2 < self.ratio * rh1 {
                        return None;
                    }
                    (rh2, nqm2)
                }
            }
            MethodFamily::Bdf => {
                let (mut dm1, exm1, nqm1) = if self.mxordn < nq {
                    let lm1 = self.mxordn + 1;
                    let dm1 = self.vnorm(self.yh.col(lm1)) / cm1[self.mxordn];
                    (dm1, 1.0 / lm1 as Float, self.mxordn)
                } else {
                    (dsm * (cm2[nq] / cm1[nq]), exsm, nq)
                };
                let mut rh1 = step_ratio(dm1, exm1, 1.2);
                let mut rh1it = 2.0 * rh1;
                let pdh = self.pdnorm * self.h.abs();
                if pdh * rh1 > 0.00001 {
                    rh1it = SM1[nqm1] / pdh;
                }
                rh1 = rh1.min(rh1it);
                let rh2 = step_ratio(dsm, exsm, 1.2);
                if rh1 * self.ratio < 5.0 * rh2 {
                    return None;
                }
                // Adams error at the new step must not be roundoff-dominated.
                let alpha = Float::max(0.001, rh1);
                dm1 *= alpha.powf(exm1);
                if dm1 <= 1000.0 * ETA * pnorm {
                    return None;
                }
                (rh1, nqm1)
            }
        };

        self.meth = match self.meth {
            MethodFamily::Adams => MethodFamily::Bdf,
            MethodFamily::Bdf => MethodFamily::Adams,
        };
        self.iteration = Iteration::from(self.meth);
        self.icount = 20;
        self.pdlast = 0.0;
        self.yh.set_order(nqnew);
        Some(rh)
    }
}
