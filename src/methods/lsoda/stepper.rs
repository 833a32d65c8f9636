//! Single-step executor: predict, correct, test, accept or reject.

use log::trace;

use super::{
    coefficients::{CoefficientTables, MethodFamily, TABLE_LEN},
    corrector::{CorrectorFailure, FailureCause},
    nordsieck::{Nordsieck, NordsieckSegment},
    norm::ErrorNorm,
    switching::OrderChange,
};
use crate::{core::ode::ODE, error::InputError, matrix::Matrix, methods::settings::Settings, Float};

/// Unit roundoff.
pub(super) const ETA: Float = Float::EPSILON;
/// Jacobian refresh threshold on `|rc - 1|`.
const CCMAX: Float = 0.3;
/// Steps between forced Jacobian refreshes.
const MSBP: usize = 20;

/// Nonlinear iteration used by the corrector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Iteration {
    /// Fixed-point iteration, no Jacobian.
    Functional,
    /// Chord Newton iteration with the matrix `I - h l0 J`.
    Newton,
}

impl From<MethodFamily> for Iteration {
    fn from(family: MethodFamily) -> Self {
        match family {
            MethodFamily::Adams => Iteration::Functional,
            MethodFamily::Bdf => Iteration::Newton,
        }
    }
}

/// How the next call to [`Stepper::step`] has to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Start {
    /// First step of the problem.
    First,
    /// Method, tolerances or step bounds changed.
    ParametersChanged,
    /// Only `h` was changed from outside.
    NewStepSize,
    /// Continue with the current history.
    Continue,
}

/// Why a step could not be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StepFailure {
    /// Error test failed repeatedly or with `|h| = hmin`.
    ErrorTest,
    /// Corrector failed repeatedly or with `|h| = hmin`.
    Corrector(FailureCause),
}

/// Complete integration state of one problem.
pub(crate) struct Stepper {
    pub(super) n: usize,
    pub(super) yh: Nordsieck,
    /// Inverted error weights.
    pub(super) ewt: Vec<Float>,
    pub(super) savf: Vec<Float>,
    pub(super) acor: Vec<Float>,
    /// Corrector iterate and argument of every `f` evaluation.
    pub(super) y: Vec<Float>,
    pub(super) wm: Matrix,
    pub(super) ipvt: Vec<usize>,
    pub(super) norm: ErrorNorm,

    pub(super) tables: CoefficientTables,
    /// Family whose table `el`, `rc` and `conit` were last loaded from.
    pub(super) coeff_family: MethodFamily,
    pub(super) el: [Float; TABLE_LEN],
    pub(super) el0: Float,
    pub(super) rc: Float,
    pub(super) conit: Float,
    pub(super) conv_rate: Float,

    pub(super) meth: MethodFamily,
    pub(super) mused: Option<MethodFamily>,
    pub(super) iteration: Iteration,
    pub(super) maxord: usize,
    pub(super) mxordn: usize,
    pub(super) mxords: usize,
    pub(super) lmax: usize,

    pub(super) tn: Float,
    pub(super) h: Float,
    pub(super) hold: Float,
    pub(super) hu: Float,
    pub(super) hmin: Float,
    pub(super) hmxi: Float,
    pub(super) rmax: Float,

    /// Lipschitz estimates for the stiffness test.
    pub(super) pdest: Float,
    pub(super) pdlast: Float,
    pub(super) pdnorm: Float,
    pub(super) ratio: Float,

    /// Steps until the next order/step-size decision.
    pub(super) ialth: usize,
    /// Jacobian update pending.
    pub(super) ipup: bool,
    pub(super) nslp: usize,
    /// Steps until the next stiffness test; negative means due.
    pub(super) icount: i32,
    /// The last rescale was limited by the Adams stability region.
    pub(super) irflag: bool,
    /// The Jacobian is current for this step.
    pub(super) jcur: bool,
    pub(super) jstart: Start,
    pub(super) kflag: i32,

    pub(super) nst: usize,
    pub(super) nfe: usize,
    pub(super) nje: usize,
    pub(super) nqu: usize,
}

impl Stepper {
    pub(super) fn new(n: usize, settings: &Settings, t: Float) -> Self {
        let mxordn = settings.adams_order();
        let mxords = settings.bdf_order();
        Self {
            n,
            yh: Nordsieck::new(n, 1 + mxordn.max(mxords)),
            ewt: vec![0.0; n],
            savf: vec![0.0; n],
            acor: vec![0.0; n],
            y: vec![0.0; n],
            wm: Matrix::zeros(n, n),
            ipvt: vec![0; n],
            norm: settings.norm,
            tables: CoefficientTables::new(),
            coeff_family: MethodFamily::Adams,
            el: [0.0; TABLE_LEN],
            el0: 1.0,
            rc: 0.0,
            conit: 0.0,
            conv_rate: 0.7,
            meth: MethodFamily::Adams,
            mused: None,
            iteration: Iteration::Functional,
            maxord: mxordn,
            mxordn,
            mxords,
            lmax: mxordn + 1,
            tn: t,
            h: 1.0,
            hold: 0.0,
            hu: 0.0,
            hmin: settings.hmin,
            hmxi: settings.hmax.map_or(0.0, |hmax| 1.0 / hmax),
            rmax: 1e4,
            pdest: 0.0,
            pdlast: 0.0,
            pdnorm: 0.0,
            ratio: 5.0,
            ialth: 2,
            ipup: false,
            nslp: 0,
            icount: 20,
            irflag: false,
            jcur: false,
            jstart: Start::First,
            kflag: 0,
            nst: 0,
            nfe: 0,
            nje: 0,
            nqu: 0,
        }
    }

    pub(super) fn order(&self) -> usize {
        self.yh.order()
    }

    pub(super) fn vnorm(&self, v: &[Float]) -> Float {
        self.norm.vector(v, &self.ewt)
    }

    /// Calls `f` at `(tn, y)` and stores the result in `savf`.
    pub(super) fn eval_savf<F: ODE>(&mut self, f: &F) {
        f.ode(self.tn, &self.y, &mut self.savf);
        self.nfe += 1;
    }

    /// Dense output over the last accepted step.
    pub(super) fn segment(&self) -> NordsieckSegment {
        NordsieckSegment {
            tlo: self.tn - self.hu,
            tn: self.tn,
            h: self.h,
            yh: self.yh.snapshot(),
        }
    }

    /// Clamps a step ratio to the minimum step and rescales.
    fn rescale_bounded(&mut self, rh: Float) {
        let rh = rh.max(self.hmin / self.h.abs());
        self.rescale(rh);
    }

    /// Takes one step of size `h` (or smaller, after failures) from `tn`.
    ///
    /// On success `tn`, the history and the step/order proposal for the next
    /// step are updated. On failure the history is restored to `tn`.
    pub(super) fn step<F: ODE>(&mut self, f: &F) -> Result<(), StepFailure> {
        self.kflag = 0;
        let told = self.tn;
        let mut ncf = 0;
        self.jcur = false;

        match self.jstart {
            Start::First => {
                self.lmax = self.maxord + 1;
                self.yh.set_order(1);
                self.ialth = 2;
                self.rmax = 1e4;
                self.rc = 0.0;
                self.el0 = 1.0;
                self.conv_rate = 0.7;
                self.hold = self.h;
                self.nslp = 0;
                self.ipup = self.iteration == Iteration::Newton;
                self.icount = 20;
                self.irflag = false;
                self.pdest = 0.0;
                self.pdlast = 0.0;
                self.ratio = 5.0;
                self.coeff_family = self.meth;
                self.reset_coefficients();
            }
            Start::ParametersChanged => {
                self.ipup = self.iteration == Iteration::Newton;
                self.lmax = self.maxord + 1;
                if self.ialth == 1 {
                    self.ialth = 2;
                }
                if self.coeff_family != self.meth {
                    self.coeff_family = self.meth;
                    self.ialth = self.order() + 1;
                    self.reset_coefficients();
                }
                if self.h != self.hold {
                    let rh = self.h / self.hold;
                    self.h = self.hold;
                    self.rescale(rh);
                }
            }
            Start::NewStepSize => {
                if self.h != self.hold {
                    let rh = self.h / self.hold;
                    self.h = self.hold;
                    self.rescale(rh);
                }
            }
            Start::Continue => {}
        }

        loop {
            // Predict and correct until the corrector converges.
            let (del, iterations, pnorm) = loop {
                if (self.rc - 1.0).abs() > CCMAX || self.nst >= self.nslp + MSBP {
                    self.ipup = self.iteration == Iteration::Newton;
                }
                self.tn += self.h;
                self.yh.predict();
                let pnorm = self.vnorm(self.yh.col(0));
                match self.correct(f, pnorm, told, &mut ncf) {
                    Ok(c) => break (c.del, c.iterations, pnorm),
                    Err(CorrectorFailure::Reduce { rh, cause }) => {
                        trace!(
                            "corrector failed ({:?}) at t = {}, h = {}; retrying with h * {}",
                            cause,
                            told,
                            self.h,
                            rh
                        );
                        self.rescale_bounded(rh);
                    }
                    Err(CorrectorFailure::Exhausted(cause)) => {
                        self.kflag = -2;
                        self.hold = self.h;
                        self.jstart = Start::Continue;
                        return Err(StepFailure::Corrector(cause));
                    }
                }
            };

            // Local error test.
            self.jcur = false;
            let nq = self.order();
            let tesco = self.tables.get(self.coeff_family).tesco[nq];
            let dsm = if iterations == 0 {
                del / tesco[1]
            } else {
                self.vnorm(&self.acor) / tesco[1]
            };

            if dsm <= 1.0 {
                self.accept(dsm, pnorm);
                return Ok(());
            }

            // The error test failed: restore the history and pick a smaller step.
            self.kflag -= 1;
            self.tn = told;
            self.yh.retract();
            self.rmax = 2.0;
            trace!(
                "error test failed at t = {} (h = {}, order {}, dsm = {})",
                told,
                self.h,
                nq,
                dsm
            );
            if self.h.abs() <= self.hmin * 1.00001 {
                self.kflag = -1;
                self.hold = self.h;
                self.jstart = Start::Continue;
                return Err(StepFailure::ErrorTest);
            }
            if self.kflag > -3 {
                match self.order_switch(0.0, dsm) {
                    OrderChange::Keep(rh) => self.rescale_bounded(rh.min(0.2)),
                    OrderChange::StepSize(rh) => self.rescale_bounded(rh),
                    OrderChange::Order(rh) => {
                        self.reset_coefficients();
                        self.rescale_bounded(rh);
                    }
                }
                continue;
            }

            // Three or more failures: restart from order 1 with a fresh derivative.
            if self.kflag == -10 {
                self.kflag = -1;
                self.hold = self.h;
                self.jstart = Start::Continue;
                return Err(StepFailure::ErrorTest);
            }
            let rh = (self.hmin / self.h.abs()).max(0.1);
            self.h *= rh;
            self.y.copy_from_slice(self.yh.col(0));
            self.eval_savf(f);
            let h = self.h;
            for (c, s) in self.yh.col_mut(1).iter_mut().zip(&self.savf) {
                *c = h * s;
            }
            self.ipup = self.iteration == Iteration::Newton;
            self.ialth = 5;
            if self.order() != 1 {
                self.yh.set_order(1);
                self.reset_coefficients();
            }
        }
    }

    /// Bookkeeping after a successful error test.
    fn accept(&mut self, dsm: Float, pnorm: Float) {
        self.kflag = 0;
        self.nst += 1;
        self.hu = self.h;
        self.nqu = self.order();
        self.mused = Some(self.meth);
        for j in 0..=self.nqu {
            let r = self.el[j];
            for (c, a) in self.yh.col_mut(j).iter_mut().zip(&self.acor) {
                *c += r * a;
            }
        }

        self.icount -= 1;
        if self.icount < 0 {
            if let Some(rh) = self.method_switch(dsm, pnorm) {
                self.rescale_bounded(rh);
                self.rmax = 10.0;
                self.end_step();
                return;
            }
        }

        // Usual step/order selection.
        self.ialth = self.ialth.saturating_sub(1);
        let l = self.order() + 1;
        if self.ialth == 0 {
            let mut rhup = 0.0;
            if l != self.lmax {
                let last = self.yh.col(self.lmax - 1);
                for ((s, a), y) in self.savf.iter_mut().zip(&self.acor).zip(last) {
                    *s = a - y;
                }
                let tesco = self.tables.get(self.coeff_family).tesco[self.order()];
                let dup = self.vnorm(&self.savf) / tesco[2];
                let exup = 1.0 / (l + 1) as Float;
                rhup = 1.0 / (1.4 * dup.powf(exup) + 0.0000014);
            }
            match self.order_switch(rhup, dsm) {
                OrderChange::Keep(_) => {}
                OrderChange::StepSize(rh) => {
                    self.rescale_bounded(rh);
                    self.rmax = 10.0;
                }
                OrderChange::Order(rh) => {
                    self.reset_coefficients();
                    self.rescale_bounded(rh);
                    self.rmax = 10.0;
                }
            }
            self.end_step();
            return;
        }
        if self.ialth == 1 && l != self.lmax {
            // Keep the correction for the order-raising estimate of the next decision.
            let lmax = self.lmax;
            self.yh.col_mut(lmax - 1).copy_from_slice(&self.acor);
        }
        self.end_step();
    }

    /// Scales `acor` to the local error estimate and records the step.
    fn end_step(&mut self) {
        let r = 1.0 / self.tables.get(self.coeff_family).tesco[self.nqu][1];
        self.acor.iter_mut().for_each(|a| *a *= r);
        self.hold = self.h;
        self.jstart = Start::Continue;
    }
}

impl Stepper {
    /// k-th derivative of the solution at `t` inside the last step `[tn - hu, tn]`.
    pub(super) fn intdy(&self, t: Float, k: usize, dky: &mut [Float]) -> Result<(), InputError> {
        let nq = self.order();
        if k > nq {
            return Err(InputError::DerivativeOrder { k, order: nq });
        }
        let tp = self.tn - self.hu - 100.0 * ETA * (self.tn.abs() + self.hu.abs()).copysign(self.hu);
        if (t - tp) * (t - self.tn) > 0.0 {
            return Err(InputError::InterpolationOutOfRange {
                t,
                tlo: self.tn - self.hu,
                thi: self.tn,
            });
        }
        self.yh.derivative(self.tn, self.h, t, k, dky);
        Ok(())
    }
}
