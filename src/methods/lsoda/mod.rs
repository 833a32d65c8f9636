//! LSODA: variable-order, variable-step linear multistep integrator with
//! automatic switching between Adams (non-stiff) and BDF (stiff) formulas.
//!
//! Integration starts with first-order Adams and functional iteration. Every
//! 20 steps at a stable configuration the integrator compares the step the
//! other family could take; when BDF would be clearly cheaper (or Adams is
//! held back by its stability region) it switches to BDF with a chord Newton
//! corrector, and back again once the problem stops being stiff.
//!
//! [`Lsoda`] is resumable: it keeps its history between calls so that it can
//! be advanced to a sequence of output times.
//!
//! # Example
//!
//! ```
//! use lsoda::prelude::*;
//!
//! struct Decay;
//! impl ODE for Decay {
//!     fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
//!         dydt[0] = -y[0];
//!     }
//! }
//!
//! # fn main() -> Result<(), lsoda::Error> {
//! let mut solver = Lsoda::new(1e-6, 1e-6, Settings::default());
//! let mut y = [1.0];
//! let mut t = 0.0;
//! for tout in [0.5, 1.0, 1.5] {
//!     solver.integrate(&Decay, &mut y, &mut t, tout)?;
//!     println!("y({t}) = {}", y[0]);
//! }
//! assert!((y[0] - (-1.5f64).exp()).abs() < 1e-4);
//! # Ok(())
//! # }
//! ```

mod coefficients;
mod corrector;
mod jacobian;
mod nordsieck;
mod norm;
mod stepper;
mod switching;

pub use coefficients::MethodFamily;
pub use nordsieck::NordsieckSegment;
pub use norm::ErrorNorm;

use log::{debug, info, warn};

use corrector::FailureCause;
use norm::set_error_weights;
use stepper::{Start, StepFailure, Stepper, ETA};

use crate::{
    core::{
        ode::ODE,
        stats::Stats,
        status::{CallState, Status},
        tolerance::Tolerance,
    },
    error::{Error, InputError},
    methods::settings::{Settings, Task},
    Float,
};

/// Resumable LSODA integrator.
pub struct Lsoda {
    rtol: Tolerance,
    atol: Tolerance,
    settings: Settings,
    state: CallState,
    stepper: Option<Stepper>,
    /// Step count at the start of the current call.
    nslast: usize,
    /// Number of `t + h == t` warnings issued.
    nhnil: usize,
    tsw: Float,
    tolsf: Float,
    imxer: Option<usize>,
}

impl Default for Lsoda {
    /// `rtol = 1e-4`, `atol = 1e-6` and default [`Settings`].
    fn default() -> Self {
        Lsoda::new(1e-4, 1e-6, Settings::default())
    }
}

impl Lsoda {
    pub fn new(rtol: impl Into<Tolerance>, atol: impl Into<Tolerance>, settings: Settings) -> Self {
        Self {
            rtol: rtol.into(),
            atol: atol.into(),
            settings,
            state: CallState::Start,
            stepper: None,
            nslast: 0,
            nhnil: 0,
            tsw: 0.0,
            tolsf: 0.0,
            imxer: None,
        }
    }

    /// Advances the solution of `y' = f(t, y)` towards `tout`.
    ///
    /// On the first call `y` and `t` are the initial condition; on later calls
    /// they must be the values returned by the previous call (only their length
    /// is checked). On success `t` is the point the task stopped at (normally
    /// `tout`) and `y` the solution there.
    ///
    /// # Errors
    ///
    /// Input errors are reported before anything is changed and leave the
    /// integrator in its current state. Run-time failures leave `y` and `t` at
    /// the last point reached and put the integrator in the failed state;
    /// every later call returns [`Error::Terminated`] until [`Lsoda::reset`].
    pub fn integrate<F: ODE>(
        &mut self,
        f: &F,
        y: &mut [Float],
        t: &mut Float,
        tout: Float,
    ) -> Result<Status, Error> {
        match self.state {
            CallState::Failed(code) => Err(Error::Terminated(code)),
            CallState::Start => {
                self.validate(y.len())?;
                if tout == *t {
                    return Ok(Status::Reached);
                }
                let mut st = self.start(f, y, *t, tout)?;
                let result = self.run(&mut st, f, y, t, tout, true);
                self.stepper = Some(st);
                result
            }
            CallState::Continue | CallState::Restart => {
                let Some(mut st) = self.stepper.take() else {
                    return Err(InputError::NotStarted.into());
                };
                let result = self.resume(&mut st, f, y, t, tout);
                self.stepper = Some(st);
                result
            }
        }
    }

    /// k-th derivative of the solution at `t`, which must lie within the last
    /// step. `k` is at most the current order.
    pub fn dense_output(&self, t: Float, k: usize, dky: &mut [Float]) -> Result<(), Error> {
        let st = self.stepper.as_ref().ok_or(InputError::NotStarted)?;
        if dky.len() != st.n {
            return Err(InputError::DimensionChanged {
                expected: st.n,
                got: dky.len(),
            }
            .into());
        }
        st.intdy(t, k, dky)?;
        Ok(())
    }

    /// Dense output over the last accepted step.
    pub fn last_step(&self) -> Option<NordsieckSegment> {
        self.stepper.as_ref().filter(|st| st.nst > 0).map(|st| st.segment())
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats {
            tsw: self.tsw,
            tolsf: self.tolsf,
            imxer: self.imxer,
            ..Stats::default()
        };
        if let Some(st) = &self.stepper {
            stats.nst = st.nst;
            stats.nfe = st.nfe;
            stats.nje = st.nje;
            stats.nqu = st.nqu;
            stats.nqcur = st.order();
            stats.hu = st.hu;
            stats.hcur = st.h;
            stats.tcur = st.tn;
            stats.mused = st.mused;
            stats.mcur = Some(st.meth);
        }
        stats
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// Family to be used on the next step, `None` before the first call.
    pub fn method(&self) -> Option<MethodFamily> {
        self.stepper.as_ref().map(|st| st.meth)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes the tolerances; applied from the next call on.
    pub fn set_tolerances(&mut self, rtol: impl Into<Tolerance>, atol: impl Into<Tolerance>) {
        self.rtol = rtol.into();
        self.atol = atol.into();
        self.mark_restart();
    }

    /// Changes the step bounds; applied from the next call on.
    pub fn set_step_bounds(&mut self, hmin: Float, hmax: Option<Float>) {
        self.settings.hmin = hmin;
        self.settings.hmax = hmax;
        self.mark_restart();
    }

    /// Changes the task of the following calls.
    pub fn set_task(&mut self, task: Task) {
        self.settings.task = task;
    }

    /// Discards all history; the next call starts a new problem.
    pub fn reset(&mut self) {
        self.state = CallState::Start;
        self.stepper = None;
        self.nslast = 0;
        self.nhnil = 0;
        self.tsw = 0.0;
        self.tolsf = 0.0;
        self.imxer = None;
    }

    fn mark_restart(&mut self) {
        if self.state == CallState::Continue {
            self.state = CallState::Restart;
        }
    }

    fn validate(&self, n: usize) -> Result<(), InputError> {
        if n == 0 {
            return Err(InputError::EmptyState);
        }
        self.rtol.validate("rtol", n)?;
        self.atol.validate("atol", n)?;
        self.settings.validate()
    }

    /// Loads the history from the initial condition and picks the first step.
    fn start<F: ODE>(
        &mut self,
        f: &F,
        y: &[Float],
        t: Float,
        tout: Float,
    ) -> Result<Stepper, InputError> {
        let n = y.len();
        let mut h0 = self.settings.h0.unwrap_or(0.0);
        if h0 != 0.0 && (tout - t) * h0 < 0.0 {
            return Err(InputError::InitialStepDirection { h0, t, tout });
        }
        if let Some(tcrit) = self.settings.task.tcrit() {
            if (tcrit - tout) * (tout - t) < 0.0 {
                return Err(InputError::TcritBehindTout { tcrit, tout });
            }
            if h0 != 0.0 && (t + h0 - tcrit) * h0 > 0.0 {
                h0 = tcrit - t;
            }
        }
        let tdist = (tout - t).abs();
        let w0 = t.abs().max(tout.abs());
        if h0 == 0.0 && tdist < 2.0 * ETA * w0 {
            return Err(InputError::ToutTooClose { t, tout });
        }

        let mut st = Stepper::new(n, &self.settings, t);
        st.yh.col_mut(0).copy_from_slice(y);
        set_error_weights(&self.rtol, &self.atol, y, &mut st.ewt)
            .map_err(|index| InputError::NonPositiveErrorWeight { index })?;
        f.ode(t, y, st.yh.col_mut(1));
        st.nfe = 1;

        if h0 == 0.0 {
            let mut tol = self.rtol.max();
            if tol <= 0.0 {
                for (i, yi) in y.iter().enumerate() {
                    if *yi != 0.0 {
                        tol = tol.max(self.atol[i] / yi.abs());
                    }
                }
            }
            tol = tol.max(100.0 * ETA).min(0.001);
            let ydot = st.vnorm(st.yh.col(1));
            let sum = 1.0 / (tol * w0 * w0) + tol * ydot * ydot;
            h0 = (1.0 / sum.sqrt()).min(tdist).copysign(tout - t);
        }
        let rh = h0.abs() * st.hmxi;
        if rh > 1.0 {
            h0 /= rh;
        }
        st.h = h0;
        st.yh.col_mut(1).iter_mut().for_each(|v| *v *= h0);

        self.nslast = 0;
        self.nhnil = 0;
        self.tsw = t;
        self.tolsf = 0.0;
        self.imxer = None;
        self.state = CallState::Continue;
        Ok(st)
    }

    /// Checks a continuation call against the task and returns early when the
    /// history already covers `tout`.
    fn resume<F: ODE>(
        &mut self,
        st: &mut Stepper,
        f: &F,
        y: &mut [Float],
        t: &mut Float,
        tout: Float,
    ) -> Result<Status, Error> {
        if y.len() != st.n {
            return Err(InputError::DimensionChanged {
                expected: st.n,
                got: y.len(),
            }
            .into());
        }
        if self.state == CallState::Restart {
            self.validate(st.n)?;
            st.hmin = self.settings.hmin;
            st.hmxi = self.settings.hmax.map_or(0.0, |hmax| 1.0 / hmax);
            st.norm = self.settings.norm;
            st.jstart = Start::ParametersChanged;
            let rh = st.h.abs() * st.hmxi;
            if rh > 1.0 {
                st.h /= rh;
            }
            self.state = CallState::Continue;
        }

        self.nslast = st.nst;
        let behind = |st: &Stepper| InputError::ToutBehindLastStep {
            tout,
            tlo: st.tn - st.hu,
            thi: st.tn,
        };
        match self.settings.task {
            Task::Normal => {
                if (st.tn - tout) * st.h >= 0.0 {
                    st.intdy(tout, 0, y).map_err(|_| behind(st))?;
                    *t = tout;
                    return Ok(interpolated(st, tout));
                }
            }
            Task::OneStep => {}
            Task::MeshPoint => {
                let tp = st.tn - st.hu * (1.0 + 100.0 * ETA);
                if (tp - tout) * st.h > 0.0 {
                    return Err(behind(st).into());
                }
                if (st.tn - tout) * st.h >= 0.0 {
                    return Ok(reached(st, y, t, None));
                }
            }
            Task::NormalTcrit(tcrit) => {
                if (st.tn - tcrit) * st.h > 0.0 {
                    return Err(InputError::TcritBehindTcur { tcrit, tcur: st.tn }.into());
                }
                if (tcrit - tout) * st.h < 0.0 {
                    return Err(InputError::TcritBehindTout { tcrit, tout }.into());
                }
                if (st.tn - tout) * st.h >= 0.0 {
                    st.intdy(tout, 0, y).map_err(|_| behind(st))?;
                    *t = tout;
                    return Ok(interpolated(st, tout));
                }
                if let Some(status) = approach_tcrit(st, y, t, tcrit) {
                    return Ok(status);
                }
            }
            Task::OneStepTcrit(tcrit) => {
                if (st.tn - tcrit) * st.h > 0.0 {
                    return Err(InputError::TcritBehindTcur { tcrit, tcur: st.tn }.into());
                }
                if let Some(status) = approach_tcrit(st, y, t, tcrit) {
                    return Ok(status);
                }
            }
        }
        self.run(st, f, y, t, tout, false)
    }

    /// Steps until the task is complete or a failure ends the integration.
    fn run<F: ODE>(
        &mut self,
        st: &mut Stepper,
        f: &F,
        y: &mut [Float],
        t: &mut Float,
        tout: Float,
        fresh: bool,
    ) -> Result<Status, Error> {
        let task = self.settings.task;
        loop {
            if !fresh || st.nst != 0 {
                if st.nst - self.nslast >= self.settings.mxstep {
                    let err = Error::ExcessFunctionEvaluations {
                        t: st.tn,
                        mxstep: self.settings.mxstep,
                    };
                    return Err(self.fail(st, y, t, err));
                }
                if let Err(index) = set_error_weights(&self.rtol, &self.atol, st.yh.col(0), &mut st.ewt) {
                    return Err(self.fail(st, y, t, Error::ZeroErrorWeight { t: st.tn, index }));
                }
            }

            let tolsf = ETA * st.vnorm(st.yh.col(0));
            if tolsf > 0.01 {
                self.tolsf = tolsf * 200.0;
                let err = Error::ToleranceTooTight {
                    t: st.tn,
                    scale_factor: self.tolsf,
                };
                if st.nst == 0 {
                    debug!("{}", err);
                    self.state = CallState::failed(&err);
                    return Err(err);
                }
                return Err(self.fail(st, y, t, err));
            }

            if st.tn + st.h == st.tn {
                self.nhnil += 1;
                if self.nhnil <= self.settings.mxhnil {
                    warn!(
                        "t (= {}) and h (= {}) are such that t + h = t on the next step; \
                         the integrator will continue anyway",
                        st.tn, st.h
                    );
                    if self.nhnil == self.settings.mxhnil {
                        warn!(
                            "the warning above has been issued {} times and will not be issued again",
                            self.nhnil
                        );
                    }
                }
            }

            if let Err(failure) = st.step(f) {
                self.imxer = largest_error_component(st);
                let err = step_error(failure, st.tn, st.h);
                return Err(self.fail(st, y, t, err));
            }
            // The next step size underflowed.
            if st.h == 0.0 {
                self.imxer = largest_error_component(st);
                let err = Error::ExcessStepReduction { t: st.tn, h: st.hu };
                return Err(self.fail(st, y, t, err));
            }

            if Some(st.meth) != st.mused {
                info!(
                    "switching from {:?} to {:?} at t = {} (order {}, h = {})",
                    st.mused.unwrap_or(MethodFamily::Adams),
                    st.meth,
                    st.tn,
                    st.order(),
                    st.h
                );
                self.tsw = st.tn;
                st.maxord = match st.meth {
                    MethodFamily::Adams => st.mxordn,
                    MethodFamily::Bdf => st.mxords,
                };
                st.jstart = Start::ParametersChanged;
            }

            match task {
                Task::Normal => {
                    if (st.tn - tout) * st.h >= 0.0 {
                        return self.interpolate_at(st, y, t, tout);
                    }
                }
                Task::OneStep => return Ok(reached(st, y, t, None)),
                Task::MeshPoint => {
                    if (st.tn - tout) * st.h >= 0.0 {
                        return Ok(reached(st, y, t, None));
                    }
                }
                Task::NormalTcrit(tcrit) => {
                    if (st.tn - tout) * st.h >= 0.0 {
                        return self.interpolate_at(st, y, t, tout);
                    }
                    if let Some(status) = approach_tcrit(st, y, t, tcrit) {
                        return Ok(status);
                    }
                }
                Task::OneStepTcrit(tcrit) => {
                    let tcrit = hits(st, tcrit).then_some(tcrit);
                    return Ok(reached(st, y, t, tcrit));
                }
            }
        }
    }

    /// Interpolates at `tout` after a step that passed it. A step that covers
    /// no interval cannot be interpolated and ends the integration.
    fn interpolate_at(
        &mut self,
        st: &Stepper,
        y: &mut [Float],
        t: &mut Float,
        tout: Float,
    ) -> Result<Status, Error> {
        if st.intdy(tout, 0, y).is_err() {
            let err = Error::ExcessStepReduction { t: st.tn, h: st.hu };
            return Err(self.fail(st, y, t, err));
        }
        *t = tout;
        Ok(interpolated(st, tout))
    }

    /// Returns the last point reached and marks the integrator as failed.
    fn fail(&mut self, st: &Stepper, y: &mut [Float], t: &mut Float, err: Error) -> Error {
        y.copy_from_slice(st.yh.col(0));
        *t = st.tn;
        debug!("integration stopped at t = {} after {} steps: {}", st.tn, st.nst, err);
        self.state = CallState::failed(&err);
        err
    }
}

/// Run-time error for a step that could not be completed at `(t, h)`.
fn step_error(failure: StepFailure, t: Float, h: Float) -> Error {
    match failure {
        StepFailure::ErrorTest => Error::ExcessStepReduction { t, h },
        StepFailure::Corrector(FailureCause::Diverged) => Error::CorrectorFailure { t, h },
        StepFailure::Corrector(FailureCause::SingularMatrix) => Error::SingularMatrix { t, h },
    }
}

/// Status of a return at `tout` by interpolation.
fn interpolated(st: &Stepper, tout: Float) -> Status {
    if tout == st.tn {
        Status::Reached
    } else {
        Status::Interpolated
    }
}

/// Returns the current mesh point, or `tcrit` when it was hit.
fn reached(st: &Stepper, y: &mut [Float], t: &mut Float, tcrit: Option<Float>) -> Status {
    y.copy_from_slice(st.yh.col(0));
    *t = tcrit.unwrap_or(st.tn);
    Status::Reached
}

/// `tn` coincides with `tcrit` up to roundoff.
fn hits(st: &Stepper, tcrit: Float) -> bool {
    let hmx = st.tn.abs() + st.h.abs();
    (st.tn - tcrit).abs() <= 100.0 * ETA * hmx
}

/// Returns at `tcrit` if it was hit, otherwise shortens the next step so
/// that it does not pass `tcrit`.
fn approach_tcrit(st: &mut Stepper, y: &mut [Float], t: &mut Float, tcrit: Float) -> Option<Status> {
    if hits(st, tcrit) {
        return Some(reached(st, y, t, Some(tcrit)));
    }
    let tnext = st.tn + st.h * (1.0 + 4.0 * ETA);
    if (tnext - tcrit) * st.h > 0.0 {
        st.h = (tcrit - st.tn) * (1.0 - 4.0 * ETA);
        if st.jstart == Start::Continue {
            st.jstart = Start::NewStepSize;
        }
    }
    None
}

/// Component with the largest weighted local error.
fn largest_error_component(st: &Stepper) -> Option<usize> {
    let mut big = 0.0;
    let mut imxer = 0;
    for (i, (a, w)) in st.acor.iter().zip(&st.ewt).enumerate() {
        let size = a.abs() * w;
        if big < size {
            big = size;
            imxer = i;
        }
    }
    (st.n > 0).then_some(imxer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failures_map_to_status_codes() {
        let codes = [
            (StepFailure::ErrorTest, -4),
            (StepFailure::Corrector(FailureCause::Diverged), -5),
            (StepFailure::Corrector(FailureCause::SingularMatrix), -7),
        ];
        for (failure, code) in codes {
            let err = step_error(failure, 0.5, 1e-3);
            assert_eq!(err.code(), code, "{failure:?}");
            assert_eq!(CallState::failed(&err), CallState::Failed(code));
        }
    }
}
