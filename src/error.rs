//! Errors for the integrator

use thiserror::Error;

use crate::Float;

/// Terminal failures reported by [`crate::Lsoda`] and [`crate::solve_ivp`].
///
/// Input errors leave the integrator as it was, so the call can be repeated
/// with corrected arguments. Run-time failures put it in the failed state: it
/// has to be [`reset`](crate::Lsoda::reset) before it will advance again, and
/// the caller's `y` and `t` hold the last point reached successfully.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("{mxstep} steps taken before reaching tout (t = {t})")]
    ExcessFunctionEvaluations { t: Float, mxstep: usize },
    #[error(
        "too much accuracy requested for machine precision at t = {t}, \
         suggested tolerance scale factor = {scale_factor}"
    )]
    ToleranceTooTight { t: Float, scale_factor: Float },
    #[error("error test failed repeatedly, with |h| = hmin, or the step size underflowed (t = {t}, h = {h})")]
    ExcessStepReduction { t: Float, h: Float },
    #[error("corrector convergence failed repeatedly or with |h| = hmin (t = {t}, h = {h})")]
    CorrectorFailure { t: Float, h: Float },
    #[error("iteration matrix singular on every retry (t = {t}, h = {h})")]
    SingularMatrix { t: Float, h: Float },
    #[error("error weight of component {index} became nonpositive (t = {t})")]
    ZeroErrorWeight { t: Float, index: usize },
    #[error("integrator stopped with status {0}; reset it before integrating again")]
    Terminated(i32),
}

impl Error {
    /// Caller-visible status code of the failure.
    pub fn code(&self) -> i32 {
        match self {
            Error::ExcessFunctionEvaluations { .. } => -1,
            Error::ToleranceTooTight { .. } => -2,
            Error::InvalidInput(_) => -3,
            Error::ExcessStepReduction { .. } => -4,
            Error::CorrectorFailure { .. } => -5,
            Error::ZeroErrorWeight { .. } => -6,
            Error::SingularMatrix { .. } => -7,
            Error::Terminated(code) => *code,
        }
    }
}

/// Validation errors detected before (or instead of) taking a step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("state vector must not be empty")]
    EmptyState,
    #[error("state dimension changed from {expected} to {got}")]
    DimensionChanged { expected: usize, got: usize },
    #[error("{name} has {got} components but the state has {expected}")]
    ToleranceLength {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{name}[{index}] = {value} is negative")]
    NegativeTolerance {
        name: &'static str,
        index: usize,
        value: Float,
    },
    #[error("hmax must be positive (got {0})")]
    NonPositiveMaxStep(Float),
    #[error("hmin must be nonnegative (got {0})")]
    NegativeMinStep(Float),
    #[error("hmin = {hmin} exceeds hmax = {hmax}")]
    MinStepExceedsMaxStep { hmin: Float, hmax: Float },
    #[error("mxstep must be positive")]
    ZeroMaxSteps,
    #[error("{name} must be at least 1")]
    ZeroMaxOrder { name: &'static str },
    #[error("initial step {h0} points away from tout = {tout} (t = {t})")]
    InitialStepDirection { h0: Float, t: Float, tout: Float },
    #[error("tout = {tout} too close to t = {t} to start integration")]
    ToutTooClose { t: Float, tout: Float },
    #[error("tcrit = {tcrit} is behind tout = {tout}")]
    TcritBehindTout { tcrit: Float, tout: Float },
    #[error("tcrit = {tcrit} is behind the current time {tcur}")]
    TcritBehindTcur { tcrit: Float, tcur: Float },
    #[error("tout = {tout} is behind the last step [{tlo}, {thi}]")]
    ToutBehindLastStep { tout: Float, tlo: Float, thi: Float },
    #[error("t = {t} is outside the last step [{tlo}, {thi}]")]
    InterpolationOutOfRange { t: Float, tlo: Float, thi: Float },
    #[error("derivative order {k} exceeds the current method order {order}")]
    DerivativeOrder { k: usize, order: usize },
    #[error("error weight of component {index} is nonpositive at the initial point")]
    NonPositiveErrorWeight { index: usize },
    #[error("no integration step has been taken yet")]
    NotStarted,
    #[error("invalid t_eval: {0}")]
    InvalidTEval(String),
}
