//! Status codes for the integrator

use crate::error::Error;

/// Successful outcome of an integration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The returned point is an internal mesh point: `tout` (or `tcrit`) was
    /// hit by a step, or a one-step task returned the end of its step.
    Reached,
    /// `tout` lies inside the last step and the state was interpolated.
    Interpolated,
    /// A [`SolOut`](crate::SolOut) callback stopped the integration.
    Interrupted,
}

impl Status {
    pub fn code(&self) -> i32 {
        match self {
            Status::Reached => 1,
            Status::Interpolated => 2,
            Status::Interrupted => 3,
        }
    }
}

/// Where an integrator instance is in its call sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Fresh instance: the next call initializes from the given `y` and `t`.
    Start,
    /// Initialized; the next call resumes from the stored history.
    Continue,
    /// Initialized, but tolerances or step bounds changed since the last
    /// call; the next call refreshes weights, coefficients and the Jacobian.
    Restart,
    /// A terminal failure with the given status code; only `reset` helps.
    Failed(i32),
}

impl CallState {
    pub(crate) fn failed(error: &Error) -> Self {
        CallState::Failed(error.code())
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CallState::Continue | CallState::Restart)
    }
}
