//! Settings for the LSODA integrator

use bon::Builder;

use crate::{error::InputError, methods::lsoda::ErrorNorm, Float};

/// What a call to [`crate::Lsoda::integrate`] should do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Task {
    /// Integrate past `tout` and interpolate back to it.
    Normal,
    /// Take one internal step and return.
    OneStep,
    /// Stop at the first internal mesh point at or beyond `tout`.
    MeshPoint,
    /// Like [`Task::Normal`], but never step past `tcrit`.
    NormalTcrit(Float),
    /// Like [`Task::OneStep`], but never step past `tcrit`.
    OneStepTcrit(Float),
}

impl Task {
    pub fn tcrit(&self) -> Option<Float> {
        match self {
            Task::NormalTcrit(tcrit) | Task::OneStepTcrit(tcrit) => Some(*tcrit),
            _ => None,
        }
    }

    /// Numeric task code (1..=5).
    pub fn code(&self) -> i32 {
        match self {
            Task::Normal => 1,
            Task::OneStep => 2,
            Task::MeshPoint => 3,
            Task::NormalTcrit(_) => 4,
            Task::OneStepTcrit(_) => 5,
        }
    }
}

#[derive(Builder, Clone, Debug)]
/// Optional inputs of the LSODA integrator.
pub struct Settings {
    /// What each call does. Default: [`Task::Normal`].
    #[builder(default = Task::Normal)]
    pub task: Task,
    /// Initial step size. The sign is taken from the integration direction
    /// when it is not given explicitly. None will result in an estimate from
    /// the tolerances and the initial derivative.
    pub h0: Option<Float>,
    /// Maximal absolute step size. None means unbounded.
    pub hmax: Option<Float>,
    /// Minimum absolute step size.
    #[builder(default = 0.0)]
    pub hmin: Float,
    /// Maximum number of internal steps per call.
    #[builder(default = 500)]
    pub mxstep: usize,
    /// Maximum number of `t + h == t` warnings.
    #[builder(default = 10)]
    pub mxhnil: usize,
    /// Maximum Adams order (at most 12).
    #[builder(default = 12)]
    pub mxordn: usize,
    /// Maximum BDF order (at most 5).
    #[builder(default = 5)]
    pub mxords: usize,
    /// Weighted vector norm used by the error test.
    #[builder(default = ErrorNorm::Max)]
    pub norm: ErrorNorm,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().build()
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<(), InputError> {
        if let Some(hmax) = self.hmax {
            if !(hmax > 0.0) {
                return Err(InputError::NonPositiveMaxStep(hmax));
            }
            if self.hmin > hmax {
                return Err(InputError::MinStepExceedsMaxStep {
                    hmin: self.hmin,
                    hmax,
                });
            }
        }
        if !(self.hmin >= 0.0) {
            return Err(InputError::NegativeMinStep(self.hmin));
        }
        if self.mxstep == 0 {
            return Err(InputError::ZeroMaxSteps);
        }
        if self.mxordn == 0 {
            return Err(InputError::ZeroMaxOrder { name: "mxordn" });
        }
        if self.mxords == 0 {
            return Err(InputError::ZeroMaxOrder { name: "mxords" });
        }
        Ok(())
    }

    /// Adams order cap, clipped to the table size.
    pub(crate) fn adams_order(&self) -> usize {
        self.mxordn.min(12)
    }

    /// BDF order cap, clipped to the table size.
    pub(crate) fn bdf_order(&self) -> usize {
        self.mxords.min(5)
    }
}
