//! Integration statistics

use crate::{methods::lsoda::MethodFamily, Float};

/// Counters and step data of an integrator instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    /// Number of accepted steps.
    pub nst: usize,
    /// Number of right-hand side evaluations.
    pub nfe: usize,
    /// Number of Jacobian evaluations (and LU factorizations).
    pub nje: usize,
    /// Method order used on the last accepted step.
    pub nqu: usize,
    /// Method order to be attempted on the next step.
    pub nqcur: usize,
    /// Step size used on the last accepted step.
    pub hu: Float,
    /// Step size to be attempted on the next step.
    pub hcur: Float,
    /// Time reached by the integrator.
    pub tcur: Float,
    /// Time of the last method switch.
    pub tsw: Float,
    /// Tolerance scale factor computed when the requested accuracy was too
    /// high; zero otherwise.
    pub tolsf: Float,
    /// Family used on the last accepted step, `None` before the first step.
    pub mused: Option<MethodFamily>,
    /// Family to be attempted on the next step.
    pub mcur: Option<MethodFamily>,
    /// Component with the largest weighted local error after a step failure.
    pub imxer: Option<usize>,
}
