//! Options for solve_ivp

use bon::Builder;

use crate::{core::tolerance::Tolerance, methods::lsoda::ErrorNorm, Float};

use i_v_p_options_builder::{IsUnset, SetSaveStepEndpoints, SetTEval, State};

#[derive(Builder, Clone, Debug)]
/// Options for solve_ivp similar to SciPy
pub struct IVPOptions {
    /// Relative tolerance for error estimation.
    #[builder(default = 1e-6, into)]
    pub rtol: Tolerance,
    /// Absolute tolerance for error estimation.
    #[builder(default = 1e-6, into)]
    pub atol: Tolerance,
    /// Maximum number of allowed steps. Default: 100_000.
    pub nmax: Option<usize>,
    /// Points where the solution is requested. Sampled by dense output, so
    /// they do not constrain the step size. By default this will disable
    /// [`save_step_endpoints`](Self::save_step_endpoints) unless explicitly set.
    #[builder(setters(vis = "", name = t_eval_internal))]
    pub t_eval: Option<Vec<Float>>,
    /// Initial step suggestion (maps to `settings.h0`).
    pub first_step: Option<Float>,
    /// Maximum step size (maps to `settings.hmax`).
    pub max_step: Option<Float>,
    /// Minimum step size (maps to `settings.hmin`).
    pub min_step: Option<Float>,
    /// Maximum Adams order. Default: 12.
    pub max_order_adams: Option<usize>,
    /// Maximum BDF order. Default: 5.
    pub max_order_bdf: Option<usize>,
    /// Error norm. Default: weighted max norm.
    #[builder(default)]
    pub norm: ErrorNorm,
    /// Save step endpoints (initial call and each accepted step). Default: true.
    #[builder(default = true)]
    pub save_step_endpoints: bool,
    /// Keep the per-step interpolants for [`IVPSolution::sol`](crate::IVPSolution::sol).
    #[builder(default = false)]
    pub dense_output: bool,
}

impl<STATE: State> IVPOptionsBuilder<STATE> {
    pub fn t_eval(self, t_eval: Vec<Float>) -> IVPOptionsBuilder<SetTEval<SetSaveStepEndpoints<STATE>>>
    where
        STATE::TEval: IsUnset,
        STATE::SaveStepEndpoints: IsUnset,
    {
        self.save_step_endpoints(false).t_eval_internal(t_eval)
    }
}

impl Default for IVPOptions {
    fn default() -> Self {
        IVPOptions::builder().build()
    }
}
