//! User defined callback hook executed after each accepted step.

use crate::{core::interpolate::Interpolate, Float};

/// Return flags for [`SolOut`].
///
/// - `Continue`: proceed with integration as normal.
/// - `Interrupt`: stop integration and return control to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlag {
    Continue,
    Interrupt,
}

/// Callback hook executed after each accepted step of [`crate::solve_ivp_with`].
///
/// The callback is invoked once before the first step (with `xold == x`) and
/// after every accepted step. The arguments are:
/// - `xold`: the left end of the last accepted step,
/// - `x`: the new abscissa,
/// - `y`: the solution at `x`,
/// - `interpolator`: dense output valid on `[xold, x]`.
///
/// # Example
///
/// ```ignore
/// struct Printer { xout: f64, dx: f64 }
/// impl SolOut for Printer {
///     fn solout<I: Interpolate>(&mut self, xold: f64, x: f64, y: &[f64], interp: &I) -> ControlFlag {
///         let mut yi = y.to_vec();
///         while self.xout <= x {
///             interp.interpolate(self.xout, &mut yi);
///             println!("x = {}, y = {:?}", self.xout, yi);
///             self.xout += self.dx;
///         }
///         ControlFlag::Continue
///     }
/// }
/// ```
pub trait SolOut {
    fn solout<I: Interpolate>(
        &mut self,
        xold: Float,
        x: Float,
        y: &[Float],
        interpolator: &I,
    ) -> ControlFlag;
}
