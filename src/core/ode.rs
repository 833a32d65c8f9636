//! User-supplied ODE system.

use crate::{matrix::Matrix, Float};

/// User-supplied ODE system.
///
/// Implement this trait for your problem to provide the right-hand side
/// function y' = f(t, y). The integrator repeatedly calls `ode` with the
/// current time `t` and state `y` and expects you to fill `dydt` with the
/// derivative values. Any problem parameters live in `self`.
///
/// `ode` is called many times per step while the Jacobian is approximated,
/// so it should be cheap and must depend only on its inputs and `self`.
///
/// # Example
///
/// ```
/// use lsoda::ODE;
///
/// struct VanDerPol { mu: f64 }
/// impl ODE for VanDerPol {
///     fn ode(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
///         dydt[0] = y[1];
///         dydt[1] = self.mu * ((1.0 - y[0] * y[0]) * y[1] - y[0]);
///     }
/// }
/// ```
pub trait ODE {
    fn ode(&self, t: Float, y: &[Float], dydt: &mut [Float]);

    /// Analytic Jacobian `dfdy[(i, j)] = ∂f_i/∂y_j`.
    ///
    /// `dfdy` arrives zeroed. Return `true` after filling it; the default
    /// returns `false`, in which case the Jacobian is approximated by finite
    /// differences of [`ODE::ode`].
    fn jac(&self, _t: Float, _y: &[Float], _dfdy: &mut Matrix) -> bool {
        false
    }
}
