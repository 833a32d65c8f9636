//! Interpolation trait

use crate::Float;

/// Trait for interpolating the solution within a step.
pub trait Interpolate {
    /// Interpolate the solution at the given abscissa `xi`.
    fn interpolate(&self, xi: Float, yi: &mut [Float]);
}

/// Interpolant for a single point: returns the stored state for any abscissa.
///
/// Used for the initial [`SolOut`](crate::SolOut) call before any step exists.
pub(crate) struct PointInterpolant<'a> {
    y: &'a [Float],
}

impl<'a> PointInterpolant<'a> {
    pub(crate) fn new(y: &'a [Float]) -> Self {
        Self { y }
    }
}

impl Interpolate for PointInterpolant<'_> {
    fn interpolate(&self, _xi: Float, yi: &mut [Float]) {
        yi.copy_from_slice(self.y);
    }
}
