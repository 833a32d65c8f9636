//! Default SolOut that implements t_eval sampling and endpoint recording; wraps a user SolOut.

use crate::{
    core::{
        interpolate::Interpolate,
        solout::{ControlFlag, SolOut},
    },
    Float,
};

/// Callback used when the caller did not supply one.
pub(crate) struct NoSolOut;

impl SolOut for NoSolOut {
    fn solout<I: Interpolate>(&mut self, _xold: Float, _x: Float, _y: &[Float], _interpolator: &I) -> ControlFlag {
        ControlFlag::Continue
    }
}

pub struct DefaultSolOut<'a, S: SolOut> {
    t_eval: Option<&'a [Float]>,
    save_endpoints: bool,
    /// Sign of the integration direction.
    dir: Float,
    next_idx: usize,
    tol: Float,
    t: Vec<Float>,
    y: Vec<Vec<Float>>,
    user: Option<&'a mut S>,
}

impl<'a, S: SolOut> DefaultSolOut<'a, S> {
    pub fn new(
        t_eval: Option<&'a [Float]>,
        save_endpoints: bool,
        dir: Float,
        user: Option<&'a mut S>,
    ) -> Self {
        Self {
            t_eval,
            save_endpoints,
            dir,
            next_idx: 0,
            tol: 1e-12,
            t: Vec::new(),
            y: Vec::new(),
            user,
        }
    }

    pub fn into_data(self) -> (Vec<Float>, Vec<Vec<Float>>) {
        (self.t, self.y)
    }

    fn sample<I: Interpolate>(&mut self, ti: Float, n: usize, interpolator: &I) {
        let mut yi = vec![0.0; n];
        interpolator.interpolate(ti, &mut yi);
        self.t.push(ti);
        self.y.push(yi);
    }
}

impl<S: SolOut> SolOut for DefaultSolOut<'_, S> {
    fn solout<I: Interpolate>(
        &mut self,
        xold: Float,
        x: Float,
        y: &[Float],
        interpolator: &I,
    ) -> ControlFlag {
        if self.save_endpoints {
            self.t.push(x);
            self.y.push(y.to_vec());
        }

        // Sample t_eval points within (xold, x], measured along the direction.
        if let Some(te) = self.t_eval {
            let mut i = self.next_idx;
            if (xold - x).abs() <= self.tol {
                // Initial call: only exact matches.
                while i < te.len() && (te[i] - x).abs() <= self.tol {
                    self.sample(te[i], y.len(), interpolator);
                    i += 1;
                }
            } else {
                while i < te.len() && (te[i] - x) * self.dir <= self.tol {
                    if (te[i] - xold) * self.dir >= -self.tol {
                        self.sample(te[i], y.len(), interpolator);
                    }
                    i += 1;
                }
            }
            self.next_idx = i;
        }

        // Forward to user callback if any
        if let Some(user) = self.user.as_deref_mut() {
            return user.solout(xold, x, y, interpolator);
        }

        ControlFlag::Continue
    }
}
