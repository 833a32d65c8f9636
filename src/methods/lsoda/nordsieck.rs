//! Nordsieck history array and dense output.

use crate::{core::interpolate::Interpolate, matrix::daxpy, Float};

/// Solution history stored as scaled derivatives.
///
/// Column `j` holds `h^j y^(j)(tn) / j!` for `j = 0..=order`. The buffer is
/// allocated once for the largest order either family may use; order changes
/// only move the `order` marker.
#[derive(Clone, Debug)]
pub(crate) struct Nordsieck {
    n: usize,
    capacity: usize,
    order: usize,
    data: Vec<Float>,
}

impl Nordsieck {
    /// History for `n` components with room for `capacity` columns.
    pub(crate) fn new(n: usize, capacity: usize) -> Self {
        Self {
            n,
            capacity,
            order: 1,
            data: vec![0.0; n * capacity],
        }
    }

    pub(crate) fn order(&self) -> usize {
        self.order
    }

    pub(crate) fn dim(&self) -> usize {
        self.n
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        debug_assert!(order >= 1 && order < self.capacity);
        self.order = order;
    }

    pub(crate) fn col(&self, j: usize) -> &[Float] {
        &self.data[j * self.n..(j + 1) * self.n]
    }

    pub(crate) fn col_mut(&mut self, j: usize) -> &mut [Float] {
        &mut self.data[j * self.n..(j + 1) * self.n]
    }

    /// `col[j] += sign * col[j + 1]`
    fn fold_next(&mut self, j: usize, sign: Float) {
        let (lo, hi) = self.data.split_at_mut((j + 1) * self.n);
        daxpy(sign, &hi[..self.n], &mut lo[j * self.n..]);
    }

    /// Advances the history by one step: multiplies by the Pascal triangle matrix.
    pub(crate) fn predict(&mut self) {
        for j in (0..self.order).rev() {
            for i in j..self.order {
                self.fold_next(i, 1.0);
            }
        }
    }

    /// Undoes [`Nordsieck::predict`].
    pub(crate) fn retract(&mut self) {
        for j in (0..self.order).rev() {
            for i in j..self.order {
                self.fold_next(i, -1.0);
            }
        }
    }

    /// Rescales the history for a step size change `h -> rh * h`.
    pub(crate) fn rescale(&mut self, rh: Float) {
        let mut r = 1.0;
        for j in 1..=self.order {
            r *= rh;
            self.col_mut(j).iter_mut().for_each(|v| *v *= r);
        }
    }

    /// k-th derivative of the interpolating polynomial at `t`, given the
    /// current time `tn` and step `h` the history is scaled with.
    pub(crate) fn derivative(&self, tn: Float, h: Float, t: Float, k: usize, dky: &mut [Float]) {
        let nq = self.order;
        let s = (t - tn) / h;
        let falling = |j: usize| ((j + 1 - k)..=j).product::<usize>() as Float;

        let c = falling(nq);
        for (d, y) in dky.iter_mut().zip(self.col(nq)) {
            *d = c * y;
        }
        for j in (k..nq).rev() {
            let c = falling(j);
            for (d, y) in dky.iter_mut().zip(self.col(j)) {
                *d = c * y + s * *d;
            }
        }
        if k > 0 {
            let r = h.powi(-(k as i32));
            dky.iter_mut().for_each(|d| *d *= r);
        }
    }

    /// Copy of the active columns only.
    pub(crate) fn snapshot(&self) -> Self {
        let len = self.n * (self.order + 1);
        Self {
            n: self.n,
            capacity: self.order + 1,
            order: self.order,
            data: self.data[..len].to_vec(),
        }
    }
}

/// Dense output over one accepted step `[tn - hu, tn]`.
#[derive(Clone, Debug)]
pub struct NordsieckSegment {
    pub(crate) tlo: Float,
    pub(crate) tn: Float,
    pub(crate) h: Float,
    pub(crate) yh: Nordsieck,
}

impl NordsieckSegment {
    /// Start of the step.
    pub fn t_start(&self) -> Float {
        self.tlo
    }

    /// End of the step.
    pub fn t_end(&self) -> Float {
        self.tn
    }

    /// Order of the interpolating polynomial.
    pub fn order(&self) -> usize {
        self.yh.order()
    }

    /// Number of solution components.
    pub fn dim(&self) -> usize {
        self.yh.dim()
    }

    /// k-th derivative at `t`, `k <= order`.
    pub fn derivative(&self, t: Float, k: usize, dky: &mut [Float]) {
        self.yh.derivative(self.tn, self.h, t, k, dky);
    }
}

impl Interpolate for NordsieckSegment {
    fn interpolate(&self, xi: Float, yi: &mut [Float]) {
        self.yh.derivative(self.tn, self.h, xi, 0, yi);
    }
}
