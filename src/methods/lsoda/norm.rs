//! Weighted norms and error weights.

use crate::{core::tolerance::Tolerance, matrix::Matrix, Float};

/// Weighted vector norm used for the local error test and the convergence tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorNorm {
    /// `max_i |v_i| w_i`
    #[default]
    Max,
    /// `sqrt(sum_i (v_i w_i)^2 / n)`
    Rms,
}

impl ErrorNorm {
    /// Norm of `v` with the (inverted) error weights `w`.
    pub fn vector(&self, v: &[Float], w: &[Float]) -> Float {
        match self {
            ErrorNorm::Max => v
                .iter()
                .zip(w)
                .fold(0.0, |acc, (vi, wi)| acc.max(vi.abs() * wi)),
            ErrorNorm::Rms => {
                let sum: Float = v.iter().zip(w).map(|(vi, wi)| (vi * wi).powi(2)).sum();
                (sum / v.len().max(1) as Float).sqrt()
            }
        }
    }

    /// Matrix norm consistent with [`ErrorNorm::vector`]: `||A v|| <= ||A|| ||v||`.
    pub fn matrix(&self, a: &Matrix, w: &[Float]) -> Float {
        let n = a.nrows();
        match self {
            ErrorNorm::Max => (0..n).fold(0.0, |an: Float, i| {
                let sum: Float = (0..a.ncols()).map(|j| a[(i, j)].abs() / w[j]).sum();
                an.max(sum * w[i])
            }),
            ErrorNorm::Rms => {
                let mut sum = 0.0;
                for j in 0..a.ncols() {
                    for (i, aij) in a.column(j).iter().enumerate() {
                        sum += (aij * w[i] / w[j]).powi(2);
                    }
                }
                Float::sqrt(sum)
            }
        }
    }
}

/// Writes `ewt[i] = 1 / (rtol_i |y_i| + atol_i)`.
///
/// Fails with the index of the first nonpositive weight; `ewt` is then only
/// partly inverted.
pub(crate) fn set_error_weights(
    rtol: &Tolerance,
    atol: &Tolerance,
    y: &[Float],
    ewt: &mut [Float],
) -> Result<(), usize> {
    for (i, (w, yi)) in ewt.iter_mut().zip(y).enumerate() {
        let tol = rtol[i] * yi.abs() + atol[i];
        if !(tol > 0.0) {
            return Err(i);
        }
        *w = 1.0 / tol;
    }
    Ok(())
}
