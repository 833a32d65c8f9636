//! Linear solves: A x = b via LU with partial pivoting.
//!
//! The factorization follows the LINPACK `dgefa`/`dgesl` column layout: the
//! multipliers are stored negated below the diagonal and row interchanges are
//! recorded in a pivot vector, so repeated solves with the same factors only
//! need the pivots and the matrix.

use crate::Float;

use super::{base::Matrix, daxpy, dscal, idamax};

/// Zero pivot met during factorization; the payload is its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingularPivot(pub usize);

impl Matrix {
    /// In-place LU factorization with partial pivoting.
    ///
    /// On success `self` holds the factors and `ipvt[k]` the row swapped with
    /// row `k` at elimination step `k`. A zero pivot is reported as
    /// [`SingularPivot`]; the factors are then unusable.
    pub fn lu_factor_mut(&mut self, ipvt: &mut [usize]) -> Result<(), SingularPivot> {
        let n = self.n;
        assert_eq!(self.m, n, "LU factorization needs a square matrix");
        assert_eq!(ipvt.len(), n, "pivot vector has the wrong length");
        let mut info = None;
        for k in 0..n.saturating_sub(1) {
            let l = k + idamax(&self.column(k)[k..]);
            ipvt[k] = l;
            if self[(l, k)] == 0.0 {
                info = Some(k);
                continue;
            }
            if l != k {
                self.data.swap(l + k * n, k + k * n);
            }
            let t = -1.0 / self[(k, k)];
            dscal(t, &mut self.column_mut(k)[k + 1..]);

            // Eliminate column k from every later column.
            let (left, right) = self.data.split_at_mut((k + 1) * n);
            let colk = &left[k * n + k + 1..(k + 1) * n];
            for colj in right.chunks_exact_mut(n) {
                let t = colj[l];
                if l != k {
                    colj[l] = colj[k];
                    colj[k] = t;
                }
                daxpy(t, colk, &mut colj[k + 1..]);
            }
        }
        if n > 0 {
            ipvt[n - 1] = n - 1;
            if self[(n - 1, n - 1)] == 0.0 {
                info = Some(n - 1);
            }
        }
        match info {
            Some(k) => Err(SingularPivot(k)),
            None => Ok(()),
        }
    }

    /// Solves `A x = b` with factors from [`Matrix::lu_factor_mut`], overwriting `b`.
    pub fn lu_solve_mut(&self, ipvt: &[usize], b: &mut [Float]) {
        let n = self.n;
        assert_eq!(b.len(), n, "dimension mismatch in solve: A is {}x{}, b has length {}", n, n, b.len());

        // Forward elimination: L y = P b.
        for k in 0..n.saturating_sub(1) {
            let l = ipvt[k];
            let t = b[l];
            if l != k {
                b[l] = b[k];
                b[k] = t;
            }
            daxpy(t, &self.column(k)[k + 1..], &mut b[k + 1..]);
        }
        // Back substitution: U x = y.
        for k in (0..n).rev() {
            let (head, tail) = b.split_at_mut(k);
            tail[0] /= self[(k, k)];
            daxpy(-tail[0], &self.column(k)[..k], head);
        }
    }

    /// Solve A x = b, returning x. `self` is left untouched.
    pub fn lin_solve(&self, b: &[Float]) -> Result<Vec<Float>, SingularPivot> {
        let mut lu = self.clone();
        let mut ipvt = vec![0; self.n];
        lu.lu_factor_mut(&mut ipvt)?;
        let mut x = b.to_vec();
        lu.lu_solve_mut(&ipvt, &mut x);
        Ok(x)
    }
}
