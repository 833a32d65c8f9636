//! BLAS level-1 kernels used by the LU factorization and solves.

use crate::Float;

/// Index of the first element of largest magnitude. Returns 0 for an empty slice.
pub fn idamax(x: &[Float]) -> usize {
    let mut imax = 0;
    let mut xmax = Float::NEG_INFINITY;
    for (i, v) in x.iter().enumerate() {
        if v.abs() > xmax {
            xmax = v.abs();
            imax = i;
        }
    }
    imax
}

/// x = da * x
pub fn dscal(da: Float, x: &mut [Float]) {
    x.iter_mut().for_each(|v| *v *= da);
}

/// y = da * x + y
pub fn daxpy(da: Float, x: &[Float], y: &mut [Float]) {
    debug_assert_eq!(x.len(), y.len());
    if da == 0.0 {
        return;
    }
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += da * xi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_one_kernels() {
        assert_eq!(idamax(&[1.0, -4.0, 4.0, 2.0]), 1);
        assert_eq!(idamax(&[]), 0);

        let mut x = [1.0, -2.0];
        dscal(-0.5, &mut x);
        assert_eq!(x, [-0.5, 1.0]);

        let mut y = [1.0, 1.0];
        daxpy(2.0, &x, &mut y);
        assert_eq!(y, [0.0, 3.0]);
    }
}
