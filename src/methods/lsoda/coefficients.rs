//! Adams and BDF coefficient tables.
//!
//! For each order `q` the table holds the Nordsieck corrector vector
//! `elco[q][0..=q]` and the test constants `tesco[q]`: `tesco[q][0]` scales
//! the error estimate at order `q - 1`, `tesco[q][1]` the one at `q`, and
//! `tesco[q][2]` the one at `q + 1`.

use crate::Float;

/// Linear multistep family in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodFamily {
    /// Implicit Adams (Adams-Moulton) formulas for non-stiff problems.
    Adams,
    /// Backward differentiation formulas for stiff problems.
    Bdf,
}

impl MethodFamily {
    /// Highest order the family supports.
    pub fn max_order(&self) -> usize {
        match self {
            MethodFamily::Adams => 12,
            MethodFamily::Bdf => 5,
        }
    }
}

/// Table size: orders 1..=12 indexed directly.
pub(crate) const TABLE_LEN: usize = 13;

/// Adams stability bounds on `|h| * L` for each order, `L` the Lipschitz estimate.
pub(crate) const SM1: [Float; TABLE_LEN] = [
    0.0, 0.5, 0.575, 0.55, 0.45, 0.35, 0.25, 0.2, 0.15, 0.1, 0.075, 0.05, 0.025,
];

#[derive(Clone, Debug)]
pub(crate) struct MethodCoefficients {
    pub elco: [[Float; TABLE_LEN]; TABLE_LEN],
    pub tesco: [[Float; 3]; TABLE_LEN],
}

impl MethodCoefficients {
    pub(crate) fn new(family: MethodFamily) -> Self {
        match family {
            MethodFamily::Adams => Self::adams(),
            MethodFamily::Bdf => Self::bdf(),
        }
    }

    /// Coefficients of the Adams formulas, built from the polynomial
    /// `p(x) = (x + 1)(x + 2)...(x + q - 1)` and its integrals over `[-1, 0]`.
    fn adams() -> Self {
        let mut elco = [[0.0; TABLE_LEN]; TABLE_LEN];
        let mut tesco = [[0.0; 3]; TABLE_LEN];
        let mut pc = [0.0; TABLE_LEN];

        elco[1][0] = 1.0;
        elco[1][1] = 1.0;
        tesco[1][0] = 0.0;
        tesco[1][1] = 2.0;
        tesco[2][0] = 1.0;
        tesco[12][2] = 0.0;
        pc[0] = 1.0;
        let mut rqfac = 1.0;
        for nq in 2..TABLE_LEN {
            let rq1fac = rqfac;
            rqfac /= nq as Float;
            let fnqm1 = (nq - 1) as Float;

            // p(x) * (x + nq - 1)
            pc[nq - 1] = 0.0;
            for i in (2..=nq).rev() {
                pc[i - 1] = pc[i - 2] + fnqm1 * pc[i - 1];
            }
            pc[0] *= fnqm1;

            // Integrals of p(x) and x p(x) over [-1, 0].
            let mut pint = pc[0];
            let mut xpin = pc[0] / 2.0;
            let mut tsign = 1.0;
            for i in 2..=nq {
                tsign = -tsign;
                pint += tsign * pc[i - 1] / i as Float;
                xpin += tsign * pc[i - 1] / (i + 1) as Float;
            }

            elco[nq][0] = pint * rq1fac;
            elco[nq][1] = 1.0;
            for i in 2..=nq {
                elco[nq][i] = rq1fac * pc[i - 1] / i as Float;
            }
            let ragq = 1.0 / (rqfac * xpin);
            tesco[nq][1] = ragq;
            if nq < 12 {
                tesco[nq + 1][0] = ragq * rqfac / (nq + 1) as Float;
            }
            tesco[nq - 1][2] = ragq;
        }
        Self { elco, tesco }
    }

    /// Coefficients of the BDF formulas, built from
    /// `p(x) = (x + 1)(x + 2)...(x + q)`.
    fn bdf() -> Self {
        let mut elco = [[0.0; TABLE_LEN]; TABLE_LEN];
        let mut tesco = [[0.0; 3]; TABLE_LEN];
        let mut pc = [0.0; TABLE_LEN];

        pc[0] = 1.0;
        let mut rq1fac = 1.0;
        for nq in 1..=5 {
            let fnq = nq as Float;
            pc[nq] = 0.0;
            for i in (2..=nq + 1).rev() {
                pc[i - 1] = pc[i - 2] + fnq * pc[i - 1];
            }
            pc[0] *= fnq;

            for i in 0..=nq {
                elco[nq][i] = pc[i] / pc[1];
            }
            elco[nq][1] = 1.0;
            tesco[nq][0] = rq1fac;
            tesco[nq][1] = (nq + 1) as Float / elco[nq][0];
            tesco[nq][2] = (nq + 2) as Float / elco[nq][0];
            rq1fac /= fnq;
        }
        Self { elco, tesco }
    }
}

/// Both coefficient families plus the error constants used by the stiffness test.
#[derive(Clone, Debug)]
pub(crate) struct CoefficientTables {
    adams: MethodCoefficients,
    bdf: MethodCoefficients,
    /// Adams error constants, `cm1[q] = tesco[q][1] * elco[q][q]`.
    pub cm1: [Float; TABLE_LEN],
    /// BDF error constants, `cm2[q] = tesco[q][1] * elco[q][q]`.
    pub cm2: [Float; 6],
}

impl CoefficientTables {
    pub(crate) fn new() -> Self {
        let adams = MethodCoefficients::new(MethodFamily::Adams);
        let bdf = MethodCoefficients::new(MethodFamily::Bdf);
        let mut cm1 = [0.0; TABLE_LEN];
        for (q, c) in cm1.iter_mut().enumerate().skip(1) {
            *c = adams.tesco[q][1] * adams.elco[q][q];
        }
        let mut cm2 = [0.0; 6];
        for (q, c) in cm2.iter_mut().enumerate().skip(1) {
            *c = bdf.tesco[q][1] * bdf.elco[q][q];
        }
        Self { adams, bdf, cm1, cm2 }
    }

    pub(crate) fn get(&self, family: MethodFamily) -> &MethodCoefficients {
        match family {
            MethodFamily::Adams => &self.adams,
            MethodFamily::Bdf => &self.bdf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Float, b: Float) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn adams_low_orders() {
        let c = MethodCoefficients::new(MethodFamily::Adams);
        // Trapezoidal rule.
        assert_eq!(&c.elco[2][..3], &[0.5, 1.0, 0.5]);
        assert!(close(c.tesco[2][1], 12.0));
        assert!(close(c.tesco[1][1], 2.0));
        // Third-order Adams-Moulton: el = [5/12, 1, 3/4, 1/6].
        assert!(close(c.elco[3][0], 5.0 / 12.0));
        assert!(close(c.elco[3][2], 0.75));
        assert!(close(c.elco[3][3], 1.0 / 6.0));
        for q in 1..=12 {
            assert_eq!(c.elco[q][1], 1.0);
            assert!(c.tesco[q][1] > 0.0);
        }
    }

    #[test]
    fn bdf_low_orders() {
        let c = MethodCoefficients::new(MethodFamily::Bdf);
        assert_eq!(&c.elco[1][..2], &[1.0, 1.0]);
        assert!(close(c.elco[2][0], 2.0 / 3.0));
        assert!(close(c.elco[2][2], 1.0 / 3.0));
        assert!(close(c.tesco[2][1], 4.5));
        assert!(close(c.tesco[1][0], 1.0));
        // l0 of BDF5 is 120/274.
        assert!(close(c.elco[5][0], 120.0 / 274.0));
    }

    #[test]
    fn error_constants() {
        let t = CoefficientTables::new();
        // Backward Euler: C = 1/2, trapezoidal: C = 1/12.
        assert!(close(t.cm2[1], 2.0));
        assert!(close(t.cm1[2], 6.0));
        assert!(t.cm1.iter().skip(1).all(|c| *c > 0.0));
    }
}
