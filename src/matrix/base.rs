//! Dense column-major matrix.

use std::ops::{Index, IndexMut};

use crate::Float;

/// Dense `n x m` matrix stored column by column.
///
/// Entry `(i, j)` lives at `data[i + j * n]`, so every column is a contiguous
/// slice and the column-oriented BLAS-1 kernels in [`crate::matrix`] apply
/// directly to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub n: usize,
    pub m: usize,
    pub data: Vec<Float>,
}

impl Matrix {
    /// `n x m` matrix of zeros.
    pub fn zeros(n: usize, m: usize) -> Self {
        Self {
            n,
            m,
            data: vec![0.0; n * m],
        }
    }

    /// Builds a matrix from row slices; every row must have the same length.
    pub fn from_rows(rows: &[&[Float]]) -> Self {
        let n = rows.len();
        let m = rows.first().map_or(0, |r| r.len());
        let mut a = Self::zeros(n, m);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), m, "row {} has length {}, expected {}", i, row.len(), m);
            for (j, v) in row.iter().enumerate() {
                a[(i, j)] = *v;
            }
        }
        a
    }

    pub fn nrows(&self) -> usize {
        self.n
    }

    pub fn ncols(&self) -> usize {
        self.m
    }

    pub fn column(&self, j: usize) -> &[Float] {
        &self.data[j * self.n..(j + 1) * self.n]
    }

    pub fn column_mut(&mut self, j: usize) -> &mut [Float] {
        &mut self.data[j * self.n..(j + 1) * self.n]
    }

    pub fn fill(&mut self, value: Float) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// y = A x
    pub fn mul_vec(&self, x: &[Float], y: &mut [Float]) {
        assert_eq!(x.len(), self.m, "dimension mismatch in mul_vec");
        y.iter_mut().for_each(|v| *v = 0.0);
        for (j, xj) in x.iter().enumerate() {
            super::daxpy(*xj, self.column(j), y);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Float;

    fn index(&self, (i, j): (usize, usize)) -> &Float {
        &self.data[i + j * self.n]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Float {
        &mut self.data[i + j * self.n]
    }
}
