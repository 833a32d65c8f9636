//! Matrix types, operations, and utilities.

mod base;
mod blas;
mod linear;

pub use base::Matrix;
pub use blas::{daxpy, dscal, idamax};
pub use linear::SingularPivot;
