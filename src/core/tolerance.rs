//! Tolerance abstraction to allow scalar or vector tolerances

use std::ops::Index;

use crate::{error::InputError, Float};

/// Tolerance enum to allow scalar or vector tolerances
/// using [`Into`] trait for easy conversion from `Float`, `[Float; N]`, or `Vec<Float>`
/// users do not need to know or worry this simply allows both
/// `Float` and `[Float; N]` to be passed in as arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Tolerance {
    Scalar(Float),
    Vector(Vec<Float>),
}

impl Tolerance {
    /// Checks the tolerance against a state of dimension `n`.
    pub(crate) fn validate(&self, name: &'static str, n: usize) -> Result<(), InputError> {
        let values: &[Float] = match self {
            Tolerance::Scalar(v) => std::slice::from_ref(v),
            Tolerance::Vector(vs) => {
                if vs.len() != n {
                    return Err(InputError::ToleranceLength {
                        name,
                        expected: n,
                        got: vs.len(),
                    });
                }
                vs
            }
        };
        match values.iter().position(|v| !(*v >= 0.0)) {
            Some(index) => Err(InputError::NegativeTolerance {
                name,
                index,
                value: values[index],
            }),
            None => Ok(()),
        }
    }

    /// Largest component.
    pub(crate) fn max(&self) -> Float {
        match self {
            Tolerance::Scalar(v) => *v,
            Tolerance::Vector(vs) => vs.iter().copied().fold(0.0, Float::max),
        }
    }
}

impl From<Float> for Tolerance {
    fn from(val: Float) -> Self {
        Tolerance::Scalar(val)
    }
}

impl From<&[Float]> for Tolerance {
    fn from(val: &[Float]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl<const N: usize> From<[Float; N]> for Tolerance {
    fn from(val: [Float; N]) -> Self {
        Tolerance::Vector(val.to_vec())
    }
}

impl From<Vec<Float>> for Tolerance {
    fn from(val: Vec<Float>) -> Self {
        Tolerance::Vector(val)
    }
}

impl Index<usize> for Tolerance {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Tolerance::Scalar(v) => v,
            Tolerance::Vector(vs) => &vs[index],
        }
    }
}
