//! Numerical methods

pub mod lsoda;
pub mod settings;
