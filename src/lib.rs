//! LSODA: an adaptive-order, adaptive-step integrator for systems of ordinary
//! differential equations that switches automatically between the non-stiff
//! Adams family and the stiff BDF family.
//!
//! The low-level entry point is [`Lsoda`], a resumable integrator that is
//! advanced to successive output times. [`solve_ivp`] wraps it in a SciPy-like
//! API with sampled and continuous output.

mod error;

pub mod core;
pub mod matrix;
pub mod methods;
pub mod prelude;
pub mod solve;

pub use crate::core::{
    interpolate::Interpolate,
    ode::ODE,
    solout::{ControlFlag, SolOut},
    stats::Stats,
    status::{CallState, Status},
    tolerance::Tolerance,
};
pub use error::{Error, InputError};
pub use methods::{
    lsoda::{ErrorNorm, Lsoda, MethodFamily, NordsieckSegment},
    settings::{Settings, Task},
};
pub use solve::{solve_ivp, solve_ivp_with, ContinuousOutput, IVPOptions, IVPSolution};

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

/// Change this to f128, f64, f32 as desired.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
