//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use lsoda::prelude::*;
//! ```
//!
//! Re-exports included:
//! - Core traits and types: `ODE`, `Interpolate`, `SolOut`, `ControlFlag`, `Status`, `Tolerance`.
//! - The resumable integrator: `Lsoda`, `Settings`, `Task`, `MethodFamily`.
//! - High-level API: `solve_ivp`, `IVPOptions`, `IVPSolution`, `ContinuousOutput`.
//!

pub use crate::core::{
    interpolate::Interpolate,
    ode::ODE,
    solout::{ControlFlag, SolOut},
    stats::Stats,
    status::{CallState, Status},
    tolerance::Tolerance,
};
pub use crate::error::{Error, InputError};
pub use crate::matrix::Matrix;
pub use crate::methods::{
    lsoda::{ErrorNorm, Lsoda, MethodFamily, NordsieckSegment},
    settings::{Settings, Task},
};
pub use crate::solve::{solve_ivp, solve_ivp_with, ContinuousOutput, IVPOptions, IVPSolution};
