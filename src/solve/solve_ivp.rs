//! SciPy-like solve_ivp entry point implementation

use crate::{
    core::{
        interpolate::PointInterpolant,
        ode::ODE,
        solout::{ControlFlag, SolOut},
        status::Status,
    },
    error::{Error, InputError},
    methods::{
        lsoda::Lsoda,
        settings::{Settings, Task},
    },
    Float,
};

use super::{
    cont::ContinuousOutput,
    options::IVPOptions,
    solout::{DefaultSolOut, NoSolOut},
    solution::IVPSolution,
};

/// Solve an initial value problem with SciPy-like options.
///
/// Integrates from `x0` to `xend` one step at a time without ever stepping
/// past `xend`, recording every step endpoint or the requested `t_eval`
/// samples.
pub fn solve_ivp<F>(
    f: &F,
    x0: Float,
    xend: Float,
    y0: &[Float],
    options: IVPOptions,
) -> Result<IVPSolution, Error>
where
    F: ODE,
{
    drive::<F, NoSolOut>(f, x0, xend, y0, options, None)
}

/// Like [`solve_ivp`], additionally calling `solout` once at `x0` and after
/// every accepted step. Returning [`ControlFlag::Interrupt`] stops the
/// integration with [`Status::Interrupted`].
pub fn solve_ivp_with<F, S>(
    f: &F,
    x0: Float,
    xend: Float,
    y0: &[Float],
    options: IVPOptions,
    solout: &mut S,
) -> Result<IVPSolution, Error>
where
    F: ODE,
    S: SolOut,
{
    drive(f, x0, xend, y0, options, Some(solout))
}

fn drive<F, S>(
    f: &F,
    x0: Float,
    xend: Float,
    y0: &[Float],
    options: IVPOptions,
    user: Option<&mut S>,
) -> Result<IVPSolution, Error>
where
    F: ODE,
    S: SolOut,
{
    let dir = if xend >= x0 { 1.0 } else { -1.0 };
    if let Some(te) = options.t_eval.as_deref() {
        validate_t_eval(te, x0, xend, dir)?;
    }

    let settings = Settings::builder()
        .task(Task::OneStepTcrit(xend))
        .maybe_h0(options.first_step)
        .maybe_hmax(options.max_step)
        .hmin(options.min_step.unwrap_or(0.0))
        .mxordn(options.max_order_adams.unwrap_or(12))
        .mxords(options.max_order_bdf.unwrap_or(5))
        .norm(options.norm)
        .build();
    let nmax = options.nmax.unwrap_or(100_000);
    let mut lsoda = Lsoda::new(options.rtol.clone(), options.atol.clone(), settings);

    let mut y = y0.to_vec();
    let mut t = x0;
    let mut out = DefaultSolOut::new(options.t_eval.as_deref(), options.save_step_endpoints, dir, user);
    let mut segments = Vec::new();
    let mut status = Status::Reached;

    if out.solout(x0, x0, &y, &PointInterpolant::new(y0)) == ControlFlag::Interrupt {
        status = Status::Interrupted;
    }

    while status != Status::Interrupted && (xend - t) * dir > 0.0 {
        if lsoda.stats().nst >= nmax {
            return Err(Error::ExcessFunctionEvaluations { t, mxstep: nmax });
        }
        let xold = t;
        lsoda.integrate(f, &mut y, &mut t, xend)?;
        let Some(seg) = lsoda.last_step() else {
            break;
        };
        if out.solout(xold, t, &y, &seg) == ControlFlag::Interrupt {
            status = Status::Interrupted;
        }
        if options.dense_output {
            segments.push(seg);
        }
    }

    let stats = lsoda.stats();
    let (t, y) = out.into_data();
    Ok(IVPSolution {
        t,
        y,
        nfev: stats.nfe,
        njev: stats.nje,
        nstep: stats.nst,
        status,
        method: lsoda.method(),
        stats,
        dense_output: options
            .dense_output
            .then(|| ContinuousOutput::from_segments(segments)),
    })
}

/// `t_eval` must be non-empty, inside the span and ordered along the direction.
fn validate_t_eval(te: &[Float], x0: Float, xend: Float, dir: Float) -> Result<(), InputError> {
    if te.is_empty() {
        return Err(InputError::InvalidTEval("t_eval is empty".into()));
    }
    let (lo, hi) = (x0.min(xend), x0.max(xend));
    if let Some(ti) = te.iter().find(|ti| !(**ti >= lo && **ti <= hi)) {
        return Err(InputError::InvalidTEval(format!(
            "{} is outside the integration span [{}, {}]",
            ti, lo, hi
        )));
    }
    if te.windows(2).any(|w| (w[1] - w[0]) * dir < 0.0) {
        return Err(InputError::InvalidTEval(
            "t_eval is not ordered along the integration direction".into(),
        ));
    }
    Ok(())
}
