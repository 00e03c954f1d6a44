//! Bidirectional solution of initial value problems.
//!
//! The problem is integrated twice from (t0, x0): forward over t0, t0 + tdelta, ... tmax and
//! backward over t0, t0 - tdelta, ... tmin. The backward segment is reversed, its copy of t0 is
//! dropped, and it is spliced in front of the forward one, so the result is a single trajectory on
//! [tmin, tmax] with strictly increasing time.
use crate::Utils::logger::save_trajectory_to_csv;
use crate::Utils::plots::plots;
use crate::numerical::ODE_integrators::{IVPConfig, IVPError, integrate};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Sampled solution of a scalar IVP
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub t_values: DVector<f64>,
    pub x_values: DVector<f64>,
    /// position of t0 in `t_values`
    pub t0_index: usize,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t_values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.t_values.is_empty()
    }
    pub fn value_at_t0(&self) -> f64 {
        self.x_values[self.t0_index]
    }
    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>) {
        (self.t_values, self.x_values)
    }
    pub fn save_csv(&self, path: &Path, arg: &str, value: &str) -> Result<(), csv::Error> {
        let x = DMatrix::from_row_slice(1, self.x_values.len(), self.x_values.as_slice());
        save_trajectory_to_csv(path, arg, &[value.to_string()], &self.t_values, &x)
    }
    /// png line plot `<dir>/<value>.png`
    pub fn plot(
        &self,
        dir: &Path,
        arg: &str,
        value: &str,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let x = DMatrix::from_row_slice(1, self.x_values.len(), self.x_values.as_slice());
        plots(dir, arg, &[value.to_string()], &self.t_values, &x)
    }
}

/// Sampled solution of a system: `x_values` has one row per component and one column per sample
#[derive(Debug, Clone, PartialEq)]
pub struct SystemTrajectory {
    pub t_values: DVector<f64>,
    pub x_values: DMatrix<f64>,
    pub t0_index: usize,
}

impl SystemTrajectory {
    pub fn len(&self) -> usize {
        self.t_values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.t_values.is_empty()
    }
    pub fn dim(&self) -> usize {
        self.x_values.nrows()
    }
    pub fn value_at_t0(&self) -> DVector<f64> {
        self.x_values.column(self.t0_index).into_owned()
    }
    /// time series of one state component
    pub fn component(&self, i: usize) -> DVector<f64> {
        self.x_values.row(i).transpose()
    }
    pub fn into_parts(self) -> (DVector<f64>, DMatrix<f64>) {
        (self.t_values, self.x_values)
    }
    pub fn save_csv(&self, path: &Path, arg: &str, values: &[String]) -> Result<(), csv::Error> {
        save_trajectory_to_csv(path, arg, values, &self.t_values, &self.x_values)
    }
    /// one png line plot per component, `<dir>/<value>.png`
    pub fn plot(
        &self,
        dir: &Path,
        arg: &str,
        values: &[String],
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        plots(dir, arg, values, &self.t_values, &self.x_values)
    }
}

/// Output times from t0 towards t_end (either direction) spaced by tdelta, both ends included.
///
/// When tdelta does not divide |t_end - t0| the last interval is shorter so that the grid still
/// ends exactly at t_end.
pub fn time_grid(t0: f64, t_end: f64, tdelta: f64) -> Result<Vec<f64>, IVPError> {
    if !tdelta.is_finite() || tdelta <= 0.0 {
        return Err(IVPError::InvalidStep(tdelta));
    }
    let span = t_end - t0;
    let direction = span.signum();
    let n_full = (span.abs() / tdelta + 1e-9).floor() as usize;
    let mut grid: Vec<f64> = (0..=n_full)
        .map(|k| t0 + direction * k as f64 * tdelta)
        .collect();
    let last = grid[grid.len() - 1];
    let gap = (t_end - last).abs();
    if gap > 1e-9 * tdelta {
        warn!(
            "tdelta = {} does not divide [{}, {}]: last interval is {}",
            tdelta, t0, t_end, gap
        );
        grid.push(t_end);
    } else if grid.len() > 1 {
        // remove rounding drift on the endpoint
        let n = grid.len();
        grid[n - 1] = t_end;
    }
    Ok(grid)
}

/// integrate both halves and splice them; returns times, states (one row per time) and t0 index
fn solve_bidirectional<F>(
    f: &F,
    t0: f64,
    x0: &DVector<f64>,
    tmin: f64,
    tmax: f64,
    config: &IVPConfig,
) -> Result<(DVector<f64>, DMatrix<f64>, usize), IVPError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    if !(tmin <= t0 && t0 <= tmax) {
        return Err(IVPError::InvalidBounds { tmin, t0, tmax });
    }
    let start = Instant::now();
    let tvecp = time_grid(t0, tmax, config.tdelta)?;
    let tvecn = time_grid(t0, tmin, config.tdelta)?;
    debug!(
        "forward grid: {} points, backward grid: {} points",
        tvecp.len(),
        tvecn.len()
    );

    let xsolp = integrate(f, x0, &tvecp, config)?;
    let xsoln = integrate(f, x0, &tvecn, config)?;

    let n_back = tvecn.len() - 1;
    let n_total = n_back + tvecp.len();
    let t_values = DVector::from_fn(n_total, |i, _| {
        if i < n_back {
            tvecn[n_back - i]
        } else {
            tvecp[i - n_back]
        }
    });
    let x_rows = DMatrix::from_fn(n_total, x0.len(), |i, j| {
        if i < n_back {
            xsoln[(n_back - i, j)]
        } else {
            xsolp[(i - n_back, j)]
        }
    });
    info!(
        "solved on [{}, {}] through t0 = {}: {} samples in {} milliseconds",
        tmin,
        tmax,
        t0,
        n_total,
        start.elapsed().as_millis()
    );
    Ok((t_values, x_rows, n_back))
}

/// Solve the scalar problem dx/dt = f(t, x, args), x(t0) = x0 on [tmin, tmax].
///
/// `args` is an arbitrary caller-defined value passed through to `f` on every evaluation.
/// ```
/// use RustedDETools::numerical::IVP_bidirectional::solve_de;
/// use RustedDETools::numerical::ODE_integrators::IVPConfig;
/// let config = IVPConfig::default().with_tdelta(0.5);
/// let sol = solve_de(|_t, x, _: &()| x, 0.0, 1.0, -1.0, 1.0, &config, &()).unwrap();
/// assert_eq!(sol.t_values.len(), 5);
/// assert!((sol.x_values[4] - 1f64.exp()).abs() < 1e-6);
/// ```
pub fn solve_de<F, P>(
    f: F,
    t0: f64,
    x0: f64,
    tmin: f64,
    tmax: f64,
    config: &IVPConfig,
    args: &P,
) -> Result<Trajectory, IVPError>
where
    F: Fn(f64, f64, &P) -> f64,
    P: ?Sized,
{
    let fsystem = |t: f64, x: &DVector<f64>| DVector::from_element(1, f(t, x[0], args));
    let init = DVector::from_element(1, x0);
    let (t_values, x_rows, t0_index) =
        solve_bidirectional(&fsystem, t0, &init, tmin, tmax, config)?;
    Ok(Trajectory {
        t_values,
        x_values: x_rows.column(0).into_owned(),
        t0_index,
    })
}

/// Solve the system dx/dt = f(t, x, args), x(t0) = x0 on [tmin, tmax].
///
/// The states are returned with one row per component and one column per time sample.
pub fn solve_de_system<F, P>(
    f: F,
    t0: f64,
    x0: &DVector<f64>,
    tmin: f64,
    tmax: f64,
    config: &IVPConfig,
    args: &P,
) -> Result<SystemTrajectory, IVPError>
where
    F: Fn(f64, &DVector<f64>, &P) -> DVector<f64>,
    P: ?Sized,
{
    let fsystem = |t: f64, x: &DVector<f64>| f(t, x, args);
    let (t_values, x_rows, t0_index) =
        solve_bidirectional(&fsystem, t0, x0, tmin, tmax, config)?;
    Ok(SystemTrajectory {
        t_values,
        x_values: x_rows.transpose(),
        t0_index,
    })
}
