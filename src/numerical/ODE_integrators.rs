//! Integrators that sample the solution of y' = f(t, y) at a prescribed sequence of times.
//!
//! The time sequence may be increasing or decreasing: every solver steps in the direction of the
//! next requested time. The result has one row per requested time (first row is the initial state)
//! and one column per state component.
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Error types of the IVP machinery
#[derive(Debug, Clone, PartialEq)]
pub enum IVPError {
    /// time step must be finite and strictly positive
    InvalidStep(f64),
    /// bounds must satisfy tmin <= t0 <= tmax
    InvalidBounds { tmin: f64, t0: f64, tmax: f64 },
    /// right hand side returned a vector of wrong length
    DimensionMismatch { expected: usize, got: usize },
    StepSizeTooSmall { t: f64, h: f64 },
    TooManySteps { t: f64, max_steps: usize },
    NonFiniteState { t: f64 },
    EmptyTimeSequence,
    UnknownMethod(String),
}

impl fmt::Display for IVPError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IVPError::InvalidStep(h) => {
                write!(f, "time step must be finite and positive, got {}", h)
            }
            IVPError::InvalidBounds { tmin, t0, tmax } => write!(
                f,
                "time bounds must satisfy tmin <= t0 <= tmax, got tmin = {}, t0 = {}, tmax = {}",
                tmin, t0, tmax
            ),
            IVPError::DimensionMismatch { expected, got } => write!(
                f,
                "right hand side returned {} components, state has {}",
                got, expected
            ),
            IVPError::StepSizeTooSmall { t, h } => {
                write!(f, "step size {} became too small at t = {}", h, t)
            }
            IVPError::TooManySteps { t, max_steps } => write!(
                f,
                "maximum number of steps ({}) exceeded at t = {}",
                max_steps, t
            ),
            IVPError::NonFiniteState { t } => write!(f, "solution is not finite at t = {}", t),
            IVPError::EmptyTimeSequence => write!(f, "time sequence is empty"),
            IVPError::UnknownMethod(name) => write!(f, "unknown solver name: {}", name),
        }
    }
}

impl std::error::Error for IVPError {}

/// Integration methods available to the IVP helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// adaptive Dormand-Prince 5(4) pair with error control
    DOPRI,
    /// classical fixed step Runge-Kutta of order 4
    RK4,
    /// 4-step Adams-Bashforth started by RK4
    AB4,
}

impl FromStr for Method {
    type Err = IVPError;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "DOPRI" | "RK45" => Ok(Method::DOPRI),
            "RK4" => Ok(Method::RK4),
            "AB4" => Ok(Method::AB4),
            _ => Err(IVPError::UnknownMethod(name.to_string())),
        }
    }
}

/// Settings shared by the bidirectional solvers and the integrators
#[derive(Debug, Clone, PartialEq)]
pub struct IVPConfig {
    /// spacing of output samples
    pub tdelta: f64,
    pub method: Method,
    /// relative tolerance (DOPRI only)
    pub rtol: f64,
    /// absolute tolerance (DOPRI only)
    pub atol: f64,
    /// limit on the number of internal steps between two output times (DOPRI only)
    pub max_steps: usize,
    /// initial step of the adaptive method, estimated when None
    pub first_step: Option<f64>,
    /// number of internal steps per output interval (RK4 and AB4 only)
    pub substeps: usize,
}

impl Default for IVPConfig {
    fn default() -> Self {
        IVPConfig {
            tdelta: 0.01,
            method: Method::DOPRI,
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 100_000,
            first_step: None,
            substeps: 1,
        }
    }
}

impl IVPConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_tdelta(mut self, tdelta: f64) -> Self {
        self.tdelta = tdelta;
        self
    }
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
    pub fn with_first_step(mut self, first_step: f64) -> Self {
        self.first_step = Some(first_step);
        self
    }
    pub fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps.max(1);
        self
    }
}

/// evaluates the right hand side and checks the length of the returned vector
fn eval_rhs<F>(f: &F, t: f64, y: &DVector<f64>) -> Result<DVector<f64>, IVPError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let dydt = f(t, y);
    if dydt.len() != y.len() {
        return Err(IVPError::DimensionMismatch {
            expected: y.len(),
            got: dydt.len(),
        });
    }
    Ok(dydt)
}

fn is_finite(y: &DVector<f64>) -> bool {
    y.iter().all(|v| v.is_finite())
}

trait Solver {
    /// advance the internal state until t == t_target
    fn advance_to<F>(&mut self, f: &F, t_target: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>;
    fn state(&self) -> &DVector<f64>;
}

pub enum Solvers {
    DOPRI(DormandPrince),
    RK4(RungeKutta4),
    AB4(AdamsBashforth4),
}

impl Solvers {
    fn advance_to<F>(&mut self, f: &F, t_target: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        match self {
            Solvers::DOPRI(dopri) => dopri.advance_to(f, t_target),
            Solvers::RK4(rk4) => rk4.advance_to(f, t_target),
            Solvers::AB4(ab4) => ab4.advance_to(f, t_target),
        }
    }
    fn state(&self) -> &DVector<f64> {
        match self {
            Solvers::DOPRI(dopri) => dopri.state(),
            Solvers::RK4(rk4) => rk4.state(),
            Solvers::AB4(ab4) => ab4.state(),
        }
    }
}

/// Integrate y' = f(t, y) from (tvec[0], y0), returning the state at every time of `tvec`.
///
/// `tvec` must be monotonic, either direction is accepted. The result has `tvec.len()` rows and
/// `y0.len()` columns.
pub fn integrate<F>(
    f: &F,
    y0: &DVector<f64>,
    tvec: &[f64],
    config: &IVPConfig,
) -> Result<DMatrix<f64>, IVPError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let start = Instant::now();
    let (&t_start, rest) = tvec.split_first().ok_or(IVPError::EmptyTimeSequence)?;
    let f0 = eval_rhs(f, t_start, y0)?;
    let t_end = *tvec.last().unwrap_or(&t_start);

    let mut solver = match config.method {
        Method::DOPRI => Solvers::DOPRI(DormandPrince::new(t_start, y0.clone(), f0, t_end, config)),
        Method::RK4 => Solvers::RK4(RungeKutta4::new(t_start, y0.clone(), config.substeps)),
        Method::AB4 => Solvers::AB4(AdamsBashforth4::new(t_start, y0.clone(), f0, config.substeps)),
    };

    let mut rows: Vec<DVector<f64>> = Vec::with_capacity(tvec.len());
    rows.push(y0.clone());
    for &t in rest {
        solver.advance_to(f, t)?;
        rows.push(solver.state().clone());
    }
    let y_res = DMatrix::from_fn(rows.len(), y0.len(), |i, j| rows[i][j]);
    debug!(
        "{:?}: integrated {} samples from t = {} to t = {} in {} microseconds",
        config.method,
        tvec.len(),
        t_start,
        t_end,
        start.elapsed().as_micros()
    );
    Ok(y_res)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Dormand-Prince 5(4) Butcher tableau
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
// difference between 5th and 4th order weights
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

pub struct DormandPrince {
    pub t: f64,
    pub y: DVector<f64>,
    // derivative at (t, y), reused as the first stage (FSAL)
    f_current: DVector<f64>,
    h_abs: f64,
    rtol: f64,
    atol: f64,
    max_steps: usize,
    n_steps: usize,
    n_rejected: usize,
}

impl DormandPrince {
    pub fn new(
        t0: f64,
        y0: DVector<f64>,
        f0: DVector<f64>,
        t_end: f64,
        config: &IVPConfig,
    ) -> Self {
        let span = (t_end - t0).abs();
        let h_abs = match config.first_step {
            Some(h) => h.abs(),
            None => Self::initial_step(&y0, &f0, config.rtol, config.atol),
        };
        let h_abs = if span > 0.0 { h_abs.min(span) } else { h_abs };
        debug!("DOPRI initial step {}", h_abs);
        DormandPrince {
            t: t0,
            y: y0,
            f_current: f0,
            h_abs,
            rtol: config.rtol,
            atol: config.atol,
            max_steps: config.max_steps,
            n_steps: 0,
            n_rejected: 0,
        }
    }

    /// crude Hairer-Wanner estimate h = 0.01 * ||y0|| / ||f0||
    fn initial_step(y0: &DVector<f64>, f0: &DVector<f64>, rtol: f64, atol: f64) -> f64 {
        let scale = y0.map(|v| atol + rtol * v.abs());
        let d0 = rms_norm(y0, &scale);
        let d1 = rms_norm(f0, &scale);
        if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        }
    }

    /// one trial step of signed size h; returns (y_new, f_new, error norm)
    fn trial_step<F>(
        &self,
        f: &F,
        h: f64,
    ) -> Result<(DVector<f64>, DVector<f64>, f64), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
        k.push(self.f_current.clone());
        for i in 1..7 {
            let mut y_temp = self.y.clone();
            for j in 0..i {
                if A[i][j] != 0.0 {
                    y_temp += (h * A[i][j]) * &k[j];
                }
            }
            k.push(eval_rhs(f, self.t + C[i] * h, &y_temp)?);
        }
        // 7th stage is evaluated at the 5th order solution
        let mut y_new = self.y.clone();
        for j in 0..6 {
            if A[6][j] != 0.0 {
                y_new += (h * A[6][j]) * &k[j];
            }
        }
        let mut err = DVector::zeros(self.y.len());
        for (j, kj) in k.iter().enumerate() {
            if E[j] != 0.0 {
                err += (h * E[j]) * kj;
            }
        }
        let scale = self
            .y
            .zip_map(&y_new, |a, b| self.atol + self.rtol * a.abs().max(b.abs()));
        let err_norm = rms_norm(&err, &scale);
        let f_new = k.pop().unwrap_or_else(|| DVector::zeros(self.y.len()));
        Ok((y_new, f_new, err_norm))
    }
}

impl Solver for DormandPrince {
    fn advance_to<F>(&mut self, f: &F, t_target: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        let direction = (t_target - self.t).signum();
        // step budget is per output interval
        let mut interval_steps = 0;
        loop {
            let remaining = (t_target - self.t).abs();
            if remaining <= 1e-12 * t_target.abs().max(1.0) {
                self.t = t_target;
                return Ok(());
            }
            if interval_steps >= self.max_steps {
                return Err(IVPError::TooManySteps {
                    t: self.t,
                    max_steps: self.max_steps,
                });
            }
            let min_step = 10.0 * f64::EPSILON * self.t.abs().max(1.0);
            let last = self.h_abs >= remaining;
            let h = if last { remaining } else { self.h_abs };
            if h < min_step {
                return Err(IVPError::StepSizeTooSmall { t: self.t, h });
            }
            self.n_steps += 1;
            interval_steps += 1;

            let (y_new, f_new, err_norm) = self.trial_step(f, direction * h)?;
            let err_norm = if err_norm.is_finite() && is_finite(&y_new) {
                err_norm
            } else {
                f64::INFINITY
            };
            if err_norm <= 1.0 {
                let factor = if err_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err_norm.powf(-0.2)).min(MAX_FACTOR)
                };
                self.t = if last { t_target } else { self.t + direction * h };
                self.y = y_new;
                self.f_current = f_new;
                self.h_abs = if last {
                    self.h_abs.max(h * factor)
                } else {
                    h * factor
                };
            } else {
                self.n_rejected += 1;
                let factor = if err_norm.is_finite() {
                    (SAFETY * err_norm.powf(-0.2)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                self.h_abs = h * factor;
                if self.h_abs < min_step && !is_finite(&y_new) {
                    return Err(IVPError::NonFiniteState { t: self.t });
                }
            }
        }
    }
    fn state(&self) -> &DVector<f64> {
        &self.y
    }
}

impl Drop for DormandPrince {
    fn drop(&mut self) {
        if self.n_steps > 0 {
            info!(
                "DOPRI finished at t = {}: {} steps, {} rejected",
                self.t, self.n_steps, self.n_rejected
            );
        }
    }
}

fn rms_norm(x: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum: f64 = x
        .iter()
        .zip(scale.iter())
        .map(|(xi, si)| (xi / si).powi(2))
        .sum();
    (sum / x.len() as f64).sqrt()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////
/// single classical RK4 step of signed size h
fn rk4_step<F>(f: &F, t: f64, y: &DVector<f64>, h: f64) -> Result<DVector<f64>, IVPError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let k1 = h * eval_rhs(f, t, y)?;
    let k2 = h * eval_rhs(f, t + h / 2.0, &(y + &k1 / 2.0))?;
    let k3 = h * eval_rhs(f, t + h / 2.0, &(y + &k2 / 2.0))?;
    let k4 = h * eval_rhs(f, t + h, &(y + &k3))?;
    Ok(y + (&k1 + 2.0 * &k2 + 2.0 * &k3 + &k4) / 6.0)
}

pub struct RungeKutta4 {
    pub t: f64,
    pub y: DVector<f64>,
    substeps: usize,
}

impl RungeKutta4 {
    pub fn new(t0: f64, y0: DVector<f64>, substeps: usize) -> Self {
        RungeKutta4 {
            t: t0,
            y: y0,
            substeps: substeps.max(1),
        }
    }
}

impl Solver for RungeKutta4 {
    fn advance_to<F>(&mut self, f: &F, t_target: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        let h = (t_target - self.t) / self.substeps as f64;
        for i in 0..self.substeps {
            let t = self.t + i as f64 * h;
            self.y = rk4_step(f, t, &self.y, h)?;
        }
        self.t = t_target;
        if !is_finite(&self.y) {
            return Err(IVPError::NonFiniteState { t: self.t });
        }
        Ok(())
    }
    fn state(&self) -> &DVector<f64> {
        &self.y
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////
pub struct AdamsBashforth4 {
    pub t: f64,
    pub y: DVector<f64>,
    h: Option<f64>,
    // derivatives at the latest (up to 4) equally spaced points, newest last
    f_history: VecDeque<DVector<f64>>,
    substeps: usize,
}

impl AdamsBashforth4 {
    pub fn new(t0: f64, y0: DVector<f64>, f0: DVector<f64>, substeps: usize) -> Self {
        AdamsBashforth4 {
            t: t0,
            y: y0,
            h: None,
            f_history: VecDeque::from(vec![f0]),
            substeps: substeps.max(1),
        }
    }

    fn step<F>(&mut self, f: &F, h: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        if self.f_history.len() < 4 {
            self.y = rk4_step(f, self.t, &self.y, h)?;
        } else {
            let f_n = &self.f_history[3];
            let f_n1 = &self.f_history[2];
            let f_n2 = &self.f_history[1];
            let f_n3 = &self.f_history[0];
            self.y = &self.y
                + h * (55.0 / 24.0 * f_n - 59.0 / 24.0 * f_n1 + 37.0 / 24.0 * f_n2
                    - 9.0 / 24.0 * f_n3);
        }
        self.t += h;
        let f_current = eval_rhs(f, self.t, &self.y)?;
        if self.f_history.len() >= 4 {
            self.f_history.pop_front();
        }
        self.f_history.push_back(f_current);
        Ok(())
    }
}

impl Solver for AdamsBashforth4 {
    fn advance_to<F>(&mut self, f: &F, t_target: f64) -> Result<(), IVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        let h = (t_target - self.t) / self.substeps as f64;
        // history is only valid for equally spaced points
        let same_spacing = self
            .h
            .is_some_and(|h_old| (h_old - h).abs() <= 1e-12 * h.abs().max(1.0));
        if !same_spacing && self.f_history.len() > 1 {
            let f_current = eval_rhs(f, self.t, &self.y)?;
            self.f_history.clear();
            self.f_history.push_back(f_current);
        }
        self.h = Some(h);
        for _ in 0..self.substeps {
            self.step(f, h)?;
        }
        self.t = t_target;
        if !is_finite(&self.y) {
            return Err(IVPError::NonFiniteState { t: self.t });
        }
        Ok(())
    }
    fn state(&self) -> &DVector<f64> {
        &self.y
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//          TESTS
///////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests_ode_integrators {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(t0: f64, t1: f64, n: usize) -> Vec<f64> {
        (0..=n)
            .map(|i| t0 + (t1 - t0) * i as f64 / n as f64)
            .collect()
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("DOPRI".parse::<Method>().unwrap(), Method::DOPRI);
        assert_eq!("RK45".parse::<Method>().unwrap(), Method::DOPRI);
        assert_eq!("AB4".parse::<Method>().unwrap(), Method::AB4);
        assert_eq!(
            "Euler".parse::<Method>(),
            Err(IVPError::UnknownMethod("Euler".to_string()))
        );
    }

    #[test]
    fn test_dopri_exponential_growth() {
        // y' = y, y(0) = 1
        let f = |_t: f64, y: &DVector<f64>| y.clone();
        let tvec = grid(0.0, 1.0, 10);
        let y0 = DVector::from_vec(vec![1.0]);
        let res = integrate(&f, &y0, &tvec, &IVPConfig::default()).unwrap();
        assert_eq!(res.shape(), (11, 1));
        for (i, t) in tvec.iter().enumerate() {
            assert_relative_eq!(res[(i, 0)], t.exp(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_dopri_backward_direction() {
        // y' = -y integrated from t = 0 down to t = -2
        let f = |_t: f64, y: &DVector<f64>| -y;
        let tvec = grid(0.0, -2.0, 8);
        let y0 = DVector::from_vec(vec![1.0]);
        let res = integrate(&f, &y0, &tvec, &IVPConfig::default()).unwrap();
        for (i, t) in tvec.iter().enumerate() {
            assert_relative_eq!(res[(i, 0)], (-t).exp(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_dopri_harmonic_oscillator() {
        // y1' = y2, y2' = -y1
        let f = |_t: f64, y: &DVector<f64>| DVector::from_vec(vec![y[1], -y[0]]);
        let tvec = grid(0.0, std::f64::consts::PI, 20);
        let y0 = DVector::from_vec(vec![1.0, 0.0]);
        let res = integrate(&f, &y0, &tvec, &IVPConfig::default()).unwrap();
        assert_eq!(res.ncols(), 2);
        for (i, t) in tvec.iter().enumerate() {
            assert_relative_eq!(res[(i, 0)], t.cos(), epsilon = 1e-6);
            assert_relative_eq!(res[(i, 1)], -t.sin(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rk4_and_ab4_linear_system_2x2() {
        // y1' = -2*y1 + y2, y2' = y1 - 2*y2
        let f = |_t: f64, y: &DVector<f64>| {
            DVector::from_vec(vec![-2.0 * y[0] + y[1], y[0] - 2.0 * y[1]])
        };
        let y1_exact = |t: f64| 0.5 * f64::exp(-3.0 * t) * (f64::exp(2.0 * t) + 1.0);
        let y2_exact = |t: f64| 0.5 * f64::exp(-3.0 * t) * (-1.0 + f64::exp(2.0 * t));
        let tvec = grid(0.0, 1.0, 100);
        let y0 = DVector::from_vec(vec![1.0, 0.0]);
        for method in [Method::RK4, Method::AB4] {
            let config = IVPConfig::default().with_method(method);
            let res = integrate(&f, &y0, &tvec, &config).unwrap();
            for (i, t) in tvec.iter().enumerate() {
                assert_relative_eq!(res[(i, 0)], y1_exact(*t), epsilon = 1e-4);
                assert_relative_eq!(res[(i, 1)], y2_exact(*t), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_ab4_uneven_last_interval() {
        // history must be restarted when the output spacing changes
        let f = |_t: f64, y: &DVector<f64>| -y;
        let tvec = vec![0.0, 0.01, 0.02, 0.03, 0.04, 0.05, 0.055];
        let y0 = DVector::from_vec(vec![1.0]);
        let config = IVPConfig::default().with_method(Method::AB4);
        let res = integrate(&f, &y0, &tvec, &config).unwrap();
        assert_relative_eq!(res[(6, 0)], (-0.055f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_single_time_returns_initial_state() {
        let f = |_t: f64, y: &DVector<f64>| y.clone();
        let y0 = DVector::from_vec(vec![3.0, 4.0]);
        let res = integrate(&f, &y0, &[2.0], &IVPConfig::default()).unwrap();
        assert_eq!(res.shape(), (1, 2));
        assert_eq!(res[(0, 0)], 3.0);
        assert_eq!(res[(0, 1)], 4.0);
    }

    #[test]
    fn test_empty_time_sequence() {
        let f = |_t: f64, y: &DVector<f64>| y.clone();
        let y0 = DVector::from_vec(vec![1.0]);
        let err = integrate(&f, &y0, &[], &IVPConfig::default()).unwrap_err();
        assert_eq!(err, IVPError::EmptyTimeSequence);
    }

    #[test]
    fn test_dimension_mismatch() {
        let f = |_t: f64, _y: &DVector<f64>| DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y0 = DVector::from_vec(vec![1.0, 0.0]);
        let err = integrate(&f, &y0, &[0.0, 1.0], &IVPConfig::default()).unwrap_err();
        assert_eq!(
            err,
            IVPError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_blow_up_is_reported() {
        // y' = y^2, y(0) = 1 has a pole at t = 1
        let f = |_t: f64, y: &DVector<f64>| y.map(|v| v * v);
        let y0 = DVector::from_vec(vec![1.0]);
        let config = IVPConfig::default().with_max_steps(5_000);
        let res = integrate(&f, &y0, &[0.0, 2.0], &config);
        assert!(res.is_err());
    }

    #[test]
    fn test_non_finite_rhs_is_reported() {
        let f = |t: f64, y: &DVector<f64>| {
            if t > 0.0 { y.map(|_| f64::NAN) } else { y.clone() }
        };
        let y0 = DVector::from_vec(vec![1.0]);
        let err = integrate(&f, &y0, &[0.0, 1.0], &IVPConfig::default()).unwrap_err();
        assert_eq!(err, IVPError::NonFiniteState { t: 0.0 });
    }

    #[test]
    fn test_step_budget_is_per_output_interval() {
        // 500 outputs, each reachable in a handful of steps
        let f = |_t: f64, y: &DVector<f64>| -y;
        let tvec = grid(0.0, 50.0, 500);
        let y0 = DVector::from_vec(vec![1.0]);
        let config = IVPConfig::default().with_max_steps(40);
        let res = integrate(&f, &y0, &tvec, &config).unwrap();
        assert_relative_eq!(res[(500, 0)], (-50.0f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_too_many_steps() {
        let f = |_t: f64, y: &DVector<f64>| y.clone();
        let y0 = DVector::from_vec(vec![1.0]);
        let config = IVPConfig::default().with_max_steps(3).with_first_step(1e-3);
        let err = integrate(&f, &y0, &[0.0, 10.0], &config).unwrap_err();
        assert!(matches!(err, IVPError::TooManySteps { max_steps: 3, .. }));
    }
}
