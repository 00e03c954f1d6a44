#![allow(non_snake_case)]
use RustedDETools::Utils::logger::{init_logger, level_from_str};
use RustedDETools::Utils::quiver_options::{Pivot, QuiverOptions};
use RustedDETools::numerical::IVP_bidirectional::{solve_de, solve_de_system};
use RustedDETools::numerical::ODE_integrators::{IVPConfig, Method};
use RustedDETools::numerical::direction_fields::{
    render_direction_field_png, render_slope_field_png,
};
use log::{error, info};
use nalgebra::{DMatrix, DVector};
use simplelog::LevelFilter;
use std::env;
use std::error::Error;
use std::path::Path;

/// dx/dt = x through (0, 1): the exponential, solved both ways from t0
fn exponential() -> Result<(), Box<dyn Error>> {
    let config = IVPConfig::default().with_tdelta(0.5);
    let sol = solve_de(|_t, x, _: &()| x, 0.0, 1.0, -1.0, 1.0, &config, &())?;
    for (t, x) in sol.t_values.iter().zip(sol.x_values.iter()) {
        println!("t = {:>5}, x = {:.6}, exp(t) = {:.6}", t, x, t.exp());
    }
    Ok(())
}

/// logistic equation with growth rate and capacity passed as parameters
fn logistic() -> Result<(), Box<dyn Error>> {
    let params = (1.5, 10.0);
    let config = IVPConfig::default().with_tdelta(0.05);
    let sol = solve_de(
        |_t, x, (r, k): &(f64, f64)| r * x * (1.0 - x / k),
        0.0,
        1.0,
        -3.0,
        5.0,
        &config,
        &params,
    )?;
    sol.save_csv(Path::new("logistic.csv"), "t", "x")?;
    sol.plot(Path::new("."), "t", "x")?;
    Ok(())
}

/// damped pendulum theta'' = -b theta' - sin(theta)
fn pendulum() -> Result<(), Box<dyn Error>> {
    let damping = 0.2;
    let f = |_t: f64, x: &DVector<f64>, b: &f64| {
        DVector::from_vec(vec![x[1], -b * x[1] - x[0].sin()])
    };
    let x0 = DVector::from_vec(vec![1.0, 0.0]);
    let config = IVPConfig::default()
        .with_tdelta(0.02)
        .with_method(Method::DOPRI);
    let values = vec!["theta".to_string(), "omega".to_string()];
    let sol = solve_de_system(f, 0.0, &x0, -5.0, 15.0, &config, &damping)?;
    sol.save_csv(Path::new("pendulum.csv"), "t", &values)?;
    sol.plot(Path::new("."), "t", &values)?;
    Ok(())
}

/// phase portrait of the damped pendulum
fn pendulum_field() -> Result<(), Box<dyn Error>> {
    let fsystem = |_t: f64, x: &DMatrix<f64>, y: &DMatrix<f64>, b: &f64| {
        (y.clone(), x.zip_map(y, |xi, yi| -b * yi - xi.sin()))
    };
    let options = QuiverOptions::new().color((31, 119, 180));
    render_direction_field_png(
        Path::new("pendulum_field.png"),
        "damped pendulum",
        fsystem,
        (-6.0, 6.0, 25),
        (-3.0, 3.0, 25),
        0.0,
        &0.2,
        &options,
    )?;
    Ok(())
}

/// slope field of dy/dx = x - y, style read from a text document
fn slopes() -> Result<(), Box<dyn Error>> {
    let options: QuiverOptions = "color: black, line_width: 1".parse()?;
    render_slope_field_png(
        Path::new("slope_field.png"),
        "dy/dx = x - y",
        |x, y, _: &()| x - y,
        (-3.0, 3.0, 21),
        (-3.0, 3.0, 21),
        &(),
        &options.pivot(Pivot::Middle),
    )?;
    Ok(())
}

/// usage: RustedDETools [example number] [log level]
fn main() {
    let mut cli = env::args().skip(1);
    let example: usize = cli.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let level = cli
        .next()
        .and_then(|s| level_from_str(&s))
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = init_logger(level, None) {
        eprintln!("logger not initialized: {}", e);
    }
    info!("running example {}", example);

    let res = match example {
        0 => exponential(),
        1 => logistic(),
        2 => pendulum(),
        3 => pendulum_field(),
        4 => slopes(),
        _ => {
            println!("example not found");
            Ok(())
        }
    };
    if let Err(e) = res {
        error!("example {} failed: {}", example, e);
    }
}
