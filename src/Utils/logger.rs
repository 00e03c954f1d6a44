use csv::Writer;
use log::info;
use nalgebra::{DMatrix, DVector};
use simplelog::*;
use std::fs::File;
use std::io;
use std::path::Path;

/// Initialize terminal logging and, when `log_file` is given, a copy of the log in that file.
/// A second call is a no-op: the global logger can only be set once.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> io::Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// log level by name: "off", "error", "warn", "info", "debug", "trace"
pub fn level_from_str(name: &str) -> Option<LevelFilter> {
    match name.to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Write a sampled solution as csv: first column is the argument, then one column per component.
/// `x_result` holds one row per component and one column per sample.
pub fn save_trajectory_to_csv(
    path: &Path,
    arg: &str,
    values: &[String],
    t_result: &DVector<f64>,
    x_result: &DMatrix<f64>,
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut headers = Vec::with_capacity(values.len() + 1);
    headers.push(arg.to_string());
    headers.extend(values.iter().cloned());
    writer.write_record(&headers)?;

    for (i, t) in t_result.iter().enumerate() {
        let mut row_data = Vec::with_capacity(x_result.nrows() + 1);
        row_data.push(t.to_string());
        row_data.extend(x_result.column(i).iter().map(|val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    info!("result saved to {}", path.display());
    Ok(())
}
