use crate::Utils::mesh::AxisBounds;
use crate::Utils::quiver::FieldChart;
use crate::numerical::direction_fields::FieldError;
use log::info;
use nalgebra::{DMatrix, DVector};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// range of the data widened by 5% on each side, never empty
fn padded_range(min: f64, max: f64) -> std::ops::Range<f64> {
    let pad = if max > min { 0.05 * (max - min) } else { 1.0 };
    (min - pad)..(max + pad)
}

/// One png per component of the solution, saved as `<dir>/<value>.png`.
/// `x_result` holds one row per component and one column per sample.
pub fn plots(
    dir: &Path,
    arg: &str,
    values: &[String],
    t_result: &DVector<f64>,
    x_result: &DMatrix<f64>,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if values.len() != x_result.nrows() {
        return Err(format!(
            "{} names given for {} solution components",
            values.len(),
            x_result.nrows()
        )
        .into());
    }
    let x_min = t_result.min();
    let x_max = t_result.max();
    let mut files = Vec::with_capacity(x_result.nrows());
    for (row, varname) in values.iter().enumerate() {
        let y_row = x_result.row(row);
        let filename = dir.join(format!("{}.png", varname));
        {
            let root_area = BitMapBackend::new(&filename, (800, 600)).into_drawing_area();
            root_area.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root_area)
                .caption(varname.to_string(), ("sans-serif", 50))
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(30)
                .build_cartesian_2d(
                    padded_range(x_min, x_max),
                    padded_range(y_row.min(), y_row.max()),
                )?;

            chart.configure_mesh().x_desc(arg).y_desc(varname).draw()?;

            let series: Vec<(f64, f64)> = t_result
                .iter()
                .zip(y_row.iter())
                .map(|(&x, &y)| (x, y))
                .collect();
            chart
                .draw_series(LineSeries::new(series, &Palette99::pick(row)))?
                .label(format!(" {}", varname))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(row))
                });

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
            root_area.present()?;
        }
        info!("{} plotted to {}", varname, filename.display());
        files.push(filename);
    }
    Ok(files)
}

/// Fill the drawing area and build an axes-labelled chart spanning the field bounds
pub fn field_chart<'a, DB: DrawingBackend>(
    root_area: &'a DrawingArea<DB, Shift>,
    caption: &str,
    xbounds: &AxisBounds,
    ybounds: &AxisBounds,
) -> Result<FieldChart<'a, DB>, FieldError> {
    root_area.fill(&WHITE)?;
    let x_range = padded_range(xbounds.start.min(xbounds.stop), xbounds.start.max(xbounds.stop));
    let y_range = padded_range(ybounds.start.min(ybounds.stop), ybounds.start.max(ybounds.stop));
    let mut chart = ChartBuilder::on(root_area)
        .caption(caption, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(x_range, y_range)?;
    chart.configure_mesh().draw()?;
    Ok(chart)
}
