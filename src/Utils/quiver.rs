//! Quiver plots on a plotters chart: one shaft (and optionally a head) per point of a field grid.
use crate::Utils::quiver_options::*;
use crate::numerical::direction_fields::{FieldError, FieldGrid};
use log::debug;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

/// chart with f64 axes on which fields are drawn
pub type FieldChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// geometry of one drawn arrow in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct QuiverSegment {
    /// grid point the arrow belongs to
    pub base: (f64, f64),
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// tip, left barb, notch on the shaft, right barb
    pub head: Option<[(f64, f64); 4]>,
}

impl QuiverSegment {
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Handle to a drawn quiver plot: the sampled field, the resolved style and the arrow geometry
#[derive(Debug, Clone)]
pub struct Quiver {
    pub grid: FieldGrid,
    pub options: QuiverOptions,
    pub arrow_length: f64,
    pub segments: Vec<QuiverSegment>,
}

impl Quiver {
    /// number of arrows actually drawn (zero vectors are skipped)
    pub fn drawn_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_degenerate()).count()
    }
}

/// spacing of the grid along one direction of the mesh
fn spacing(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let d = (values[values.len() - 1] - values[0]).abs() / (values.len() - 1) as f64;
    if d > 0.0 { Some(d) } else { None }
}

/// arrow length used when the options do not set one
pub fn auto_arrow_length(grid: &FieldGrid) -> f64 {
    let (nrows, ncols) = grid.shape();
    let xs: Vec<f64> = (0..ncols).map(|j| grid.x[(0, j)]).collect();
    let ys: Vec<f64> = (0..nrows).map(|i| grid.y[(i, 0)]).collect();
    let d = match (spacing(&xs), spacing(&ys)) {
        (Some(dx), Some(dy)) => dx.min(dy),
        (Some(d), None) | (None, Some(d)) => d,
        (None, None) => 1.0,
    };
    DEFAULT_LENGTH_FRACTION * d
}

/// Arrow geometry for one grid point with direction (u, v)
pub fn arrow_geometry(
    base: (f64, f64),
    (u, v): (f64, f64),
    length: f64,
    options: &QuiverOptions,
) -> QuiverSegment {
    let (x, y) = base;
    let (dx, dy) = (u * length, v * length);
    let (start, end) = match options.pivot.unwrap_or(Pivot::Tail) {
        Pivot::Tail => ((x, y), (x + dx, y + dy)),
        Pivot::Middle => ((x - dx / 2.0, y - dy / 2.0), (x + dx / 2.0, y + dy / 2.0)),
        Pivot::Tip => ((x - dx, y - dy), (x, y)),
    };
    let head_width = options.head_width.unwrap_or(DEFAULT_HEAD_WIDTH);
    let head_length = options.head_length.unwrap_or(DEFAULT_HEAD_LENGTH);
    let head_axis_length = options.head_axis_length.unwrap_or(DEFAULT_HEAD_AXIS_LENGTH);
    let norm = (dx * dx + dy * dy).sqrt();
    let head = if head_width > 0.0 && head_length > 0.0 && norm > 0.0 {
        // unit vector along the arrow and its normal
        let (ex, ey) = (dx / norm, dy / norm);
        let (nx, ny) = (-ey, ex);
        let back = head_length * norm;
        let half_width = head_width * norm / 2.0;
        let axis = head_axis_length * norm;
        Some([
            end,
            (end.0 - ex * back + nx * half_width, end.1 - ey * back + ny * half_width),
            (end.0 - ex * axis, end.1 - ey * axis),
            (end.0 - ex * back - nx * half_width, end.1 - ey * back - ny * half_width),
        ])
    } else {
        None
    };
    QuiverSegment {
        base,
        start,
        end,
        head,
    }
}

/// Draw the (already normalised) field of `grid` as arrows on `chart`
pub fn draw_quiver<DB: DrawingBackend>(
    chart: &mut FieldChart<'_, DB>,
    grid: FieldGrid,
    options: &QuiverOptions,
) -> Result<Quiver, FieldError> {
    let length = options.length.unwrap_or_else(|| auto_arrow_length(&grid));
    let segments: Vec<QuiverSegment> = grid
        .iter()
        .map(|(x, y, u, v)| arrow_geometry((x, y), (u, v), length, options))
        .collect();

    let (r, g, b) = options.color.unwrap_or(DEFAULT_COLOR);
    let color = RGBColor(r, g, b);
    let shaft_style = color.stroke_width(options.line_width.unwrap_or(DEFAULT_LINE_WIDTH));
    chart.draw_series(
        segments
            .iter()
            .filter(|s| !s.is_degenerate())
            .map(|s| PathElement::new(vec![s.start, s.end], shaft_style)),
    )?;
    chart.draw_series(
        segments
            .iter()
            .filter_map(|s| s.head)
            .map(|head| Polygon::new(head.to_vec(), color.filled())),
    )?;
    debug!(
        "quiver: {} arrows of length {} on a {:?} grid",
        segments.len(),
        length,
        grid.shape()
    );
    Ok(Quiver {
        grid,
        options: options.clone(),
        arrow_length: length,
        segments,
    })
}
