//! Direction fields of planar systems and slope fields of scalar first order equations.
//!
//! The field is sampled on a linspace x linspace mesh, every vector is scaled to unit length
//! (zero vectors stay zero) and the result is drawn as a quiver plot on a chart supplied by the
//! caller.
use crate::Utils::mesh::{AxisBounds, meshgrid};
use crate::Utils::plots::field_chart;
use crate::Utils::quiver::{FieldChart, Quiver, draw_quiver};
use crate::Utils::quiver_options::QuiverOptions;
use log::info;
use nalgebra::DMatrix;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fmt;
use std::path::Path;

/// Error types of field sampling and rendering
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// axis needs at least one sample and finite ends
    InvalidBounds(AxisBounds),
    /// field function returned components of a different shape than the mesh
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    Drawing(String),
    InvalidOption(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldError::InvalidBounds(b) => write!(
                f,
                "invalid axis bounds: start = {}, stop = {}, num = {}",
                b.start, b.stop, b.num
            ),
            FieldError::ShapeMismatch { expected, got } => write!(
                f,
                "field components have shape {:?}, mesh has shape {:?}",
                got, expected
            ),
            FieldError::Drawing(msg) => write!(f, "drawing error: {}", msg),
            FieldError::InvalidOption(msg) => write!(f, "invalid rendering option: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for FieldError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        FieldError::Drawing(e.to_string())
    }
}

/// Mesh coordinates with the field vector at every point. Row i follows y, column j follows x.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub u: DMatrix<f64>,
    pub v: DMatrix<f64>,
}

impl FieldGrid {
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }
    /// (x, y, u, v) for every grid point
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.u.iter().zip(self.v.iter()))
            .map(|((&x, &y), (&u, &v))| (x, y, u, v))
    }
}

/// Scale every vector (u, v) to unit length in place; zero vectors are left untouched
pub fn normalize_field(u: &mut DMatrix<f64>, v: &mut DMatrix<f64>) {
    for (ui, vi) in u.iter_mut().zip(v.iter_mut()) {
        let mut scale = (*ui * *ui + *vi * *vi).sqrt();
        if scale == 0.0 {
            scale = 1.0;
        }
        *ui /= scale;
        *vi /= scale;
    }
}

fn check_bounds(bounds: AxisBounds) -> Result<AxisBounds, FieldError> {
    if bounds.num == 0 || !bounds.start.is_finite() || !bounds.stop.is_finite() {
        return Err(FieldError::InvalidBounds(bounds));
    }
    Ok(bounds)
}

/// Sample `fsystem` once over the whole mesh at time `tvalue` and normalise the vectors
pub fn sample_direction_field<F, P>(
    fsystem: F,
    xbounds: impl Into<AxisBounds>,
    ybounds: impl Into<AxisBounds>,
    tvalue: f64,
    args: &P,
) -> Result<FieldGrid, FieldError>
where
    F: Fn(f64, &DMatrix<f64>, &DMatrix<f64>, &P) -> (DMatrix<f64>, DMatrix<f64>),
    P: ?Sized,
{
    let xvalues = check_bounds(xbounds.into())?.samples();
    let yvalues = check_bounds(ybounds.into())?.samples();
    let (x, y) = meshgrid(&xvalues, &yvalues);
    let (mut u, mut v) = fsystem(tvalue, &x, &y, args);
    for component in [&u, &v] {
        if component.shape() != x.shape() {
            return Err(FieldError::ShapeMismatch {
                expected: x.shape(),
                got: component.shape(),
            });
        }
    }
    normalize_field(&mut u, &mut v);
    Ok(FieldGrid { x, y, u, v })
}

/// Draw the direction field of (dx/dt, dy/dt) = fsystem(t, (x, y), args) at t = `tvalue`.
///
/// `fsystem` receives the whole x and y meshes and returns the u and v meshes of the same shape.
/// Arrows are normalised to unit direction; their drawn length and style come from `options`.
pub fn direction_field<DB, F, P>(
    chart: &mut FieldChart<'_, DB>,
    fsystem: F,
    xbounds: impl Into<AxisBounds>,
    ybounds: impl Into<AxisBounds>,
    tvalue: f64,
    args: &P,
    options: &QuiverOptions,
) -> Result<Quiver, FieldError>
where
    DB: DrawingBackend,
    F: Fn(f64, &DMatrix<f64>, &DMatrix<f64>, &P) -> (DMatrix<f64>, DMatrix<f64>),
    P: ?Sized,
{
    let grid = sample_direction_field(fsystem, xbounds, ybounds, tvalue, args)?;
    draw_quiver(chart, grid, options)
}

/// Draw the slope field of dy/dx = f(x, y, args) as centred segments without heads.
///
/// `options` override the slope defaults key by key.
pub fn slope_field<DB, F, P>(
    chart: &mut FieldChart<'_, DB>,
    f: F,
    xbounds: impl Into<AxisBounds>,
    ybounds: impl Into<AxisBounds>,
    args: &P,
    options: &QuiverOptions,
) -> Result<Quiver, FieldError>
where
    DB: DrawingBackend,
    F: Fn(f64, f64, &P) -> f64,
    P: ?Sized,
{
    let fsystem = |_t: f64, x: &DMatrix<f64>, y: &DMatrix<f64>, args: &P| {
        let u = DMatrix::from_element(x.nrows(), x.ncols(), 1.0);
        let v = x.zip_map(y, |xi, yi| f(xi, yi, args));
        (u, v)
    };
    let options = QuiverOptions::slope_defaults().merge(options);
    direction_field(chart, fsystem, xbounds, ybounds, 0.0, args, &options)
}

/// Direction field written to an 800x800 png with axes and caption
pub fn render_direction_field_png<F, P>(
    path: &Path,
    caption: &str,
    fsystem: F,
    xbounds: impl Into<AxisBounds>,
    ybounds: impl Into<AxisBounds>,
    tvalue: f64,
    args: &P,
    options: &QuiverOptions,
) -> Result<Quiver, FieldError>
where
    F: Fn(f64, &DMatrix<f64>, &DMatrix<f64>, &P) -> (DMatrix<f64>, DMatrix<f64>),
    P: ?Sized,
{
    let (xbounds, ybounds) = (xbounds.into(), ybounds.into());
    let root_area = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    let mut chart = field_chart(&root_area, caption, &xbounds, &ybounds)?;
    let quiver = direction_field(&mut chart, fsystem, xbounds, ybounds, tvalue, args, options)?;
    root_area.present()?;
    info!("direction field plotted to {}", path.display());
    Ok(quiver)
}

/// Slope field written to an 800x800 png with axes and caption
pub fn render_slope_field_png<F, P>(
    path: &Path,
    caption: &str,
    f: F,
    xbounds: impl Into<AxisBounds>,
    ybounds: impl Into<AxisBounds>,
    args: &P,
    options: &QuiverOptions,
) -> Result<Quiver, FieldError>
where
    F: Fn(f64, f64, &P) -> f64,
    P: ?Sized,
{
    let (xbounds, ybounds) = (xbounds.into(), ybounds.into());
    let root_area = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    let mut chart = field_chart(&root_area, caption, &xbounds, &ybounds)?;
    let quiver = slope_field(&mut chart, f, xbounds, ybounds, args, options)?;
    root_area.present()?;
    info!("slope field plotted to {}", path.display());
    Ok(quiver)
}

////////////////////////////////////////////////////////////////////////////////////////
//          TESTS
///////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests_direction_fields {
    use super::*;
    use crate::Utils::quiver_options::Pivot;
    use approx::assert_relative_eq;

    /// (x, y) -> (x, y): radial field vanishing at the origin
    fn radial(_t: f64, x: &DMatrix<f64>, y: &DMatrix<f64>, _: &()) -> (DMatrix<f64>, DMatrix<f64>) {
        (x.clone(), y.clone())
    }

    /// run `draw` on an in-memory svg chart spanning [-2, 2]^2, return its result and the svg text
    fn with_svg_chart<T>(
        draw: impl FnOnce(&mut FieldChart<'_, SVGBackend<'_>>) -> T,
    ) -> (T, String) {
        let mut svg = String::new();
        let result = {
            let root = SVGBackend::with_string(&mut svg, (400, 400)).into_drawing_area();
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(-2.0..2.0, -2.0..2.0)
                .unwrap();
            let result = draw(&mut chart);
            root.present().unwrap();
            result
        };
        (result, svg)
    }

    #[test]
    fn test_normalize_field() {
        let mut u = DMatrix::from_row_slice(1, 3, &[3.0, 0.0, -2.0]);
        let mut v = DMatrix::from_row_slice(1, 3, &[4.0, 0.0, 0.0]);
        normalize_field(&mut u, &mut v);
        assert_relative_eq!(u[(0, 0)], 0.6, epsilon = 1e-15);
        assert_relative_eq!(v[(0, 0)], 0.8, epsilon = 1e-15);
        assert_eq!((u[(0, 1)], v[(0, 1)]), (0.0, 0.0));
        assert_eq!((u[(0, 2)], v[(0, 2)]), (-1.0, 0.0));
    }

    #[test]
    fn test_sample_radial_field_3x3() {
        let grid =
            sample_direction_field(radial, (-1.0, 1.0, 3), (-1.0, 1.0, 3), 0.0, &()).unwrap();
        assert_eq!(grid.shape(), (3, 3));
        let mut zero_points = 0;
        for (x, y, u, v) in grid.iter() {
            let norm = (u * u + v * v).sqrt();
            if x == 0.0 && y == 0.0 {
                assert_eq!(norm, 0.0);
                zero_points += 1;
            } else {
                assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
                // radial field points away from the origin
                assert!(u * x + v * y > 0.0);
            }
        }
        assert_eq!(zero_points, 1);
    }

    #[test]
    fn test_sample_uses_time_and_args() {
        // (u, v) = (k * t, 0): direction flips with the sign of t
        let f = |t: f64, x: &DMatrix<f64>, _y: &DMatrix<f64>, k: &f64| {
            (x.map(|_| k * t), x.map(|_| 0.0))
        };
        let grid = sample_direction_field(f, (0.0, 1.0, 2), (0.0, 1.0, 2), -3.0, &2.0).unwrap();
        assert!(grid.u.iter().all(|&u| u == -1.0));
        assert!(grid.v.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_default_resolution_is_linspace_default() {
        let grid = sample_direction_field(radial, (-1.0, 1.0), (-1.0, 1.0, 7), 0.0, &()).unwrap();
        assert_eq!(grid.shape(), (7, crate::Utils::mesh::DEFAULT_LINSPACE_NUM));
    }

    #[test]
    fn test_shape_mismatch() {
        let f = |_t: f64, _x: &DMatrix<f64>, _y: &DMatrix<f64>, _: &()| {
            (DMatrix::zeros(1, 1), DMatrix::zeros(1, 1))
        };
        let err = sample_direction_field(f, (-1.0, 1.0, 3), (-1.0, 1.0, 4), 0.0, &()).unwrap_err();
        assert_eq!(
            err,
            FieldError::ShapeMismatch {
                expected: (4, 3),
                got: (1, 1)
            }
        );
    }

    #[test]
    fn test_invalid_bounds() {
        let err = sample_direction_field(radial, (-1.0, 1.0, 0), (-1.0, 1.0, 3), 0.0, &())
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidBounds(_)));
    }

    #[test]
    fn test_direction_field_draws_arrows() {
        let (quiver, svg) = with_svg_chart(|chart| {
            direction_field(
                chart,
                radial,
                (-1.0, 1.0, 3),
                (-1.0, 1.0, 3),
                0.0,
                &(),
                &QuiverOptions::default(),
            )
            .unwrap()
        });
        assert_eq!(quiver.segments.len(), 9);
        // zero vector at the origin is not drawn
        assert_eq!(quiver.drawn_count(), 8);
        assert_relative_eq!(quiver.arrow_length, 0.8, epsilon = 1e-12);
        assert_eq!(quiver.segments.iter().filter(|s| s.head.is_some()).count(), 8);
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_slope_field_zero_rhs_is_horizontal() {
        let (quiver, svg) = with_svg_chart(|chart| {
            slope_field(
                chart,
                |_x, _y, _: &()| 0.0,
                (-1.0, 1.0, 3),
                (-1.0, 1.0, 3),
                &(),
                &QuiverOptions::default(),
            )
            .unwrap()
        });
        assert_eq!(quiver.segments.len(), 9);
        assert_eq!(quiver.options.pivot, Some(Pivot::Middle));
        for s in &quiver.segments {
            assert!(s.head.is_none());
            assert_eq!(s.start.1, s.end.1);
            assert!(s.end.0 > s.start.0);
            // centred on the grid point
            assert_relative_eq!((s.start.0 + s.end.0) / 2.0, s.base.0, epsilon = 1e-12);
        }
        assert!(quiver.grid.v.iter().all(|&v| v == 0.0));
        assert!(quiver.grid.u.iter().all(|&u| u == 1.0));
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn test_slope_field_slopes_match_rhs() {
        // dy/dx = x: segment slope equals x at every grid point
        let (quiver, _) = with_svg_chart(|chart| {
            slope_field(
                chart,
                |x, _y, _: &()| x,
                (-1.0, 1.0, 5),
                (-1.0, 1.0, 5),
                &(),
                &QuiverOptions::default(),
            )
            .unwrap()
        });
        for s in &quiver.segments {
            let slope = (s.end.1 - s.start.1) / (s.end.0 - s.start.0);
            assert_relative_eq!(slope, s.base.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_slope_field_user_options_override_defaults() {
        let user = QuiverOptions::new().pivot(Pivot::Tail).color((255, 0, 0)).length(0.1);
        let (quiver, _) = with_svg_chart(|chart| {
            slope_field(chart, |_x, y, _: &()| y, (-1.0, 1.0, 3), (-1.0, 1.0, 3), &(), &user)
                .unwrap()
        });
        assert_eq!(quiver.options.pivot, Some(Pivot::Tail));
        assert_eq!(quiver.options.color, Some((255, 0, 0)));
        assert_eq!(quiver.options.head_width, Some(0.0));
        assert_eq!(quiver.arrow_length, 0.1);
        for s in &quiver.segments {
            assert_eq!(s.start, s.base);
        }
    }
}
