use nalgebra::{DMatrix, DVector};

/// number of samples produced by linspace when the caller does not give one
pub const DEFAULT_LINSPACE_NUM: usize = 50;

/// start, stop and number of samples of one plot axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub start: f64,
    pub stop: f64,
    pub num: usize,
}

impl AxisBounds {
    pub fn new(start: f64, stop: f64, num: usize) -> Self {
        AxisBounds { start, stop, num }
    }
    pub fn samples(&self) -> DVector<f64> {
        linspace(self.start, self.stop, self.num)
    }
}

impl From<(f64, f64)> for AxisBounds {
    fn from((start, stop): (f64, f64)) -> Self {
        AxisBounds::new(start, stop, DEFAULT_LINSPACE_NUM)
    }
}

impl From<(f64, f64, usize)> for AxisBounds {
    fn from((start, stop, num): (f64, f64, usize)) -> Self {
        AxisBounds::new(start, stop, num)
    }
}

/// `num` evenly spaced samples from start to stop, both ends included
pub fn linspace(start: f64, stop: f64, num: usize) -> DVector<f64> {
    match num {
        0 => DVector::zeros(0),
        1 => DVector::from_element(1, start),
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            DVector::from_fn(num, |i, _| {
                if i == num - 1 {
                    stop
                } else {
                    start + step * i as f64
                }
            })
        }
    }
}

/// Cartesian product of two axes with "xy" indexing: row i follows y[i], column j follows x[j]
pub fn meshgrid(x: &DVector<f64>, y: &DVector<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let x_mesh = DMatrix::from_fn(y.len(), x.len(), |_, j| x[j]);
    let y_mesh = DMatrix::from_fn(y.len(), x.len(), |i, _| y[i]);
    (x_mesh, y_mesh)
}
