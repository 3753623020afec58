use ndarray::{ArrayView2, Zip};

use super::{check_shapes, DistanceMetric};
use crate::Result;

// Sum of absolute element-wise differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanDistance;

impl DistanceMetric for ManhattanDistance {
    fn distance(&self, a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<f32> {
        check_shapes(&a, &b)?;
        Ok(Zip::from(&a)
            .and(&b)
            .fold(0.0, |sum, &x, &y| sum + (x - y).abs()))
    }
}
