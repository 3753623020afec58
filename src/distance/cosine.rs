use ndarray::{ArrayView2, Zip};

use super::{check_shapes, DistanceMetric};
use crate::Result;

// One minus the cosine of the angle between the two images taken as vectors.
// Two blank images are at distance 0; a blank image against anything else is at
// distance 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl DistanceMetric for CosineDistance {
    fn distance(&self, a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<f32> {
        check_shapes(&a, &b)?;
        let (dot, a_norm, b_norm) = Zip::from(&a)
            .and(&b)
            .fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, aa, bb), &x, &y| {
                (dot + x * y, aa + x * x, bb + y * y)
            });

        if a_norm == 0.0 && b_norm == 0.0 {
            return Ok(0.0);
        }
        if a_norm == 0.0 || b_norm == 0.0 {
            return Ok(1.0);
        }
        let similarity = dot / (a_norm.sqrt() * b_norm.sqrt());
        // Rounding can push the similarity just past 1
        Ok((1.0 - similarity).clamp(0.0, 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_orthogonal_and_parallel() {
        let a = array![[1.0, 0.0], [0.0, 0.0]];
        let b = array![[0.0, 1.0], [0.0, 0.0]];
        let c = array![[3.0, 0.0], [0.0, 0.0]];
        assert_abs_diff_eq!(CosineDistance.distance(a.view(), b.view()).unwrap(), 1.0);
        assert_abs_diff_eq!(CosineDistance.distance(a.view(), c.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_blank_images() {
        let blank = Array2::<f32>::zeros((2, 2));
        let ones = Array2::<f32>::ones((2, 2));
        assert_eq!(CosineDistance.distance(blank.view(), blank.view()).unwrap(), 0.0);
        assert_eq!(CosineDistance.distance(blank.view(), ones.view()).unwrap(), 1.0);
        assert_eq!(CosineDistance.distance(ones.view(), blank.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_self_distance_is_near_zero() {
        let a = array![[0.3, 0.9], [0.1, 0.7]];
        assert_abs_diff_eq!(
            CosineDistance.distance(a.view(), a.view()).unwrap(),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f32>::zeros((2, 2));
        let b = Array2::<f32>::zeros((1, 4));
        assert!(matches!(
            CosineDistance.distance(a.view(), b.view()),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
