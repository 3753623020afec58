use array_init::array_init;
use ndarray::{ArrayView2, Zip};
use wide::f32x8;

use super::{check_shapes, DistanceMetric};
use crate::Result;

const LANES: usize = 8;

// Straight-line distance: the square root of the summed squared differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceMetric for EuclideanDistance {
    fn distance(&self, a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<f32> {
        check_shapes(&a, &b)?;
        let sum = match (a.as_slice(), b.as_slice()) {
            (Some(a), Some(b)) => squared_difference_sum(a, b),
            // Non-contiguous views (slices, transposes) take the element-wise path
            _ => Zip::from(&a)
                .and(&b)
                .fold(0.0, |sum, &x, &y| sum + (x - y) * (x - y)),
        };
        Ok(sum.sqrt())
    }
}

// Sum of (a[i] - b[i])^2 over two equal-length slices, eight lanes at a time
fn squared_difference_sum(a: &[f32], b: &[f32]) -> f32 {
    let mut a_blocks = a.chunks_exact(LANES);
    let mut b_blocks = b.chunks_exact(LANES);

    let mut acc = f32x8::default();
    for (x, y) in (&mut a_blocks).zip(&mut b_blocks) {
        let x: [f32; LANES] = array_init(|i| x[i]);
        let y: [f32; LANES] = array_init(|i| y[i]);
        let difference = f32x8::from(x) - f32x8::from(y);
        acc = acc + difference * difference;
    }

    let tail: f32 = a_blocks
        .remainder()
        .iter()
        .zip(b_blocks.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    acc.reduce_add() + tail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use ndarray::{s, Array2};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn random_image(rng: &mut SmallRng, rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_simple_fn((rows, cols), || rng.gen())
    }

    #[test]
    fn test_same_image_has_zero_distance() {
        let image = Array2::<f32>::ones((28, 28));
        assert_eq!(EuclideanDistance.distance(image.view(), image.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_known_distance() {
        let zeros = Array2::<f32>::zeros((2, 2));
        let ones = Array2::<f32>::ones((2, 2));
        assert_eq!(EuclideanDistance.distance(zeros.view(), ones.view()).unwrap(), 2.0);
    }

    #[test]
    fn test_symmetric() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            let a = random_image(&mut rng, 28, 28);
            let b = random_image(&mut rng, 28, 28);
            assert_eq!(
                EuclideanDistance.distance(a.view(), b.view()).unwrap(),
                EuclideanDistance.distance(b.view(), a.view()).unwrap()
            );
        }
    }

    #[test]
    fn test_simd_path_matches_scalar_path() {
        let mut rng = SmallRng::seed_from_u64(2);
        // 5 x 7 leaves a tail after the 8-wide blocks
        let a = random_image(&mut rng, 5, 7);
        let b = random_image(&mut rng, 5, 7);
        let expected: f32 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt();
        let simd = EuclideanDistance.distance(a.view(), b.view()).unwrap();
        // Reversed columns are not contiguous, so this goes through Zip
        let strided = EuclideanDistance
            .distance(a.slice(s![.., ..;-1]), b.slice(s![.., ..;-1]))
            .unwrap();
        assert_relative_eq!(simd, expected, max_relative = 1e-5);
        assert_relative_eq!(strided, expected, max_relative = 1e-5);
    }

    #[test]
    fn test_sliced_views() {
        let a = Array2::<f32>::zeros((4, 4));
        let b = Array2::<f32>::ones((4, 4));
        let distance = EuclideanDistance
            .distance(a.slice(s![..2, ..2]), b.slice(s![1..3, 1..3]))
            .unwrap();
        assert_eq!(distance, 2.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f32>::zeros((2, 2));
        let b = Array2::<f32>::zeros((2, 3));
        let c = Array2::<f32>::zeros((4, 1));
        for (x, y) in [(&a, &b), (&b, &a), (&a, &c)] {
            assert!(matches!(
                EuclideanDistance.distance(x.view(), y.view()),
                Err(Error::ShapeMismatch { .. })
            ));
        }
    }
}
