// Dissimilarity measures between canonical images

use ndarray::ArrayView2;

use crate::{Error, Result};

mod euclidean;
pub use euclidean::EuclideanDistance;

mod manhattan;
pub use manhattan::ManhattanDistance;

mod cosine;
pub use cosine::CosineDistance;

// A pairwise dissimilarity between two images of the same shape.
// Results must be non-negative and symmetric in their arguments. Mismatched
// shapes are an error rather than a partial result.
pub trait DistanceMetric: Send + Sync {
    fn distance(&self, a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<f32>;
}

// Every metric needs both arrays to line up element for element
fn check_shapes(a: &ArrayView2<f32>, b: &ArrayView2<f32>) -> Result<()> {
    if a.shape() == b.shape() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            left: a.shape().to_vec(),
            right: b.shape().to_vec(),
        })
    }
}
