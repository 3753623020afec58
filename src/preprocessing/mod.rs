// Turning raw images into the fixed-size arrays the classifier compares

use ndarray::Array2;

use crate::Result;

mod input;
pub use input::Image;

mod mnist_preprocessor;
pub use mnist_preprocessor::MnistPreprocessor;

// A preprocessed image: one grayscale channel, values in [0, 1].
pub type CanonicalImage = Array2<f32>;

// Maps any supported `Image` into a `CanonicalImage`.
// Implementations must be pure: the classifier calls `preprocess` from several
// threads at once while fitting, and every output of one instance must have the
// same shape.
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, image: &Image) -> Result<CanonicalImage>;
}
