pub mod classifier;
pub mod distance;
pub mod error;
pub mod majority;
pub mod mnist;
pub mod nearest;
pub mod preprocessing;

pub use classifier::{ClassifierConfig, ImageClassifier};
pub use distance::{CosineDistance, DistanceMetric, EuclideanDistance, ManhattanDistance};
pub use error::{Error, Result};
pub use nearest::Neighbor;
pub use preprocessing::{CanonicalImage, Image, MnistPreprocessor, Preprocessor};
