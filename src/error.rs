use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Classifier contract violations
    #[error("got {images} images but {labels} labels")]
    LengthMismatch { images: usize, labels: usize },

    #[error("cannot evaluate on an empty test set")]
    EmptyInput,

    #[error("classifier has not been fitted, call fit() first")]
    NotFitted,

    #[error("k must be at least 1, got {0}")]
    InvalidK(usize),

    #[error("k = {k} exceeds the number of training examples ({n_examples})")]
    KTooLarge { k: usize, n_examples: usize },

    // Preprocessing failures
    #[error("unsupported image input: {0}")]
    TypeKind(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("image is corrupt or not a supported format")]
    Corrupt(#[source] image::ImageError),

    #[error("invalid image: {0}")]
    Invalid(String),

    // Distance computation
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    // Dataset loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("malformed dataset file: {0}")]
    Format(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
