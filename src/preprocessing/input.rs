use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::{Array2, ArrayD};

// A raw image as handed to the classifier, before preprocessing
#[derive(Debug, Clone)]
pub enum Image {
    // Already decoded bitmap
    Decoded(DynamicImage),
    // Encoded file contents (PNG, JPEG, BMP)
    Encoded(Vec<u8>),
    // Path to an encoded image on disk
    Path(PathBuf),
    // Raw intensities on the 0-255 scale, shaped (height, width) or (height, width, channels)
    Pixels(ArrayD<f32>),
}

impl Image {
    // Short name of the variant, used in log and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Image::Decoded(_) => "decoded image",
            Image::Encoded(_) => "encoded bytes",
            Image::Path(_) => "path",
            Image::Pixels(_) => "pixel array",
        }
    }
}

impl From<DynamicImage> for Image {
    fn from(image: DynamicImage) -> Self {
        Image::Decoded(image)
    }
}

impl From<PathBuf> for Image {
    fn from(path: PathBuf) -> Self {
        Image::Path(path)
    }
}

impl From<&Path> for Image {
    fn from(path: &Path) -> Self {
        Image::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Image {
    fn from(bytes: Vec<u8>) -> Self {
        Image::Encoded(bytes)
    }
}

impl From<ArrayD<f32>> for Image {
    fn from(pixels: ArrayD<f32>) -> Self {
        Image::Pixels(pixels)
    }
}

impl From<Array2<f32>> for Image {
    fn from(pixels: Array2<f32>) -> Self {
        Image::Pixels(pixels.into_dyn())
    }
}

impl From<Array2<u8>> for Image {
    fn from(pixels: Array2<u8>) -> Self {
        Image::Pixels(pixels.mapv(f32::from).into_dyn())
    }
}
