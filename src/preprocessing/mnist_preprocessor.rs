use std::borrow::Cow;
use std::io;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, ImageError, RgbImage, RgbaImage};
use log::debug;
use ndarray::{Array2, ArrayD};

use super::{CanonicalImage, Image, Preprocessor};
use crate::{Error, Result};

// Side length of an MNIST digit
const MNIST_SIDE: u32 = 28;

// Grayscale, resize, and scale to [0, 1], producing MNIST-shaped arrays by default.
// The resampling filter changes the output values, so it is fixed per instance.
// `Lanczos3` is the default.
#[derive(Debug, Clone, Copy)]
pub struct MnistPreprocessor {
    target_width: u32,
    target_height: u32,
    filter: FilterType,
}

impl Default for MnistPreprocessor {
    fn default() -> Self {
        Self::new(MNIST_SIDE, MNIST_SIDE)
    }
}

impl MnistPreprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    // Shape of every array this preprocessor produces, as (rows, columns)
    pub fn target_shape(&self) -> (usize, usize) {
        (self.target_height as usize, self.target_width as usize)
    }
}

impl Preprocessor for MnistPreprocessor {
    fn preprocess(&self, image: &Image) -> Result<CanonicalImage> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(Error::Invalid(format!(
                "target size {}x{} has no pixels",
                self.target_width, self.target_height
            )));
        }

        let bitmap = materialize(image)?;
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(Error::Invalid(format!(
                "{} has zero width or height",
                image.kind()
            )));
        }

        let gray = bitmap.to_luma8();
        let resized = imageops::resize(&gray, self.target_width, self.target_height, self.filter);

        Array2::from_shape_vec(self.target_shape(), resized.into_raw())
            .map(|pixels| pixels.mapv(|value| f32::from(value) / 255.0))
            .map_err(|e| Error::Invalid(e.to_string()))
    }
}

// Get a decoded bitmap out of any input variant, borrowing when it already is one
fn materialize(image: &Image) -> Result<Cow<'_, DynamicImage>> {
    match image {
        Image::Decoded(bitmap) => Ok(Cow::Borrowed(bitmap)),
        Image::Encoded(bytes) => image::load_from_memory(bytes)
            .map(Cow::Owned)
            .map_err(decode_error),
        Image::Path(path) => open(path).map(Cow::Owned),
        Image::Pixels(pixels) => from_pixels(pixels).map(Cow::Owned),
    }
}

// Missing and unreadable paths (directories, no permission) are both NotFound;
// only failures after the bytes are read count as decode errors
fn open(path: &Path) -> Result<DynamicImage> {
    let unreadable = |e: io::Error| {
        debug!("Cannot read {}: {}", path.display(), e);
        Error::NotFound(path.to_path_buf())
    };
    // Sniff the format from the content so extension-less files still decode
    image::io::Reader::open(path)
        .map_err(unreadable)?
        .with_guessed_format()
        .map_err(unreadable)?
        .decode()
        .map_err(decode_error)
}

fn decode_error(err: ImageError) -> Error {
    match err {
        ImageError::Decoding(_) | ImageError::Unsupported(_) => Error::Corrupt(err),
        // Some decoders surface a truncated payload as an I/O error
        ImageError::IoError(ref e)
            if matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ) =>
        {
            Error::Corrupt(err)
        }
        other => Error::Invalid(other.to_string()),
    }
}

// Build a bitmap from raw intensities, rounding and clamping each value into 0-255
fn from_pixels(pixels: &ArrayD<f32>) -> Result<DynamicImage> {
    let (height, width, channels) = match *pixels.shape() {
        [height, width] => (height, width, 1),
        [height, width, channels @ (1 | 3 | 4)] => (height, width, channels),
        ref shape => {
            return Err(Error::TypeKind(format!(
                "expected a (height, width) or (height, width, 1|3|4) pixel array, got shape {:?}",
                shape
            )))
        }
    };
    let width = u32::try_from(width).map_err(|e| Error::Invalid(e.to_string()))?;
    let height = u32::try_from(height).map_err(|e| Error::Invalid(e.to_string()))?;

    // Logical iteration order is row-major whatever the memory layout
    let raw: Vec<u8> = pixels
        .iter()
        .map(|&value| value.round().clamp(0.0, 255.0) as u8)
        .collect();

    let bitmap = match channels {
        1 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
    };
    bitmap.ok_or_else(|| {
        Error::Invalid(format!(
            "pixel buffer does not fit a {}x{}x{} image",
            width, height, channels
        ))
    })
}
