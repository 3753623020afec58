use std::path::Path;

use ndarray::Array2;

use crate::preprocessing::Image;
use crate::{Error, Result};

// Load MNIST images from a csv file.
// Returns a tuple of (images, labels)
// The expected format is:
// - No headers
// - One image per row
// - Each row starts with the class label 0-9
// - The rest of the row consists of the pixels of a square image (28x28 for MNIST)
// - The pixel values are represented as integers, 0-255
pub fn load_mnist_csv(path: impl AsRef<Path>, n_examples: usize) -> Result<(Vec<Image>, Vec<u8>)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    // Use the CSV crate
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    // Parse each row into an (image, label) pair, then split the pairs into two vectors
    let rows = reader
        .records()
        .take(n_examples)
        .enumerate()
        .map(|(row, result)| {
            let record = result?;
            let label = record
                .get(0)
                .and_then(|x| x.trim().parse::<u8>().ok())
                .ok_or_else(|| Error::Format(format!("row {}: missing or bad label", row)))?;
            let pixels = record
                .iter()
                .skip(1) // Skip the label
                .map(|x| {
                    x.trim()
                        .parse::<u8>()
                        .map(f32::from)
                        .map_err(|e| Error::Format(format!("row {}: bad pixel {:?}: {}", row, x, e)))
                })
                .collect::<Result<Vec<f32>>>()?;
            Ok((square_image(pixels, row)?, label))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(rows.into_iter().unzip())
}

fn square_image(pixels: Vec<f32>, row: usize) -> Result<Image> {
    let side = (pixels.len() as f64).sqrt().round() as usize;
    if side == 0 || side * side != pixels.len() {
        return Err(Error::Format(format!(
            "row {}: {} pixels do not form a square image",
            row,
            pixels.len()
        )));
    }
    Array2::from_shape_vec((side, side), pixels)
        .map(Image::from)
        .map_err(|e| Error::Format(e.to_string()))
}
