use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info};
use ndarray::{Array1, Array3, Axis};

use super::{read_idx_images, read_idx_labels};
use crate::preprocessing::Image;
use crate::{Error, Result};

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

// One half of the dataset: `images[i]` is labeled `labels[i]`.
#[derive(Debug, Clone)]
pub struct MnistSplit {
    pub images: Array3<u8>,
    pub labels: Array1<u8>,
}

impl MnistSplit {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    // Raw pixel grids ready for the classifier, with their labels
    pub fn to_images(&self) -> (Vec<Image>, Vec<u8>) {
        let images = self
            .images
            .axis_iter(Axis(0))
            .map(|image| Image::from(image.to_owned()))
            .collect();
        (images, self.labels.to_vec())
    }
}

// The MNIST training and test sets, read from the four standard IDX files.
// Each file may be stored raw or gzip-compressed with a `.gz` suffix. Nothing is
// downloaded: the files must already be in the directory.
#[derive(Debug, Clone)]
pub struct MnistDataset {
    train: MnistSplit,
    test: MnistSplit,
}

impl MnistDataset {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let train = load_split(dir, TRAIN_IMAGES, TRAIN_LABELS)?;
        let test = load_split(dir, TEST_IMAGES, TEST_LABELS)?;
        info!(
            "Loaded MNIST from {}: {} training and {} test examples",
            dir.display(),
            train.len(),
            test.len()
        );
        Ok(Self { train, test })
    }

    pub fn train(&self) -> &MnistSplit {
        &self.train
    }

    pub fn test(&self) -> &MnistSplit {
        &self.test
    }

    pub fn train_data(&self) -> (Vec<Image>, Vec<u8>) {
        self.train.to_images()
    }

    pub fn test_data(&self) -> (Vec<Image>, Vec<u8>) {
        self.test.to_images()
    }
}

fn load_split(dir: &Path, images_name: &str, labels_name: &str) -> Result<MnistSplit> {
    let images = read_idx_images(open_idx(dir, images_name)?)?;
    let labels = read_idx_labels(open_idx(dir, labels_name)?)?;
    if images.len_of(Axis(0)) != labels.len() {
        return Err(Error::Format(format!(
            "{} holds {} images but {} holds {} labels",
            images_name,
            images.len_of(Axis(0)),
            labels_name,
            labels.len()
        )));
    }
    Ok(MnistSplit { images, labels })
}

// Open `name` or, failing that, `name.gz`
fn open_idx(dir: &Path, name: &str) -> Result<Box<dyn Read>> {
    let raw = dir.join(name);
    if raw.is_file() {
        debug!("Reading {}", raw.display());
        return Ok(Box::new(BufReader::new(File::open(raw)?)));
    }

    let compressed = dir.join(format!("{}.gz", name));
    if compressed.is_file() {
        debug!("Reading {}", compressed.display());
        let file = BufReader::new(File::open(compressed)?);
        return Ok(Box::new(GzDecoder::new(file)));
    }

    Err(Error::NotFound(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnist::idx::tests::{idx_images, idx_labels};
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn write_gz(path: &Path, bytes: &[u8]) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_open_mixed_raw_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let train = idx_images(&[[0, 0, 0, 0], [255, 255, 255, 255], [9, 9, 9, 9]]);
        write_gz(&dir.path().join("train-images-idx3-ubyte.gz"), &train);
        write_gz(&dir.path().join("train-labels-idx1-ubyte.gz"), &idx_labels(&[0, 1, 0]));
        std::fs::write(dir.path().join(TEST_IMAGES), idx_images(&[[1, 2, 3, 4]])).unwrap();
        std::fs::write(dir.path().join(TEST_LABELS), idx_labels(&[5])).unwrap();

        let dataset = MnistDataset::open(dir.path()).unwrap();
        assert_eq!(dataset.train().len(), 3);
        assert_eq!(dataset.test().len(), 1);

        let (images, labels) = dataset.train_data();
        assert_eq!(labels, vec![0, 1, 0]);
        match &images[1] {
            Image::Pixels(pixels) => {
                assert_eq!(pixels.shape(), &[2, 2]);
                assert!(pixels.iter().all(|&v| v == 255.0));
            }
            other => panic!("expected pixels, got {}", other.kind()),
        }

        let (images, labels) = dataset.test_data();
        assert_eq!(images.len(), 1);
        assert_eq!(labels, vec![5]);
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        match MnistDataset::open(dir.path()) {
            Err(Error::NotFound(path)) => assert!(path.ends_with(TRAIN_IMAGES)),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }

        assert!(matches!(
            MnistDataset::open("/this/directory/does/not/exist"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TRAIN_IMAGES), idx_images(&[[1, 2, 3, 4]])).unwrap();
        std::fs::write(dir.path().join(TRAIN_LABELS), idx_labels(&[1, 2])).unwrap();
        assert!(matches!(
            MnistDataset::open(dir.path()),
            Err(Error::Format(_))
        ));
    }
}
