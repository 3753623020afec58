use std::hash::Hash;
use std::time::Instant;

use log::{debug, info, warn};
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::distance::{DistanceMetric, EuclideanDistance};
use crate::majority::majority_vote;
use crate::nearest::{KNearest, Neighbor};
use crate::preprocessing::{CanonicalImage, Image, MnistPreprocessor, Preprocessor};
use crate::{Error, Result};

const DEFAULT_K: usize = 3;

// Everything an `ImageClassifier` is built from.
// `workers` bounds the thread pool used to preprocess training images; `None`
// shares rayon's global pool.
#[derive(Debug, Clone)]
pub struct ClassifierConfig<D = EuclideanDistance, P = MnistPreprocessor> {
    pub k: usize,
    pub distance: D,
    pub preprocessor: P,
    pub workers: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            distance: EuclideanDistance,
            preprocessor: MnistPreprocessor::default(),
            workers: None,
        }
    }
}

impl<D, P> ClassifierConfig<D, P> {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_distance<D2>(self, distance: D2) -> ClassifierConfig<D2, P> {
        ClassifierConfig {
            k: self.k,
            distance,
            preprocessor: self.preprocessor,
            workers: self.workers,
        }
    }

    pub fn with_preprocessor<P2>(self, preprocessor: P2) -> ClassifierConfig<D, P2> {
        ClassifierConfig {
            k: self.k,
            distance: self.distance,
            preprocessor,
            workers: self.workers,
        }
    }
}

// Canonical training images with their labels, index for index
struct TrainingSet<L> {
    examples: Vec<CanonicalImage>,
    labels: Vec<L>,
}

// Brute-force k-nearest-neighbors classifier over preprocessed images.
// `fit` is the only operation that changes the classifier and it takes
// `&mut self`, so it can never overlap a `predict` or `evaluate` on the same
// instance. Any number of predictions can share a fitted classifier.
pub struct ImageClassifier<L, D = EuclideanDistance, P = MnistPreprocessor> {
    k: usize,
    distance: D,
    preprocessor: P,
    pool: Option<rayon::ThreadPool>,
    training: Option<TrainingSet<L>>,
}

impl<L> Default for ImageClassifier<L> {
    fn default() -> Self {
        let config = ClassifierConfig::default();
        Self {
            k: config.k,
            distance: config.distance,
            preprocessor: config.preprocessor,
            pool: None,
            training: None,
        }
    }
}

impl<L, D, P> ImageClassifier<L, D, P>
where
    L: Clone + Eq + Hash + Ord + Send + Sync,
    D: DistanceMetric,
    P: Preprocessor,
{
    pub fn new(config: ClassifierConfig<D, P>) -> Result<Self> {
        let pool = config
            .workers
            .map(|workers| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("knn-preprocess-{}", i))
                    .build()
            })
            .transpose()?;

        Ok(Self {
            k: config.k,
            distance: config.distance,
            preprocessor: config.preprocessor,
            pool,
            training: None,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    // k is validated against the training set on every prediction, not here
    pub fn set_k(&mut self, k: usize) {
        self.k = k;
    }

    pub fn is_fitted(&self) -> bool {
        self.training.is_some()
    }

    // Number of stored training examples (0 when unfitted)
    pub fn len(&self) -> usize {
        self.training.as_ref().map_or(0, |t| t.labels.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Preprocess and store a new training set, replacing any previous one.
    // On error the classifier is left exactly as it was.
    pub fn fit(&mut self, images: &[Image], labels: &[L]) -> Result<()> {
        if images.len() != labels.len() {
            return Err(Error::LengthMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }

        let now = Instant::now();
        let examples = self.in_pool(|| {
            images
                .par_iter()
                .map(|image| self.preprocessor.preprocess(image))
                // Indexed collect writes each result at its input position,
                // whatever order the workers finish in
                .collect::<Result<Vec<_>>>()
        })?;
        info!(
            "Preprocessed {} training images [{}ms]",
            examples.len(),
            now.elapsed().as_millis()
        );

        self.training = Some(TrainingSet {
            examples,
            labels: labels.to_vec(),
        });
        Ok(())
    }

    // The `k` training examples nearest to `image`, nearest first.
    pub fn neighbors(&self, image: &Image) -> Result<Vec<Neighbor>> {
        let training = self.training.as_ref().ok_or(Error::NotFitted)?;
        if self.k < 1 {
            return Err(Error::InvalidK(self.k));
        }
        if self.k > training.examples.len() {
            return Err(Error::KTooLarge {
                k: self.k,
                n_examples: training.examples.len(),
            });
        }

        let query = self.preprocessor.preprocess(image)?;
        self.scan(training, query.view())
    }

    // Full scan over the training set, keeping the k closest
    fn scan(&self, training: &TrainingSet<L>, query: ArrayView2<f32>) -> Result<Vec<Neighbor>> {
        let mut nearest = KNearest::new(self.k);
        for (index, example) in training.examples.iter().enumerate() {
            let distance = self.distance.distance(query, example.view())?;
            nearest.push(Neighbor { distance, index });
        }
        Ok(nearest.into_sorted_vec())
    }

    // Predict a label by majority vote among the `k` nearest training examples.
    // Among equally distant examples the one fitted earlier is taken; among
    // labels with equally many votes the smallest label wins.
    pub fn predict(&self, image: &Image) -> Result<L> {
        let neighbors = self.neighbors(image)?;
        let training = self.training.as_ref().ok_or(Error::NotFitted)?;

        let prediction = majority_vote(neighbors.iter().map(|n| &training.labels[n.index]))
            .ok_or(Error::InvalidK(self.k))?;
        debug!(
            "Predicted from {} neighbors, nearest at distance {:?}",
            neighbors.len(),
            neighbors.first().map(|n| n.distance)
        );
        Ok(prediction)
    }

    // Predict several images in parallel, results in input order
    pub fn predict_batch(&self, images: &[Image]) -> Vec<Result<L>> {
        self.in_pool(|| images.par_iter().map(|image| self.predict(image)).collect())
    }

    // Fraction of `test_images` predicted as their label in `test_labels`.
    // A failed prediction is logged and counted as wrong instead of aborting
    // the evaluation.
    pub fn evaluate(&self, test_images: &[Image], test_labels: &[L]) -> Result<f64> {
        if test_images.len() != test_labels.len() {
            return Err(Error::LengthMismatch {
                images: test_images.len(),
                labels: test_labels.len(),
            });
        }
        if test_images.is_empty() {
            return Err(Error::EmptyInput);
        }
        if !self.is_fitted() {
            return Err(Error::NotFitted);
        }

        let now = Instant::now();
        let mut correct = 0_usize;
        for (i, (image, label)) in test_images.iter().zip(test_labels).enumerate() {
            match self.predict(image) {
                Ok(predicted) if predicted == *label => correct += 1,
                Ok(_) => {}
                Err(err) => warn!(
                    "Prediction failed for test image {} ({}): {}",
                    i,
                    image.kind(),
                    err
                ),
            }
        }

        let accuracy = correct as f64 / test_images.len() as f64;
        info!(
            "Evaluated {} test images, accuracy {} [{}ms]",
            test_images.len(),
            accuracy,
            now.elapsed().as_millis()
        );
        Ok(accuracy)
    }

    fn in_pool<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
