// Needed to write partial lines to the console
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use env_logger::Env;
// For drawing a random subset of the training set
use rand::{rngs::SmallRng, seq::index::sample, SeedableRng};

use knn_mnist::mnist::{load_mnist_csv, MnistDataset};
use knn_mnist::{
    ClassifierConfig, CosineDistance, DistanceMetric, EuclideanDistance, Image, ImageClassifier,
    ManhattanDistance,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Classify MNIST digits with a brute-force k-nearest-neighbors search"
)]
struct Args {
    #[arg(
        long,
        default_value = "data",
        help = "Directory holding the four MNIST IDX files (raw or .gz)",
    )]
    data_dir: PathBuf,

    #[arg(
        long,
        requires = "test_csv",
        help = "Label-first CSV file to train on instead of the IDX files",
    )]
    train_csv: Option<PathBuf>,

    #[arg(
        long,
        requires = "train_csv",
        help = "Label-first CSV file to test on instead of the IDX files",
    )]
    test_csv: Option<PathBuf>,

    #[arg(
        short,
        long,
        default_value_t = 3,
        help = "Number of neighbors that vote on each prediction",
    )]
    k: usize,

    #[arg(long, value_enum, default_value_t = Metric::Euclidean)]
    metric: Metric,

    #[arg(long, help = "Threads used to preprocess the training set (default: one per core)")]
    workers: Option<usize>,

    #[arg(long, default_value_t = 10_000, help = "Number of training examples to sample")]
    train_examples: usize,

    #[arg(long, default_value_t = 1_000, help = "Number of test examples to evaluate")]
    test_examples: usize,

    #[arg(long, default_value_t = 0, help = "Seed for sampling the training examples")]
    seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Metric {
    Euclidean,
    Manhattan,
    Cosine,
}

fn main() -> knn_mnist::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the dataset - raw images and labels, no preprocessing yet
    print!("Loading data... ");
    let _ = io::stdout().flush();
    let now = Instant::now();
    let (train_images, train_labels, test_images, test_labels) =
        match (&args.train_csv, &args.test_csv) {
            (Some(train), Some(test)) => {
                let (train_images, train_labels) = load_mnist_csv(train, usize::MAX)?;
                let (test_images, test_labels) = load_mnist_csv(test, args.test_examples)?;
                (train_images, train_labels, test_images, test_labels)
            }
            _ => {
                let dataset = MnistDataset::open(&args.data_dir)?;
                let (train_images, train_labels) = dataset.train_data();
                let (mut test_images, mut test_labels) = dataset.test_data();
                test_images.truncate(args.test_examples);
                test_labels.truncate(args.test_examples);
                (train_images, train_labels, test_images, test_labels)
            }
        };
    println!(
        "Loaded {} training and {} test examples [{}ms]",
        train_images.len(),
        test_images.len(),
        now.elapsed().as_millis()
    );

    // Brute force is linear in the training set, so only keep a random subset of it
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let amount = args.train_examples.min(train_images.len());
    let picked = sample(&mut rng, train_images.len(), amount);
    let train_images: Vec<Image> = picked.iter().map(|i| train_images[i].clone()).collect();
    let train_labels: Vec<u8> = picked.iter().map(|i| train_labels[i]).collect();

    let train = (train_images.as_slice(), train_labels.as_slice());
    let test = (test_images.as_slice(), test_labels.as_slice());
    match args.metric {
        Metric::Euclidean => run(&args, EuclideanDistance, train, test),
        Metric::Manhattan => run(&args, ManhattanDistance, train, test),
        Metric::Cosine => run(&args, CosineDistance, train, test),
    }
}

fn run<D: DistanceMetric>(
    args: &Args,
    distance: D,
    (train_images, train_labels): (&[Image], &[u8]),
    (test_images, test_labels): (&[Image], &[u8]),
) -> knn_mnist::Result<()> {
    let config = ClassifierConfig {
        workers: args.workers,
        ..ClassifierConfig::default().with_k(args.k).with_distance(distance)
    };
    let mut classifier = ImageClassifier::new(config)?;

    // Preprocess and store the training set
    print!("Fitting {} examples... ", train_images.len());
    let _ = io::stdout().flush();
    let now = Instant::now();
    classifier.fit(train_images, train_labels)?;
    println!("Done [{}ms]", now.elapsed().as_millis());

    // Classify the test data and compute accuracy
    print!("Testing {:?} k={} classifier... ", args.metric, args.k);
    let _ = io::stdout().flush();
    let now = Instant::now();
    let acc = classifier.evaluate(test_images, test_labels)?;
    println!("Done - Accuracy = {} [{}ms]", acc, now.elapsed().as_millis());
    Ok(())
}
