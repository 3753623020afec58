// This module contains all the MNIST-specific code in the project

mod idx;
pub use idx::{read_idx_images, read_idx_labels};

mod load_mnist;
pub use load_mnist::load_mnist_csv;

mod dataset;
pub use dataset::{MnistDataset, MnistSplit};
