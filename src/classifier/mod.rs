//! Classification over the example library.
//!
//! 1. **Traits** ([`traits`]) -- the [`Classifier`] capability:
//!    `guess_classification` and `update`.
//! 2. **Dataset** ([`dataset`]) -- the [`Dataset`] of labeled examples with
//!    JSON persistence and hold-out splitting.
//! 3. **k-NN** ([`knn`]) -- [`KnnClassifier`], a majority vote over the `k`
//!    examples nearest under DTW.

pub mod dataset;
pub mod knn;
pub mod traits;

pub use dataset::Dataset;
pub use knn::{KnnClassifier, Neighbor};
pub use traits::Classifier;
