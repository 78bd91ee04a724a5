//! k-nearest-neighbour classification over DTW distances.
//!
//! # Algorithm
//!
//! 1. Compute the DTW distance from the query to every stored example
//!    (exhaustive scan, no index).
//! 2. Sort ascending; equal distances keep library order.
//! 3. Take the `min(k, len)` nearest.
//! 4. Majority label wins. Ties go to the label with the smallest summed
//!    distance, then to the lexicographically smallest label.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::dataset::Dataset;
use super::traits::Classifier;
use crate::alignment::{Dtw, FrameMetric};
use crate::config::LfdConfig;
use crate::error::{LfdError, LfdResult};
use crate::trajectory::Trajectory;

/// A stored example ranked against a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub label: String,
    pub distance: f64,
    pub example_id: String,
}

/// Nearest-neighbour classifier that owns the example library.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    dataset: Dataset,
    k: usize,
    dtw: Dtw,
}

impl KnnClassifier {
    /// Build a classifier from a loaded library and the session configuration.
    pub fn new(dataset: Dataset, config: &LfdConfig) -> LfdResult<Self> {
        config.classifier.validate()?;
        let metric = FrameMetric::new(&config.metric)?;
        Ok(Self {
            dataset,
            k: config.classifier.k,
            dtw: Dtw::new(metric),
        })
    }

    /// Build a classifier with the default metric and the given `k`.
    pub fn with_k(dataset: Dataset, k: usize) -> LfdResult<Self> {
        let mut config = LfdConfig::default();
        config.classifier.k = k;
        Self::new(dataset, &config)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Neighbours that actually vote: `k`, or fewer when the library is small.
    pub fn effective_k(&self) -> usize {
        self.k.min(self.dataset.len())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Hand the (possibly grown) library back for persistence.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub fn dtw(&self) -> &Dtw {
        &self.dtw
    }

    /// Every stored example, nearest first.
    pub fn rank(&self, trajectory: &Trajectory) -> LfdResult<Vec<Neighbor>> {
        let mut scored: Vec<(OrderedFloat<f64>, Neighbor)> = Vec::with_capacity(self.dataset.len());
        for example in self.dataset.examples() {
            let distance = self.dtw.distance(trajectory, example)?;
            let neighbor = Neighbor {
                // Library entries are labeled on insertion.
                label: example.label().unwrap_or_default().to_string(),
                distance,
                example_id: example.id().to_string(),
            };
            scored.push((OrderedFloat(distance), neighbor));
        }

        // Stable: equal distances keep library order.
        scored.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(scored.into_iter().map(|(_, n)| n).collect())
    }

    /// Majority label among `neighbors`; `None` when the slice is empty.
    pub fn vote(neighbors: &[Neighbor]) -> Option<String> {
        let mut tally: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for n in neighbors {
            let entry = tally.entry(n.label.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += n.distance;
        }

        // BTreeMap iterates in label order, so `min_by` settles the final tie
        // on the smallest label.
        tally
            .into_iter()
            .min_by(|(_, (ca, da)), (_, (cb, db))| {
                cb.cmp(ca)
                    .then_with(|| OrderedFloat(*da).cmp(&OrderedFloat(*db)))
            })
            .map(|(label, _)| label.to_string())
    }
}

impl Classifier for KnnClassifier {
    fn guess_classification(&self, trajectory: &Trajectory, verbose: bool) -> LfdResult<String> {
        if self.dataset.is_empty() {
            return Err(LfdError::EmptyLibrary);
        }

        let ranked = self.rank(trajectory)?;
        let k = self.effective_k();
        if k < self.k {
            tracing::debug!(
                k = self.k,
                examples = self.dataset.len(),
                "Fewer examples than k; voting with all of them"
            );
        }

        for (rank, n) in ranked.iter().enumerate() {
            if verbose {
                tracing::info!(
                    rank,
                    label = %n.label,
                    distance = n.distance,
                    example = %n.example_id,
                    voting = rank < k,
                    "Neighbour"
                );
            } else {
                tracing::debug!(rank, label = %n.label, distance = n.distance, "Neighbour");
            }
        }

        let guess = Self::vote(&ranked[..k]).ok_or(LfdError::EmptyLibrary)?;
        tracing::debug!(guess = %guess, k, "Classified trajectory");
        Ok(guess)
    }

    fn update(&mut self, trajectory: Trajectory) -> LfdResult<()> {
        let label = trajectory.label().map(str::to_string);
        self.dataset.add(trajectory)?;
        tracing::info!(
            label = label.as_deref().unwrap_or_default(),
            examples = self.dataset.len(),
            "Added example to dataset"
        );
        Ok(())
    }
}
