//! Example library of labeled demonstrations.
//!
//! The [`Dataset`] exclusively owns its trajectories. Entries are appended
//! whole and never edited in place; the library grows by one example per
//! supervised correction and is written back to disk by the caller.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LfdError, LfdResult};
use crate::trajectory::Trajectory;

/// A flat collection of labeled example trajectories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecord")]
pub struct Dataset {
    examples: Vec<Trajectory>,
}

impl Dataset {
    /// Create an empty library.
    pub fn new() -> Self {
        Self {
            examples: Vec::new(),
        }
    }

    /// Build a library from already loaded examples; each must be labeled.
    pub fn from_examples(examples: Vec<Trajectory>) -> LfdResult<Self> {
        let mut dataset = Self::new();
        for example in examples {
            dataset.add(example)?;
        }
        Ok(dataset)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a labeled example. No deduplication, no size cap.
    pub fn add(&mut self, example: Trajectory) -> LfdResult<()> {
        if example.is_empty() {
            return Err(LfdError::EmptyTrajectory);
        }
        if example.label().is_none() {
            return Err(LfdError::UnlabeledExample {
                id: example.id().to_string(),
            });
        }
        self.examples.push(example);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn examples(&self) -> &[Trajectory] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of examples per label, in label order.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.examples.iter().filter_map(|t| t.label()) {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        self.label_counts().into_keys().collect()
    }

    /// Randomly split off `fraction` of the examples as a hold-out set.
    ///
    /// Returns `(train, holdout)`. The hold-out size is rounded to the nearest
    /// example; `fraction` must lie strictly between 0 and 1.
    pub fn split_holdout<R: Rng + ?Sized>(
        &self,
        fraction: f64,
        rng: &mut R,
    ) -> LfdResult<(Dataset, Dataset)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(LfdError::invalid_config(format!(
                "hold-out fraction must be in (0, 1); got {fraction}"
            )));
        }
        let mut shuffled = self.examples.clone();
        shuffled.shuffle(rng);

        let holdout_len = ((self.len() as f64) * fraction).round() as usize;
        let train = shuffled.split_off(holdout_len.min(shuffled.len()));
        Ok((Dataset { examples: train }, Dataset { examples: shuffled }))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the library to a JSON file at the given path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize dataset to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write dataset to {}", path.as_ref().display()))?;
        tracing::info!(
            path = %path.as_ref().display(),
            examples = self.len(),
            "Saved dataset"
        );
        Ok(())
    }

    /// Deserialize a library from a JSON file, validating every example.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read dataset from {}", path.as_ref().display())
        })?;
        let dataset: Self =
            serde_json::from_str(&data).context("Failed to deserialize dataset JSON")?;
        tracing::info!(
            path = %path.as_ref().display(),
            examples = dataset.len(),
            labels = dataset.label_counts().len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }
}

#[derive(Deserialize)]
struct DatasetRecord {
    #[serde(default)]
    examples: Vec<Trajectory>,
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = LfdError;

    fn try_from(record: DatasetRecord) -> LfdResult<Self> {
        Self::from_examples(record.examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{Frame, Point, Pose, Quaternion, NUM_JOINTS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn example(label: &str, x: f64) -> Trajectory {
        let frame = Frame::new(
            Pose::new(Point::new(x, 0.0, 0.0), Quaternion::IDENTITY),
            vec![0.0; NUM_JOINTS],
        );
        Trajectory::new(vec![frame]).unwrap().with_label(label)
    }

    #[test]
    fn test_add_and_count() {
        let mut dataset = Dataset::new();
        dataset.add(example("wave", 0.0)).unwrap();
        dataset.add(example("grab", 1.0)).unwrap();
        dataset.add(example("wave", 2.0)).unwrap();

        assert_eq!(dataset.len(), 3);
        let counts = dataset.label_counts();
        assert_eq!(counts["wave"], 2);
        assert_eq!(counts["grab"], 1);
        assert_eq!(dataset.labels(), vec!["grab".to_string(), "wave".to_string()]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let t = example("wave", 0.0);
        let mut dataset = Dataset::new();
        dataset.add(t.clone()).unwrap();
        dataset.add(t).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_unlabeled_rejected() {
        let frame = Frame::new(
            Pose::new(Point::ORIGIN, Quaternion::IDENTITY),
            vec![0.0; NUM_JOINTS],
        );
        let t = Trajectory::new(vec![frame]).unwrap();
        let mut dataset = Dataset::new();
        assert!(matches!(
            dataset.add(t),
            Err(LfdError::UnlabeledExample { .. })
        ));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_split_holdout() {
        let examples = (0..10).map(|i| example("wave", i as f64)).collect();
        let dataset = Dataset::from_examples(examples).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let (train, holdout) = dataset.split_holdout(0.3, &mut rng).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(holdout.len(), 3);

        assert!(dataset.split_holdout(0.0, &mut rng).is_err());
        assert!(dataset.split_holdout(1.0, &mut rng).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut dataset = Dataset::new();
        dataset.add(example("wave", 0.0)).unwrap();
        dataset.add(example("grab", 1.0)).unwrap();

        let tmp = std::env::temp_dir().join("lfd_actions_test_dataset.json");
        dataset.save_to_file(&tmp).unwrap();
        let loaded = Dataset::load_from_file(&tmp).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.examples()[1].label(), Some("grab"));
        assert_eq!(loaded.examples()[0].id(), dataset.examples()[0].id());
        std::fs::remove_file(tmp).ok();
    }

    #[test]
    fn test_load_rejects_unlabeled_examples() {
        let json = r#"{"examples": [{"frames": [{
            "position": {"x": 0.0, "y": 0.0, "z": 0.0},
            "orientation": {"w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0},
            "joint_angles": [0, 0, 0, 0, 0, 0, 0, 0]
        }]}]}"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }
}
