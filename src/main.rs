//! lfd: classify recorded arm demonstrations against a labeled library.
//!
//! Provides subcommands:
//!
//! - `classify` -- Guess the label of recorded trajectories; with
//!   `--supervise`, confirm or correct the guess and grow the library
//! - `evaluate` -- Measure accuracy on a labeled test file or a random hold-out
//! - `inspect`  -- Summarise a saved dataset

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lfd_actions::classifier::{Classifier, Dataset, KnnClassifier};
use lfd_actions::config::LfdConfig;
use lfd_actions::trajectory::Trajectory;
use lfd_actions::LfdError;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// lfd: gesture recognition by DTW nearest-neighbour search
#[derive(Parser)]
#[command(name = "lfd", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess the label of one or more recorded trajectories.
    Classify {
        /// The dataset file.
        #[arg(short, long)]
        dataset: PathBuf,

        /// Recorded trajectory file (a single trajectory or an array).
        #[arg(short, long)]
        input: PathBuf,

        /// The number of nearest neighbours (overrides the config file).
        #[arg(short)]
        k: Option<usize>,

        /// Log every neighbour's distance.
        #[arg(short, long)]
        verbose: bool,

        /// Confirm each guess and add the labeled trajectory to the dataset.
        #[arg(short, long)]
        supervise: bool,

        /// Label to assign in supervised mode instead of prompting.
        #[arg(long, requires = "supervise")]
        label: Option<String>,
    },

    /// Measure classification accuracy.
    Evaluate {
        /// The dataset file.
        #[arg(short, long)]
        dataset: PathBuf,

        /// Labeled test file; when omitted a hold-out split of the dataset is used.
        #[arg(short, long)]
        test: Option<PathBuf>,

        /// Fraction of the dataset held out when no test file is given.
        #[arg(long, default_value_t = 0.2)]
        holdout: f64,

        /// The number of nearest neighbours (overrides the config file).
        #[arg(short)]
        k: Option<usize>,

        /// Log every neighbour's distance.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Inspect a saved dataset.
    Inspect {
        /// Path to the dataset JSON file.
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<LfdConfig>(&text)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        }
        None => LfdConfig::default(),
    };

    match cli.command {
        Commands::Classify {
            dataset,
            input,
            k,
            verbose,
            supervise,
            label,
        } => cmd_classify(
            with_k(config, k)?,
            &dataset,
            &input,
            verbose,
            supervise,
            label,
        ),
        Commands::Evaluate {
            dataset,
            test,
            holdout,
            k,
            verbose,
        } => cmd_evaluate(with_k(config, k)?, &dataset, test.as_deref(), holdout, verbose),
        Commands::Inspect { path } => cmd_inspect(&path),
    }
}

fn with_k(mut config: LfdConfig, k: Option<usize>) -> Result<LfdConfig> {
    if let Some(k) = k {
        config.classifier.k = k;
    }
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_classify(
    config: LfdConfig,
    dataset_path: &Path,
    input: &Path,
    verbose: bool,
    supervise: bool,
    label: Option<String>,
) -> Result<()> {
    tracing::info!(
        dataset = %dataset_path.display(),
        k = config.classifier.k,
        supervised = supervise,
        "Starting classification"
    );

    let dataset = if dataset_path.exists() {
        Dataset::load_from_file(dataset_path)?
    } else if supervise {
        tracing::warn!(path = %dataset_path.display(), "Dataset not found, starting empty");
        Dataset::new()
    } else {
        bail!("Dataset file {} does not exist", dataset_path.display());
    };

    let trajectories = load_trajectories(input)?;
    let mut classifier = KnnClassifier::new(dataset, &config)?;

    for trajectory in trajectories {
        let guess = match classifier.guess_classification(&trajectory, verbose) {
            Ok(guess) => {
                tracing::info!(guess = %guess, frames = trajectory.len(), "Action guess");
                println!("Action guess: {guess}");
                Some(guess)
            }
            Err(LfdError::EmptyLibrary) if supervise => {
                tracing::warn!("Dataset is empty, no guess available");
                None
            }
            Err(e) => return Err(e.into()),
        };

        if supervise {
            let confirmed = match &label {
                Some(label) => label.clone(),
                None => confirm_guess(guess.as_deref())?,
            };
            classifier.update(trajectory.with_label(confirmed))?;
        }
    }

    if supervise {
        if let Some(parent) = dataset_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        classifier.into_dataset().save_to_file(dataset_path)?;
    }

    Ok(())
}

fn cmd_evaluate(
    config: LfdConfig,
    dataset_path: &Path,
    test_path: Option<&Path>,
    holdout: f64,
    verbose: bool,
) -> Result<()> {
    let dataset = Dataset::load_from_file(dataset_path)?;

    let (train, test) = match test_path {
        Some(path) => (dataset, Dataset::load_from_file(path)?),
        None => {
            let mut rng = rand::thread_rng();
            dataset.split_holdout(holdout, &mut rng)?
        }
    };

    if test.is_empty() {
        bail!("No test examples to evaluate");
    }
    if train.is_empty() {
        bail!(
            "No training examples left after holding out {} of {} (lower --holdout or add examples)",
            test.len(),
            test.len() + train.len()
        );
    }

    tracing::info!(
        train = train.len(),
        test = test.len(),
        k = config.classifier.k,
        "Evaluating classifier"
    );

    let classifier = KnnClassifier::new(train, &config)?;

    // label -> (correct, total)
    let mut per_label: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for example in test.examples() {
        let expected = example.label().unwrap_or_default();
        let guess = classifier.guess_classification(example, verbose)?;
        let entry = per_label.entry(expected.to_string()).or_insert((0, 0));
        entry.1 += 1;
        if guess == expected {
            entry.0 += 1;
        } else {
            tracing::debug!(expected, guess = %guess, example = %example.id(), "Misclassified");
        }
    }

    let correct: usize = per_label.values().map(|(c, _)| c).sum();
    let accuracy = correct as f64 / test.len() as f64;

    println!("Accuracy: {correct}/{} ({:.1}%)", test.len(), accuracy * 100.0);
    for (label, (c, total)) in &per_label {
        println!("  {label}: {c}/{total}");
    }

    tracing::info!(
        accuracy = format!("{:.2}%", accuracy * 100.0),
        "Evaluation complete"
    );
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let dataset = Dataset::load_from_file(path)?;

    println!("Dataset: {}", path.display());
    println!("  Total examples: {}", dataset.len());
    println!();

    println!("Examples by label:");
    for (label, count) in dataset.label_counts() {
        println!("  {label}: {count}");
    }
    println!();

    for example in dataset.examples() {
        let id = example.id();
        println!(
            "  [{id}] {label} ({frames} frames, recorded {at})",
            id = id.get(..8).unwrap_or(id),
            label = example.label().unwrap_or_default(),
            frames = example.len(),
            at = example.recorded_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn load_trajectories(path: &Path) -> Result<Vec<Trajectory>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_trajectories(&text)
        .with_context(|| format!("Failed to parse trajectories from {}", path.display()))
}

/// Accept either a JSON array of trajectories or a single trajectory object.
/// Validation errors from the element or object are passed through.
fn parse_trajectories(text: &str) -> Result<Vec<Trajectory>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_array() {
        Ok(serde_json::from_value::<Vec<Trajectory>>(value)?)
    } else {
        Ok(vec![serde_json::from_value::<Trajectory>(value)?])
    }
}

/// Ask the user to confirm `guess`, or to supply the correct label.
fn confirm_guess(guess: Option<&str>) -> Result<String> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut prompt = |text: &str| -> Result<String> {
        print!("{text}");
        io::stdout().flush()?;
        match lines.next() {
            Some(line) => Ok(line?.trim().to_string()),
            None => bail!("stdin closed while waiting for a label"),
        }
    };

    if let Some(guess) = guess {
        let answer = prompt("Guess correct? [Y/N]: ")?;
        if answer.eq_ignore_ascii_case("y") {
            return Ok(guess.to_string());
        }
    }

    let label = prompt("Enter the correct label: ")?;
    if label.is_empty() {
        bail!("Label must not be empty");
    }
    Ok(label)
}
