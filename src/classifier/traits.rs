//! The classification capability.
//!
//! Every strategy (k-NN with any `k` or vote policy) implements [`Classifier`]
//! so that the session layer can drive it uniformly without knowing how
//! distances are computed.

use crate::error::LfdResult;
use crate::trajectory::Trajectory;

pub trait Classifier {
    /// Guess the label of `trajectory`.
    ///
    /// `verbose` only controls diagnostic output; it never changes the
    /// returned label.
    fn guess_classification(&self, trajectory: &Trajectory, verbose: bool) -> LfdResult<String>;

    /// Fold a labeled trajectory into the classifier's examples.
    fn update(&mut self, trajectory: Trajectory) -> LfdResult<()>;
}
