//! Contract with the external learning component
//!
//! The pipeline hands the training set to a [`Learner`] and treats the returned
//! [`Model`] as an opaque prediction function. Diagnostic text and node counts
//! are passed through to the report without interpretation.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::encoder::EncodedRecord;

/// Iteration-count knobs forwarded to the learner.
///
/// A learner may normalize these during training; the values it leaves behind
/// are the ones echoed in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub backpropagation_iterations: u64,
    pub information_gain_train_iterations: u64,
    pub lazy_train_inner_train_iterations: u64,
    pub lazy_train_maximum_tries: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self::from_multipliers(1, 1)
    }
}

impl TrainingParams {
    /// Derive the knobs from the launcher's `j` (lazy training) and `k`
    /// (backpropagation) multipliers.
    pub fn from_multipliers(j: u64, k: u64) -> Self {
        let j2 = j.saturating_mul(j);
        Self {
            backpropagation_iterations: k.saturating_mul(k),
            information_gain_train_iterations: j2.saturating_mul(10),
            lazy_train_inner_train_iterations: j2,
            lazy_train_maximum_tries: j2,
        }
    }
}

/// A trained, read-only prediction function
pub trait Model {
    /// Continuous output for one encoded input vector
    fn predict(&self, input: &[f64]) -> f64;

    /// Human-readable structure, if the learner provides one
    fn structure(&self) -> Option<String> {
        None
    }

    /// Number of units or nodes, if the learner provides one
    fn node_count(&self) -> Option<usize> {
        None
    }
}

/// Black-box training step
pub trait Learner {
    type Model: Model;

    /// Fit a model to `training`. `params` may be rewritten to reflect the
    /// values actually used.
    fn train(&mut self, training: &[EncodedRecord], params: &mut TrainingParams)
        -> Result<Self::Model>;
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, input: &[f64]) -> f64 {
        (**self).predict(input)
    }

    fn structure(&self) -> Option<String> {
        (**self).structure()
    }

    fn node_count(&self) -> Option<usize> {
        (**self).node_count()
    }
}
