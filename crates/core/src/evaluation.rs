//! Evaluation harness
//!
//! Runs every held-out record through a model, thresholds the continuous
//! output and tallies accuracy. Neither the model nor the test set is touched.

use serde::{Deserialize, Serialize};

use crate::encoder::EncodedRecord;
use crate::errors::{PipelineError, Result};
use crate::learner::Model;

/// Cut-off above which a raw prediction counts as class 1
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary decision for a raw model output
pub fn threshold(raw: f64) -> f64 {
    if raw > DECISION_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

/// Outcome for one test record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(rename = "outputAccurate")]
    pub raw_output: f64,
    #[serde(rename = "outputDenormalized")]
    pub thresholded_output: f64,
    pub expected: usize,
}

impl EvaluationResult {
    pub fn is_correct(&self) -> bool {
        self.thresholded_output == self.expected as f64
    }
}

/// Correct and incorrect prediction counts over a non-empty test set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub incorrect: usize,
}

impl Accuracy {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// `correct / total`, always within `[0, 1]`
    pub fn value(&self) -> f64 {
        self.correct as f64 / self.total() as f64
    }
}

/// Per-record results in test-set order plus the aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub results: Vec<EvaluationResult>,
    pub accuracy: Accuracy,
}

/// Score `model` against `test`.
pub fn evaluate<M: Model + ?Sized>(model: &M, test: &[EncodedRecord]) -> Result<Evaluation> {
    if test.is_empty() {
        return Err(PipelineError::EmptyTestSet);
    }

    let mut results = Vec::with_capacity(test.len());
    let mut correct = 0;
    let mut incorrect = 0;

    for record in test {
        let raw_output = model.predict(&record.input);
        let result = EvaluationResult {
            raw_output,
            thresholded_output: threshold(raw_output),
            expected: record.output,
        };

        if result.is_correct() {
            correct += 1;
        } else {
            incorrect += 1;
        }
        results.push(result);
    }

    let accuracy = Accuracy { correct, incorrect };
    tracing::debug!(correct, incorrect, "Evaluated test set");

    Ok(Evaluation { results, accuracy })
}
