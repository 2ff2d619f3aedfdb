//! Majority-class reference learner
//!
//! Stands in for a real learning component so the pipeline can run end to
//! end. It ignores the inputs and always predicts the most frequent training
//! label.

use anyhow::Result;

use crate::encoder::EncodedRecord;
use crate::learner::{Learner, Model, TrainingParams};

#[derive(Debug, Default, Clone, Copy)]
pub struct MajorityClassLearner;

/// Constant predictor produced by [`MajorityClassLearner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorityClassModel {
    class: usize,
}

impl MajorityClassModel {
    pub fn class(&self) -> usize {
        self.class
    }
}

impl Model for MajorityClassModel {
    fn predict(&self, _input: &[f64]) -> f64 {
        self.class as f64
    }

    fn structure(&self) -> Option<String> {
        Some(format!("majority(class={})", self.class))
    }

    fn node_count(&self) -> Option<usize> {
        Some(1)
    }
}

impl Learner for MajorityClassLearner {
    type Model = MajorityClassModel;

    fn train(
        &mut self,
        training: &[EncodedRecord],
        _params: &mut TrainingParams,
    ) -> Result<Self::Model> {
        if training.is_empty() {
            anyhow::bail!("cannot fit a majority class on an empty training set");
        }

        let classes = training.iter().map(|r| r.output).max().unwrap_or(0) + 1;
        let mut counts = vec![0usize; classes];
        for record in training {
            counts[record.output] += 1;
        }

        // Ties go to the lowest class index
        let class = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (class, &count)| {
                if count > best.1 {
                    (class, count)
                } else {
                    best
                }
            })
            .0;

        tracing::debug!(class, ?counts, "Fitted majority class");
        Ok(MajorityClassModel { class })
    }
}
