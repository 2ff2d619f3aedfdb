//! Run report
//!
//! Accuracy summary, parameter echo and the per-record CSV listing.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::errors::{PipelineError, Result};
use crate::evaluation::{Accuracy, EvaluationResult};
use crate::learner::TrainingParams;

/// Header line of the per-record listing
pub const RESULTS_CSV_HEADER: &str = "outputAccurate,outputDenormalized,expected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub problem_number: u32,
    /// Parameters as the learner left them
    pub params: TrainingParams,
    pub structure: Option<String>,
    pub node_count: Option<usize>,
    pub train_size: usize,
    pub feature_width: usize,
    pub accuracy: Accuracy,
    pub results: Vec<EvaluationResult>,
}

impl RunReport {
    /// Overall accuracy in `[0, 1]`
    pub fn accuracy(&self) -> f64 {
        self.accuracy.value()
    }

    /// Human-readable summary lines, one fact per line
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Testing finished: problem {}", self.problem_number),
            format!(
                "backpropagationIterations: {}",
                self.params.backpropagation_iterations
            ),
            format!(
                "informationGainTrainIterations: {}",
                self.params.information_gain_train_iterations
            ),
            format!(
                "lazyTrainInnerTrainIterations: {}",
                self.params.lazy_train_inner_train_iterations
            ),
            format!(
                "lazyTrainMaximumTries: {}",
                self.params.lazy_train_maximum_tries
            ),
        ];

        if let Some(structure) = &self.structure {
            lines.push(format!("Network structure: {}", structure));
        }
        if let Some(nodes) = self.node_count {
            lines.push(format!("Network nodes number: {}", nodes));
        }

        lines.push(format!("Network accuracy: {}", self.accuracy()));
        lines.push(format!("Number of results: {}", self.results.len()));
        lines
    }

    /// Write the header and one `raw,thresholded,expected` line per test record.
    pub fn write_results_csv<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", RESULTS_CSV_HEADER)?;
        for result in &self.results {
            writeln!(
                out,
                "{},{},{}",
                result.raw_output, result.thresholded_output, result.expected
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Report(e.to_string()))
    }
}
