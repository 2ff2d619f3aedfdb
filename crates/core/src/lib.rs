//! attrenc core - attribute-aware encoding and evaluation pipeline
//!
//! Prepares mixed categorical/continuous tabular data for an external learner
//! and scores the learner's predictions.
//!
//! Modules:
//! - `dataset`: CSV loading into positional string rows
//! - `schema`: per-column descriptor inference
//! - `encoder`: one-hot / scaled feature vectors and class labels
//! - `partition`: seeded train/test splitting
//! - `learner`: contract with the external learning component
//! - `baseline`: majority-class reference learner
//! - `evaluation`: thresholding and accuracy
//! - `report`: run summary and CSV listing
//! - `pipeline`: fail-fast orchestration of the stages above
//! - `config`: layered run configuration

pub mod baseline;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod errors;
pub mod evaluation;
pub mod learner;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod schema;

pub use baseline::{MajorityClassLearner, MajorityClassModel};
pub use config::{
    AttributeKind, AttributeTypes, InferenceScope, ProblemPreset, RunConfig, UnseenCategoryPolicy,
};
pub use dataset::{RawRecord, RawTable};
pub use encoder::{EncodedRecord, RecordEncoder};
pub use errors::{PipelineError, Result};
pub use evaluation::{evaluate, threshold, Accuracy, Evaluation, EvaluationResult};
pub use learner::{Learner, Model, TrainingParams};
pub use partition::{Partition, Partitioner};
pub use pipeline::{Pipeline, PreparedDataset};
pub use report::{RunReport, RESULTS_CSV_HEADER};
pub use schema::{AttributeDescriptor, FeatureLayout, FeatureSpan, Schema};

/// Run the whole pipeline for `config` with the given learner.
pub async fn run_pipeline<L: Learner>(config: RunConfig, learner: &mut L) -> Result<RunReport> {
    Pipeline::new(config)?.run(learner).await
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
